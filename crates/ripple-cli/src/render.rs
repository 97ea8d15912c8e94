//! Terminal rendering for feed snapshots.
//!
//! Presentation only: humanized timestamps, mention highlighting, and
//! comment truncation all live here, outside the synchronization core.

use std::collections::HashSet;

use ripple_core::mention::{segment_mentions, Segment};
use ripple_core::presence::PresenceRoster;
use ripple_core::{FeedSnapshot, Post};

/// Render a whole snapshot, newest post first.
pub fn render_feed(
    snapshot: &FeedSnapshot,
    directory: &HashSet<String>,
    roster: &PresenceRoster,
    now_ms: i64,
    max_comments: usize,
) -> String {
    let mut out = format!(
        "{} online · {} post{}\n",
        roster.count(now_ms),
        snapshot.len(),
        if snapshot.len() == 1 { "" } else { "s" }
    );
    for post in &snapshot.posts {
        out.push_str(&render_post(post, directory, now_ms, max_comments));
    }
    out
}

fn render_post(
    post: &Post,
    directory: &HashSet<String>,
    now_ms: i64,
    max_comments: usize,
) -> String {
    let mut out = format!(
        "\n@{} · {}\n  {}\n",
        post.author,
        format_relative_time(post.created_at, now_ms),
        highlight_mentions(&post.body, directory)
    );

    if !post.likes.is_empty() {
        out.push_str(&format!(
            "  ♥ {} ({})\n",
            post.like_count(),
            post.likes.join(", ")
        ));
    }

    let hidden = post.comments.len().saturating_sub(max_comments);
    if hidden > 0 {
        out.push_str(&format!("  (… {hidden} earlier comment{})\n", if hidden == 1 { "" } else { "s" }));
    }
    for comment in post.comments.iter().skip(hidden) {
        out.push_str(&format!(
            "  @{} · {}: {}\n",
            comment.author,
            format_relative_time(comment.created_at, now_ms),
            highlight_mentions(&comment.body, directory)
        ));
    }
    out
}

/// Wrap recognised mentions in ANSI bold; unknown tokens pass through.
pub fn highlight_mentions(text: &str, directory: &HashSet<String>) -> String {
    segment_mentions(text, directory)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(run) => run,
            Segment::Mention(name) => format!("\u{1b}[1m@{name}\u{1b}[0m"),
        })
        .collect()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ripple_core::{Comment, PostId};

    use super::*;

    fn directory(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    fn post_with_comments(count: usize) -> Post {
        let mut post = Post::new(PostId::new(), "alice", "hello", 1000);
        for seq in 1..=count {
            post.comments.push(Comment {
                author: "bob".to_string(),
                body: format!("comment {seq}"),
                created_at: 1000 + seq as i64,
                seq: seq as u64,
            });
        }
        post
    }

    #[test]
    fn format_relative_time_units() {
        let now = 10_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
        assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    }

    #[test]
    fn highlight_only_known_mentions() {
        let highlighted = highlight_mentions("hi @bob and @ghost", &directory(&["bob"]));
        assert!(highlighted.contains("\u{1b}[1m@bob\u{1b}[0m"));
        assert!(highlighted.contains("@ghost"));
        assert!(!highlighted.contains("\u{1b}[1m@ghost"));
    }

    #[test]
    fn render_post_truncates_to_trailing_comments() {
        let post = post_with_comments(5);
        let rendered = render_post(&post, &directory(&[]), 2000, 3);

        assert!(rendered.contains("(… 2 earlier comments)"));
        assert!(!rendered.contains("comment 1"));
        assert!(!rendered.contains("comment 2"));
        assert!(rendered.contains("comment 3"));
        assert!(rendered.contains("comment 5"));
    }

    #[test]
    fn render_post_without_overflow_shows_everything() {
        let post = post_with_comments(2);
        let rendered = render_post(&post, &directory(&[]), 2000, 3);

        assert!(!rendered.contains("earlier comment"));
        assert!(rendered.contains("comment 1"));
        assert!(rendered.contains("comment 2"));
    }

    #[test]
    fn render_feed_includes_presence_header() {
        let mut roster = PresenceRoster::new(1000);
        roster.heartbeat("alice", 0);
        roster.heartbeat("bob", 0);

        let snapshot = FeedSnapshot::default();
        let rendered = render_feed(&snapshot, &directory(&[]), &roster, 10, 3);
        assert!(rendered.starts_with("2 online · 0 posts"));
    }
}
