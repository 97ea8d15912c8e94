//! @mention segmentation for post and comment bodies.
//!
//! A presentation-side concern kept outside the store, hub, and mutator:
//! the core never interprets mentions, it only stores the text. Front-ends
//! call [`segment_mentions`] with whatever identity lookup they have.

use regex::Regex;

/// Lookup capability deciding whether an `@token` names a known identity.
pub trait IdentityDirectory {
    fn is_known(&self, identity: &str) -> bool;
}

impl<F> IdentityDirectory for F
where
    F: Fn(&str) -> bool,
{
    fn is_known(&self, identity: &str) -> bool {
        self(identity)
    }
}

impl IdentityDirectory for std::collections::HashSet<String> {
    fn is_known(&self, identity: &str) -> bool {
        self.contains(identity)
    }
}

/// One run of segmented text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Mention(String),
}

/// Split `text` into plain runs and recognised mentions.
///
/// Mention tokens match `@[A-Za-z0-9_][A-Za-z0-9_.-]*`. A token the
/// directory does not recognise stays part of the surrounding plain text,
/// byte for byte.
///
/// # Examples
///
/// ```
/// use ripple_core::mention::{segment_mentions, Segment};
///
/// let segments = segment_mentions("hi @bob!", &|token: &str| token == "bob");
/// assert_eq!(segments[0], Segment::Text("hi ".to_string()));
/// assert_eq!(segments[1], Segment::Mention("bob".to_string()));
/// assert_eq!(segments[2], Segment::Text("!".to_string()));
/// ```
#[must_use]
pub fn segment_mentions(text: &str, directory: &impl IdentityDirectory) -> Vec<Segment> {
    let re = Regex::new(r"@([A-Za-z0-9_][A-Za-z0-9_.-]*)").expect("Invalid regex");

    let mut segments = Vec::new();
    let mut cursor = 0;
    for captures in re.captures_iter(text) {
        let Some(whole) = captures.get(0) else { continue };
        let token = &captures[1];
        if !directory.is_known(token) {
            continue;
        }

        if whole.start() > cursor {
            segments.push(Segment::Text(text[cursor..whole.start()].to_string()));
        }
        segments.push(Segment::Mention(token.to_string()));
        cursor = whole.end();
    }
    if cursor < text.len() {
        segments.push(Segment::Text(text[cursor..].to_string()));
    }
    segments
}
