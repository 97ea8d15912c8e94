//! Ripple demo client.
//!
//! Drives the synchronization core end to end against a simulated
//! persistence collaborator: optimistic posts, likes, and comments from the
//! local identity, fabricated peer activity (including deliberate event
//! redelivery), a rejected or cancelled intent to show rollback, and a
//! rendered feed at the end.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ripple_core::hub::{self, FeedEvent};
use ripple_core::presence::PresenceRoster;
use ripple_core::remote::{SharedSession, SyncDriver};
use ripple_core::{FeedConfig, FeedSession, PostId};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

mod backend;
mod render;

use backend::{SimBackend, SimBackendConfig};

#[derive(Parser)]
#[command(name = "ripple")]
#[command(about = "Demo client for the Ripple feed synchronization core")]
#[command(version)]
struct Cli {
    /// Local identity, as the identity provider would supply it
    #[arg(long, default_value = "alice")]
    user: String,

    /// Simulated remote participants
    #[arg(long, value_delimiter = ',', default_value = "bob,carol")]
    peers: Vec<String>,

    /// Simulated backend acknowledgment latency in milliseconds
    #[arg(long, default_value = "25")]
    latency_ms: u64,

    /// Reject every Nth submission (0 disables rejections)
    #[arg(long, default_value = "0")]
    reject_every: usize,

    /// Show at most this many trailing comments per post
    #[arg(long, default_value = "3")]
    max_comments: usize,

    /// Dump the final snapshot as JSON instead of rendered text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] ripple_core::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ripple=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let (submission_tx, submission_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();

    let mut session = FeedSession::new(FeedConfig::default());
    session.attach_backend(submission_tx);
    session.identity_ready(&cli.user);
    session.subscribe(hub::observer(|event: &FeedEvent| {
        println!("  · {}", describe_event(event));
        Ok(())
    }));

    let session: SharedSession = Arc::new(Mutex::new(session));
    let _driver = tokio::spawn(SyncDriver::new(event_rx, reply_rx).run(Arc::clone(&session)));
    let _backend = tokio::spawn(
        SimBackend::new(
            SimBackendConfig {
                latency: Duration::from_millis(cli.latency_ms),
                reject_every: cli.reject_every,
                peers: cli.peers.clone(),
            },
            submission_rx,
            event_tx,
            reply_tx,
        )
        .run(),
    );

    run_script(&session, &cli).await?;
    settle(cli.latency_ms).await;

    let now_ms = chrono::Utc::now().timestamp_millis();
    let mut roster = PresenceRoster::new(60_000);
    roster.heartbeat(&cli.user, now_ms);
    for peer in &cli.peers {
        roster.heartbeat(peer, now_ms);
    }

    let mut directory: HashSet<String> = cli.peers.iter().cloned().collect();
    directory.insert(cli.user.clone());

    let mut session = session.lock().await;
    for (correlation, error) in session.take_rejections() {
        println!("  ! intent {correlation} rolled back: {error}");
    }
    for warning in session.take_observer_warnings() {
        tracing::warn!(subscription = ?warning.subscription, "observer warning: {}", warning.message);
    }
    let snapshot = session.snapshot();
    drop(session);

    println!();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "{}",
            render::render_feed(&snapshot, &directory, &roster, now_ms, cli.max_comments)
        );
    }
    Ok(())
}

/// The scripted demo session: post, wait for authoritative ids, interact,
/// then cancel one intent mid-flight.
async fn run_script(session: &SharedSession, cli: &Cli) -> Result<(), CliError> {
    let mention = cli.peers.first().cloned().unwrap_or_else(|| cli.user.clone());

    {
        let mut session = session.lock().await;
        session.post("Saw a heron by the river this morning")?;
        session.post(format!("Anyone up for a walk later, @{mention}?"))?;
    }

    // Let the backend ack both posts so the feed holds authoritative ids.
    settle(cli.latency_ms).await;

    let oldest = {
        let session = session.lock().await;
        session.snapshot().posts.last().map(|post| post.id)
    };
    if let Some(post) = oldest {
        interact_with(session, post).await?;
    }

    settle(cli.latency_ms).await;
    Ok(())
}

async fn interact_with(session: &SharedSession, post: PostId) -> Result<(), CliError> {
    let mut session = session.lock().await;
    session.like(post)?;
    session.comment(post, "Lovely spot, going back tomorrow")?;

    // Propose and immediately cancel, before the ack can arrive; the
    // backend's late ack for it is discarded by the driver.
    let cancelled = session.comment(post, "typo, never mind")?;
    session.cancel(cancelled.correlation())?;
    Ok(())
}

fn describe_event(event: &FeedEvent) -> String {
    match event {
        FeedEvent::Snapshot(snapshot) => format!("initial snapshot ({} posts)", snapshot.len()),
        FeedEvent::PostAdded(post) => format!("post added by @{}", post.author),
        FeedEvent::PostUpdated(post) => format!(
            "post by @{} updated ({} likes, {} comments)",
            post.author,
            post.like_count(),
            post.comments.len()
        ),
        FeedEvent::PostRemoved(id) => format!("post {id} removed"),
    }
}

async fn settle(latency_ms: u64) {
    tokio::time::sleep(Duration::from_millis(latency_ms * 6 + 20)).await;
}
