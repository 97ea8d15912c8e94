//! Heartbeat-based presence roster.
//!
//! Pure in-memory bookkeeping: an identity counts as online while its last
//! heartbeat is within the configured TTL. Callers pass the current time
//! explicitly, so the roster stays deterministic under test.

use std::collections::HashMap;

/// Tracks which identities are currently online.
#[derive(Debug, Clone)]
pub struct PresenceRoster {
    ttl_ms: i64,
    heartbeats: HashMap<String, i64>,
}

impl PresenceRoster {
    /// Create a roster where a heartbeat keeps an identity online for
    /// `ttl_ms` milliseconds.
    #[must_use]
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            heartbeats: HashMap::new(),
        }
    }

    /// Record a heartbeat for `identity` at `now_ms`.
    pub fn heartbeat(&mut self, identity: impl Into<String>, now_ms: i64) {
        self.heartbeats.insert(identity.into(), now_ms);
    }

    /// Remove `identity` immediately, regardless of TTL.
    pub fn leave(&mut self, identity: &str) {
        self.heartbeats.remove(identity);
    }

    #[must_use]
    pub fn is_online(&self, identity: &str, now_ms: i64) -> bool {
        self.heartbeats
            .get(identity)
            .is_some_and(|last| now_ms.saturating_sub(*last) < self.ttl_ms)
    }

    /// Number of identities online at `now_ms`. Each identity counts once
    /// no matter how many heartbeats it sent.
    #[must_use]
    pub fn count(&self, now_ms: i64) -> usize {
        self.heartbeats
            .values()
            .filter(|last| now_ms.saturating_sub(**last) < self.ttl_ms)
            .count()
    }

    /// Identities online at `now_ms`, sorted for deterministic output.
    #[must_use]
    pub fn online(&self, now_ms: i64) -> Vec<String> {
        let mut names: Vec<String> = self
            .heartbeats
            .iter()
            .filter(|(_, last)| now_ms.saturating_sub(**last) < self.ttl_ms)
            .map(|(identity, _)| identity.clone())
            .collect();
        names.sort();
        names
    }

    /// Drop entries whose heartbeat has expired.
    pub fn prune(&mut self, now_ms: i64) {
        let ttl_ms = self.ttl_ms;
        self.heartbeats
            .retain(|_, last| now_ms.saturating_sub(*last) < ttl_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_heartbeats_count_once() {
        let mut roster = PresenceRoster::new(1000);
        roster.heartbeat("alice", 0);
        roster.heartbeat("alice", 100);
        roster.heartbeat("bob", 100);

        assert_eq!(roster.count(500), 2);
        assert_eq!(roster.online(500), vec!["alice", "bob"]);
    }

    #[test]
    fn stale_heartbeats_expire() {
        let mut roster = PresenceRoster::new(1000);
        roster.heartbeat("alice", 0);
        roster.heartbeat("bob", 800);

        assert!(roster.is_online("alice", 999));
        assert!(!roster.is_online("alice", 1000));
        assert_eq!(roster.count(1500), 1);
    }

    #[test]
    fn leave_removes_immediately() {
        let mut roster = PresenceRoster::new(1000);
        roster.heartbeat("alice", 0);
        roster.leave("alice");

        assert!(!roster.is_online("alice", 1));
        assert_eq!(roster.count(1), 0);
    }

    #[test]
    fn prune_drops_expired_entries() {
        let mut roster = PresenceRoster::new(1000);
        roster.heartbeat("alice", 0);
        roster.heartbeat("bob", 900);
        roster.prune(1200);

        assert_eq!(roster.online(1200), vec!["bob"]);
    }
}
