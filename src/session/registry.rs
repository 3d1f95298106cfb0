//! In-memory record of the one live token per user.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::store::UserId;

/// Shared map of user id to the token most recently issued for that user.
///
/// Cloning yields another handle to the same map. Construct a fresh
/// registry per authority (or per test) to get an isolated session space.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<UserId, String>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, subject: UserId) -> Option<String> {
        self.sessions.lock().get(&subject).cloned()
    }

    /// Store `token` for `subject` unless the current entry is still live.
    ///
    /// `is_live` is evaluated on the existing entry while the lock is held, so
    /// the check and the store happen as one step. Returns `false` when a
    /// live entry blocked the claim.
    pub fn claim<F>(&self, subject: UserId, token: String, is_live: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(&subject) {
            if is_live(existing) {
                return false;
            }
        }
        sessions.insert(subject, token);
        true
    }

    pub fn remove(&self, subject: UserId) -> Option<String> {
        self.sessions.lock().remove(&subject)
    }

    /// Number of entries whose token satisfies `predicate`.
    pub fn count_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        self.sessions
            .lock()
            .values()
            .filter(|token| predicate(token))
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_on_empty_registry_stores_token() {
        let registry = SessionRegistry::new();
        assert!(registry.claim(1, "t1".to_string(), |_| true));
        assert_eq!(registry.get(1).as_deref(), Some("t1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn live_entry_blocks_claim() {
        let registry = SessionRegistry::new();
        assert!(registry.claim(1, "t1".to_string(), |_| true));
        assert!(!registry.claim(1, "t2".to_string(), |existing| existing == "t1"));
        assert_eq!(registry.get(1).as_deref(), Some("t1"));
    }

    #[test]
    fn stale_entry_is_replaced() {
        let registry = SessionRegistry::new();
        assert!(registry.claim(1, "t1".to_string(), |_| true));
        assert!(registry.claim(1, "t2".to_string(), |_| false));
        assert_eq!(registry.get(1).as_deref(), Some("t2"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SessionRegistry::new();
        assert!(registry.claim(9, "t".to_string(), |_| true));
        assert_eq!(registry.remove(9).as_deref(), Some("t"));
        assert_eq!(registry.remove(9), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn count_where_filters_entries() {
        let registry = SessionRegistry::new();
        assert!(registry.claim(1, "live".to_string(), |_| true));
        assert!(registry.claim(2, "stale".to_string(), |_| true));
        assert_eq!(registry.count_where(|token| token == "live"), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clones_share_state() {
        let registry = SessionRegistry::new();
        let other = registry.clone();
        assert!(registry.claim(5, "t".to_string(), |_| true));
        assert_eq!(other.get(5).as_deref(), Some("t"));
    }

    #[test]
    fn subjects_are_independent() {
        let registry = SessionRegistry::new();
        assert!(registry.claim(1, "a".to_string(), |_| true));
        assert!(registry.claim(2, "b".to_string(), |_| true));
        registry.remove(1);
        assert_eq!(registry.get(2).as_deref(), Some("b"));
    }
}
