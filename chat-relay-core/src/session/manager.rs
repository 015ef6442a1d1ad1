//! Keyed in-memory store for conversation sessions

use super::store::{ChatTurn, Session};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps session identifiers to their conversation history.
///
/// Cloning is cheap and every clone shares the same sessions. Locks are held
/// only for the in-memory update, never across I/O.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn, creating the session on first use
    pub fn append(&self, key: &str, turn: ChatTurn) {
        let mut sessions = self.sessions.write();
        sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key))
            .push(turn);
    }

    /// Append a user turn and its reply under a single lock acquisition, so
    /// concurrent exchanges on one session never interleave.
    pub fn append_exchange(&self, key: &str, user: ChatTurn, assistant: ChatTurn) {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key));
        session.push(user);
        session.push(assistant);
    }

    /// Reset a session to empty. Unknown sessions are left absent.
    pub fn clear(&self, key: &str) {
        if let Some(session) = self.sessions.write().get_mut(key) {
            session.clear();
        }
    }

    /// Snapshot of a session's turns in conversation order
    pub fn get(&self, key: &str) -> Vec<ChatTurn> {
        self.sessions
            .read()
            .get(key)
            .map(|session| session.turns().to_vec())
            .unwrap_or_default()
    }

    /// Number of turns in a session
    pub fn len(&self, key: &str) -> usize {
        self.sessions.read().get(key).map_or(0, Session::len)
    }

    /// Number of sessions the store has seen
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.get("missing").is_empty());
        assert_eq!(store.len("missing"), 0);
    }

    #[test]
    fn test_append_creates_and_orders() {
        let store = SessionStore::new();
        store.append("a", ChatTurn::user("one"));
        store.append("a", ChatTurn::assistant("two"));

        let turns = store.get("a");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content(), "one");
        assert_eq!(turns[1].role(), Role::Assistant);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store.append("a", ChatTurn::user("for a"));
        store.append("b", ChatTurn::user("for b"));

        assert_eq!(store.len("a"), 1);
        assert_eq!(store.get("b")[0].content(), "for b");
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::new();
        store.append_exchange("a", ChatTurn::user("q"), ChatTurn::assistant("r"));

        store.clear("a");
        assert!(store.get("a").is_empty());
        store.clear("a");
        assert!(store.get("a").is_empty());

        store.clear("never-seen");
        assert!(store.get("never-seen").is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        other.append("a", ChatTurn::user("shared"));
        assert_eq!(store.len("a"), 1);
    }

    #[test]
    fn test_concurrent_exchanges_stay_paired() {
        let store = SessionStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.append_exchange(
                            "shared",
                            ChatTurn::user(format!("q{}-{}", i, j)),
                            ChatTurn::assistant(format!("a{}-{}", i, j)),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let turns = store.get("shared");
        assert_eq!(turns.len(), 8 * 50 * 2);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role(), Role::User);
            assert_eq!(pair[1].role(), Role::Assistant);
            assert_eq!(&pair[0].content()[1..], &pair[1].content()[1..]);
        }
    }
}
