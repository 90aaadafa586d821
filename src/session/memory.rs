//! In-process session store.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use super::{Exchange, SessionStore, format_history};
use crate::error::{CoursemateError, Result};
use crate::id::generate_session_id;

/// Sessions held in memory, each trimmed to the newest `max_history` exchanges
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, VecDeque<Exchange>>>,
    max_history: usize,
}

impl InMemorySessionStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history,
        }
    }

    /// Append without going through an id check; used when replaying persisted exchanges
    pub(crate) fn push(&self, session_id: &str, exchange: Exchange) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| CoursemateError::Session(e.to_string()))?;
        let exchanges = sessions.entry(session_id.to_string()).or_default();
        exchanges.push_back(exchange);
        while exchanges.len() > self.max_history {
            exchanges.pop_front();
        }
        Ok(())
    }

    /// Exchanges currently kept for a session
    pub fn exchanges(&self, session_id: &str) -> Result<Vec<Exchange>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| CoursemateError::Session(e.to_string()))?;
        Ok(sessions
            .get(session_id)
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .map(|s| s.contains_key(session_id))
            .unwrap_or(false)
    }
}

impl SessionStore for InMemorySessionStore {
    fn create_session(&self) -> Result<String> {
        let id = generate_session_id();
        self.sessions
            .write()
            .map_err(|e| CoursemateError::Session(e.to_string()))?
            .insert(id.clone(), VecDeque::new());
        Ok(id)
    }

    fn history(&self, session_id: &str) -> Result<Option<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| CoursemateError::Session(e.to_string()))?;
        Ok(sessions.get(session_id).and_then(|e| format_history(e.iter())))
    }

    fn append_exchange(&self, session_id: &str, question: &str, answer: &str) -> Result<()> {
        self.push(session_id, Exchange::new(question, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_is_empty() {
        let store = InMemorySessionStore::new(2);
        let id = store.create_session().unwrap();

        assert!(store.contains(&id));
        assert!(store.history(&id).unwrap().is_none());
    }

    #[test]
    fn test_unknown_session_has_no_history() {
        let store = InMemorySessionStore::new(2);
        assert!(store.history("session-missing").unwrap().is_none());
        assert!(!store.contains("session-missing"));
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_append_creates_missing_session() {
        let store = InMemorySessionStore::new(2);
        store.append_exchange("session-new", "Hi", "Hello").unwrap();

        assert_eq!(
            store.history("session-new").unwrap().as_deref(),
            Some("User: Hi\nAssistant: Hello")
        );
    }

    #[test]
    fn test_history_bounded_to_most_recent() {
        let store = InMemorySessionStore::new(2);
        let id = store.create_session().unwrap();
        store.append_exchange(&id, "q1", "a1").unwrap();
        store.append_exchange(&id, "q2", "a2").unwrap();
        store.append_exchange(&id, "q3", "a3").unwrap();

        assert_eq!(
            store.exchanges(&id).unwrap(),
            vec![Exchange::new("q2", "a2"), Exchange::new("q3", "a3")]
        );
        assert_eq!(
            store.history(&id).unwrap().as_deref(),
            Some("User: q2\nAssistant: a2\nUser: q3\nAssistant: a3")
        );
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = InMemorySessionStore::new(2);
        let a = store.create_session().unwrap();
        let b = store.create_session().unwrap();
        store.append_exchange(&a, "only in a", "yes").unwrap();

        assert!(store.history(&b).unwrap().is_none());
    }
}
