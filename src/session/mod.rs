//! Session store contract and implementations.
//!
//! A session is an ordered, bounded list of question/answer exchanges. The
//! store owns session lifecycle; the query path only reads history and
//! appends exchanges.

mod jsonl;
mod memory;

pub use jsonl::JsonlSessionStore;
pub use memory::InMemorySessionStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One completed question and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Render exchanges as plain `User:`/`Assistant:` lines; `None` when there are none
pub fn format_history<'a>(exchanges: impl IntoIterator<Item = &'a Exchange>) -> Option<String> {
    let lines: Vec<String> = exchanges
        .into_iter()
        .map(|e| format!("User: {}\nAssistant: {}", e.question, e.answer))
        .collect();

    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

/// Storage for conversation sessions
pub trait SessionStore: Send + Sync {
    /// Start a new, empty session and return its id
    fn create_session(&self) -> Result<String>;

    /// Formatted prior exchanges, or `None` for an unknown or empty session
    fn history(&self, session_id: &str) -> Result<Option<String>>;

    /// Record an exchange, creating the session if it does not exist yet
    fn append_exchange(&self, session_id: &str, question: &str, answer: &str) -> Result<()>;
}
