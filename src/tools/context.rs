//! Tool execution context - scoped to a single query

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::Source;

/// Per-query scratch state handed to every tool call.
///
/// Sources are kept per tool name; a tool recording again replaces its
/// previous list. Dropped with the query, so nothing carries over.
#[derive(Debug, Default)]
pub struct ToolContext {
    sources: Mutex<HashMap<String, Vec<Source>>>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Vec<Source>>> {
        self.sources.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the sources recorded by `tool`
    pub fn record_sources(&self, tool: &str, sources: Vec<Source>) {
        self.slots().insert(tool.to_string(), sources);
    }

    /// Sources last recorded by `tool`
    pub fn sources_for(&self, tool: &str) -> Vec<Source> {
        self.slots().get(tool).cloned().unwrap_or_default()
    }

    pub fn has_sources(&self) -> bool {
        self.slots().values().any(|s| !s.is_empty())
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.slots().clear();
    }
}
