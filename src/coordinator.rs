//! Query coordinator - one question in, one answer plus sources out.
//!
//! Wraps the orchestrator with session history and per-query source
//! harvesting. The tool registry is shared; every query gets its own
//! [`ToolContext`], so sources from concurrent queries cannot mix.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::llm::{LlmClient, ToolDefinition};
use crate::orchestrator::{Orchestrator, ToolSet};
use crate::session::SessionStore;
use crate::tools::{Source, ToolContext, ToolRegistry};

/// Answer text and the sources the tools surfaced while producing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<Source>,
}

pub struct QueryCoordinator<L: LlmClient, S: SessionStore> {
    orchestrator: Orchestrator<L>,
    registry: Arc<ToolRegistry>,
    sessions: Arc<S>,
}

impl<L: LlmClient, S: SessionStore> QueryCoordinator<L, S> {
    pub fn new(orchestrator: Orchestrator<L>, registry: Arc<ToolRegistry>, sessions: Arc<S>) -> Self {
        Self {
            orchestrator,
            registry,
            sessions,
        }
    }

    /// Answer `question`, reading and extending the session's history when an id is given.
    ///
    /// Without a session id nothing is read or persisted and no session is created.
    pub async fn query(&self, question: &str, session_id: Option<&str>) -> Result<QueryAnswer> {
        let history = match session_id {
            Some(id) => self.sessions.history(id)?,
            None => None,
        };

        let ctx = ToolContext::new();
        let outcome = self
            .orchestrator
            .respond(question, history.as_deref(), Some(ToolSet::new(&self.registry, &ctx)))
            .await;

        // Harvest and reset on every path, including a failed model call
        let sources = self.registry.collect_sources(&ctx);
        self.registry.clear_sources(&ctx);
        let answer = outcome?;

        if let Some(id) = session_id {
            self.sessions.append_exchange(id, question, &answer)?;
        }

        info!(
            "query answered: session={:?}, {} sources",
            session_id,
            sources.len()
        );
        Ok(QueryAnswer { answer, sources })
    }

    /// Start a session for a caller that wants history across queries
    pub fn create_session(&self) -> Result<String> {
        self.sessions.create_session()
    }

    /// Tool descriptors, in registration order
    pub fn tool_descriptors(&self) -> Vec<ToolDefinition> {
        self.registry.descriptors()
    }
}
