//! Tool system for LLM interactions
//!
//! Tools give the model read access to course material. Each query gets a
//! fresh [`ToolContext`] that collects the sources the tools surfaced, so a
//! single [`ToolRegistry`] can serve concurrent queries.

mod context;
mod course_outline;
mod course_search;
mod registry;

pub use context::ToolContext;
pub use course_outline::CourseOutlineTool;
pub use course_search::CourseSearchTool;
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::ToolDefinition;

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches LLM tool_use name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Descriptor advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }

    /// Execute the tool, recording any sources into `ctx`
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError>;
}

/// Citation for a passage or course a tool surfaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub lesson_number: Option<u32>,
    pub url: Option<String>,
}

impl Source {
    pub fn new(title: impl Into<String>, lesson_number: Option<u32>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            lesson_number,
            url,
        }
    }
}

/// Errors that can occur during tool dispatch
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Execution(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidInput(err.to_string())
    }
}
