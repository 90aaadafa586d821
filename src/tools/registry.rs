//! Tool registry - name to tool mapping, dispatch and source aggregation

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use super::{CourseOutlineTool, CourseSearchTool, Source, Tool, ToolContext, ToolError};
use crate::llm::ToolDefinition;
use crate::search::SearchBackend;

/// Tools in registration order.
///
/// Immutable once built and safe to share between queries: all per-query
/// state lives in the [`ToolContext`] passed to each call.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with the content-search and outline tools over `backend`
    pub fn for_courses(backend: Arc<dyn SearchBackend>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CourseSearchTool::new(Arc::clone(&backend))));
        registry.register(Box::new(CourseOutlineTool::new(backend)));
        registry
    }

    /// Add a tool; a tool with the same name is replaced in place
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => {
                warn!("Replacing registered tool: {}", tool.name());
                self.tools[index] = tool;
            }
            None => self.tools.push(tool),
        }
    }

    /// Descriptors for the LLM, in registration order
    pub fn descriptors(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Run the named tool
    pub async fn dispatch(&self, name: &str, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!("dispatch {} {}", name, input);
        tool.execute(input, ctx).await
    }

    /// Sources recorded in `ctx`, by registration order then emission order
    pub fn collect_sources(&self, ctx: &ToolContext) -> Vec<Source> {
        self.tools.iter().flat_map(|t| ctx.sources_for(t.name())).collect()
    }

    /// Reset `ctx` so nothing surfaces on the next collection
    pub fn clear_sources(&self, ctx: &ToolContext) {
        ctx.clear();
    }
}
