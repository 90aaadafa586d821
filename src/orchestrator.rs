//! Orchestrator - bounded model/tool round loop for one question.
//!
//! Each question runs through a small state machine:
//!
//! 1. Compose the system context and a single user message
//! 2. Call the model, with tools attached when a tool set was supplied
//! 3. Branch on the stop reason:
//!    - no tool requested: return the text
//!    - tool requested with rounds left: run the tools, append the exchange, call again
//!    - tool requested on the last round: run the tools, then make one final call
//!      without tools so the model has to answer in text
//!
//! Tool failures become tool-result text for the model; only a failing model
//! call ends the question with an error.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, Message, ToolCall, ToolResult};
use crate::tools::{ToolContext, ToolRegistry};

/// Tool-enabled model calls per question; one more tool-less call may follow
pub const MAX_ROUNDS: usize = 2;

/// Fixed instruction text sent as the system prompt
pub const SYSTEM_PROMPT: &str = "You are an assistant for course materials and educational content, with tools for looking up course information.

Tool use:
- Outline or structure questions (lesson lists, course overviews): use get_course_outline for the course title, link and numbered lessons
- Content or detail questions about specific material: use search_course_content
- General knowledge questions: answer directly without a tool
- At most two sequential tool calls per question; make a second call only when the first result shows more information is needed
- If a tool finds nothing, say so plainly

Answers:
- Give the answer directly, without describing your search or reasoning
- Do not say \"based on the search results\" or \"based on the outline\"
- Keep answers brief, accurate, educational and clear, with an example when it helps";

/// Tools available to one question: the shared registry plus that question's context
#[derive(Clone, Copy)]
pub struct ToolSet<'a> {
    pub registry: &'a ToolRegistry,
    pub ctx: &'a ToolContext,
}

impl<'a> ToolSet<'a> {
    pub fn new(registry: &'a ToolRegistry, ctx: &'a ToolContext) -> Self {
        Self { registry, ctx }
    }
}

/// What to do after a model response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Hand the response text back to the caller
    Return,
    /// Run the requested tools and call again with tools attached
    Advance,
    /// Run the requested tools, then make the final tool-less call
    ForceFinal,
}

/// Decide the next step for the response received on `round` (0-based)
pub fn branch(round: usize, response: &CompletionResponse, tools_attached: bool) -> Branch {
    let wants_tools = response.stop_reason.needs_continuation() && !response.tool_calls().is_empty();
    if !wants_tools || !tools_attached {
        Branch::Return
    } else if round + 1 < MAX_ROUNDS {
        Branch::Advance
    } else {
        Branch::ForceFinal
    }
}

/// System prompt, with prior conversation appended when there is any
pub fn system_context(history: Option<&str>) -> String {
    match history {
        Some(history) if !history.is_empty() => {
            format!("{}\n\nPrevious conversation:\n{}", SYSTEM_PROMPT, history)
        }
        _ => SYSTEM_PROMPT.to_string(),
    }
}

enum State {
    Call { round: usize },
    ForceFinal,
    Done(String),
}

/// Request settings shared by every call of a question
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 800,
            temperature: 0.0,
        }
    }
}

impl From<&LlmConfig> for OrchestratorConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: Some(config.model.clone()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

pub struct Orchestrator<L: LlmClient> {
    llm: Arc<L>,
    config: OrchestratorConfig,
}

impl<L: LlmClient> Orchestrator<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self::with_config(llm, OrchestratorConfig::default())
    }

    pub fn with_config(llm: Arc<L>, config: OrchestratorConfig) -> Self {
        Self { llm, config }
    }

    /// Answer `question`, letting the model call tools from `tools` for up to MAX_ROUNDS rounds
    pub async fn respond(&self, question: &str, history: Option<&str>, tools: Option<ToolSet<'_>>) -> Result<String> {
        let system = system_context(history);
        let mut messages = vec![Message::user(question)];
        let mut state = State::Call { round: 0 };

        loop {
            state = match state {
                State::Call { round } => {
                    let request = self.request(&system, &messages, tools);
                    let response = self.llm.complete(request).await?;
                    let next = branch(round, &response, tools.is_some());
                    debug!("round {}: {:?} -> {:?}", round, response.stop_reason, next);

                    match (next, tools) {
                        (Branch::Advance, Some(set)) => {
                            self.absorb(response, set, &mut messages).await;
                            State::Call { round: round + 1 }
                        }
                        (Branch::ForceFinal, Some(set)) => {
                            self.absorb(response, set, &mut messages).await;
                            State::ForceFinal
                        }
                        _ => State::Done(response.text()),
                    }
                }
                State::ForceFinal => {
                    debug!("rounds exhausted, forcing a text answer");
                    let request = self.request(&system, &messages, None);
                    let response = self.llm.complete(request).await?;
                    State::Done(response.text())
                }
                State::Done(answer) => return Ok(answer),
            };
        }
    }

    /// Configured model, else the client's own default
    fn model(&self) -> String {
        self.config
            .model
            .clone()
            .unwrap_or_else(|| self.llm.model().to_string())
    }

    fn request(&self, system: &str, messages: &[Message], tools: Option<ToolSet<'_>>) -> CompletionRequest {
        let mut request = CompletionRequest {
            system: system.to_string(),
            messages: messages.to_vec(),
            model: Some(self.model()),
            ..Default::default()
        }
        .with_max_tokens(self.config.max_tokens)
        .with_temperature(self.config.temperature);

        if let Some(set) = tools {
            request = request.with_tools(set.registry.descriptors());
        }
        request
    }

    /// Run the response's tool calls and append the assistant turn plus its results
    async fn absorb(&self, response: CompletionResponse, set: ToolSet<'_>, messages: &mut Vec<Message>) {
        let results = self.run_tools(response.tool_calls(), set).await;
        messages.push(Message::assistant_blocks(response.content));
        messages.push(Message::tool_results(results));
    }

    /// Dispatch calls one at a time, in emission order; failures become error results
    async fn run_tools(&self, calls: Vec<ToolCall>, set: ToolSet<'_>) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let result = match set.registry.dispatch(&call.name, call.input, set.ctx).await {
                Ok(content) => ToolResult::success(call.id, content),
                Err(e) => {
                    warn!("tool {} failed: {}", call.name, e);
                    ToolResult::error(call.id, format!("Tool execution error: {}", e))
                }
            };
            results.push(result);
        }

        results
    }
}
