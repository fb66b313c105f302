//! The tool-augmented conversation loop.
//!
//! [`ToolLoop::run`] sends the conversation, and while the service answers
//! with `finish_reason = "tool_calls"` it runs every requested tool through
//! the [`ToolRegistry`], logs one tool reply per call in the order the calls
//! were made, and asks again. The first answer that is not a tool request
//! ends the loop.
//!
//! There is exactly one request in flight at any time and tools of a turn
//! run one after another. Any error ends the loop immediately; nothing is
//! retried and no partial tool results are ever sent.

use tracing::{debug, info, warn};

use crate::api::{ChatMessage, ChatRequest, ChatResponse, FinishReason, ToolChoice, Usage};
use crate::core::conversation::Conversation;
use crate::core::error::ChatError;
use crate::core::tools::ToolRegistry;
use crate::core::transport::Transport;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_STOP_SEQUENCE: &str = "<|eot_id|>";
pub const DEFAULT_MAX_TOKENS: u32 = 256;

/// Per-request sampling settings plus the loop's own knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: f32,
    pub stop: Vec<String>,
    pub max_tokens: u32,
    /// Policy sent whenever tools are declared.
    pub tool_choice: ToolChoice,
    /// Opt-in ceiling on request/response rounds. `None` loops until the
    /// service stops asking for tools.
    pub max_rounds: Option<usize>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            stop: vec![DEFAULT_STOP_SEQUENCE.to_string()],
            max_tokens: DEFAULT_MAX_TOKENS,
            tool_choice: ToolChoice::Auto,
            max_rounds: None,
        }
    }
}

impl CompletionOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }
}

/// Result of a finished loop.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The assistant message that ended the loop.
    pub message: ChatMessage,
    pub finish_reason: Option<FinishReason>,
    /// Token usage summed over every round.
    pub usage: Usage,
    /// Number of request/response cycles performed.
    pub rounds: usize,
    /// The full log, ending with `message`.
    pub conversation: Conversation,
}

impl LoopOutcome {
    pub fn content(&self) -> &str {
        self.message.text()
    }
}

enum State {
    AwaitingResponse,
    DispatchingTools(ChatMessage),
    Done(ChatMessage, Option<FinishReason>),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::AwaitingResponse => "awaiting_response",
            State::DispatchingTools(_) => "dispatching_tools",
            State::Done(..) => "done",
        }
    }
}

pub struct ToolLoop<'a> {
    transport: &'a dyn Transport,
    tools: Option<&'a ToolRegistry>,
    options: CompletionOptions,
}

impl<'a> ToolLoop<'a> {
    /// A loop with no tools declared: a single plain completion unless the
    /// service insists on calling a tool, which then fails as unsupported.
    pub fn new(transport: &'a dyn Transport, options: CompletionOptions) -> Self {
        Self {
            transport,
            tools: None,
            options,
        }
    }

    pub fn with_tools(mut self, tools: &'a ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Start a conversation from a system/user pair and run it to the end.
    pub async fn ask(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<LoopOutcome, ChatError> {
        self.run(Conversation::new(system, user)).await
    }

    pub async fn run(&self, mut conversation: Conversation) -> Result<LoopOutcome, ChatError> {
        let declared = self
            .tools
            .filter(|tools| !tools.is_empty())
            .map(ToolRegistry::definitions);
        let tool_choice = declared
            .as_ref()
            .map(|_| self.options.tool_choice.clone());
        let max_rounds = self.options.max_rounds.map(|limit| limit.max(1));

        let mut usage = Usage::default();
        let mut rounds = 0_usize;
        let mut state = State::AwaitingResponse;

        loop {
            debug!(state = state.name(), rounds, "Tool loop step");
            state = match state {
                State::AwaitingResponse => {
                    let request = ChatRequest {
                        model: self.options.model.clone(),
                        messages: conversation.messages().to_vec(),
                        temperature: self.options.temperature,
                        stop: self.options.stop.clone(),
                        max_tokens: self.options.max_tokens,
                        tools: declared.clone(),
                        tool_choice: tool_choice.clone(),
                    };
                    let response = self.transport.complete(&request).await?;
                    rounds += 1;
                    usage += response.usage;

                    let (message, finish_reason) = first_choice(response)?;
                    let wants_tools = finish_reason == Some(FinishReason::ToolCalls)
                        && message.has_tool_calls();
                    if !wants_tools {
                        State::Done(message, finish_reason)
                    } else if let Some(limit) = max_rounds.filter(|&limit| rounds >= limit) {
                        warn!(limit, "Tool loop hit its round limit");
                        return Err(ChatError::RoundLimit { limit });
                    } else {
                        State::DispatchingTools(message)
                    }
                }
                State::DispatchingTools(message) => {
                    check_tool_call_ids(&message)?;
                    if let Some(call) = message
                        .tool_calls
                        .iter()
                        .find(|call| !self.supports(&call.function.name))
                    {
                        return Err(ChatError::UnsupportedTool {
                            name: call.function.name.clone(),
                        });
                    }
                    let calls = message.tool_calls.clone();
                    conversation.push(message);

                    for call in &calls {
                        let result = self
                            .dispatch(&call.function.name, &call.function.arguments)
                            .await?;
                        conversation.push_tool_result(call, result.to_string());
                    }
                    info!(round = rounds, tool_calls = calls.len(), "Resolved tool calls");
                    State::AwaitingResponse
                }
                State::Done(message, finish_reason) => {
                    if finish_reason == Some(FinishReason::Length) {
                        warn!(rounds, "Final answer was cut off by max_tokens");
                    }
                    conversation.push(message.clone());
                    return Ok(LoopOutcome {
                        message,
                        finish_reason,
                        usage,
                        rounds,
                        conversation,
                    });
                }
            };
        }
    }

    fn supports(&self, name: &str) -> bool {
        self.tools.is_some_and(|tools| tools.contains(name))
    }

    async fn dispatch(&self, name: &str, arguments: &str) -> Result<serde_json::Value, ChatError> {
        match self.tools {
            Some(tools) => tools.dispatch(name, arguments).await,
            None => Err(ChatError::UnsupportedTool {
                name: name.to_string(),
            }),
        }
    }
}

fn first_choice(response: ChatResponse) -> Result<(ChatMessage, Option<FinishReason>), ChatError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::malformed("response has no choices"))?;
    let message = choice
        .message
        .ok_or_else(|| ChatError::malformed("first choice has no message"))?;
    Ok((message, choice.finish_reason))
}

fn check_tool_call_ids(message: &ChatMessage) -> Result<(), ChatError> {
    for (position, call) in message.tool_calls.iter().enumerate() {
        if call.id.is_empty() {
            return Err(ChatError::malformed(format!(
                "tool call {position} ({}) has no id",
                call.function.name
            )));
        }
        if message.tool_calls[..position]
            .iter()
            .any(|earlier| earlier.id == call.id)
        {
            return Err(ChatError::malformed(format!(
                "tool call id {} is used twice in one turn",
                call.id
            )));
        }
    }
    Ok(())
}
