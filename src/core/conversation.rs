use thiserror::Error;

use crate::api::{ChatMessage, Role, ToolCall};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Tool reply at position {position} has no tool_call_id")]
    MissingToolCallId { position: usize },

    #[error("Tool reply at position {position} answers unknown call {tool_call_id}")]
    UnmatchedToolReply {
        position: usize,
        tool_call_id: String,
    },
}

/// Append-only message log for one conversation.
///
/// Messages are only ever pushed; nothing is edited or removed once logged.
/// Every tool reply refers to a call made by the most recent assistant turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        }
    }

    /// Rebuild a conversation from decoded messages, checking that every tool
    /// reply answers a call of the assistant turn before it.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Result<Self, ConversationError> {
        let mut open_calls: &[ToolCall] = &[];
        for (position, message) in messages.iter().enumerate() {
            match message.role {
                Role::Assistant => open_calls = &message.tool_calls,
                Role::Tool => {
                    let tool_call_id = message
                        .tool_call_id
                        .as_deref()
                        .ok_or(ConversationError::MissingToolCallId { position })?;
                    if !open_calls.iter().any(|call| call.id == tool_call_id) {
                        return Err(ConversationError::UnmatchedToolReply {
                            position,
                            tool_call_id: tool_call_id.to_string(),
                        });
                    }
                }
                Role::System | Role::User => open_calls = &[],
            }
        }
        Ok(Self { messages })
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Log the reply to `call`; the id is taken from the call itself so the
    /// pairing cannot drift.
    pub fn push_tool_result(&mut self, call: &ToolCall, content: impl Into<String>) {
        self.push(ChatMessage::tool(call.id.clone(), content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
