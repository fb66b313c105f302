use thiserror::Error;

use crate::core::tools::ToolError;
use crate::core::transport::TransportError;

/// Every way a conversation loop can stop short of a final answer.
///
/// None of these are retried: the loop stops at the first failure and hands
/// the error to the caller.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unsupported tool: {name}")]
    UnsupportedTool { name: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Tool loop exceeded {limit} rounds without a final answer")]
    RoundLimit { limit: usize },
}

impl ChatError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        ChatError::MalformedResponse(detail.into())
    }
}
