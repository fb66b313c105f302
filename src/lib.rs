//! chatloop is a command-line client for OpenAI-compatible chat-completion
//! servers that can answer the model's tool calls.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the chat-completion and model-list payloads exactly as
//!   they travel over the wire.
//! - [`core`] owns the conversation log, the tool registry, the transport
//!   seam and the tool loop that ties them together, plus configuration.
//! - [`cli`] parses arguments and runs the `ask`, `cars`, `demo` and
//!   `models` commands.
//! - [`utils`] holds URL helpers and the plain-text transcript log.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod utils;
