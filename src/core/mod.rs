pub mod builtin_tools;
pub mod config;
pub mod conversation;
pub mod error;
pub mod tool_loop;
pub mod tools;
pub mod transport;
