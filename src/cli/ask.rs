//! Single question without tools

use std::error::Error;
use std::io::Write;

use crate::api::ChatMessage;
use crate::cli::CommandContext;
use crate::core::tool_loop::{LoopOutcome, ToolLoop};
use crate::utils::logging::format_message;

pub async fn run_ask<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
    system: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<LoopOutcome, Box<dyn Error>> {
    if prompt.trim().is_empty() {
        return Err("Usage: chatloop ask <prompt>".into());
    }

    writeln!(out, "{}", format_message(&ChatMessage::system(system)))?;
    writeln!(out, "{}", format_message(&ChatMessage::user(prompt)))?;

    let outcome = ToolLoop::new(ctx.transport, ctx.config.completion_options(max_tokens))
        .ask(system, prompt)
        .await?;

    ctx.transcript.start_session("ask")?;
    ctx.transcript
        .log_messages(outcome.conversation.messages())?;

    writeln!(out, "{}", outcome.usage)?;
    writeln!(out, "{}", outcome.content())?;
    Ok(outcome)
}
