//! Car tools conversation

use std::error::Error;
use std::io::Write;

use tracing::info;

use crate::api::ChatMessage;
use crate::cli::CommandContext;
use crate::core::builtin_tools::{car_question, car_tools, CAR_TOOLS_SYSTEM_PROMPT};
use crate::core::tool_loop::{LoopOutcome, ToolLoop};
use crate::utils::logging::format_message;

pub async fn run_cars<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
    company: &str,
    max_tokens: u32,
) -> Result<LoopOutcome, Box<dyn Error>> {
    let question = car_question(company);
    writeln!(out, "{}", format_message(&ChatMessage::user(question.as_str())))?;

    let tools = car_tools();
    let outcome = ToolLoop::new(ctx.transport, ctx.config.completion_options(max_tokens))
        .with_tools(&tools)
        .ask(CAR_TOOLS_SYSTEM_PROMPT, question)
        .await?;
    info!(rounds = outcome.rounds, "Car tools conversation finished");

    ctx.transcript.start_session(&format!("cars: {company}"))?;
    ctx.transcript
        .log_messages(outcome.conversation.messages())?;

    writeln!(out, "{}", outcome.usage)?;
    writeln!(out, "{}", outcome.content())?;
    Ok(outcome)
}
