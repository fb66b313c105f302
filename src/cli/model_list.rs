//! Model listing functionality

use std::error::Error;
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::api::Model;
use crate::core::transport::HttpTransport;

pub async fn list_models<W: Write>(
    transport: &HttpTransport,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let models = transport.list_models().await?;

    writeln!(out, "🤖 Available Models at {}", transport.base_url())?;
    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(out)?;
    write_models(out, &models.data)?;
    Ok(())
}

/// Print models in the order given (the fetch already sorts newest first).
pub fn write_models<W: Write>(out: &mut W, models: &[Model]) -> std::io::Result<()> {
    if models.is_empty() {
        return writeln!(out, "No models found on this server.");
    }

    writeln!(out, "Found {} models (sorted newest first):", models.len())?;
    writeln!(out)?;
    for model in models {
        writeln!(out, "  • {}", model.id)?;
        if let Some(owned_by) = model.owned_by.as_deref() {
            if !owned_by.is_empty() && owned_by != "system" {
                writeln!(out, "    Owner: {owned_by}")?;
            }
        }
        if let Some(created) = model.created.filter(|&created| created > 0) {
            // Some servers report milliseconds
            let secs = if created > 10_000_000_000 {
                created / 1000
            } else {
                created
            };
            if let Some(dt) = DateTime::<Utc>::from_timestamp(secs, 0) {
                writeln!(out, "    Created: {}", dt.format("%Y-%m-%d %H:%M:%S UTC"))?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
