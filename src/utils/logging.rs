use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::api::{ChatMessage, Role};

/// Plain-text transcript of every message a command sends or receives.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn new(log_file: Option<PathBuf>) -> io::Result<Self> {
        if let Some(path) = &log_file {
            Self::test_file_access(path)?;
        }
        Ok(Self {
            file_path: log_file,
        })
    }

    pub fn disabled() -> Self {
        Self { file_path: None }
    }

    /// Write a timestamped header separating one conversation from the next.
    pub fn start_session(&self, title: &str) -> io::Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.write_entry(&format!("## {title} ({stamp})"))
    }

    pub fn log_message(&self, message: &ChatMessage) -> io::Result<()> {
        self.write_entry(&format_message(message))
    }

    pub fn log_messages(&self, messages: &[ChatMessage]) -> io::Result<()> {
        for message in messages {
            self.log_message(message)?;
        }
        Ok(())
    }

    fn write_entry(&self, content: &str) -> io::Result<()> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        writer.flush()
    }

    fn test_file_access(path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()
    }
}

/// Render a message the way the CLI echoes it: `> role: content`, with tool
/// calls and tool replies spelled out.
pub fn format_message(message: &ChatMessage) -> String {
    match message.role {
        Role::Tool => format!(
            "> tool [{}]: {}",
            message.tool_call_id.as_deref().unwrap_or("?"),
            message.text()
        ),
        Role::Assistant if message.has_tool_calls() => {
            let mut out = String::from("> assistant: (tool calls)");
            for call in &message.tool_calls {
                out.push_str(&format!(
                    "\n  {} [{}] {}",
                    call.function.name, call.id, call.function.arguments
                ));
            }
            out
        }
        role => format!("> {role}: {}", message.text()),
    }
}
