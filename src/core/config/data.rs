use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::tool_loop::{CompletionOptions, DEFAULT_STOP_SEQUENCE, DEFAULT_TEMPERATURE};
use crate::utils::url::base_url;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9990;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Host of the chat-completion server
    pub host: String,
    pub port: u16,
    /// Log request and response bodies
    pub debug: bool,
    /// Model name sent with every request; most local servers ignore it
    pub model: Option<String>,
    pub temperature: f32,
    pub stop: Vec<String>,
    /// Ceiling on request/response rounds per conversation
    pub max_rounds: Option<usize>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            stop: vec![DEFAULT_STOP_SEQUENCE.to_string()],
            max_rounds: None,
            request_timeout_secs: None,
        }
    }
}

/// Values given on the command line. Unset fields leave the loaded
/// configuration alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub max_rounds: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Get a user-friendly display string for a path
/// Converts paths under the home directory to `~` notation on Unix-like systems
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    pub fn base_url(&self) -> String {
        base_url(&self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if overrides.debug {
            self.debug = true;
        }
        if overrides.max_rounds.is_some() {
            self.max_rounds = overrides.max_rounds;
        }
        if overrides.timeout_secs.is_some() {
            self.request_timeout_secs = overrides.timeout_secs;
        }
    }

    /// Sampling settings for a conversation, with the given token budget.
    pub fn completion_options(&self, max_tokens: u32) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            stop: self.stop.clone(),
            ..CompletionOptions::default()
        }
        .with_max_tokens(max_tokens)
        .with_max_rounds(self.max_rounds)
    }
}
