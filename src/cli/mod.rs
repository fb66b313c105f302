//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod cars;
pub mod model_list;

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::ask::run_ask;
use crate::cli::cars::run_cars;
use crate::cli::model_list::list_models;
use crate::core::builtin_tools::DEFAULT_COMPANY;
use crate::core::config::{Config, ConfigError, ConfigOverrides};
use crate::core::tool_loop::DEFAULT_MAX_TOKENS;
use crate::core::transport::{HttpTransport, Transport};
use crate::logging::init_tracing;
use crate::utils::logging::TranscriptLog;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const CARS_MAX_TOKENS: u32 = 5000;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "chatloop", version, long_version = LONG_VERSION)]
#[command(about = "Tool-calling chat client for OpenAI-compatible completion servers")]
#[command(
    long_about = "chatloop sends chat-completion requests to a local OpenAI-compatible server \
and, when the model asks for tools, runs them and feeds the results back until it answers.\n\n\
Environment Variables:\n\
  HOST     Server host (default 127.0.0.1)\n\
  PORT     Server port (default 9990)\n\
  DEBUG    Set to 1 or true to log request and response bodies\n\
  RUST_LOG Overrides the log filter entirely"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Log request and response bodies to stderr
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append a transcript of every conversation to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Give up after this many request/response rounds
    #[arg(long, global = true, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Ask a single question without tools
    Ask {
        /// System prompt
        #[arg(short, long, default_value = DEFAULT_SYSTEM_PROMPT)]
        system: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
        /// The question (multiple words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Ask about a car company's most popular car using the stub car tools
    Cars {
        #[arg(default_value = DEFAULT_COMPANY)]
        company: String,
        #[arg(short = 'n', long, default_value_t = CARS_MAX_TOKENS)]
        max_tokens: u32,
    },
    /// Run two plain questions followed by the car tools conversation (default)
    Demo,
    /// List the models the server offers
    Models,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            debug: self.debug,
            max_rounds: self.max_rounds,
            timeout_secs: self.timeout,
        }
    }
}

/// What every command needs to talk to the server.
pub struct CommandContext<'a> {
    pub transport: &'a dyn Transport,
    pub config: &'a Config,
    pub transcript: &'a TranscriptLog,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let transport = HttpTransport::from_config(&config)?;
    let transcript = TranscriptLog::new(args.log.clone())?;
    let ctx = CommandContext {
        transport: &transport,
        config: &config,
        transcript: &transcript,
    };
    let mut out = io::stdout().lock();

    match args.command.unwrap_or(Commands::Demo) {
        Commands::Ask {
            system,
            max_tokens,
            prompt,
        } => {
            run_ask(&ctx, &mut out, &system, &prompt.join(" "), max_tokens).await?;
        }
        Commands::Cars {
            company,
            max_tokens,
        } => {
            run_cars(&ctx, &mut out, &company, max_tokens).await?;
        }
        Commands::Demo => run_demo(&ctx, &mut out).await?,
        Commands::Models => list_models(&transport, &mut out).await?,
    }

    out.flush()?;
    Ok(())
}

/// Resolve the configuration, then install logging at the level it asks for.
pub fn load_config(args: &Args) -> Result<Config, ConfigError> {
    let config = Config::load(args.config.as_deref(), &args.overrides())?;
    init_tracing(config.debug);
    debug!(
        base_url = %config.base_url(),
        debug = config.debug,
        max_rounds = ?config.max_rounds,
        "Loaded configuration"
    );
    Ok(config)
}

/// Two plain questions, then the car tools conversation for the default company.
pub async fn run_demo<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    run_ask(
        ctx,
        out,
        "You are an excellent math teacher.",
        "What is 1 + 2?",
        DEFAULT_MAX_TOKENS,
    )
    .await?;
    run_ask(
        ctx,
        out,
        "You are a romantic.",
        "Where is Europe?",
        DEFAULT_MAX_TOKENS,
    )
    .await?;
    run_cars(ctx, out, DEFAULT_COMPANY, CARS_MAX_TOKENS).await?;
    Ok(())
}
