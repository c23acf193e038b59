//! Command-line argument structures.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Log verbosity for the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show resolution and parsing steps
    Debug,
    /// Show everything, including tokenization
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Parse and dispatch chat-bot commands against a TOML command tree.
#[derive(Debug, Parser)]
#[command(name = "discli")]
#[command(author, version)]
#[command(about = "Parse and dispatch chat-bot commands", long_about = None)]
pub struct Cli {
    /// Command tree file
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "DISCLI_CONFIG",
        default_value = "discli.toml"
    )]
    pub config: PathBuf,

    /// Author id of the simulated invocation
    #[arg(long, global = true, default_value_t = 0)]
    pub user: u64,

    /// Guild id of the simulated invocation (omit for a direct message)
    #[arg(long, global = true)]
    pub guild: Option<u64>,

    /// Channel id of the simulated invocation
    #[arg(long, global = true)]
    pub channel: Option<u64>,

    /// Log verbosity [default: warn]; falls back to `DISCLI_LOG_LEVEL`, and
    /// `RUST_LOG` takes precedence over both
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The `--log-level` flag, else `env_level` (read case-insensitively,
    /// ignored when unrecognized), else warn.
    pub fn resolve_log_level(&self, env_level: Option<&str>) -> LogLevel {
        self.log_level
            .or_else(|| env_level.and_then(LogLevel::from_str_loose))
            .unwrap_or_default()
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the command tree
    Tree(TreeArgs),

    /// Print the usage message of a command
    Usage(CommandArgs),

    /// Dispatch a command and print its parsed parameters as JSON
    Run(CommandArgs),

    /// Read command strings from stdin, one per line
    Repl,
}

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Also list parameters and permissions
    #[arg(long, short = 'd')]
    pub details: bool,
}

#[derive(Debug, Args)]
pub struct CommandArgs {
    /// Command string; words are joined with single spaces, use `\ ` to keep
    /// a space inside a token
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl CommandArgs {
    pub fn command_string(&self) -> String {
        self.command.join(" ")
    }
}
