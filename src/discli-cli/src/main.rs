//! Discli CLI - Main entry point.
//!
//! - `discli tree [--details]` - print the command tree
//! - `discli usage <command...>` - print a command's usage
//! - `discli run <command...>` - dispatch and print parsed parameters
//! - `discli repl` - dispatch command strings read from stdin

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use discli_cli::cli::{Cli, LogLevel, dispatch_command};

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(level: LogLevel) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!(
            "{},discli_commands={},discli_cli={}",
            LogLevel::Warn.as_filter_str(),
            level.as_filter_str(),
            level.as_filter_str()
        ))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_level = std::env::var("DISCLI_LOG_LEVEL").ok();
    init_logging(cli.resolve_log_level(env_level.as_deref()));

    dispatch_command(cli).await
}
