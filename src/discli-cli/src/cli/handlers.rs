//! Command execution handlers.

use std::path::Path;

use anyhow::{Context, Result};
use discli_commands::{CommandSystem, Invocation, ParsedParams, TreeConfig, handler_fn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::args::{Cli, Commands};

/// Command system driven by the CLI: every command echoes its parameters.
pub type EchoSystem = CommandSystem<Invocation, serde_json::Value>;

/// Reads and parses a command tree file.
pub fn load_tree(path: &Path) -> Result<TreeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read command tree {}", path.display()))?;
    TreeConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse command tree {}", path.display()))
}

/// Builds a system whose handlers return the parsed parameters as JSON.
pub fn build_system(config: &TreeConfig) -> Result<EchoSystem> {
    let handler = handler_fn(|_: &Invocation, params: ParsedParams| async move {
        serde_json::to_value(&params).map_err(anyhow::Error::from)
    });
    let system = config
        .build(handler)
        .with_context(|| format!("Invalid command tree '{}'", config.name))?;
    info!(
        tree = system.name(),
        commands = system.command_count(),
        "loaded command tree"
    );
    Ok(system)
}

/// The simulated invocation described by the global flags.
pub fn invocation(cli: &Cli) -> Invocation {
    let mut ctx = Invocation::new(cli.user);
    if let Some(guild) = cli.guild {
        ctx = ctx.with_guild(guild);
    }
    if let Some(channel) = cli.channel {
        ctx = ctx.with_channel(channel);
    }
    ctx
}

/// Dispatches one command string and returns the handler's JSON.
pub async fn run_command(
    system: &EchoSystem,
    ctx: &Invocation,
    command: &str,
) -> Result<serde_json::Value> {
    let value = system.execute(ctx, command).await?;
    Ok(value)
}

pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let config = load_tree(&cli.config)?;
    let system = build_system(&config)?;
    let ctx = invocation(&cli);

    match &cli.command {
        Commands::Tree(args) => {
            print!("{}", system.tree_string(args.details));
            Ok(())
        }
        Commands::Usage(args) => {
            let usage = system.usage_message(&ctx, &args.command_string()).await?;
            println!("{usage}");
            Ok(())
        }
        Commands::Run(args) => {
            let value = run_command(&system, &ctx, &args.command_string()).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Commands::Repl => run_repl(&system, &ctx).await,
    }
}

/// One line of REPL input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplLine<'a> {
    Empty,
    Quit,
    Tree,
    /// `:usage <command>`; the command may be empty.
    Usage(&'a str),
    Command(&'a str),
}

impl<'a> ReplLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => ReplLine::Empty,
            ":quit" => ReplLine::Quit,
            ":tree" => ReplLine::Tree,
            ":usage" => ReplLine::Usage(""),
            _ => match line.strip_prefix(":usage ") {
                Some(command) => ReplLine::Usage(command.trim()),
                None => ReplLine::Command(line),
            },
        }
    }
}

/// Line-oriented loop over stdin.
///
/// `:tree` prints the tree, `:usage <command>` prints usage, `:quit` exits.
/// Anything else is dispatched; failures are reported and the loop goes on.
async fn run_repl(system: &EchoSystem, ctx: &Invocation) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = ReplLine::parse(&line);
        debug!(?input, "repl input");

        match input {
            ReplLine::Empty => {}
            ReplLine::Quit => break,
            ReplLine::Tree => print!("{}", system.tree_string(false)),
            ReplLine::Usage(command) => match system.usage_message(ctx, command).await {
                Ok(usage) => println!("{usage}"),
                Err(e) => eprintln!("error: {e}"),
            },
            ReplLine::Command(command) => match run_command(system, ctx, command).await {
                Ok(value) => println!("{value}"),
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }
    Ok(())
}
