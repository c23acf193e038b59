//! CLI argument parsing and command dispatch.
//!
//! - `args` - Command-line argument structures
//! - `handlers` - Command execution handlers

pub mod args;
pub mod handlers;

pub use args::{Cli, CommandArgs, Commands, LogLevel, TreeArgs};
pub use handlers::{ReplLine, build_system, dispatch_command, invocation, load_tree, run_command};
