#![allow(
    clippy::missing_errors_doc,
    clippy::uninlined_format_args,
    clippy::doc_markdown
)]
//! Discli Commands - command-tree parsing and dispatch for chat-bot commands.
//!
//! A raw command string typed by a user goes through four stages:
//!
//! ```text
//!   "user ban 12345 -r spam\ bot -s"
//!                  │
//!                  ▼  split_command_string
//!   [user] [ban] [12345] [-r] [spam bot] [-s]
//!                  │
//!                  ▼  resolve (permissions checked per hop)
//!   node "user ban", rest [12345] [-r] [spam bot] [-s]
//!                  │
//!                  ▼  parse parameters
//!   { target_id: 12345, reason: "spam bot", silent: true }
//!                  │
//!                  ▼  handler(ctx, params)
//! ```
//!
//! # Parameters
//!
//! - Arguments are positional and required, matched in declaration order.
//! - Options take one value: `-r value` or `--reason value`.
//! - Tags are boolean switches: `-s`, `--silent`, or bundled as `-sv`.
//!
//! Every parse result holds one entry per declared parameter; absent options
//! are [`Value::None`] and absent tags are `false`.
//!
//! # Example
//!
//! ```
//! use discli_commands::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut system: CommandSystem<Invocation, String> = CommandSystem::new("bot", None);
//! system
//!     .command("user", Some("User management"))?
//!     .executable("ban", Some("Ban a user"), |_, params: ParsedParams| async move {
//!         Ok(format!("banned {}", params.get_int_or("target_id", 0)))
//!     })?
//!     .add_argument(Argument::integer("target_id", Bounds::any()))?
//!     .add_option(CommandOption::string("reason", Bounds::any()))?
//!     .add_tag(Tag::new("silent"))?;
//!
//! let reply = futures::executor::block_on(
//!     system.execute(&Invocation::new(1), "user ban 12345 -r spam -s"),
//! )?;
//! assert_eq!(reply, "banned 12345");
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
mod tests;

pub mod config;
mod error;
mod handler;
mod node;
mod params;
mod parser;
mod permission;
mod render;
mod system;
pub mod validation;
mod value;

// Re-export all public types
pub use config::TreeConfig;
pub use error::{CommandError, ConfigError, ParseError, Result, ValueError};
pub use handler::{CommandHandler, FnHandler, SharedHandler, handler_fn};
pub use node::CommandNode;
pub use params::{
    Argument, ArgumentRegistry, CommandOption, OptionRegistry, Parameters, Tag, TagRegistry,
};
pub use parser::{ValueParser, parse_date, parse_time};
pub use permission::{Invocation, InvocationContext, Permission, PermissionSet, and, or};
pub use system::{CommandSystem, split_command_string};
pub use validation::Bounds;
pub use value::{DATE_FORMAT, ParsedParams, TIME_FORMAT, Value};

/// Everything needed to declare and dispatch commands.
pub mod prelude {
    pub use crate::{
        Argument, Bounds, CommandError, CommandNode, CommandOption, CommandSystem, ConfigError,
        Invocation, InvocationContext, ParsedParams, Permission, Tag, Value, ValueParser, and, or,
    };
}
