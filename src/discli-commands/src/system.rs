//! The root container: tokenizing, registration and dispatch.

use std::future::Future;

use tracing::{debug, trace};

use crate::error::{CommandError, ConfigError, Result};
use crate::handler::SharedHandler;
use crate::node::CommandNode;
use crate::permission::InvocationContext;
use crate::validation;
use crate::value::ParsedParams;

/// Splits a raw command string into tokens.
///
/// Tokens are separated by whitespace; `\ ` (backslash, space) escapes a
/// space so that `say hello\ world` yields `["say", "hello world"]`. Escapes
/// chain: `a\ b\ c` is one token. An escape with nothing on one side joins
/// nothing.
pub fn split_command_string(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut previous_had_tokens = false;

    for (i, span) in input.split("\\ ").enumerate() {
        let mut words = span.split_whitespace().peekable();
        let has_tokens = words.peek().is_some();

        if i > 0 && previous_had_tokens && has_tokens {
            if let (Some(last), Some(first)) = (tokens.last_mut(), words.next()) {
                last.push(' ');
                last.push_str(first);
            }
        }
        tokens.extend(words.map(str::to_string));
        previous_had_tokens = has_tokens;
    }

    trace!(input, ?tokens, "split command string");
    tokens
}

/// A command tree with its dispatcher.
///
/// `C` is the invocation context handed to permissions and handlers, `R` the
/// handler output. Build the tree first, then share it (e.g. in an `Arc`)
/// between concurrent dispatches.
///
/// ```
/// use discli_commands::prelude::*;
///
/// # futures::executor::block_on(async {
/// let mut system: CommandSystem<Invocation, String> = CommandSystem::new("bot", None);
/// system
///     .executable("ping", Some("Replies with pong"), |_, _| async {
///         Ok("pong".to_string())
///     })
///     .unwrap();
///
/// let reply = system.execute(&Invocation::new(1), "ping").await.unwrap();
/// assert_eq!(reply, "pong");
/// # });
/// ```
pub struct CommandSystem<C, R> {
    root: CommandNode<C, R>,
}

impl<C: InvocationContext, R> CommandSystem<C, R> {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            root: CommandNode::root(name, description.map(str::to_string)),
        }
    }

    /// Like [`CommandSystem::new`], rejecting an empty description.
    pub fn try_new(name: impl Into<String>, description: Option<&str>) -> Result<Self, ConfigError> {
        validation::validate_description("system", description)?;
        Ok(Self::new(name, description))
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.root.description()
    }

    pub fn root(&self) -> &CommandNode<C, R> {
        &self.root
    }

    /// Adds a top-level namespace command.
    pub fn command(&mut self, name: &str, description: Option<&str>) -> Result<&mut CommandNode<C, R>, ConfigError> {
        self.root.command(name, description)
    }

    /// Adds a top-level executable command.
    pub fn executable<F, Fut>(
        &mut self,
        name: &str,
        description: Option<&str>,
        handler: F,
    ) -> Result<&mut CommandNode<C, R>, ConfigError>
    where
        F: Fn(&C, ParsedParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        C: 'static,
        R: Send + 'static,
    {
        self.root.executable(name, description, handler)
    }

    pub fn executable_with(
        &mut self,
        name: &str,
        description: Option<&str>,
        handler: SharedHandler<C, R>,
    ) -> Result<&mut CommandNode<C, R>, ConfigError> {
        self.root.executable_with(name, description, handler)
    }

    /// Mutable access to a registered command by its command string.
    pub fn command_mut(&mut self, path: &str) -> Option<&mut CommandNode<C, R>> {
        let mut node = &mut self.root;
        for name in path.split_whitespace() {
            node = node.child_mut(name)?;
        }
        if node.is_root() { None } else { Some(node) }
    }

    /// Looks up a command by its command string, ignoring permissions.
    pub fn find(&self, path: &str) -> Option<&CommandNode<C, R>> {
        let mut node = &self.root;
        for name in path.split_whitespace() {
            node = node.child(name)?;
        }
        if node.is_root() { None } else { Some(node) }
    }

    /// Top-level commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandNode<C, R>> {
        self.root.children()
    }

    /// Number of registered commands at every depth.
    pub fn command_count(&self) -> usize {
        fn count<C: InvocationContext, R>(node: &CommandNode<C, R>) -> usize {
            node.children().map(|child| 1 + count(child)).sum()
        }
        count(&self.root)
    }

    /// Resolves tokens from the root, checking permissions at each hop.
    pub async fn resolve<'s, 't>(
        &'s self,
        ctx: &C,
        tokens: &'t [String],
    ) -> Result<(&'s CommandNode<C, R>, &'t [String])> {
        self.root.resolve(ctx, tokens).await
    }

    /// Resolves a command string to a command other than the root.
    async fn resolve_command<'s, 't>(
        &'s self,
        ctx: &C,
        command: &str,
        tokens: &'t [String],
    ) -> Result<(&'s CommandNode<C, R>, &'t [String])> {
        let (node, rest) = self.resolve(ctx, tokens).await?;
        if node.is_root() {
            debug!(command, "no matching command");
            return Err(CommandError::NotFound(command.trim().to_string()));
        }
        Ok((node, rest))
    }

    /// Tokenizes, resolves, parses and runs `command`.
    pub async fn execute(&self, ctx: &C, command: &str) -> Result<R> {
        let tokens = split_command_string(command);
        let (node, rest) = self.resolve_command(ctx, command, &tokens).await?;
        node.execute(ctx, rest).await
    }

    /// Usage text for the command that `command` resolves to. Trailing
    /// parameter tokens are ignored.
    pub async fn usage_message(&self, ctx: &C, command: &str) -> Result<String> {
        let tokens = split_command_string(command);
        let (node, _) = self.resolve_command(ctx, command, &tokens).await?;
        Ok(node.usage_message(ctx).await)
    }

    /// Text rendering of the whole tree, optionally with parameters.
    pub fn tree_string(&self, details: bool) -> String {
        self.root.tree_string(details)
    }
}

impl<C, R> std::fmt::Debug for CommandSystem<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSystem").field("root", &self.root).finish()
    }
}
