//! The command tree.

use std::fmt;
use std::future::Future;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{CommandError, ConfigError, ParseError, Result};
use crate::handler::{SharedHandler, handler_fn};
use crate::params::{Argument, CommandOption, Parameters, Tag};
use crate::permission::{InvocationContext, Permission, PermissionSet};
use crate::validation;
use crate::value::ParsedParams;

/// One command: a namespace, an executable command, or both.
///
/// Nodes are built through [`CommandNode::command`] and friends and are
/// immutable once dispatch starts.
pub struct CommandNode<C, R> {
    name: String,
    description: Option<String>,
    parent: Option<String>,
    command_string: String,
    handler: Option<SharedHandler<C, R>>,
    params: Parameters,
    permissions: PermissionSet<C>,
    children: IndexMap<String, CommandNode<C, R>>,
}

impl<C: InvocationContext, R> CommandNode<C, R> {
    /// The nameless root. Its command string is empty.
    pub(crate) fn root(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            parent: None,
            command_string: String::new(),
            handler: None,
            params: Parameters::default(),
            permissions: PermissionSet::new(),
            children: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Command string of the parent; `None` for the root and for top-level
    /// commands.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Full path from the root, e.g. `"user ban"`.
    pub fn command_string(&self) -> &str {
        &self.command_string
    }

    pub fn is_root(&self) -> bool {
        self.command_string.is_empty()
    }

    pub fn is_executable(&self) -> bool {
        self.handler.is_some()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn permissions(&self) -> &PermissionSet<C> {
        &self.permissions
    }

    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.children.get_mut(name)
    }

    /// Children in registration order.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.values()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Adds a namespace child without a handler.
    pub fn command(&mut self, name: &str, description: Option<&str>) -> Result<&mut Self, ConfigError> {
        self.insert_child(name, description, None)
    }

    /// Adds an executable child running `handler`.
    pub fn executable<F, Fut>(
        &mut self,
        name: &str,
        description: Option<&str>,
        handler: F,
    ) -> Result<&mut Self, ConfigError>
    where
        F: Fn(&C, ParsedParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        C: 'static,
        R: Send + 'static,
    {
        self.insert_child(name, description, Some(handler_fn(handler)))
    }

    /// Adds an executable child running a shared handler.
    pub fn executable_with(
        &mut self,
        name: &str,
        description: Option<&str>,
        handler: SharedHandler<C, R>,
    ) -> Result<&mut Self, ConfigError> {
        self.insert_child(name, description, Some(handler))
    }

    fn insert_child(
        &mut self,
        name: &str,
        description: Option<&str>,
        handler: Option<SharedHandler<C, R>>,
    ) -> Result<&mut Self, ConfigError> {
        validation::validate_identifier("command name", name)?;
        validation::validate_description("command", description)?;

        let command_string = if self.is_root() {
            name.to_string()
        } else {
            format!("{} {}", self.command_string, name)
        };
        if self.children.contains_key(name) {
            return Err(ConfigError::CommandExists(command_string));
        }
        if self.params.arguments().first_is_text() {
            return Err(ConfigError::Ambiguous {
                command: self.command_string.clone(),
                reason: "a command whose first argument is free text cannot have sub-commands",
            });
        }

        debug!(command = %command_string, executable = handler.is_some(), "registered command");
        let child = CommandNode {
            name: name.to_string(),
            description: description.map(str::to_string),
            parent: (!self.is_root()).then(|| self.command_string.clone()),
            command_string,
            handler,
            params: Parameters::default(),
            permissions: PermissionSet::new(),
            children: IndexMap::new(),
        };
        Ok(self.children.entry(name.to_string()).or_insert(child))
    }

    pub fn add_argument(&mut self, argument: Argument) -> Result<&mut Self, ConfigError> {
        if self.params.arguments().is_empty()
            && argument.parser().is_free_text()
            && self.has_children()
        {
            return Err(ConfigError::Ambiguous {
                command: self.command_string.clone(),
                reason: "a command with sub-commands cannot take free text as its first argument",
            });
        }
        self.params.add_argument(&self.command_string, argument)?;
        Ok(self)
    }

    pub fn add_option(&mut self, option: CommandOption) -> Result<&mut Self, ConfigError> {
        self.params.add_option(&self.command_string, option)?;
        Ok(self)
    }

    pub fn add_tag(&mut self, tag: Tag) -> Result<&mut Self, ConfigError> {
        self.params.add_tag(&self.command_string, tag)?;
        Ok(self)
    }

    /// Any one of the added permissions grants access to this command and
    /// everything below it.
    pub fn add_permission(&mut self, permission: Permission<C>) -> &mut Self {
        self.permissions.push(permission);
        self
    }

    /// Walks down from this node while the leading token names a child.
    ///
    /// Each child's permissions are checked before descending into it.
    /// Returns the deepest node reached and the tokens left over.
    pub async fn resolve<'n, 't>(
        &'n self,
        ctx: &C,
        tokens: &'t [String],
    ) -> Result<(&'n Self, &'t [String])> {
        let mut node = self;
        let mut rest = tokens;

        while let Some((first, tail)) = rest.split_first() {
            let Some(child) = node.children.get(first.as_str()) else {
                break;
            };
            if !child.permissions.evaluate(ctx).await {
                warn!(
                    command = %child.command_string,
                    author = ctx.author_id(),
                    "permission denied"
                );
                return Err(CommandError::InsufficientPermissions(
                    child.command_string.clone(),
                ));
            }
            node = child;
            rest = tail;
        }

        debug!(command = %node.command_string, remaining = rest.len(), "resolved command");
        Ok((node, rest))
    }

    /// Parses the tokens left after resolution against this node's
    /// parameters.
    pub fn parse_params(&self, tokens: &[String]) -> Result<ParsedParams, ParseError> {
        self.params.parse(&self.command_string, tokens)
    }

    /// Parses `tokens` and runs the handler.
    pub async fn execute(&self, ctx: &C, tokens: &[String]) -> Result<R> {
        let Some(handler) = &self.handler else {
            return Err(CommandError::NotExecutable(self.command_string.clone()));
        };

        let params = self.parse_params(tokens)?;
        debug!(command = %self.command_string, params = params.len(), "executing command");

        handler
            .call(ctx, params)
            .await
            .map_err(|source| CommandError::Handler {
                command: self.command_string.clone(),
                source,
            })
    }
}

impl<C, R> fmt::Debug for CommandNode<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("command", &self.command_string)
            .field("executable", &self.handler.is_some())
            .field("params", &self.params)
            .field("permissions", &self.permissions)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Invocation;
    use crate::validation::Bounds;

    type Node = CommandNode<Invocation, String>;

    fn tokens(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> Node {
        let mut root = Node::root("bot", None);
        let user = root.command("user", Some("User management")).unwrap();
        user.executable("ban", None, |_, params: ParsedParams| async move {
            Ok(format!("banned {}", params.get_int_or("target_id", 0)))
        })
        .unwrap()
        .add_argument(Argument::integer("target_id", Bounds::any()))
        .unwrap();
        user.command("admin", None)
            .unwrap()
            .add_permission(Permission::user(1));
        root
    }

    #[test]
    fn test_command_strings() {
        let root = tree();
        assert!(root.is_root());
        let user = root.child("user").unwrap();
        assert_eq!(user.command_string(), "user");
        assert_eq!(user.parent(), None);
        let ban = user.child("ban").unwrap();
        assert_eq!(ban.command_string(), "user ban");
        assert_eq!(ban.parent(), Some("user"));
        assert!(ban.is_executable());
        assert!(!user.is_executable());
    }

    #[test]
    fn test_duplicate_child() {
        let mut root = tree();
        let err = root
            .child_mut("user")
            .unwrap()
            .command("ban", None)
            .unwrap_err();
        assert_eq!(err, ConfigError::CommandExists("user ban".to_string()));
    }

    #[test]
    fn test_invalid_command_name() {
        let mut root = Node::root("bot", None);
        assert!(root.command("two words", None).is_err());
        assert!(root.command("", None).is_err());
        assert!(root.command("ok", Some("")).is_err());
        assert!(!root.has_children());
    }

    #[test]
    fn test_free_text_ambiguity() {
        let mut root = Node::root("bot", None);
        let say = root.command("say", None).unwrap();
        say.add_argument(Argument::string("text", Bounds::any()))
            .unwrap();
        assert!(matches!(
            say.command("loud", None),
            Err(ConfigError::Ambiguous { .. })
        ));

        let user = root.command("user", None).unwrap();
        user.command("ban", None).unwrap();
        assert!(matches!(
            user.add_argument(Argument::word("name", Bounds::any())),
            Err(ConfigError::Ambiguous { .. })
        ));
        // Non-text first arguments are fine next to sub-commands.
        user.add_argument(Argument::integer("id", Bounds::any()))
            .unwrap();
    }

    #[tokio::test]
    async fn test_resolve() {
        let root = tree();
        let ctx = Invocation::new(1);

        let toks = tokens(&["user", "ban", "42"]);
        let (node, rest) = root.resolve(&ctx, &toks).await.unwrap();
        assert_eq!(node.command_string(), "user ban");
        assert_eq!(rest, &toks[2..]);

        let toks = tokens(&["nope"]);
        let (node, rest) = root.resolve(&ctx, &toks).await.unwrap();
        assert!(node.is_root());
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_permission_denied() {
        let root = tree();
        let toks = tokens(&["user", "admin"]);
        let err = root.resolve(&Invocation::new(2), &toks).await.unwrap_err();
        assert!(matches!(err, CommandError::InsufficientPermissions(ref c) if c == "user admin"));
        assert!(root.resolve(&Invocation::new(1), &toks).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute() {
        let root = tree();
        let ctx = Invocation::new(1);
        let ban = root.child("user").unwrap().child("ban").unwrap();
        assert_eq!(ban.execute(&ctx, &tokens(&["7"])).await.unwrap(), "banned 7");

        let user = root.child("user").unwrap();
        assert!(matches!(
            user.execute(&ctx, &[]).await,
            Err(CommandError::NotExecutable(_))
        ));
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let mut root = Node::root("bot", None);
        root.executable("fail", None, |_, _| async {
            Err::<String, _>(anyhow::anyhow!("nope"))
        })
        .unwrap();
        let err = root
            .child("fail")
            .unwrap()
            .execute(&Invocation::new(1), &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "command 'fail' failed: nope");
    }
}
