//! Integration tests for the discli-commands crate.
//!
//! Exercises the public API the way a bot host would: a custom context type,
//! handlers with their own state, config-built trees and concurrent dispatch
//! through a shared `Arc<CommandSystem>`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use discli_commands::{
    Argument, Bounds, CommandError, CommandOption, CommandSystem, InvocationContext, ParseError,
    ParsedParams, Permission, Tag, TreeConfig, Value, handler_fn,
};
use futures::FutureExt;

/// Host context carrying more than the ids the engine needs.
#[derive(Debug, Clone)]
struct Message {
    author: u64,
    guild: Option<u64>,
    channel: u64,
    roles: HashSet<String>,
}

impl Message {
    fn by(author: u64) -> Self {
        Self {
            author,
            guild: Some(100),
            channel: 200,
            roles: HashSet::new(),
        }
    }

    fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_string());
        self
    }
}

impl InvocationContext for Message {
    fn author_id(&self) -> u64 {
        self.author
    }

    fn guild_id(&self) -> Option<u64> {
        self.guild
    }

    fn channel_id(&self) -> Option<u64> {
        Some(self.channel)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Reply {
    Text(String),
    Banned { target: u64, reason: Option<String>, silent: bool },
}

fn bot(audit: Arc<Mutex<Vec<String>>>) -> CommandSystem<Message, Reply> {
    let mut system = CommandSystem::new("modbot", Some("Moderation bot"));

    system
        .executable("echo", Some("Repeat text"), |msg: &Message, params: ParsedParams| {
            let author = msg.author;
            async move {
                let text = params.get_str_or("text", "").to_string();
                Ok(Reply::Text(format!("{author}: {text}")))
            }
        })
        .unwrap()
        .add_argument(Argument::string("text", Bounds::between(1, 100)))
        .unwrap();

    let user = system.command("user", Some("User management")).unwrap();
    user.add_permission(Permission::deferred(|msg: &Message| {
        let is_mod = msg.roles.contains("mod");
        async move { is_mod }.boxed()
    }));
    user.executable("ban", Some("Ban a user"), move |msg: &Message, params: ParsedParams| {
        let audit = Arc::clone(&audit);
        let author = msg.author;
        async move {
            let target = params.get_id("target").unwrap_or_default();
            if let Ok(mut log) = audit.lock() {
                log.push(format!("{author} banned {target}"));
            }
            Ok(Reply::Banned {
                target,
                reason: params.get_str("reason").map(str::to_string),
                silent: params.flag("silent"),
            })
        }
    })
    .unwrap()
    .add_argument(Argument::user("target"))
    .unwrap()
    .add_option(CommandOption::string("reason", Bounds::any()).with_word("reason"))
    .unwrap()
    .add_tag(Tag::new("silent").with_word("silent"))
    .unwrap();

    system
}

// ============================================================================
// DISPATCH TESTS
// ============================================================================

mod dispatch {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_custom_context_reaches_handler() {
        let system = bot(Arc::default());
        let reply = system
            .execute(&Message::by(7), "echo hi\\ there")
            .await
            .unwrap();
        assert_eq!(reply, Reply::Text("7: hi there".to_string()));
    }

    #[tokio::test]
    async fn test_ban_with_mention_and_words() {
        let audit = Arc::new(Mutex::new(Vec::new()));
        let system = bot(Arc::clone(&audit));
        let moderator = Message::by(1).with_role("mod");

        let reply = system
            .execute(&moderator, "user ban <@!42> --reason raid\\ spam --silent")
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::Banned {
                target: 42,
                reason: Some("raid spam".to_string()),
                silent: true,
            }
        );
        assert_eq!(audit.lock().unwrap().as_slice(), ["1 banned 42".to_string()]);
    }

    #[tokio::test]
    async fn test_role_gate() {
        let audit = Arc::new(Mutex::new(Vec::new()));
        let system = bot(Arc::clone(&audit));

        let err = system
            .execute(&Message::by(1), "user ban <@42>")
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InsufficientPermissions(_)));
        assert!(audit.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_mention() {
        let system = bot(Arc::default());
        let err = system
            .execute(&Message::by(1).with_role("mod"), "user ban <#42>")
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_parse(),
            Some(ParseError::InvalidValue { param, .. }) if param == "target"
        ));
    }

    #[tokio::test]
    async fn test_length_bound() {
        let system = bot(Arc::default());
        let long = "x".repeat(100);
        let err = system
            .execute(&Message::by(1), &format!("echo {long}"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("length 100 must be < 100"), "{err}");
    }

    #[tokio::test]
    async fn test_not_found() {
        let system = bot(Arc::default());
        let err = system.execute(&Message::by(1), "kick 5").await.unwrap_err();
        assert_eq!(err.to_string(), "command not found: 'kick 5'");
    }
}

// ============================================================================
// CONCURRENCY TESTS
// ============================================================================

mod concurrency {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_tree_across_tasks() {
        let audit = Arc::new(Mutex::new(Vec::new()));
        let system = Arc::new(bot(Arc::clone(&audit)));

        let mut handles = Vec::new();
        for i in 0..32u64 {
            let system = Arc::clone(&system);
            handles.push(tokio::spawn(async move {
                let msg = Message::by(i).with_role("mod");
                system
                    .execute(&msg, &format!("user ban <@{}>", 1000 + i))
                    .await
            }));
        }

        for handle in handles {
            let reply = handle.await.unwrap().unwrap();
            assert!(matches!(reply, Reply::Banned { silent: false, .. }));
        }
        assert_eq!(audit.lock().unwrap().len(), 32);
    }
}

// ============================================================================
// CONFIG TESTS
// ============================================================================

mod config {
    use super::*;
    use pretty_assertions::assert_eq;

    const TREE: &str = r#"
name = "configured"

[[command]]
name = "roll"
description = "Roll dice"
argument = [{ name = "sides", kind = "integer", min = 2, max = 100, include_max = true }]
tag = [{ name = "verbose", word = "verbose" }]
"#;

    #[tokio::test]
    async fn test_config_tree_dispatches() {
        let handler = handler_fn(|_: &Message, params: ParsedParams| async move { Ok(params) });
        let system = TreeConfig::from_toml_str(TREE)
            .unwrap()
            .build(handler)
            .unwrap();

        let params = system
            .execute(&Message::by(1), "roll 100 --verbose")
            .await
            .unwrap();
        assert_eq!(params.get("sides"), Some(&Value::Integer(100)));
        assert!(params.flag("verbose"));

        let err = system.execute(&Message::by(1), "roll 1").await.unwrap_err();
        assert!(matches!(err, CommandError::Parse(ParseError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_config_usage() {
        let handler = handler_fn(|_: &Message, params: ParsedParams| async move { Ok(params) });
        let system = TreeConfig::from_toml_str(TREE)
            .unwrap()
            .build(handler)
            .unwrap();

        let usage = system
            .usage_message(&Message::by(1), "roll")
            .await
            .unwrap();
        assert_eq!(
            usage,
            "Usage: roll <sides> [-v]\nRoll dice\nArguments:\n  sides:integer[2, 100]\nTags:\n  verbose | -v | --verbose"
        );
        assert_eq!(system.tree_string(false), "configured\n|\n+-+ roll\n");
    }
}
