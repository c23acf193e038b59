//! Dispatcher scenarios.
//!
//! Covers:
//! 1. End-to-end dispatch of nested commands
//! 2. Escaped spaces reaching handlers intact
//! 3. Permission gates at every level of the tree
//! 4. Shape of parse results
//! 5. Registration-time rejections

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;

use super::*;

type System = CommandSystem<Invocation, ParsedParams>;

/// Returns the parsed parameters unchanged.
struct Echo;

impl CommandHandler<Invocation, ParsedParams> for Echo {
    fn call<'a>(
        &'a self,
        _ctx: &'a Invocation,
        params: ParsedParams,
    ) -> BoxFuture<'a, anyhow::Result<ParsedParams>> {
        async move { Ok(params) }.boxed()
    }
}

fn moderation() -> System {
    let mut system = System::new("bot", Some("Moderation bot"));

    let user = system.command("user", Some("User management")).unwrap();
    user.executable_with("ban", Some("Ban a user"), Arc::new(Echo))
        .unwrap()
        .add_argument(Argument::integer("target_id", Bounds::any()))
        .unwrap()
        .add_option(CommandOption::string("reason", Bounds::any()))
        .unwrap()
        .add_tag(Tag::new("silent"))
        .unwrap();

    system
        .executable("say", None, |_, params: ParsedParams| async move { Ok(params) })
        .unwrap()
        .add_argument(Argument::string("text", Bounds::any()))
        .unwrap();

    system
}

// ============================================================================
// Dispatch
// ============================================================================

mod dispatch_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_user_ban_scenario() {
        let system = moderation();
        let params = system
            .execute(&Invocation::new(1), "user ban 12345 -r spam -s")
            .await
            .unwrap();

        let expected: ParsedParams = vec![
            ("target_id".to_string(), Value::Integer(12345)),
            ("reason".to_string(), Value::Text("spam".to_string())),
            ("silent".to_string(), Value::Flag(true)),
        ]
        .into_iter()
        .collect();
        assert_eq!(params, expected);
    }

    #[tokio::test]
    async fn test_escaped_space_scenario() {
        let system = moderation();
        let params = system
            .execute(&Invocation::new(1), "say hello\\ world")
            .await
            .unwrap();
        assert_eq!(params.get_str("text"), Some("hello world"));
    }

    #[tokio::test]
    async fn test_escaped_option_value() {
        let system = moderation();
        let params = system
            .execute(&Invocation::new(1), "user ban 1 -r too\\ much\\ spam")
            .await
            .unwrap();
        assert_eq!(params.get_str("reason"), Some("too much spam"));
        assert!(!params.flag("silent"));
    }

    #[tokio::test]
    async fn test_parse_errors_surface() {
        let system = moderation();
        let ctx = Invocation::new(1);

        let err = system.execute(&ctx, "user ban").await.unwrap_err();
        assert_eq!(
            err.as_parse(),
            Some(&ParseError::ExpectedArguments {
                command: "user ban".to_string(),
                expected: 1,
                actual: 0,
            })
        );

        let err = system.execute(&ctx, "user ban -r").await.unwrap_err();
        assert_eq!(
            err.as_parse(),
            Some(&ParseError::InvalidOption {
                command: "user ban".to_string(),
                option: "reason".to_string(),
            })
        );

        let err = system.execute(&ctx, "user ban 1 -z").await.unwrap_err();
        assert!(matches!(
            err.as_parse(),
            Some(ParseError::UnexpectedLetter { .. })
        ));

        let err = system.execute(&ctx, "user").await.unwrap_err();
        assert!(matches!(err, CommandError::NotExecutable(ref c) if c == "user"));
    }

    #[tokio::test]
    async fn test_unknown_sub_command_stops_resolution() {
        let system = moderation();
        // "kick" is not a child of "user", so resolution stops at "user".
        let err = system
            .execute(&Invocation::new(1), "user kick 5")
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NotExecutable(_)));
    }
}

// ============================================================================
// Permissions
// ============================================================================

mod permission_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gated() -> System {
        let mut system = System::new("bot", None);
        let admin = system.command("admin", None).unwrap();
        admin.add_permission(Permission::user(1));
        admin
            .executable("stop", None, |_, p: ParsedParams| async move { Ok(p) })
            .unwrap();
        system
    }

    #[tokio::test]
    async fn test_permission_gate_scenario() {
        let system = gated();

        let err = system
            .execute(&Invocation::new(2), "admin stop")
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InsufficientPermissions(ref c) if c == "admin"));

        assert!(system.execute(&Invocation::new(1), "admin stop").await.is_ok());
    }

    #[tokio::test]
    async fn test_deferred_permission_on_leaf() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let mut system = System::new("bot", None);
        {
            let lookups = Arc::clone(&lookups);
            system
                .executable("secret", None, |_, p: ParsedParams| async move { Ok(p) })
                .unwrap()
                .add_permission(Permission::deferred(move |ctx: &Invocation| {
                    lookups.fetch_add(1, Ordering::SeqCst);
                    let guild = ctx.guild_id;
                    async move { guild == Some(7) }.boxed()
                }));
        }

        assert!(system
            .execute(&Invocation::new(1).with_guild(7), "secret")
            .await
            .is_ok());
        assert!(matches!(
            system.execute(&Invocation::new(1), "secret").await,
            Err(CommandError::InsufficientPermissions(_))
        ));
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_denied_resolution_reaches_no_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut system = System::new("bot", None);
        let counter = Arc::clone(&calls);
        system
            .command("guild", None)
            .unwrap()
            .add_permission(and(Permission::guild(5), Permission::channel(6)))
            .executable("purge", None, move |_, p: ParsedParams| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(p) }
            })
            .unwrap();

        let in_guild = Invocation::new(1).with_guild(5);
        assert!(system.execute(&in_guild, "guild purge").await.is_err());
        assert!(system
            .execute(&in_guild.with_channel(6), "guild purge")
            .await
            .is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

// ============================================================================
// Parse Result Shape
// ============================================================================

mod shape_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_result_has_every_parameter() {
        let system = moderation();
        let node = system.find("user ban").unwrap();
        let expected = node.parameters().len();

        for input in ["user ban 1", "user ban 1 -s", "user ban -r x 1", "user ban 1 -s -r y"] {
            let params = system.execute(&Invocation::new(1), input).await.unwrap();
            assert_eq!(params.len(), expected, "{input}");
        }
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let system = moderation();
        let ctx = Invocation::new(1);
        let tokens = split_command_string("user ban 1 -s");

        let (first, rest_first) = system.resolve(&ctx, &tokens).await.unwrap();
        let (second, rest_second) = system.resolve(&ctx, &tokens).await.unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(rest_first, rest_second);
        assert_eq!(first.parse_params(rest_first), second.parse_params(rest_second));
    }
}

// ============================================================================
// Registration
// ============================================================================

mod registration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cross_kind_name_uniqueness() {
        let mut system = System::new("bot", None);
        let node = system
            .executable("count", None, |_, p: ParsedParams| async move { Ok(p) })
            .unwrap();
        node.add_argument(Argument::integer("amount", Bounds::any()))
            .unwrap();

        let err = node
            .add_option(CommandOption::integer("amount", Bounds::any()).with_letter('x'))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NameInUse { .. }));

        let err = node.add_tag(Tag::new("amount").with_letter('y')).unwrap_err();
        assert!(matches!(err, ConfigError::NameInUse { .. }));
        assert_eq!(node.parameters().len(), 1);
    }

    #[test]
    fn test_free_text_node_rejects_children() {
        let mut system = moderation();
        let say = system.command_mut("say").unwrap();
        assert!(matches!(
            say.command("loud", None),
            Err(ConfigError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_registration_errors_leave_tree_intact() {
        let mut system = moderation();
        let before = system.tree_string(true);

        assert!(system.command("user", None).is_err());
        assert!(system.command("bad name", None).is_err());
        let ban = system.command_mut("user ban").unwrap();
        assert!(ban.add_tag(Tag::new("reason")).is_err());
        assert!(ban.add_option(CommandOption::integer("n", Bounds::between(9, 1))).is_err());

        assert_eq!(system.tree_string(true), before);
    }
}
