//! Permission predicates.
//!
//! A [`Permission`] is a closed tree of leaf checks and `and`/`or`
//! composites, evaluated against the invocation context. Each command owns a
//! [`PermissionSet`]: empty allows everyone, otherwise any entry suffices.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// What the engine needs to know about who invoked a command.
///
/// Hosts implement this on their own message or interaction type. Anything
/// else a handler needs travels inside the same value.
pub trait InvocationContext: Send + Sync {
    fn author_id(&self) -> u64;

    /// `None` for direct messages.
    fn guild_id(&self) -> Option<u64>;

    fn channel_id(&self) -> Option<u64> {
        None
    }
}

/// Plain context carrying only the ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub author_id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: Option<u64>,
}

impl Invocation {
    pub fn new(author_id: u64) -> Self {
        Self {
            author_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel_id: u64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }
}

impl InvocationContext for Invocation {
    fn author_id(&self) -> u64 {
        self.author_id
    }

    fn guild_id(&self) -> Option<u64> {
        self.guild_id
    }

    fn channel_id(&self) -> Option<u64> {
        self.channel_id
    }
}

type CheckFn<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;
type DeferredFn<C> = Arc<dyn for<'a> Fn(&'a C) -> BoxFuture<'a, bool> + Send + Sync>;

/// A boolean predicate over the invocation context.
pub enum Permission<C> {
    /// The author has this id.
    User(u64),
    /// The invocation happened in this guild.
    Guild(u64),
    /// The invocation happened in this channel.
    Channel(u64),
    /// Synchronous custom check.
    Check(CheckFn<C>),
    /// Asynchronous custom check, e.g. a role lookup against the host.
    Deferred(DeferredFn<C>),
    And(Box<Permission<C>>, Box<Permission<C>>),
    Or(Box<Permission<C>>, Box<Permission<C>>),
}

impl<C: InvocationContext> Permission<C> {
    pub fn user(id: u64) -> Self {
        Permission::User(id)
    }

    pub fn guild(id: u64) -> Self {
        Permission::Guild(id)
    }

    pub fn channel(id: u64) -> Self {
        Permission::Channel(id)
    }

    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Permission::Check(Arc::new(f))
    }

    /// The closure returns a boxed future borrowing the context, usually
    /// written as `|ctx| async move { .. }.boxed()`.
    pub fn deferred<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Permission::Deferred(Arc::new(f))
    }

    #[must_use]
    pub fn and(self, other: Permission<C>) -> Self {
        and(self, other)
    }

    #[must_use]
    pub fn or(self, other: Permission<C>) -> Self {
        or(self, other)
    }

    /// Evaluates the predicate. `and` skips its right side when the left is
    /// false, `or` when the left is true.
    pub fn evaluate<'a>(&'a self, ctx: &'a C) -> BoxFuture<'a, bool> {
        async move {
            match self {
                Permission::User(id) => ctx.author_id() == *id,
                Permission::Guild(id) => ctx.guild_id() == Some(*id),
                Permission::Channel(id) => ctx.channel_id() == Some(*id),
                Permission::Check(f) => f(ctx),
                Permission::Deferred(f) => f(ctx).await,
                Permission::And(left, right) => {
                    left.evaluate(ctx).await && right.evaluate(ctx).await
                }
                Permission::Or(left, right) => {
                    left.evaluate(ctx).await || right.evaluate(ctx).await
                }
            }
        }
        .boxed()
    }
}

/// Both predicates must hold.
pub fn and<C>(left: Permission<C>, right: Permission<C>) -> Permission<C> {
    Permission::And(Box::new(left), Box::new(right))
}

/// Either predicate must hold.
pub fn or<C>(left: Permission<C>, right: Permission<C>) -> Permission<C> {
    Permission::Or(Box::new(left), Box::new(right))
}

impl<C> Clone for Permission<C> {
    fn clone(&self) -> Self {
        match self {
            Permission::User(id) => Permission::User(*id),
            Permission::Guild(id) => Permission::Guild(*id),
            Permission::Channel(id) => Permission::Channel(*id),
            Permission::Check(f) => Permission::Check(Arc::clone(f)),
            Permission::Deferred(f) => Permission::Deferred(Arc::clone(f)),
            Permission::And(l, r) => Permission::And(l.clone(), r.clone()),
            Permission::Or(l, r) => Permission::Or(l.clone(), r.clone()),
        }
    }
}

impl<C> fmt::Display for Permission<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::User(id) => write!(f, "user({id})"),
            Permission::Guild(id) => write!(f, "guild({id})"),
            Permission::Channel(id) => write!(f, "channel({id})"),
            Permission::Check(_) => write!(f, "check"),
            Permission::Deferred(_) => write!(f, "deferred"),
            Permission::And(l, r) => write!(f, "({l} & {r})"),
            Permission::Or(l, r) => write!(f, "({l} | {r})"),
        }
    }
}

impl<C> fmt::Debug for Permission<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permission({self})")
    }
}

/// Permissions attached to one command.
pub struct PermissionSet<C> {
    entries: Vec<Permission<C>>,
}

impl<C> Default for PermissionSet<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> Clone for PermissionSet<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> fmt::Debug for PermissionSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.entries).finish()
    }
}

impl<C: InvocationContext> PermissionSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, permission: Permission<C>) {
        self.entries.push(permission);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission<C>> {
        self.entries.iter()
    }

    /// `true` when empty, otherwise whether any entry holds. Entries are
    /// evaluated in order and evaluation stops at the first success.
    pub async fn evaluate(&self, ctx: &C) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        for permission in &self.entries {
            if permission.evaluate(ctx).await {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx() -> Invocation {
        Invocation::new(1).with_guild(10).with_channel(100)
    }

    #[tokio::test]
    async fn test_leaves() {
        let ctx = ctx();
        assert!(Permission::user(1).evaluate(&ctx).await);
        assert!(!Permission::user(2).evaluate(&ctx).await);
        assert!(Permission::guild(10).evaluate(&ctx).await);
        assert!(Permission::channel(100).evaluate(&ctx).await);
        assert!(!Permission::channel(100).evaluate(&Invocation::new(1)).await);
        assert!(Permission::check(|c: &Invocation| c.author_id < 5).evaluate(&ctx).await);
    }

    #[tokio::test]
    async fn test_deferred() {
        let perm = Permission::deferred(|c: &Invocation| {
            let guild = c.guild_id;
            async move { guild == Some(10) }.boxed()
        });
        assert!(perm.evaluate(&ctx()).await);
        assert!(!perm.evaluate(&Invocation::new(1)).await);
    }

    #[tokio::test]
    async fn test_composites() {
        let ctx = ctx();
        assert!(and(Permission::user(1), Permission::guild(10)).evaluate(&ctx).await);
        assert!(!and(Permission::user(1), Permission::guild(11)).evaluate(&ctx).await);
        assert!(or(Permission::user(2), Permission::guild(10)).evaluate(&ctx).await);
        assert!(!or(Permission::user(2), Permission::guild(11)).evaluate(&ctx).await);
        assert!(
            Permission::user(2)
                .or(Permission::user(1).and(Permission::channel(100)))
                .evaluate(&ctx)
                .await
        );
    }

    #[tokio::test]
    async fn test_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = {
            let calls = Arc::clone(&calls);
            Permission::check(move |_: &Invocation| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
        };

        let ctx = ctx();
        assert!(!and(Permission::user(2), counter.clone()).evaluate(&ctx).await);
        assert!(or(Permission::user(1), counter.clone()).evaluate(&ctx).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(or(Permission::user(2), counter).evaluate(&ctx).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permission_set() {
        let ctx = ctx();
        let mut set = PermissionSet::new();
        assert!(set.evaluate(&ctx).await);

        set.push(Permission::user(2));
        assert!(!set.evaluate(&ctx).await);

        set.push(Permission::guild(10));
        assert!(set.evaluate(&ctx).await);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        let perm: Permission<Invocation> =
            Permission::user(1).and(Permission::guild(2).or(Permission::check(|_| true)));
        assert_eq!(perm.to_string(), "(user(1) & (guild(2) | check))");
    }
}
