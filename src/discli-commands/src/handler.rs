//! Command handlers.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::value::ParsedParams;

/// Something that runs a resolved command.
///
/// Closures are adapted through [`FnHandler`]; implement the trait directly
/// when the handler carries its own state.
pub trait CommandHandler<C, R>: Send + Sync {
    fn call<'a>(&'a self, ctx: &'a C, params: ParsedParams) -> BoxFuture<'a, anyhow::Result<R>>;
}

/// Handler shared between the tree and in-flight dispatches.
pub type SharedHandler<C, R> = Arc<dyn CommandHandler<C, R>>;

/// Adapts `Fn(&C, ParsedParams) -> impl Future` into a [`CommandHandler`].
///
/// The returned future must not borrow the context; copy what it needs out
/// of `ctx` before the `async move` block.
pub struct FnHandler<F, C, R> {
    f: F,
    _marker: PhantomData<fn(&C) -> R>,
}

impl<F, C, R> FnHandler<F, C, R> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, Fut, C, R> CommandHandler<C, R> for FnHandler<F, C, R>
where
    F: Fn(&C, ParsedParams) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    C: Sync,
    R: Send + 'static,
{
    fn call<'a>(&'a self, ctx: &'a C, params: ParsedParams) -> BoxFuture<'a, anyhow::Result<R>> {
        (self.f)(ctx, params).boxed()
    }
}

/// Wraps a closure into a [`SharedHandler`].
pub fn handler_fn<F, Fut, C, R>(f: F) -> SharedHandler<C, R>
where
    F: Fn(&C, ParsedParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    C: Sync + 'static,
    R: Send + 'static,
{
    Arc::new(FnHandler::new(f))
}
