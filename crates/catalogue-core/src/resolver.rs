//! Deferred functions stored on apps, actions and options.
//!
//! Nothing here is invoked while the catalogue is being built. The host calls
//! the resolvers at run time with the [`ActionContext`] of the current
//! connection and the option values chosen so far.

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::option::{ActionOption, AllowedValue};

pub type JsonMap = Map<String, JsonValue>;

/// Run-time context handed to resolvers and action functions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionContext {
    /// Name of the connection the action runs against
    #[serde(default)]
    pub conn_name: String,
    /// Connection options, including the access `token`
    #[serde(default)]
    pub conn_opts: JsonMap,
    /// Option values already chosen by the user
    #[serde(default)]
    pub opts: JsonMap,
}

impl ActionContext {
    pub fn new(conn_name: impl Into<String>) -> Self {
        Self {
            conn_name: conn_name.into(),
            ..Default::default()
        }
    }

    pub fn with_conn_opt(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.conn_opts.insert(key.into(), value);
        self
    }

    pub fn with_opt(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.opts.insert(key.into(), value);
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.conn_opts.get("token").and_then(JsonValue::as_str)
    }
}

type ResolverFn<T> = dyn Fn(ActionContext) -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync;

/// An async function of the action context, kept un-invoked until the host asks for it.
///
/// Equality is pointer identity: two `Deferred` values are equal only when they
/// share the same underlying closure.
pub struct Deferred<T: 'static> {
    inner: Arc<ResolverFn<T>>,
}

impl<T: 'static> Deferred<T> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx| -> BoxFuture<'static, anyhow::Result<T>> {
                Box::pin(f(ctx))
            }),
        }
    }

    /// Invoke the resolver. Errors are returned exactly as the function produced them.
    pub async fn resolve(&self, ctx: ActionContext) -> anyhow::Result<T> {
        (self.inner)(ctx).await
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> PartialEq for Deferred<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: 'static> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// Fetches the allowed values of one option
pub type AllowedValuesResolver = Deferred<Vec<AllowedValue>>;

/// Produces extra options once the options this one depends on are set
pub type DependentOptionsResolver = Deferred<IndexMap<String, ActionOption>>;

/// Enriches connection options after authentication succeeded
pub type PostAuthResolver = Deferred<JsonMap>;

type ActionFuture = BoxFuture<'static, anyhow::Result<JsonValue>>;

type ActionFn = dyn Fn(JsonMap, JsonMap, ActionContext) -> ActionFuture + Send + Sync;

/// Inline callable behind a function action: `(input, options, context) -> result`
#[derive(Clone)]
pub struct ActionFunction {
    inner: Arc<ActionFn>,
}

impl ActionFunction {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(JsonMap, JsonMap, ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<JsonValue>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |input, options, ctx| -> ActionFuture {
                Box::pin(f(input, options, ctx))
            }),
        }
    }

    pub async fn call(
        &self,
        input: JsonMap,
        options: JsonMap,
        ctx: ActionContext,
    ) -> anyhow::Result<JsonValue> {
        (self.inner)(input, options, ctx).await
    }
}

impl PartialEq for ActionFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ActionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionFunction(..)")
    }
}
