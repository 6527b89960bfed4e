//! Piece plugin contract and ready-made definitions.

use async_trait::async_trait;
use catalogue_core::{ActionContext, HttpMethod, JsonMap, TypeDescription};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::property::{FetchContext, Property};

/// Auth descriptor of a piece
#[derive(Debug, Clone, PartialEq)]
pub enum PieceAuth {
    None,
    OAuth2(OAuth2Auth),
    SecretText { display_name: String },
    BasicAuth { display_name: String },
    CustomAuth { display_name: String },
}

impl PieceAuth {
    pub fn kind(&self) -> &'static str {
        match self {
            PieceAuth::None => "none",
            PieceAuth::OAuth2(_) => "oauth2",
            PieceAuth::SecretText { .. } => "secret_text",
            PieceAuth::BasicAuth { .. } => "basic_auth",
            PieceAuth::CustomAuth { .. } => "custom_auth",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Auth {
    /// API base URL
    pub url: String,
    pub auth_url: String,
    pub token_url: String,
    #[serde(default)]
    pub scope: Vec<String>,
    /// Extra authorization request arguments
    #[serde(default)]
    pub extra: JsonMap,
    #[serde(default)]
    pub ping_method: Option<HttpMethod>,
    #[serde(default)]
    pub ping_path: Option<String>,
    #[serde(default)]
    pub token_use_basic_auth: bool,
}

/// Context a piece action runs with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieceContext {
    pub props_value: JsonMap,
    /// `access_token` plus the remaining connection options
    pub auth: JsonMap,
    /// Host-level call options
    pub options: JsonMap,
    pub conn_name: String,
}

/// `{access_token: conn_opts.token, ...other conn_opts}`
pub fn piece_auth(ctx: &ActionContext) -> JsonMap {
    let mut auth = JsonMap::new();
    let token = ctx.conn_opts.get("token").cloned().unwrap_or(JsonValue::Null);
    auth.insert("access_token".to_string(), token);
    for (key, value) in &ctx.conn_opts {
        if key != "token" {
            auth.insert(key.clone(), value.clone());
        }
    }
    auth
}

impl PieceContext {
    pub fn from_action(input: JsonMap, options: JsonMap, ctx: &ActionContext) -> Self {
        Self {
            props_value: input,
            auth: piece_auth(ctx),
            options,
            conn_name: ctx.conn_name.clone(),
        }
    }
}

impl FetchContext {
    pub fn from_action(ctx: &ActionContext) -> Self {
        Self {
            auth: piece_auth(ctx),
            props_value: ctx.opts.clone(),
        }
    }
}

#[async_trait]
pub trait PieceAction: Send + Sync {
    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    fn props(&self) -> &IndexMap<String, Property>;

    fn response_type(&self) -> Option<&TypeDescription> {
        None
    }

    async fn run(&self, ctx: PieceContext) -> anyhow::Result<JsonValue>;
}

pub trait Piece: Send + Sync {
    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    fn logo(&self) -> Option<&str> {
        None
    }

    fn auth(&self) -> &PieceAuth;

    fn actions(&self) -> &IndexMap<String, Arc<dyn PieceAction>>;
}

type RunFn = dyn Fn(PieceContext) -> BoxFuture<'static, anyhow::Result<JsonValue>> + Send + Sync;

/// Piece action assembled from props and a run closure
pub struct ActionDef {
    display_name: String,
    description: String,
    props: IndexMap<String, Property>,
    response_type: Option<TypeDescription>,
    runner: Arc<RunFn>,
}

impl ActionDef {
    pub fn new<F, Fut>(
        display_name: impl Into<String>,
        description: impl Into<String>,
        run: F,
    ) -> Self
    where
        F: Fn(PieceContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<JsonValue>> + Send + 'static,
    {
        Self {
            display_name: display_name.into(),
            description: description.into(),
            props: IndexMap::new(),
            response_type: None,
            runner: Arc::new(move |ctx| -> BoxFuture<'static, anyhow::Result<JsonValue>> {
                Box::pin(run(ctx))
            }),
        }
    }

    pub fn prop(mut self, name: impl Into<String>, property: Property) -> Self {
        self.props.insert(name.into(), property);
        self
    }

    pub fn with_response_type(mut self, response_type: impl Into<TypeDescription>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("display_name", &self.display_name)
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl PieceAction for ActionDef {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn props(&self) -> &IndexMap<String, Property> {
        &self.props
    }

    fn response_type(&self) -> Option<&TypeDescription> {
        self.response_type.as_ref()
    }

    async fn run(&self, ctx: PieceContext) -> anyhow::Result<JsonValue> {
        (self.runner)(ctx).await
    }
}

/// Piece assembled from an auth descriptor and action definitions
pub struct PieceDef {
    display_name: String,
    description: String,
    logo: Option<String>,
    auth: PieceAuth,
    actions: IndexMap<String, Arc<dyn PieceAction>>,
}

impl PieceDef {
    pub fn new(
        display_name: impl Into<String>,
        description: impl Into<String>,
        auth: PieceAuth,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            description: description.into(),
            logo: None,
            auth,
            actions: IndexMap::new(),
        }
    }

    pub fn logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    pub fn action(mut self, name: impl Into<String>, action: impl PieceAction + 'static) -> Self {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }
}

impl Piece for PieceDef {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    fn auth(&self) -> &PieceAuth {
        &self.auth
    }

    fn actions(&self) -> &IndexMap<String, Arc<dyn PieceAction>> {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_piece_auth_from_connection() {
        let ctx = ActionContext::new("dropbox-main")
            .with_conn_opt("token", json!("secret"))
            .with_conn_opt("region", json!("eu"));
        let auth = piece_auth(&ctx);
        assert_eq!(auth.get("access_token"), Some(&json!("secret")));
        assert_eq!(auth.get("region"), Some(&json!("eu")));
        assert!(auth.get("token").is_none());
    }

    #[tokio::test]
    async fn test_action_def_runs_closure() {
        let action = ActionDef::new("Echo", "Echo the props", |ctx: PieceContext| async move {
            Ok(JsonValue::Object(ctx.props_value))
        })
        .prop("text", Property::short_text("Text"));
        let mut props = JsonMap::new();
        props.insert("text".into(), json!("hi"));
        let ctx = PieceContext {
            props_value: props,
            ..Default::default()
        };
        let out = action.run(ctx).await.unwrap();
        assert_eq!(out, json!({"text": "hi"}));
        assert_eq!(action.props().len(), 1);
    }
}
