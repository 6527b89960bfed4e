//! Property model of a piece action.

use catalogue_core::{AllowedValue, BaseType, JsonMap};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a dropdown or dynamic property fetcher receives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchContext {
    /// `access_token` plus the remaining connection options
    pub auth: JsonMap,
    /// Values of the props filled in so far
    pub props_value: JsonMap,
}

type FetchFn<T> = dyn Fn(FetchContext) -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync;

/// Async callback supplied by a piece to compute property data on demand
pub struct Fetcher<T: 'static> {
    inner: Arc<FetchFn<T>>,
}

impl<T: 'static> Fetcher<T> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(FetchContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx| -> BoxFuture<'static, anyhow::Result<T>> {
                Box::pin(f(ctx))
            }),
        }
    }

    pub async fn fetch(&self, ctx: FetchContext) -> anyhow::Result<T> {
        (self.inner)(ctx).await
    }
}

impl<T: 'static> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fetcher(..)")
    }
}

pub type OptionsFetcher = Fetcher<DropdownState>;
pub type DynamicPropsFetcher = Fetcher<IndexMap<String, Property>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: JsonValue,
}

impl DropdownOption {
    pub fn new(label: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn to_allowed_value(&self) -> AllowedValue {
        AllowedValue::labelled(self.value.clone(), self.label.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropdownState {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<DropdownOption>,
}

impl DropdownState {
    pub fn with_options(options: Vec<DropdownOption>) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub enum PropertyKind {
    ShortText,
    LongText,
    Checkbox,
    Number,
    File,
    Json,
    Object,
    Array,
    DateTime,
    StaticDropdown(Vec<DropdownOption>),
    Dropdown(OptionsFetcher),
    /// Sub-properties computed from the values of the `refreshers`
    Dynamic(DynamicPropsFetcher),
    /// Display-only markdown block
    Markdown(String),
    /// Display-only info block
    Info(String),
}

impl PropertyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::ShortText => "short_text",
            PropertyKind::LongText => "long_text",
            PropertyKind::Checkbox => "checkbox",
            PropertyKind::Number => "number",
            PropertyKind::File => "file",
            PropertyKind::Json => "json",
            PropertyKind::Object => "object",
            PropertyKind::Array => "array",
            PropertyKind::DateTime => "date_time",
            PropertyKind::StaticDropdown(_) => "static_dropdown",
            PropertyKind::Dropdown(_) => "dropdown",
            PropertyKind::Dynamic(_) => "dynamic",
            PropertyKind::Markdown(_) => "markdown",
            PropertyKind::Info(_) => "info",
        }
    }

    /// Catalogue type of the value this kind holds
    pub fn base_type(&self) -> BaseType {
        match self {
            PropertyKind::ShortText
            | PropertyKind::LongText
            | PropertyKind::Markdown(_)
            | PropertyKind::Info(_) => BaseType::String,
            PropertyKind::Checkbox => BaseType::Bool,
            PropertyKind::Number => BaseType::Number,
            PropertyKind::File => BaseType::Binary,
            PropertyKind::Json | PropertyKind::Object | PropertyKind::Dynamic(_) => BaseType::Hash,
            PropertyKind::Array => BaseType::List,
            PropertyKind::DateTime => BaseType::Date,
            PropertyKind::StaticDropdown(_) | PropertyKind::Dropdown(_) => BaseType::Any,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    pub display_name: String,
    pub description: Option<String>,
    pub required: bool,
    pub default_value: Option<JsonValue>,
    /// Props whose values this one depends on
    pub refreshers: Vec<String>,
    pub kind: PropertyKind,
}

impl Property {
    pub fn new(display_name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            display_name: display_name.into(),
            description: None,
            required: false,
            default_value: None,
            refreshers: Vec::new(),
            kind,
        }
    }

    pub fn short_text(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::ShortText)
    }

    pub fn long_text(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::LongText)
    }

    pub fn checkbox(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::Checkbox)
    }

    pub fn number(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::Number)
    }

    pub fn file(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::File)
    }

    pub fn json(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::Json)
    }

    pub fn object(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::Object)
    }

    pub fn array(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::Array)
    }

    pub fn date_time(display_name: impl Into<String>) -> Self {
        Self::new(display_name, PropertyKind::DateTime)
    }

    pub fn static_dropdown(display_name: impl Into<String>, options: Vec<DropdownOption>) -> Self {
        Self::new(display_name, PropertyKind::StaticDropdown(options))
    }

    pub fn dropdown(display_name: impl Into<String>, fetcher: OptionsFetcher) -> Self {
        Self::new(display_name, PropertyKind::Dropdown(fetcher))
    }

    pub fn dynamic(display_name: impl Into<String>, fetcher: DynamicPropsFetcher) -> Self {
        Self::new(display_name, PropertyKind::Dynamic(fetcher))
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new("", PropertyKind::Markdown(text))
    }

    pub fn info(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new("", PropertyKind::Info(text))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn refreshers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refreshers = names.into_iter().map(Into::into).collect();
        self
    }

    /// Info and markdown blocks carry no value
    pub fn is_display_only(&self) -> bool {
        matches!(self.kind, PropertyKind::Info(_) | PropertyKind::Markdown(_))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, PropertyKind::Dynamic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_type_mapping() {
        assert_eq!(Property::checkbox("Flag").kind.base_type(), BaseType::Bool);
        assert_eq!(Property::file("Upload").kind.base_type(), BaseType::Binary);
        assert_eq!(Property::date_time("When").kind.base_type(), BaseType::Date);
        assert_eq!(Property::static_dropdown("Pick", vec![]).kind.base_type(), BaseType::Any);
        assert!(Property::info("Read this").is_display_only());
        assert!(!Property::long_text("Body").is_display_only());
    }

    #[test]
    fn test_dropdown_option_to_allowed_value() {
        let value = DropdownOption::new("High", json!(3)).to_allowed_value();
        assert_eq!(value.value, json!(3));
        assert_eq!(value.display_name, "High");
        assert_eq!(value.short_desc, "High");
        assert_eq!(value.desc, "High");
    }

    #[tokio::test]
    async fn test_fetcher_sees_auth() {
        let fetcher: OptionsFetcher = Fetcher::new(|ctx: FetchContext| async move {
            let token = ctx.auth.get("access_token").cloned().unwrap_or(JsonValue::Null);
            Ok(DropdownState::with_options(vec![DropdownOption::new("token", token)]))
        });
        let mut auth = JsonMap::new();
        auth.insert("access_token".into(), json!("t-1"));
        let ctx = FetchContext {
            auth,
            props_value: JsonMap::new(),
        };
        let state = fetcher.fetch(ctx).await.unwrap();
        assert_eq!(state.options[0].value, json!("t-1"));
    }
}
