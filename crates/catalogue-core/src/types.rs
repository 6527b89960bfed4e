//! Apps and actions as exposed to the host engine.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::option::{ActionOption, OptionType, PrimitiveType};
use crate::resolver::{ActionFunction, JsonMap, PostAuthResolver};

/// Action code the host uses for API-backed actions
pub const ACTION_CODE_API: u32 = 2;

/// Placeholder logo (a rounded square) as base64 SVG
pub const DEFAULT_LOGO: &str = concat!(
    "PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAyNCAyNCI+",
    "PHJlY3Qgd2lkdGg9IjI0IiBoZWlnaHQ9IjI0IiByeD0iNCIgZmlsbD0iIzVjNmJjMCIvPjwvc3ZnPg==",
);
pub const DEFAULT_LOGO_MIME_TYPE: &str = "image/svg+xml";

pub const OAUTH2_AUTHORIZATION_CODE: &str = "authorization_code";

static URL_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "options")]
    Options,
    #[serde(alias = "head")]
    Head,
    #[serde(alias = "patch")]
    Patch,
}

impl HttpMethod {
    /// Methods in the order operations are visited inside a path item
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Invalid(format!("unsupported HTTP method '{s}'")))
    }
}

/// Reference from an action to one swagger operation, written `"{path}/{METHOD}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwaggerPath {
    pub path: String,
    pub method: HttpMethod,
}

impl SwaggerPath {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for SwaggerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.path, self.method)
    }
}

impl FromStr for SwaggerPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, method) = s
            .rsplit_once('/')
            .ok_or_else(|| CoreError::Invalid(format!("swagger path '{s}' has no method suffix")))?;
        if !path.starts_with('/') {
            return Err(CoreError::Invalid(format!("swagger path '{s}' must start with '/'")));
        }
        Ok(Self {
            path: path.to_string(),
            method: method.parse()?,
        })
    }
}

impl TryFrom<String> for SwaggerPath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SwaggerPath> for String {
    fn from(value: SwaggerPath) -> Self {
        value.to_string()
    }
}

fn default_data() -> String {
    "auto".to_string()
}

/// REST connection template of an app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestConfig {
    /// Base URL, may contain `{{option}}` placeholders
    pub url: String,
    #[serde(default = "default_data")]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_grant_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oauth2_scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub oauth2_auth_args: JsonMap,
    #[serde(default)]
    pub oauth2_token_use_basic_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_path: Option<String>,
}

impl RestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: default_data(),
            oauth2_grant_type: None,
            oauth2_client_id: None,
            oauth2_client_secret: None,
            oauth2_auth_url: None,
            oauth2_token_url: None,
            oauth2_scopes: Vec::new(),
            oauth2_auth_args: JsonMap::new(),
            oauth2_token_use_basic_auth: false,
            ping_method: None,
            ping_path: None,
        }
    }

    pub fn is_oauth2(&self) -> bool {
        self.oauth2_grant_type.is_some()
    }

    /// Names of the `{{placeholder}}` tokens in the base URL, in order of appearance
    pub fn url_placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in URL_PLACEHOLDER.captures_iter(&self.url) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Substitute placeholders from connection options
    pub fn render_url(&self, conn_opts: &JsonMap) -> CoreResult<String> {
        let mut missing = Vec::new();
        let rendered = URL_PLACEHOLDER.replace_all(&self.url, |caps: &regex::Captures<'_>| {
            match conn_opts.get(&caps[1]) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(JsonValue::Null) | None => {
                    missing.push(caps[1].to_string());
                    String::new()
                }
                Some(other) => other.to_string(),
            }
        });
        if !missing.is_empty() {
            return Err(CoreError::Invalid(format!(
                "url '{}' is missing options: {}",
                self.url,
                missing.join(", ")
            )));
        }
        Ok(rendered.into_owned())
    }
}

/// A user-supplied connection option (e.g. a subdomain)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionOption {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type", default = "default_connection_option_type")]
    pub option_type: PrimitiveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
}

fn default_connection_option_type() -> PrimitiveType {
    PrimitiveType::new(crate::option::BaseType::String)
}

/// Adjustments to the REST connection template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestModifiers {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, ConnectionOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub url_template_options: Vec<String>,
    #[serde(skip)]
    pub set_options_post_auth: Option<PostAuthResolver>,
}

/// Where an app's swagger document lives and which paths are exposed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwaggerReference {
    pub file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub logo_file_name: String,
    #[serde(default)]
    pub logo_mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<RestConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_modifiers: Option<RestModifiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<SwaggerReference>,
}

impl App {
    /// App with the default logo and labels derived from `display_name`
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let name = name.into();
        let display_name = display_name.into();
        Self {
            logo_file_name: format!("{name}.svg"),
            name,
            short_desc: display_name.clone(),
            desc: display_name.clone(),
            display_name,
            logo: DEFAULT_LOGO.to_string(),
            logo_mime_type: DEFAULT_LOGO_MIME_TYPE.to_string(),
            rest: None,
            rest_modifiers: None,
            swagger: None,
        }
    }

    pub fn with_desc(mut self, short_desc: impl Into<String>, desc: impl Into<String>) -> Self {
        self.short_desc = short_desc.into();
        self.desc = desc.into();
        self
    }

    pub fn with_rest(mut self, rest: RestConfig) -> Self {
        self.rest = Some(rest);
        self
    }

    pub fn with_rest_modifiers(mut self, modifiers: RestModifiers) -> Self {
        self.rest_modifiers = Some(modifiers);
        self
    }

    pub fn with_swagger(mut self, swagger: SwaggerReference) -> Self {
        self.swagger = Some(swagger);
        self
    }
}

/// What the host does when an action runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    /// Inline callable
    Function {
        #[serde(skip)]
        api_function: ActionFunction,
    },
    /// Declarative REST call dispatched by the host's executor
    Swagger { swagger_path: SwaggerPath },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub app: String,
    pub action: String,
    pub display_name: String,
    pub short_desc: String,
    pub desc: String,
    pub action_code: u32,
    #[serde(flatten)]
    pub kind: ActionKind,
    pub options: IndexMap<String, ActionOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<OptionType>,
    /// Hint for the host's I/O timeout; never enforced by the catalogue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_timeout_secs: Option<u64>,
}

impl Action {
    fn with_kind(app: impl Into<String>, action: impl Into<String>, kind: ActionKind) -> Self {
        let action = action.into();
        let display_name = crate::naming::humanize(&action);
        Self {
            app: app.into(),
            short_desc: display_name.clone(),
            desc: display_name.clone(),
            display_name,
            action,
            action_code: ACTION_CODE_API,
            kind,
            options: IndexMap::new(),
            response_type: None,
            io_timeout_secs: None,
        }
    }

    pub fn function(
        app: impl Into<String>,
        action: impl Into<String>,
        api_function: ActionFunction,
    ) -> Self {
        Self::with_kind(app, action, ActionKind::Function { api_function })
    }

    pub fn swagger(
        app: impl Into<String>,
        action: impl Into<String>,
        swagger_path: SwaggerPath,
    ) -> Self {
        Self::with_kind(app, action, ActionKind::Swagger { swagger_path })
    }

    /// Set labels, falling back from description to short description to display name
    pub fn with_labels(
        mut self,
        display_name: Option<&str>,
        short_desc: Option<&str>,
        desc: Option<&str>,
    ) -> Self {
        let pick = |v: Option<&str>| v.filter(|s| !s.trim().is_empty()).map(str::to_string);
        if let Some(display_name) = pick(display_name) {
            self.display_name = display_name;
        }
        let desc = pick(desc);
        self.short_desc = pick(short_desc)
            .or_else(|| desc.clone())
            .unwrap_or_else(|| self.display_name.clone());
        self.desc = desc.unwrap_or_else(|| self.short_desc.clone());
        self
    }

    pub fn with_options(mut self, options: IndexMap<String, ActionOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_response_type(mut self, response_type: OptionType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    pub fn with_io_timeout(mut self, secs: u64) -> Self {
        self.io_timeout_secs = Some(secs);
        self
    }

    pub fn function_ref(&self) -> Option<&ActionFunction> {
        match &self.kind {
            ActionKind::Function { api_function } => Some(api_function),
            ActionKind::Swagger { .. } => None,
        }
    }

    pub fn swagger_path(&self) -> Option<&SwaggerPath> {
        match &self.kind {
            ActionKind::Swagger { swagger_path } => Some(swagger_path),
            ActionKind::Function { .. } => None,
        }
    }

    pub fn is_swagger(&self) -> bool {
        self.swagger_path().is_some()
    }

    /// `"{app}.{action}"`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.app, self.action)
    }
}
