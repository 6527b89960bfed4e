//! Environment variable substitution with a prefix whitelist and default values.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use std::env;
use thiserror::Error;

static VAR_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").unwrap());

#[derive(Debug, Error)]
pub enum EnvResolverError {
    #[error("Environment variable '{0}' not found and no default provided")]
    VarNotFound(String),
    #[error("Environment variable '{0}' is not in whitelist. Allowed prefixes: {1:?}")]
    VarNotWhitelisted(String, Vec<String>),
    #[error("Recursive variable reference detected through '{0}'")]
    RecursiveReference(String),
    #[error("Maximum substitution depth {0} exceeded")]
    DepthExceeded(usize),
}

/// Resolves `${VAR}` and `${VAR:default}` references inside JSON strings
///
/// Substituted values stay strings. A value that itself contains references is
/// resolved again, up to `max_depth` levels.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    /// Empty means every variable is allowed
    allowed_prefixes: Vec<String>,
    max_depth: usize,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self {
            allowed_prefixes: vec!["CATALOGUE_".to_string(), "APP_".to_string()],
            max_depth: 10,
        }
    }
}

impl EnvResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self {
            allowed_prefixes,
            max_depth: 10,
        }
    }

    pub fn unrestricted() -> Self {
        Self {
            allowed_prefixes: vec![],
            max_depth: 10,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !self.allowed_prefixes.is_empty() && !self.allowed_prefixes.contains(&prefix) {
            self.allowed_prefixes.push(prefix);
        }
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn resolve(&self, value: &JsonValue) -> Result<JsonValue, EnvResolverError> {
        match value {
            JsonValue::String(s) => Ok(JsonValue::String(self.resolve_str(s)?)),
            JsonValue::Object(obj) => {
                let mut resolved = serde_json::Map::with_capacity(obj.len());
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve(val)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            JsonValue::Array(items) => Ok(JsonValue::Array(
                items.iter().map(|item| self.resolve(item)).collect::<Result<_, _>>()?,
            )),
            other => Ok(other.clone()),
        }
    }

    pub fn resolve_str(&self, input: &str) -> Result<String, EnvResolverError> {
        self.substitute(input, &mut Vec::new())
    }

    /// Whether a variable may be read at all
    pub fn is_allowed(&self, var_name: &str) -> bool {
        self.allowed_prefixes.is_empty()
            || self
                .allowed_prefixes
                .iter()
                .any(|p| var_name.starts_with(p.as_str()))
    }

    fn substitute(&self, input: &str, stack: &mut Vec<String>) -> Result<String, EnvResolverError> {
        if !input.contains("${") {
            return Ok(input.to_string());
        }
        if stack.len() >= self.max_depth {
            return Err(EnvResolverError::DepthExceeded(self.max_depth));
        }

        let mut failure = None;
        let output = VAR_REF.replace_all(input, |caps: &Captures<'_>| {
            if failure.is_some() {
                return String::new();
            }
            match self.lookup(&caps[1], caps.get(2).map(|m| m.as_str()), stack) {
                Ok(value) => value,
                Err(e) => {
                    failure = Some(e);
                    String::new()
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(output.into_owned()),
        }
    }

    fn lookup(
        &self,
        name: &str,
        default: Option<&str>,
        stack: &mut Vec<String>,
    ) -> Result<String, EnvResolverError> {
        if !self.is_allowed(name) {
            return Err(EnvResolverError::VarNotWhitelisted(
                name.to_string(),
                self.allowed_prefixes.clone(),
            ));
        }
        if stack.iter().any(|n| n == name) {
            return Err(EnvResolverError::RecursiveReference(name.to_string()));
        }
        let raw = match env::var(name) {
            Ok(value) => value,
            Err(_) => match default {
                Some(default) => default.to_string(),
                None => return Err(EnvResolverError::VarNotFound(name.to_string())),
            },
        };
        stack.push(name.to_string());
        let resolved = self.substitute(&raw, stack);
        stack.pop();
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_and_default_resolution() {
        env::set_var("CATALOGUE_TEST_SUBDOMAIN", "acme");
        let resolver = EnvResolver::default();
        let value = resolver
            .resolve(&json!({
                "url": "https://${CATALOGUE_TEST_SUBDOMAIN}.zendesk.com",
                "scopes": ["${CATALOGUE_TEST_MISSING_SCOPE:read}"],
                "port": 443
            }))
            .unwrap();
        assert_eq!(value["url"], json!("https://acme.zendesk.com"));
        assert_eq!(value["scopes"][0], json!("read"));
        assert_eq!(value["port"], json!(443));
    }

    #[test]
    fn test_missing_and_not_whitelisted() {
        let resolver = EnvResolver::default();
        assert!(matches!(
            resolver.resolve_str("${CATALOGUE_TEST_NOT_SET_ANYWHERE}"),
            Err(EnvResolverError::VarNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve_str("${HOME}"),
            Err(EnvResolverError::VarNotWhitelisted(..))
        ));
        assert!(EnvResolver::default()
            .with_prefix("ZENDESK_")
            .is_allowed("ZENDESK_CLIENT_SECRET"));
    }

    #[test]
    fn test_nested_and_recursive_references() {
        env::set_var("APP_TEST_HOST", "api.example.com");
        env::set_var("APP_TEST_BASE", "https://${APP_TEST_HOST}/v2");
        let resolver = EnvResolver::default();
        assert_eq!(
            resolver.resolve_str("${APP_TEST_BASE}/items").unwrap(),
            "https://api.example.com/v2/items"
        );

        env::set_var("APP_TEST_LOOP_A", "${APP_TEST_LOOP_B}");
        env::set_var("APP_TEST_LOOP_B", "${APP_TEST_LOOP_A}");
        assert!(matches!(
            resolver.resolve_str("${APP_TEST_LOOP_A}"),
            Err(EnvResolverError::RecursiveReference(_))
        ));
    }

    #[test]
    fn test_unrestricted_allows_everything() {
        env::set_var("CATALOGUE_TEST_ANY", "x");
        assert_eq!(EnvResolver::unrestricted().resolve_str("${CATALOGUE_TEST_ANY}").unwrap(), "x");
        assert!(EnvResolver::unrestricted().with_prefix("FOO_").is_allowed("PATH"));
    }
}
