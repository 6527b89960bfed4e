//! Declarative manifest of swagger-backed apps.

use catalogue_core::{App, CollisionPolicy, SwaggerPath, DEFAULT_LOCALE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueManifest {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    #[serde(default)]
    pub apps: Vec<AppDeclaration>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for CatalogueManifest {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            collision_policy: CollisionPolicy::default(),
            apps: Vec::new(),
        }
    }
}

/// One app plus the actions it explicitly declares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDeclaration {
    #[serde(flatten)]
    pub app: App,
    /// When empty, actions are derived from the swagger allow-list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDeclaration>,
}

/// An action bound to exactly one swagger operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDeclaration {
    pub action: String,
    pub swagger_path: SwaggerPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_timeout_secs: Option<u64>,
}

impl CatalogueManifest {
    /// Structural checks that make the manifest unusable when they fail
    pub fn validate(&self) -> ConfigResult<()> {
        let mut app_names = HashSet::new();
        for decl in &self.apps {
            let name = decl.app.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Validation("app name must not be empty".to_string()));
            }
            if !app_names.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "app '{name}' is declared more than once"
                )));
            }
            if !decl.actions.is_empty() && decl.app.swagger.is_none() {
                return Err(ConfigError::Validation(format!(
                    "app '{name}' declares actions but has no swagger document"
                )));
            }
            let mut action_names = HashSet::new();
            for action in &decl.actions {
                if action.action.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "app '{name}' has an action without a name"
                    )));
                }
                if !action_names.insert(action.action.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "action '{}' is declared more than once in app '{name}'",
                        action.action
                    )));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn env_prefix(app_name: &str) -> String {
    let mut prefix: String = app_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    prefix.push('_');
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue_core::HttpMethod;

    fn parse(yaml: &str) -> CatalogueManifest {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let manifest = parse("apps: []");
        assert_eq!(manifest.locale, "en");
        assert_eq!(manifest.collision_policy, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_app_declaration_with_actions() {
        let manifest = parse(
            r#"
collision_policy: reject
apps:
  - name: Zendesk
    display_name: Zendesk
    rest:
      url: "https://{{subdomain}}.zendesk.com/api/v2"
    swagger:
      file: zendesk.json
    actions:
      - action: list_tickets
        swagger_path: /tickets/GET
        io_timeout_secs: 30
"#,
        );
        assert_eq!(manifest.collision_policy, CollisionPolicy::Reject);
        let decl = &manifest.apps[0];
        assert_eq!(decl.app.name, "Zendesk");
        assert_eq!(decl.app.rest.as_ref().unwrap().data, "auto");
        assert_eq!(decl.actions[0].swagger_path, SwaggerPath::new("/tickets", HttpMethod::Get));
        assert_eq!(decl.actions[0].io_timeout_secs, Some(30));
        manifest.validate().unwrap();
    }

    #[test]
    fn test_validation_failures() {
        let duplicate = parse("apps:\n  - name: A\n  - name: A\n");
        assert!(matches!(duplicate.validate(), Err(ConfigError::Validation(_))));

        let no_swagger = parse(
            "apps:\n  - name: A\n    actions:\n      - action: x\n        swagger_path: /x/GET\n",
        );
        assert!(matches!(no_swagger.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix("Zendesk"), "ZENDESK_");
        assert_eq!(env_prefix("google-sheets"), "GOOGLE_SHEETS_");
    }
}
