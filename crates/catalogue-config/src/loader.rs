//! Manifest loading: parse, resolve environment references, deserialize, fill defaults.

use serde_json::Value as JsonValue;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::env_resolver::EnvResolver;
use crate::error::{ConfigError, ConfigResult};
use crate::manifest::{env_prefix, CatalogueManifest};

/// Used when an OAuth2 app has neither a declared nor an environment secret
pub const AUTO_CLIENT_SECRET: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat(format!(
                "no extension on {}",
                path.display()
            ))),
        }
    }
}

/// A parsed manifest and the directory its relative paths are resolved against
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: CatalogueManifest,
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    env_resolver: EnvResolver,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env_resolver(mut self, resolver: EnvResolver) -> Self {
        self.env_resolver = resolver;
        self
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<LoadedManifest> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let manifest = self.load_from_str(&content, format)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!(path = %path.display(), apps = manifest.apps.len(), "loaded catalogue manifest");
        Ok(LoadedManifest { manifest, base_dir })
    }

    pub fn load_from_str(
        &self,
        content: &str,
        format: FileFormat,
    ) -> ConfigResult<CatalogueManifest> {
        let raw: JsonValue = match format {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };

        let resolver = app_names(&raw)
            .iter()
            .fold(self.env_resolver.clone(), |resolver, name| {
                resolver.with_prefix(env_prefix(name))
            });
        let resolved = resolver.resolve(&raw)?;

        let mut manifest: CatalogueManifest = serde_json::from_value(resolved)?;
        manifest.validate()?;
        fill_client_secrets(&mut manifest);
        Ok(manifest)
    }
}

fn app_names(raw: &JsonValue) -> Vec<String> {
    raw.get("apps")
        .and_then(JsonValue::as_array)
        .map(|apps| {
            apps.iter()
                .filter_map(|app| app.get("name").and_then(JsonValue::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn fill_client_secrets(manifest: &mut CatalogueManifest) {
    for decl in &mut manifest.apps {
        let name = decl.app.name.clone();
        let Some(rest) = decl.app.rest.as_mut() else { continue };
        if !rest.is_oauth2() || rest.oauth2_client_secret.is_some() {
            continue;
        }
        let var = format!("{}CLIENT_SECRET", env_prefix(&name));
        let secret = match env::var(&var) {
            Ok(secret) => {
                debug!(app = %name, var = %var, "client secret taken from environment");
                secret
            }
            Err(_) => AUTO_CLIENT_SECRET.to_string(),
        };
        rest.oauth2_client_secret = Some(secret);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path("a/b.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("c.json").unwrap(), FileFormat::Json);
        assert!(matches!(FileFormat::from_path("c.toml"), Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_app_prefix_is_whitelisted() {
        env::set_var("HUBSPOT_REGION", "eu1");
        let yaml = r#"
apps:
  - name: Hubspot
    rest:
      url: https://api-${HUBSPOT_REGION}.hubapi.com
"#;
        let manifest = ConfigLoader::new().load_from_str(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(
            manifest.apps[0].app.rest.as_ref().unwrap().url,
            "https://api-eu1.hubapi.com"
        );
    }

    #[test]
    fn test_client_secret_defaults() {
        env::set_var("GITLAB_CLIENT_SECRET", "s3cret");
        let yaml = r#"
apps:
  - name: Gitlab
    rest:
      url: https://gitlab.com/api/v4
      oauth2_grant_type: authorization_code
  - name: Trello
    rest:
      url: https://api.trello.com/1
      oauth2_grant_type: authorization_code
  - name: Plain
    rest:
      url: https://plain.example.com
"#;
        let manifest = ConfigLoader::new().load_from_str(yaml, FileFormat::Yaml).unwrap();
        let secret = |i: usize| {
            let rest = manifest.apps[i].app.rest.as_ref().unwrap();
            rest.oauth2_client_secret.clone()
        };
        assert_eq!(secret(0).as_deref(), Some("s3cret"));
        assert_eq!(secret(1).as_deref(), Some(AUTO_CLIENT_SECRET));
        assert_eq!(secret(2), None);
    }

    #[test]
    fn test_declared_option_order_survives_env_resolution() {
        let yaml = r#"
apps:
  - name: Freshdesk
    rest:
      url: "https://{{domain}}.freshdesk.com/api/v2"
    rest_modifiers:
      options:
        domain: { display_name: "${CATALOGUE_TEST_DOMAIN_LABEL:Domain}" }
        api_key: { display_name: API key }
        agent_email: { display_name: Agent email }
"#;
        let manifest = ConfigLoader::new().load_from_str(yaml, FileFormat::Yaml).unwrap();
        let options = &manifest.apps[0].app.rest_modifiers.as_ref().unwrap().options;
        assert_eq!(options.keys().collect::<Vec<_>>(), vec!["domain", "api_key", "agent_email"]);
        assert_eq!(options["domain"].display_name, "Domain");
    }

    #[test]
    fn test_load_from_file_sets_base_dir() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"locale": "de", "apps": [{{"name": "Demo"}}]}}"#).unwrap();
        let loaded = ConfigLoader::new().load_from_file(file.path()).unwrap();
        assert_eq!(loaded.manifest.locale, "de");
        assert_eq!(loaded.base_dir, file.path().parent().unwrap());
    }

    #[test]
    fn test_unresolved_variable_fails() {
        let yaml = "apps:\n  - name: Demo\n    desc: ${CATALOGUE_TEST_UNSET_DESC}\n";
        let err = ConfigLoader::new()
            .load_from_str(yaml, FileFormat::Yaml)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }
}
