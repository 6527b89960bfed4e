//! Turns manifest declarations into catalogue apps.

use catalogue_core::{
    Action, App, AppProvider, AppWithActions, BuildContext, Diagnostic, Diagnostics, Normalizer,
    DEFAULT_LOGO, DEFAULT_LOGO_MIME_TYPE,
};
use catalogue_swagger::{swagger_app, ActionDescriptor, SwaggerActionBuilder, SwaggerDocument};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigResult;
use crate::loader::{ConfigLoader, LoadedManifest};
use crate::manifest::{ActionDeclaration, AppDeclaration, CatalogueManifest};

pub const DIAGNOSTIC_SOURCE: &str = "manifest";

/// App provider backed by a loaded manifest
#[derive(Debug, Clone)]
pub struct DeclaredAppsProvider {
    manifest: CatalogueManifest,
    base_dir: PathBuf,
}

impl DeclaredAppsProvider {
    pub fn new(manifest: CatalogueManifest, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            base_dir: base_dir.into(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        Ok(ConfigLoader::new().load_from_file(path)?.into())
    }

    pub fn manifest(&self) -> &CatalogueManifest {
        &self.manifest
    }

    /// Build settings declared by the manifest
    pub fn build_context(&self) -> BuildContext {
        BuildContext::new(
            Normalizer::new(self.manifest.locale.clone()),
            self.manifest.collision_policy,
        )
    }

    fn provide_app(
        &self,
        decl: &AppDeclaration,
        ctx: &BuildContext,
        diagnostics: &mut Diagnostics,
    ) -> Option<AppWithActions> {
        let app = with_defaults(decl.app.clone());
        check_rest(&app, diagnostics);

        let Some(swagger) = app.swagger.clone() else {
            debug!(app = %app.name, "app declared without swagger document");
            return Some(AppWithActions::new(app));
        };

        let file = self.base_dir.join(&swagger.file);
        let document = match SwaggerDocument::from_path(&file) {
            Ok(document) => document,
            Err(e) => {
                let message = format!("cannot load {}: {e}", file.display());
                diagnostics.push(
                    Diagnostic::error(DIAGNOSTIC_SOURCE, message).app(app.name.clone()),
                );
                return None;
            }
        };

        if decl.actions.is_empty() {
            return Some(swagger_app(app, &document, &swagger.allowed_paths, ctx, diagnostics));
        }

        let builder = SwaggerActionBuilder::new(&document)
            .with_policy(ctx.policy)
            .with_normalizer(ctx.normalizer.scoped(&app.name));
        let mut actions = Vec::with_capacity(decl.actions.len());
        for declared in &decl.actions {
            let path = &declared.swagger_path;
            match builder.build_operation(&path.path, path.method) {
                Ok(descriptor) => {
                    descriptor.report(&app.name, diagnostics);
                    actions.push(declared_action(&app.name, declared, descriptor));
                }
                Err(e) => diagnostics.push(
                    Diagnostic::error(DIAGNOSTIC_SOURCE, e.to_string())
                        .app(app.name.clone())
                        .action(declared.action.clone()),
                ),
            }
        }
        info!(app = %app.name, actions = actions.len(), "built declared actions");
        Some(AppWithActions::with_actions(app, actions))
    }
}

impl From<LoadedManifest> for DeclaredAppsProvider {
    fn from(loaded: LoadedManifest) -> Self {
        Self::new(loaded.manifest, loaded.base_dir)
    }
}

impl AppProvider for DeclaredAppsProvider {
    fn name(&self) -> &str {
        DIAGNOSTIC_SOURCE
    }

    fn provide(&self, ctx: &BuildContext, diagnostics: &mut Diagnostics) -> Vec<AppWithActions> {
        self.manifest
            .apps
            .iter()
            .filter_map(|decl| self.provide_app(decl, ctx, diagnostics))
            .collect()
    }
}

fn with_defaults(mut app: App) -> App {
    if app.display_name.trim().is_empty() {
        app.display_name = app.name.clone();
    }
    if app.short_desc.trim().is_empty() {
        app.short_desc = app.display_name.clone();
    }
    if app.desc.trim().is_empty() {
        app.desc = app.short_desc.clone();
    }
    if app.logo.is_empty() {
        app.logo = DEFAULT_LOGO.to_string();
        app.logo_mime_type = DEFAULT_LOGO_MIME_TYPE.to_string();
    }
    if app.logo_file_name.is_empty() {
        app.logo_file_name = format!("{}.svg", app.name);
    }
    if app.logo_mime_type.is_empty() {
        app.logo_mime_type = DEFAULT_LOGO_MIME_TYPE.to_string();
    }
    app
}

fn check_rest(app: &App, diagnostics: &mut Diagnostics) {
    let Some(modifiers) = &app.rest_modifiers else {
        return;
    };
    let placeholders = app
        .rest
        .as_ref()
        .map(|rest| rest.url_placeholders())
        .unwrap_or_default();
    for name in &modifiers.url_template_options {
        if !placeholders.contains(name) {
            let message = format!("url template option '{name}' is not used in rest.url");
            diagnostics.push(Diagnostic::warning(DIAGNOSTIC_SOURCE, message).app(app.name.clone()));
        }
    }
    for name in &modifiers.required_options {
        if !modifiers.options.contains_key(name) {
            let message = format!("required option '{name}' is not declared");
            diagnostics.push(Diagnostic::warning(DIAGNOSTIC_SOURCE, message).app(app.name.clone()));
        }
    }
}

fn declared_action(
    app: &str,
    declared: &ActionDeclaration,
    descriptor: ActionDescriptor,
) -> Action {
    let summary = descriptor.summary.as_deref();
    let mut action = Action::swagger(app, declared.action.clone(), descriptor.swagger_path())
        .with_labels(
            declared.display_name.as_deref().or(summary),
            declared.short_desc.as_deref().or(summary),
            declared.desc.as_deref().or(descriptor.description.as_deref()),
        )
        .with_options(descriptor.options);
    action.response_type = descriptor.response_type;
    if let Some(secs) = declared.io_timeout_secs {
        action = action.with_io_timeout(secs);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue_core::{BaseType, ConnectionOption, PrimitiveType, RestConfig, RestModifiers};

    #[test]
    fn test_with_defaults_fills_labels_and_logo() {
        let app = with_defaults(App::new("Demo", ""));
        assert_eq!(app.display_name, "Demo");
        assert_eq!(app.desc, "Demo");
        assert_eq!(app.logo, DEFAULT_LOGO);
        assert_eq!(app.logo_file_name, "Demo.svg");
    }

    #[test]
    fn test_rest_checks_report_warnings() {
        let mut modifiers = RestModifiers::default();
        modifiers.url_template_options = vec!["subdomain".into(), "region".into()];
        modifiers.required_options = vec!["subdomain".into(), "api_key".into()];
        modifiers.options.insert(
            "subdomain".into(),
            ConnectionOption {
                display_name: "Subdomain".into(),
                short_desc: String::new(),
                desc: String::new(),
                option_type: PrimitiveType::new(BaseType::String),
                default_value: None,
            },
        );
        let app = App::new("Zendesk", "Zendesk")
            .with_rest(RestConfig::new("https://{{subdomain}}.zendesk.com/api/v2"))
            .with_rest_modifiers(modifiers);

        let mut diagnostics = Diagnostics::new();
        check_rest(&app, &mut diagnostics);
        let messages: Vec<_> = diagnostics.warnings().map(|d| d.message.clone()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("region"));
        assert!(messages[1].contains("api_key"));
    }

    #[test]
    fn test_missing_swagger_file_skips_app() {
        let yaml = "apps:\n  - name: Ghost\n    swagger:\n      file: missing.json\n";
        let manifest: CatalogueManifest = serde_yaml::from_str(yaml).unwrap();
        let provider = DeclaredAppsProvider::new(manifest, std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        let apps = provider.provide(&provider.build_context(), &mut diagnostics);
        assert!(apps.is_empty());
        assert!(diagnostics.has_errors());
    }
}
