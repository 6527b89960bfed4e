//! The aggregated catalogue and the builder that assembles it.

use catalogue_core::{
    Action, ActionContext, ActionOption, AllowedValue, App, AppProvider, AppWithActions,
    BuildContext, CollisionPolicy, Diagnostic, Diagnostics, JsonMap, Normalizer,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::host::HostApi;

const DIAGNOSTIC_SOURCE: &str = "registry";

/// One app and its actions, keyed by action name
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    pub app: App,
    pub actions: IndexMap<String, Action>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    pub apps: usize,
    pub actions: usize,
}

/// Collects apps from providers in registration order
pub struct CatalogueBuilder {
    providers: Vec<Box<dyn AppProvider>>,
    policy: CollisionPolicy,
    normalizer: Normalizer,
}

impl Default for CatalogueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogueBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            policy: CollisionPolicy::default(),
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn provider(mut self, provider: impl AppProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn add_provider(&mut self, provider: Box<dyn AppProvider>) {
        self.providers.push(provider);
    }

    pub fn build(self) -> Catalogue {
        let ctx = BuildContext::new(self.normalizer, self.policy);
        let mut catalogue = Catalogue {
            entries: IndexMap::new(),
            diagnostics: Diagnostics::new(),
            policy: self.policy,
        };

        for provider in &self.providers {
            let mut diagnostics = Diagnostics::new();
            let apps = provider.provide(&ctx, &mut diagnostics);
            info!(provider = provider.name(), apps = apps.len(), "collected apps from provider");
            catalogue.diagnostics.extend(diagnostics);
            for app in apps {
                catalogue.insert(provider.name(), app);
            }
        }

        info!(
            apps = catalogue.len(),
            actions = catalogue.action_count(),
            errors = catalogue.diagnostics.errors().count(),
            "catalogue built"
        );
        catalogue
    }
}

/// Flat app/action namespace handed to the host; read-only once built
#[derive(Debug, Clone)]
pub struct Catalogue {
    entries: IndexMap<String, CatalogueEntry>,
    diagnostics: Diagnostics,
    policy: CollisionPolicy,
}

impl Catalogue {
    pub fn builder() -> CatalogueBuilder {
        CatalogueBuilder::new()
    }

    fn insert(&mut self, provider: &str, source: AppWithActions) {
        let AppWithActions {
            app,
            actions: source_actions,
        } = source;

        if self.entries.contains_key(&app.name) {
            match self.policy {
                CollisionPolicy::Overwrite => {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            DIAGNOSTIC_SOURCE,
                            format!(
                                "app redefined by provider '{provider}', later definition wins"
                            ),
                        )
                        .app(app.name.clone()),
                    );
                }
                CollisionPolicy::Reject => {
                    self.diagnostics.push(
                        Diagnostic::error(
                            DIAGNOSTIC_SOURCE,
                            format!("app redefined by provider '{provider}', definition dropped"),
                        )
                        .app(app.name.clone()),
                    );
                    return;
                }
            }
        }

        let mut actions: IndexMap<String, Action> = IndexMap::with_capacity(source_actions.len());
        for mut action in source_actions {
            if action.app != app.name {
                self.diagnostics.push(
                    Diagnostic::warning(
                        DIAGNOSTIC_SOURCE,
                        format!(
                            "action declared for app '{}', moved to its owning app",
                            action.app
                        ),
                    )
                    .app(app.name.clone())
                    .action(action.action.clone()),
                );
                action.app = app.name.clone();
            }
            if actions.contains_key(&action.action) {
                let diagnostic = match self.policy {
                    CollisionPolicy::Overwrite => Diagnostic::warning(
                        DIAGNOSTIC_SOURCE,
                        "duplicate action, later definition wins",
                    ),
                    CollisionPolicy::Reject => {
                        Diagnostic::error(DIAGNOSTIC_SOURCE, "duplicate action, definition dropped")
                    }
                };
                self.diagnostics.push(
                    diagnostic
                        .app(app.name.clone())
                        .action(action.action.clone()),
                );
                if self.policy == CollisionPolicy::Reject {
                    continue;
                }
            }
            debug!(app = %app.name, action = %action.action, "catalogued action");
            actions.insert(action.action.clone(), action);
        }

        self.entries.insert(app.name.clone(), CatalogueEntry { app, actions });
    }

    /// Register each app followed by its own actions, in insertion order
    pub fn register_apps(&self, host: &mut dyn HostApi) -> RegistryResult<RegistrationSummary> {
        let mut summary = RegistrationSummary::default();
        for entry in self.entries.values() {
            host.register_app(&entry.app).map_err(|source| RegistryError::Host {
                item: entry.app.name.clone(),
                source,
            })?;
            summary.apps += 1;
            for action in entry.actions.values() {
                host.register_action(action)
                    .map_err(|source| RegistryError::Host {
                        item: action.qualified_name(),
                        source,
                    })?;
                summary.actions += 1;
            }
        }
        info!(apps = summary.apps, actions = summary.actions, "registered catalogue with host");
        Ok(summary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn action_count(&self) -> usize {
        self.entries.values().map(|e| e.actions.len()).sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.entries.values()
    }

    pub fn apps(&self) -> impl Iterator<Item = &App> {
        self.entries.values().map(|e| &e.app)
    }

    pub fn entry(&self, app: &str) -> RegistryResult<&CatalogueEntry> {
        self.entries.get(app).ok_or_else(|| RegistryError::AppNotFound(app.to_string()))
    }

    pub fn app(&self, name: &str) -> RegistryResult<&App> {
        self.entry(name).map(|e| &e.app)
    }

    pub fn actions(&self, app: &str) -> RegistryResult<impl Iterator<Item = &Action>> {
        self.entry(app).map(|e| e.actions.values())
    }

    pub fn action(&self, app: &str, action: &str) -> RegistryResult<&Action> {
        self.entry(app)?
            .actions
            .get(action)
            .ok_or_else(|| RegistryError::action_not_found(app, action))
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn option(&self, app: &str, action: &str, option: &str) -> RegistryResult<&ActionOption> {
        self.action(app, action)?.options.get(option).ok_or_else(|| RegistryError::OptionNotFound {
            app: app.to_string(),
            action: action.to_string(),
            option: option.to_string(),
        })
    }

    /// Allowed values of one option, static and fetched
    pub async fn allowed_values(
        &self,
        app: &str,
        action: &str,
        option: &str,
        ctx: ActionContext,
    ) -> RegistryResult<Vec<AllowedValue>> {
        self.option(app, action, option)?
            .allowed_values_for(ctx)
            .await
            .map_err(RegistryError::Resolver)
    }

    /// Options that appear once `option` has a value
    pub async fn dependent_options(
        &self,
        app: &str,
        action: &str,
        option: &str,
        ctx: ActionContext,
    ) -> RegistryResult<IndexMap<String, ActionOption>> {
        self.option(app, action, option)?
            .dependent_options_for(ctx)
            .await
            .map_err(RegistryError::Resolver)
    }

    /// Connection options contributed by the app once authentication succeeded
    pub async fn post_auth_options(
        &self,
        app: &str,
        ctx: ActionContext,
    ) -> RegistryResult<JsonMap> {
        let resolver = self
            .app(app)?
            .rest_modifiers
            .as_ref()
            .and_then(|m| m.set_options_post_auth.as_ref());
        match resolver {
            Some(resolver) => resolver.resolve(ctx).await.map_err(RegistryError::Resolver),
            None => Ok(JsonMap::new()),
        }
    }

    /// Run a function action
    pub async fn invoke(
        &self,
        app: &str,
        action: &str,
        input: JsonMap,
        options: JsonMap,
        ctx: ActionContext,
    ) -> RegistryResult<JsonValue> {
        let found = self.action(app, action)?;
        let function = found
            .function_ref()
            .ok_or_else(|| RegistryError::NotInvocable(found.qualified_name()))?;
        function.call(input, options, ctx).await.map_err(RegistryError::Resolver)
    }

    pub fn stats(&self) -> HashMap<String, JsonValue> {
        let swagger_actions = self
            .entries
            .values()
            .flat_map(|e| e.actions.values())
            .filter(|a| a.is_swagger())
            .count();
        let function_actions = self.action_count() - swagger_actions;
        let mut stats = HashMap::new();
        stats.insert("apps".to_string(), JsonValue::from(self.len()));
        stats.insert("actions".to_string(), JsonValue::from(self.action_count()));
        stats.insert("swagger_actions".to_string(), JsonValue::from(swagger_actions));
        stats.insert("function_actions".to_string(), JsonValue::from(function_actions));
        stats.insert("errors".to_string(), JsonValue::from(self.diagnostics.errors().count()));
        stats.insert("warnings".to_string(), JsonValue::from(self.diagnostics.warnings().count()));
        stats
    }
}
