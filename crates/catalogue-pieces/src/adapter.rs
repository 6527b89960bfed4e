//! Maps pieces onto catalogue apps and actions.

use catalogue_core::{
    normalize_app_name, normalize_name, Action, ActionContext, ActionFunction, ActionOption,
    AllowedValuesResolver, App, AppWithActions, CoreResult, Deferred, DependentOptionsResolver,
    Diagnostic, Diagnostics, FieldDescription, Normalizer, PrimitiveType, RestConfig,
    OAUTH2_AUTHORIZATION_CODE,
};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{PieceError, PieceResult};
use crate::piece::{OAuth2Auth, Piece, PieceAction, PieceAuth, PieceContext};
use crate::property::{DynamicPropsFetcher, FetchContext, OptionsFetcher, Property, PropertyKind};

pub const DIAGNOSTIC_SOURCE: &str = "pieces";

/// Key pieces use for their info block
const INFO_KEY: &str = "info";

#[derive(Debug, Clone, Default)]
pub struct PieceAdapter {
    normalizer: Normalizer,
}

impl PieceAdapter {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Map one piece and all of its actions; actions that fail to map are reported and skipped
    pub fn map_piece_to_app(
        &self,
        piece_name: &str,
        piece: &dyn Piece,
        diagnostics: &mut Diagnostics,
    ) -> AppWithActions {
        let app_name = normalize_app_name(piece_name);
        let mut app = App::new(app_name.clone(), piece.display_name())
            .with_desc(piece.description(), piece.description());
        if let Some(logo) = piece.logo().filter(|l| !l.is_empty()) {
            app.logo = logo.to_string();
        }
        app.rest = map_auth(piece.auth());
        if matches!(
            piece.auth(),
            PieceAuth::SecretText { .. }
                | PieceAuth::BasicAuth { .. }
                | PieceAuth::CustomAuth { .. }
        ) {
            let err = PieceError::UnsupportedAuth(piece.auth().kind().to_string());
            diagnostics.push(
                Diagnostic::warning(DIAGNOSTIC_SOURCE, err.to_string()).app(app_name.clone()),
            );
        }

        let mut actions = Vec::with_capacity(piece.actions().len());
        for (action_name, action) in piece.actions() {
            match self.map_piece_action_to_app_action(&app_name, action_name, Arc::clone(action)) {
                Ok(mapped) => actions.push(mapped),
                Err(e) => diagnostics.push(
                    Diagnostic::error(DIAGNOSTIC_SOURCE, e.to_string())
                        .app(app_name.clone())
                        .action(normalize_name(action_name)),
                ),
            }
        }
        info!(app = %app_name, piece = piece_name, actions = actions.len(), "mapped piece");
        AppWithActions::with_actions(app, actions)
    }

    pub fn map_piece_action_to_app_action(
        &self,
        app_name: &str,
        action_name: &str,
        action: Arc<dyn PieceAction>,
    ) -> PieceResult<Action> {
        let name = normalize_name(action_name);
        let normalizer = self.normalizer.scoped(app_name).scoped(&name);

        let props = action.props();
        let mut options = IndexMap::new();
        for (key, prop) in props {
            if key == INFO_KEY || prop.is_display_only() || prop.is_dynamic() {
                debug!(
                    action = %name,
                    prop = %key,
                    kind = prop.kind.name(),
                    "prop not exposed as an option"
                );
                continue;
            }
            let dependents = dependent_fetchers(key, props);
            let option = property_option(&normalizer, key, prop, dependents)
                .map_err(|source| PieceError::Property {
                    property: key.clone(),
                    source,
                })?;
            options.insert(key.clone(), option);
        }

        let response_type = match action.response_type() {
            Some(description) => Some(
                normalizer
                    .normalize_type(description)
                    .map_err(PieceError::ResponseType)?,
            ),
            None => None,
        };

        let run_target = Arc::clone(&action);
        let api_function = ActionFunction::new(move |input, call_options, ctx: ActionContext| {
            let action = Arc::clone(&run_target);
            async move { action.run(PieceContext::from_action(input, call_options, &ctx)).await }
        });

        let description = non_empty(action.description()).unwrap_or(action.display_name());
        let mut mapped = Action::function(app_name, name, api_function)
            .with_labels(Some(action.display_name()), Some(description), Some(description))
            .with_options(options);
        mapped.response_type = response_type;
        Ok(mapped)
    }
}

fn map_auth(auth: &PieceAuth) -> Option<RestConfig> {
    match auth {
        PieceAuth::OAuth2(oauth) => Some(oauth2_rest(oauth)),
        _ => None,
    }
}

fn oauth2_rest(oauth: &OAuth2Auth) -> RestConfig {
    let mut rest = RestConfig::new(oauth.url.clone());
    rest.oauth2_grant_type = Some(OAUTH2_AUTHORIZATION_CODE.to_string());
    rest.oauth2_auth_url = Some(oauth.auth_url.clone());
    rest.oauth2_token_url = Some(oauth.token_url.clone());
    rest.oauth2_scopes = oauth.scope.clone();
    rest.oauth2_auth_args = oauth.extra.clone();
    rest.oauth2_token_use_basic_auth = oauth.token_use_basic_auth;
    rest.ping_method = oauth.ping_method;
    rest.ping_path = oauth.ping_path.clone();
    rest
}

/// Fetchers of the dynamic props that list `key` among their refreshers
fn dependent_fetchers(key: &str, props: &IndexMap<String, Property>) -> Vec<DynamicPropsFetcher> {
    props
        .values()
        .filter(|p| p.refreshers.iter().any(|r| r == key))
        .filter_map(|p| match &p.kind {
            PropertyKind::Dynamic(fetcher) => Some(fetcher.clone()),
            _ => None,
        })
        .collect()
}

fn property_option(
    normalizer: &Normalizer,
    key: &str,
    prop: &Property,
    dependents: Vec<DynamicPropsFetcher>,
) -> CoreResult<ActionOption> {
    let description = prop.description.as_deref().and_then(non_empty).unwrap_or(&prop.display_name);
    let mut field = FieldDescription::new(PrimitiveType::new(prop.kind.base_type()).to_string())
        .short_desc(description)
        .desc(description)
        .required(prop.required)
        .depends_on(prop.refreshers.iter().cloned());
    if !prop.display_name.is_empty() {
        field = field.display_name(prop.display_name.clone());
    }
    if let Some(default_value) = &prop.default_value {
        field = field.default_value(default_value.clone()).example_value(default_value.clone());
    }
    match &prop.kind {
        PropertyKind::StaticDropdown(options) => {
            field = field.allowed_values(options.iter().map(|o| o.to_allowed_value()).collect());
        }
        PropertyKind::Dropdown(fetcher) => {
            field = field.get_allowed_values(allowed_values_resolver(fetcher.clone()));
        }
        _ => {}
    }
    if !dependents.is_empty() {
        let resolver = dependent_options_resolver(normalizer.clone(), dependents);
        field = field.get_dependent_options(resolver);
    }
    normalizer.normalize_field(key, &field)
}

fn allowed_values_resolver(fetcher: OptionsFetcher) -> AllowedValuesResolver {
    Deferred::new(move |ctx: ActionContext| {
        let fetcher = fetcher.clone();
        async move {
            let state = fetcher.fetch(FetchContext::from_action(&ctx)).await?;
            Ok(state.options.iter().map(|o| o.to_allowed_value()).collect())
        }
    })
}

/// All fetchers for one refresher merged into a single resolver; later keys overwrite earlier ones
fn dependent_options_resolver(
    normalizer: Normalizer,
    fetchers: Vec<DynamicPropsFetcher>,
) -> DependentOptionsResolver {
    Deferred::new(move |ctx: ActionContext| {
        let fetchers = fetchers.clone();
        let normalizer = normalizer.clone();
        async move {
            let fetch_ctx = FetchContext::from_action(&ctx);
            let mut options = IndexMap::new();
            for fetcher in &fetchers {
                for (key, prop) in fetcher.fetch(fetch_ctx.clone()).await? {
                    if prop.is_display_only() || prop.is_dynamic() {
                        continue;
                    }
                    let option = property_option(&normalizer, &key, &prop, Vec::new())?;
                    options.insert(key, option);
                }
            }
            Ok(options)
        }
    })
}

fn non_empty(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Convenience wrapper around [`PieceAdapter::map_piece_to_app`] with the default normalizer
pub fn map_piece_to_app(
    piece_name: &str,
    piece: &dyn Piece,
    diagnostics: &mut Diagnostics,
) -> AppWithActions {
    PieceAdapter::default().map_piece_to_app(piece_name, piece, diagnostics)
}

/// Convenience wrapper around [`PieceAdapter::map_piece_action_to_app_action`]
pub fn map_piece_action_to_app_action(
    app_name: &str,
    action_name: &str,
    action: Arc<dyn PieceAction>,
) -> PieceResult<Action> {
    PieceAdapter::default().map_piece_action_to_app_action(app_name, action_name, action)
}
