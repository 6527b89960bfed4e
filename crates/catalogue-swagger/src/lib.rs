//! Swagger action builder: derives catalogue actions from OpenAPI v2 documents.

pub mod builder;
pub mod document;
pub mod error;
pub mod resolver;
pub mod schema;

pub use builder::{
    build_actions, ActionDescriptor, BuildOutcome, SkippedOperation, SwaggerActionBuilder,
};
pub use document::{
    Info, Operation, Parameter, ParameterLocation, ParameterOrRef, PathItem, Response,
    ResponseOrRef, Schema, SwaggerDocument,
};
pub use error::{SwaggerError, SwaggerResult};
pub use resolver::RefResolver;
pub use schema::SchemaConverter;

use catalogue_core::{App, AppWithActions, BuildContext, Diagnostics};
use tracing::info;

/// Attach every allowed operation of `document` to `app` as swagger actions
pub fn swagger_app(
    app: App,
    document: &SwaggerDocument,
    allowed_paths: &[String],
    ctx: &BuildContext,
    diagnostics: &mut Diagnostics,
) -> AppWithActions {
    let outcome = SwaggerActionBuilder::new(document)
        .with_allowed_paths(allowed_paths.iter().cloned())
        .with_policy(ctx.policy)
        .with_normalizer(ctx.normalizer.scoped(&app.name))
        .build();
    outcome.report(&app.name, diagnostics);
    info!(
        app = %app.name,
        actions = outcome.actions.len(),
        skipped = outcome.skipped.len(),
        "built swagger actions"
    );
    let actions = outcome.into_actions(&app.name);
    AppWithActions::with_actions(app, actions)
}
