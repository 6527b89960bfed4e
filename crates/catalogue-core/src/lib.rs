//! Core model of the actions catalogue: apps, actions, normalized options and
//! the provider seam every app source plugs into.

pub mod description;
pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod normalize;
pub mod option;
pub mod provider;
pub mod resolver;
pub mod types;

pub use description::{FieldDescription, TypeDescription};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, CoreResult};
pub use naming::{humanize, normalize_app_name, normalize_name};
pub use normalize::{Normalizer, StaticTranslator, Translator, DEFAULT_LOCALE};
pub use option::{ActionOption, AllowedValue, BaseType, OptionType, PrimitiveType};
pub use provider::{AppProvider, AppWithActions, BuildContext, CollisionPolicy, StaticProvider};
pub use resolver::{
    ActionContext, ActionFunction, AllowedValuesResolver, Deferred, DependentOptionsResolver,
    JsonMap, PostAuthResolver,
};
pub use types::{
    Action, ActionKind, App, ConnectionOption, HttpMethod, RestConfig, RestModifiers, SwaggerPath,
    SwaggerReference, ACTION_CODE_API, DEFAULT_LOGO, DEFAULT_LOGO_MIME_TYPE,
    OAUTH2_AUTHORIZATION_CODE,
};
