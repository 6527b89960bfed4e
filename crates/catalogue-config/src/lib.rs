//! Manifest-driven app declarations for the actions catalogue.
//!
//! A manifest lists swagger-backed apps with their connection settings.
//! `${VAR}` references are resolved from the environment before the manifest
//! is deserialized, and [`DeclaredAppsProvider`] turns the result into apps.

pub mod env_resolver;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod provider;

pub use env_resolver::{EnvResolver, EnvResolverError};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, FileFormat, LoadedManifest, AUTO_CLIENT_SECRET};
pub use manifest::{ActionDeclaration, AppDeclaration, CatalogueManifest};
pub use provider::DeclaredAppsProvider;
