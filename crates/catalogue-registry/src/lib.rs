//! Catalogue registry: aggregates apps from providers into one namespace and
//! hands it to the host through `register_app` / `register_action`.

pub mod catalogue;
pub mod error;
pub mod host;

pub use catalogue::{Catalogue, CatalogueBuilder, CatalogueEntry, RegistrationSummary};
pub use error::{RegistryError, RegistryResult};
pub use host::{HostApi, RecordingHost};
