//! Seam between app sources and the registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::Diagnostics;
use crate::error::CoreError;
use crate::normalize::{Normalizer, DEFAULT_LOCALE};
use crate::types::{Action, App};

/// What happens when two sources define the same app, or one app defines the same action twice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Last writer wins; reported as a warning
    #[default]
    Overwrite,
    /// First writer wins; the duplicate is dropped and reported as an error
    Reject,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Overwrite => f.write_str("overwrite"),
            CollisionPolicy::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "reject" => Ok(CollisionPolicy::Reject),
            other => Err(CoreError::Invalid(format!("unknown collision policy '{other}'"))),
        }
    }
}

/// Settings shared by every provider during one catalogue build
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub normalizer: Normalizer,
    pub policy: CollisionPolicy,
}

impl BuildContext {
    pub fn new(normalizer: Normalizer, policy: CollisionPolicy) -> Self {
        Self { normalizer, policy }
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(Normalizer::new(DEFAULT_LOCALE), CollisionPolicy::default())
    }
}

/// An app together with the actions it owns
#[derive(Debug, Clone, PartialEq)]
pub struct AppWithActions {
    pub app: App,
    pub actions: Vec<Action>,
}

impl AppWithActions {
    pub fn new(app: App) -> Self {
        Self {
            app,
            actions: Vec::new(),
        }
    }

    pub fn with_actions(app: App, actions: Vec<Action>) -> Self {
        Self { app, actions }
    }
}

/// A source of apps for the catalogue
///
/// Providers never fail as a whole: items that cannot be built are skipped
/// and reported through `diagnostics`.
pub trait AppProvider: Send + Sync {
    fn name(&self) -> &str;

    fn provide(&self, ctx: &BuildContext, diagnostics: &mut Diagnostics) -> Vec<AppWithActions>;
}

/// Provider over a fixed list of already built apps
pub struct StaticProvider {
    name: String,
    apps: Vec<AppWithActions>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, apps: Vec<AppWithActions>) -> Self {
        Self {
            name: name.into(),
            apps,
        }
    }
}

impl AppProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, _ctx: &BuildContext, _diagnostics: &mut Diagnostics) -> Vec<AppWithActions> {
        self.apps.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_policy_parsing() {
        assert_eq!("Reject".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::Reject);
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Overwrite);
        assert!("merge".parse::<CollisionPolicy>().is_err());
    }

    #[test]
    fn test_static_provider_returns_apps() {
        let provider =
            StaticProvider::new("fixed", vec![AppWithActions::new(App::new("Demo", "Demo"))]);
        let mut diagnostics = Diagnostics::new();
        let apps = provider.provide(&BuildContext::default(), &mut diagnostics);
        assert_eq!(apps.len(), 1);
        assert!(diagnostics.is_empty());
    }
}
