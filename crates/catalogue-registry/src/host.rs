//! Registration calls exposed by the host engine.

use catalogue_core::{Action, App};

/// The two calls the host offers for populating its catalogue
pub trait HostApi {
    fn register_app(&mut self, app: &App) -> anyhow::Result<()>;

    fn register_action(&mut self, action: &Action) -> anyhow::Result<()>;
}

/// Host that records every registration in call order
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    pub apps: Vec<App>,
    pub actions: Vec<Action>,
    /// `app:<name>` / `action:<app>.<action>` in call order
    pub calls: Vec<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostApi for RecordingHost {
    fn register_app(&mut self, app: &App) -> anyhow::Result<()> {
        self.calls.push(format!("app:{}", app.name));
        self.apps.push(app.clone());
        Ok(())
    }

    fn register_action(&mut self, action: &Action) -> anyhow::Result<()> {
        self.calls.push(format!("action:{}", action.qualified_name()));
        self.actions.push(action.clone());
        Ok(())
    }
}
