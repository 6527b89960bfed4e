//! Show command: one app with its actions, or a single action

use crate::{cli::OutputFormat, error::CliResult, utils::load_catalogue};
use serde_json::{json, Value as JsonValue};
use std::path::Path;

pub struct ShowCommand;

impl ShowCommand {
    pub fn run(
        manifest: &Path,
        app: &str,
        action: Option<&str>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let catalogue = load_catalogue(manifest)?;
        let value = match action {
            Some(action) => serde_json::to_value(catalogue.action(app, action)?)?,
            None => {
                let entry = catalogue.entry(app)?;
                let actions: Vec<JsonValue> =
                    entry.actions.values().map(serde_json::to_value).collect::<Result<_, _>>()?;
                json!({ "app": entry.app, "actions": actions })
            }
        };
        println!("{}", format.format_json(&value)?);
        Ok(())
    }
}
