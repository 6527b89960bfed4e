//! Build command: assemble the catalogue and hand it to a host

use crate::{
    error::{CliError, CliResult},
    utils::{load_catalogue, print_diagnostics, ColoredOutput},
};
use catalogue_registry::RecordingHost;
use serde_json::json;
use std::path::Path;
use tracing::info;

pub struct BuildCommand;

impl BuildCommand {
    pub fn run(manifest: &Path, dump: bool) -> CliResult<()> {
        let catalogue = load_catalogue(manifest)?;
        let mut host = RecordingHost::new();
        let summary = catalogue.register_apps(&mut host)?;
        info!(apps = summary.apps, actions = summary.actions, "catalogue registered");

        print_diagnostics(catalogue.diagnostics());

        if dump {
            let out = json!({ "apps": host.apps, "actions": host.actions });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }

        let errors = catalogue.diagnostics().errors().count();
        let warnings = catalogue.diagnostics().warnings().count();
        let line = format!(
            "Registered {} app(s) and {} action(s) ({} warning(s), {} error(s))",
            summary.apps, summary.actions, warnings, errors
        );
        if errors > 0 {
            eprintln!("{}", ColoredOutput::warning(&line));
            return Err(CliError::BuildFailed(errors));
        }
        eprintln!("{}", ColoredOutput::success(&line));
        Ok(())
    }
}
