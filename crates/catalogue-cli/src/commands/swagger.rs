//! Swagger command: preview derived actions without a manifest

use crate::{
    cli::OutputFormat,
    error::CliResult,
    utils::{print_diagnostics, truncate_text, validate_file_exists, ColoredOutput},
};
use catalogue_core::Diagnostics;
use catalogue_swagger::{ActionDescriptor, SwaggerActionBuilder, SwaggerDocument};
use std::path::Path;

pub struct SwaggerCommand;

impl SwaggerCommand {
    pub fn run(file: &Path, allow: &[String], format: OutputFormat) -> CliResult<()> {
        validate_file_exists(file)?;
        let document = SwaggerDocument::from_path(file)?;
        let outcome = SwaggerActionBuilder::new(&document)
            .with_allowed_paths(allow.iter().cloned())
            .build();

        let label = if document.info.title.is_empty() {
            file.file_stem().and_then(|s| s.to_str()).unwrap_or("swagger").to_string()
        } else {
            document.info.title.clone()
        };
        let mut diagnostics = Diagnostics::new();
        outcome.report(&label, &mut diagnostics);
        print_diagnostics(&diagnostics);

        match format {
            OutputFormat::Table => Self::display_table(&outcome.actions),
            _ => println!("{}", format.format_json(&serde_json::to_value(&outcome)?)?),
        }
        Ok(())
    }

    fn display_table(actions: &[ActionDescriptor]) {
        if actions.is_empty() {
            println!("{}", ColoredOutput::info("No operations matched"));
            return;
        }

        println!("{}", ColoredOutput::success(&format!("Derived {} action(s):", actions.len())));
        println!();
        println!(
            "{:<32} {:<8} {:<36} {:<8} {:<12}",
            ColoredOutput::highlight("Action"),
            ColoredOutput::highlight("Method"),
            ColoredOutput::highlight("Path"),
            ColoredOutput::highlight("Options"),
            ColoredOutput::highlight("Response")
        );
        println!("{}", "-".repeat(100));

        for action in actions {
            let response = action
                .response_type
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".into());
            let name = if action.deprecated {
                ColoredOutput::dim(&truncate_text(&action.name, 32)).to_string()
            } else {
                truncate_text(&action.name, 32)
            };
            println!(
                "{:<32} {:<8} {:<36} {:<8} {:<12}",
                name,
                action.method.as_str(),
                truncate_text(&action.path, 36),
                action.options.len(),
                truncate_text(&response, 12)
            );
        }
    }
}
