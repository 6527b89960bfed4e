//! Utility functions for the CLI

use crate::error::{CliError, CliResult};
use catalogue_config::DeclaredAppsProvider;
use catalogue_core::{Diagnostic, Diagnostics, Severity};
use catalogue_registry::{Catalogue, CatalogueBuilder};
use colored::{ColoredString, Colorize};
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize tracing; `RUST_LOG` wins over the verbosity flag
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }

    pub fn info(msg: &str) -> ColoredString {
        msg.blue()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn validate_file_exists(path: &Path) -> CliResult<()> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// Build the catalogue declared by a manifest file
pub fn load_catalogue(manifest: &Path) -> CliResult<Catalogue> {
    validate_file_exists(manifest)?;
    let provider = DeclaredAppsProvider::from_file(manifest)?;
    let ctx = provider.build_context();
    debug!(manifest = %manifest.display(), policy = %ctx.policy, "building catalogue");
    Ok(CatalogueBuilder::new()
        .with_policy(ctx.policy)
        .with_normalizer(ctx.normalizer)
        .provider(provider)
        .build())
}

pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        Severity::Error => ColoredOutput::error("error"),
        Severity::Warning => ColoredOutput::warning("warning"),
    };
    let location = match (&diagnostic.app, &diagnostic.action) {
        (Some(app), Some(action)) => format!(" {app}.{action}"),
        (Some(app), None) => format!(" {app}"),
        _ => String::new(),
    };
    eprintln!(
        "{} {}{}: {}",
        label,
        ColoredOutput::dim(&format!("[{}]", diagnostic.source)),
        location,
        diagnostic.message
    );
}

pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        print_diagnostic(diagnostic);
    }
}
