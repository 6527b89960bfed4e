//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalogue", about = "Build and inspect the actions catalogue", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Catalogue manifest
    #[arg(
        long,
        global = true,
        env = "CATALOGUE_MANIFEST",
        default_value = "./catalogue.yaml",
        help = "Path to the catalogue manifest (YAML or JSON)"
    )]
    pub manifest: PathBuf,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the catalogue, register it with a recording host and report diagnostics
    Build {
        #[arg(long, help = "Print the registered apps and actions as JSON")]
        dump: bool,
    },

    /// List apps or actions
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Show one app, or one action of an app
    Show {
        #[arg(help = "App name")]
        app: String,

        #[arg(help = "Action name")]
        action: Option<String>,

        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },

    /// Preview the actions a swagger document would produce
    Swagger {
        #[arg(help = "Swagger 2.0 document (JSON or YAML)")]
        file: PathBuf,

        #[arg(long = "allow", help = "Only include this path template (repeatable)")]
        allow: Vec<String>,

        #[arg(long, value_enum, default_value = "table", help = "Output format")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List apps
    Apps {
        #[arg(long, value_enum, default_value = "table", help = "Output format")]
        format: OutputFormat,
    },

    /// List actions
    Actions {
        #[arg(short, long, help = "Only actions of this app")]
        app: Option<String>,

        #[arg(long, value_enum, default_value = "table", help = "Output format")]
        format: OutputFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// Pretty-printed JSON
    Pretty,
    /// Compact JSON
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Format a JSON value according to the output format
    pub fn format_json(&self, value: &JsonValue) -> Result<String, serde_json::Error> {
        match self {
            // tables are rendered by the commands themselves
            Self::Table | Self::Pretty => serde_json::to_string_pretty(value),
            Self::Json => serde_json::to_string(value),
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| {
                serde_json::Error::io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("YAML serialization error: {}", e),
                ))
            }),
        }
    }
}
