//! Catalogue CLI entry point

use catalogue_cli::{
    cli::{Cli, Commands},
    commands::{BuildCommand, ListCommand, ShowCommand, SwaggerCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use clap::Parser;
use tracing::debug;

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("catalogue CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Build { dump } => BuildCommand::run(&cli.manifest, dump),
        Commands::List { resource } => ListCommand::run(&cli.manifest, resource),
        Commands::Show {
            app,
            action,
            format,
        } => ShowCommand::run(&cli.manifest, &app, action.as_deref(), format),
        Commands::Swagger {
            file,
            allow,
            format,
        } => SwaggerCommand::run(&file, &allow, format),
    }
}
