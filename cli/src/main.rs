use anyhow::Result;
use clap::Parser;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod tools;
mod ui;

use cli::{Cli, Commands, HelmCommands};

/// Initialize logging.
///
/// Stdout is reserved for command output, so diagnostics go to stderr with
/// `--verbose` and are discarded otherwise. `LOGGING`/`LOG_LEVEL` override
/// the level (e.g. `LOGGING=debug`).
fn init_logging(verbose: bool) {
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    let writer = if verbose {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::sink)
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Helm { command } => match command {
            HelmCommands::GetServiceValues(args) => {
                commands::helm::get_service_values(args).await?;
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
