//! Cutsplit CLI - Prepress Print/Cut Separation
//!
//! Command-line interface for the cutsplit library.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use cutsplit::cli::{commands, Cli, Commands};
use cutsplit::CutsplitError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Cutsplit v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if let Some(hint) = err
                .downcast_ref::<CutsplitError>()
                .and_then(CutsplitError::recovery_suggestion)
            {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Some(Commands::Split {
            files,
            print_dir,
            cut_dir,
        }) => commands::split(&files, &config, print_dir.as_deref(), cut_dir.as_deref())
            .context("split failed"),
        Some(Commands::Tile {
            file,
            page,
            margins,
            gap,
            output,
        }) => commands::tile(
            &file,
            &config.tile,
            page,
            margins.as_deref(),
            gap,
            &output,
        )
        .with_context(|| format!("tiling {} failed", file.display())),
        Some(Commands::Measure { file }) => {
            commands::measure(&file).with_context(|| format!("measuring {}", file.display()))
        }
        Some(Commands::Names { files }) => {
            commands::names(&files, &config).context("name preview failed")
        }
        None => {
            println!("Cutsplit v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}
