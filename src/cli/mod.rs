//! CLI Module
//!
//! Command-line interface for splitting artwork and tiling sheets.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PageSizeChoice;

/// Cutsplit - print/cut separation and sheet tiling for prepress
#[derive(Parser, Debug)]
#[command(name = "cutsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split artwork into print and cut documents
    #[command(name = "split")]
    Split {
        /// Artwork scene files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Folder for print documents, relative to the current directory
        /// (default: PrintReady next to the artwork)
        #[arg(long)]
        print_dir: Option<PathBuf>,

        /// Folder for cut documents, relative to the current directory
        /// (default: Cut next to the artwork)
        #[arg(long)]
        cut_dir: Option<PathBuf>,
    },

    /// Tile the selected object onto a new sheet
    #[command(name = "tile")]
    Tile {
        /// Artwork scene file with a selection
        file: PathBuf,

        /// Sheet size
        #[arg(long, value_enum)]
        page: Option<PageSizeChoice>,

        /// Margins in mm
        #[arg(long, num_args = 4, value_names = ["LEFT", "RIGHT", "TOP", "BOTTOM"])]
        margins: Option<Vec<f64>>,

        /// Gap between copies in mm
        #[arg(long)]
        gap: Option<f64>,

        /// Where to write the tiled sheet
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Measure the selected object on the artboard
    #[command(name = "measure")]
    Measure {
        /// Artwork scene file with a selection
        file: PathBuf,
    },

    /// Show the names a split would write, without writing
    #[command(name = "names")]
    Names {
        /// Artwork scene files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tile_margins() {
        let cli = Cli::parse_from([
            "cutsplit", "tile", "art.json", "--page", "sra3-plus", "--margins", "5", "5", "10",
            "10", "--output", "sheet.json",
        ]);
        match cli.command {
            Some(Commands::Tile { page, margins, .. }) => {
                assert_eq!(page, Some(PageSizeChoice::Sra3Plus));
                assert_eq!(margins, Some(vec![5.0, 5.0, 10.0, 10.0]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
