//! CLI Command Implementations
//!
//! Each command opens scene files into a fresh in-memory host and runs one
//! operation against it.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::config::{Config, PageSizeChoice, SplitConfig, TileConfig};
use crate::engine::Margins;
use crate::error::{CutsplitError, Result};
use crate::export::{write_atomic, JsonExporter};
use crate::pipeline::{measure_selection, preview_names, split_document, tile_selection};
use crate::scene::{MemoryHost, SceneHost};

/// Load the settings file, or defaults when none was given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading settings: {}", path.display());
            Config::load(path)
        }
        None => Ok(Config::default()),
    }
}

fn open(file: &Path) -> Result<MemoryHost> {
    let mut host = MemoryHost::new();
    host.open(file)?;
    Ok(host)
}

fn artwork_dir(file: &Path) -> &Path {
    file.parent().unwrap_or_else(|| Path::new("."))
}

/// Settings folders resolve next to the artwork; folders given on the
/// command line are taken as-is, relative to the working directory.
fn split_config_for(
    base: &SplitConfig,
    file: &Path,
    print_dir: Option<&Path>,
    cut_dir: Option<&Path>,
) -> SplitConfig {
    let mut config = base.clone().rooted_at(artwork_dir(file));
    if let Some(dir) = print_dir {
        config.print_dir = dir.to_path_buf();
    }
    if let Some(dir) = cut_dir {
        config.cut_dir = dir.to_path_buf();
    }
    config
}

/// Split each artwork file into print and cut documents.
///
/// Files are processed independently; the first failure is returned after
/// all files were tried.
pub fn split(
    files: &[PathBuf],
    config: &Config,
    print_dir: Option<&Path>,
    cut_dir: Option<&Path>,
) -> Result<()> {
    let exporter = JsonExporter::new();
    let mut first_error = None;

    for file in files {
        info!("Splitting: {}", file.display());

        let split_config = split_config_for(&config.split, file, print_dir, cut_dir);

        let result = open(file)
            .and_then(|mut host| split_document(&mut host, &split_config, &exporter));
        match result {
            Ok(report) => {
                println!("{}", report.base_name);
                println!(
                    "  removed {} cut items, kept {} in the cut document",
                    report.partition.removal.removed, report.partition.keep.kept
                );
                for artifact in &report.artifacts {
                    println!(
                        "  {:?}: {} ({} bytes, sha256 {})",
                        artifact.kind,
                        artifact.path.display(),
                        artifact.size_bytes,
                        artifact.sha256.get(..12).unwrap_or(&artifact.sha256)
                    );
                }
                if report.total_failures() > 0 {
                    warn!("{} items were skipped", report.total_failures());
                }
                if !report.partition.flatten.is_complete() {
                    println!(
                        "  {} groups remain in the cut document",
                        report.partition.flatten.remaining
                    );
                }
            }
            Err(e) => {
                error!("{}: {}", file.display(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Tile the selected object of `file` onto a new sheet written to `output`.
pub fn tile(
    file: &Path,
    base: &TileConfig,
    page: Option<PageSizeChoice>,
    margins: Option<&[f64]>,
    gap: Option<f64>,
    output: &Path,
) -> Result<()> {
    let mut config = *base;
    if let Some(page) = page {
        config.page = page;
    }
    if let Some(values) = margins {
        match values {
            [left, right, top, bottom] => {
                config.margins_mm = Margins::new(*left, *right, *top, *bottom);
            }
            _ => {
                return Err(CutsplitError::InvalidConfig {
                    reason: format!("expected 4 margins, got {}", values.len()),
                })
            }
        }
    }
    if let Some(gap) = gap {
        config.gap_mm = gap;
    }

    info!("Tiling selection of: {}", file.display());
    let mut host = open(file)?;
    let report = tile_selection(&mut host, &config)?;

    let sheet = host.snapshot(report.document)?;
    write_atomic(output, &serde_json::to_vec_pretty(&sheet)?)?;

    println!(
        "Placed {} copies ({} rows x {} cols) on {}",
        report.count,
        report.rows,
        report.cols,
        config.page.label()
    );
    println!("Sheet written: {}", output.display());
    Ok(())
}

/// Print the size of the selected object.
pub fn measure(file: &Path) -> Result<()> {
    let host = open(file)?;
    let m = measure_selection(&host)?;
    println!(
        "{:.2} x {:.2} mm ({:.2} x {:.2} pt)",
        m.width_mm, m.height_mm, m.width_pt, m.height_pt
    );
    Ok(())
}

/// Print the artifact names a split would produce for each file.
pub fn names(files: &[PathBuf], config: &Config) -> Result<()> {
    let exporter = JsonExporter::new();
    for file in files {
        let host = open(file)?;
        let split_config = config.split.clone().rooted_at(artwork_dir(file));
        let preview = preview_names(&host, &split_config, &exporter)?;

        println!("{}", preview.document);
        println!("  print: {}", preview.print_path.display());
        println!("  cut:   {}", preview.cut_path.display());
    }
    Ok(())
}
