//! Configuration
//!
//! Split and tiling settings. Both load from one JSON file where every
//! field is optional and falls back to the shop defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, CutMarker, ProtectedLayers, DEFAULT_PROTECTED_LAYERS};
use crate::engine::{DuplicationOptions, Margins, TileRequest};
use crate::error::{CutsplitError, Result};
use crate::export::{default_page_sizes, NamedPageSize};
use crate::scene::{mm_to_pt, POINTS_PER_MM};

/// Settings file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub split: SplitConfig,
    pub tile: TileConfig,
}

impl Config {
    /// Load settings from a JSON file. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| CutsplitError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.split.validate()?;
        config.tile.validate()?;
        Ok(config)
    }
}

/// Settings for splitting a document into print and cut artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub marker: CutMarker,
    pub protected_layers: Vec<String>,
    /// Folder receiving the print artifact
    pub print_dir: PathBuf,
    /// Folder receiving the cut artifact
    pub cut_dir: PathBuf,
    pub print_suffix: String,
    pub cut_suffix: String,
    pub page_sizes: Vec<NamedPageSize>,
    pub duplication: DuplicationOptions,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            marker: CutMarker::default(),
            protected_layers: DEFAULT_PROTECTED_LAYERS.iter().map(|s| s.to_string()).collect(),
            print_dir: PathBuf::from("PrintReady"),
            cut_dir: PathBuf::from("Cut"),
            print_suffix: "_spaudai".to_string(),
            cut_suffix: "_pjovimui".to_string(),
            page_sizes: default_page_sizes(),
            duplication: DuplicationOptions::default(),
        }
    }
}

impl SplitConfig {
    pub fn classifier(&self) -> Classifier {
        Classifier::new(
            self.marker.clone(),
            ProtectedLayers::new(self.protected_layers.iter().cloned()),
        )
    }

    /// Resolve relative output folders against `root`
    pub fn rooted_at(mut self, root: &Path) -> Self {
        if self.print_dir.is_relative() {
            self.print_dir = root.join(&self.print_dir);
        }
        if self.cut_dir.is_relative() {
            self.cut_dir = root.join(&self.cut_dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker.name.is_empty() {
            return Err(CutsplitError::InvalidConfig {
                reason: "cut marker name is empty".to_string(),
            });
        }
        if self.print_dir.as_os_str().is_empty() || self.cut_dir.as_os_str().is_empty() {
            return Err(CutsplitError::InvalidConfig {
                reason: "output folders must be named".to_string(),
            });
        }
        if self.print_suffix == self.cut_suffix {
            return Err(CutsplitError::InvalidConfig {
                reason: format!("print and cut share the suffix '{}'", self.print_suffix),
            });
        }
        if self.duplication.min_chunk > self.duplication.max_chunk {
            return Err(CutsplitError::InvalidConfig {
                reason: format!(
                    "duplication chunk bounds reversed: {} > {}",
                    self.duplication.min_chunk, self.duplication.max_chunk
                ),
            });
        }
        for size in &self.page_sizes {
            if !(size.width_mm > 0.0 && size.height_mm > 0.0) {
                return Err(CutsplitError::InvalidConfig {
                    reason: format!("page size '{}' has no area", size.name),
                });
            }
        }
        Ok(())
    }
}

/// Sheet the tiled copies are laid out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PageSizeChoice {
    #[default]
    Sra3,
    Sra3Plus,
}

impl PageSizeChoice {
    /// Width and height in millimetres
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PageSizeChoice::Sra3 => (320.0, 450.0),
            PageSizeChoice::Sra3Plus => (330.0, 488.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PageSizeChoice::Sra3 => "SRA3",
            PageSizeChoice::Sra3Plus => "SRA3+",
        }
    }
}

/// Tiling sheet settings, lengths in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub page: PageSizeChoice,
    pub margins_mm: Margins,
    pub gap_mm: f64,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            page: PageSizeChoice::Sra3,
            margins_mm: Margins::new(5.0, 5.0, 15.0, 15.0),
            gap_mm: 1.0,
        }
    }
}

impl TileConfig {
    /// Reject negative or non-finite lengths
    pub fn validate(&self) -> Result<()> {
        let m = &self.margins_mm;
        let fields = [
            ("left margin", m.left),
            ("right margin", m.right),
            ("top margin", m.top),
            ("bottom margin", m.bottom),
            ("gap", self.gap_mm),
        ];
        for (label, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CutsplitError::InvalidConfig {
                    reason: format!("{} must be a non-negative number, got {}", label, value),
                });
            }
        }
        Ok(())
    }

    /// The sheet request in points
    pub fn to_request(&self) -> TileRequest {
        let (width_mm, height_mm) = self.page.dimensions_mm();
        TileRequest {
            page_width: mm_to_pt(width_mm),
            page_height: mm_to_pt(height_mm),
            margins: self.margins_mm.scaled(POINTS_PER_MM),
            gap: mm_to_pt(self.gap_mm),
        }
    }
}
