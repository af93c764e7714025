//! Export sinks
//!
//! A sink turns a document snapshot into a file. Files are written to a
//! hidden temporary name in the target folder and renamed into place, so a
//! failed export never leaves a partial artifact behind.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CutsplitError, Result};
use crate::scene::DocumentData;

/// Which half of the split an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Print,
    Cut,
}

/// A written artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// SHA-256 of the written bytes, lowercase hex
    pub sha256: String,
}

/// Writes document snapshots somewhere
pub trait ExportSink {
    /// File extension, without the dot
    fn extension(&self) -> &str;

    /// Write `document` as `dir/stem.ext`, creating `dir` if needed
    fn export(
        &self,
        kind: ArtifactKind,
        document: &DocumentData,
        dir: &Path,
        stem: &str,
    ) -> Result<ExportRecord>;
}

/// Exports documents as JSON scene files
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pub compact: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExportSink for JsonExporter {
    fn extension(&self) -> &str {
        "json"
    }

    fn export(
        &self,
        kind: ArtifactKind,
        document: &DocumentData,
        dir: &Path,
        stem: &str,
    ) -> Result<ExportRecord> {
        let bytes = if self.compact {
            serde_json::to_vec(document)?
        } else {
            serde_json::to_vec_pretty(document)?
        };
        let path = dir.join(format!("{}.{}", stem, self.extension()));
        write_atomic(&path, &bytes)?;

        let record = ExportRecord {
            kind,
            path,
            size_bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        };
        info!(
            "Exported {:?} artifact: {} ({} bytes)",
            kind,
            record.path.display(),
            record.size_bytes
        );
        Ok(record)
    }
}

/// Create a folder (and parents) if it does not exist yet
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| CutsplitError::DirectoryCreateError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Write to a temporary sibling, then rename over the final path
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(dir)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CutsplitError::InvalidConfig {
            reason: format!("export path {} has no file name", path.display()),
        })?;
    let temp_path = dir.join(format!(".{}.tmp", file_name));

    fs::write(&temp_path, bytes).map_err(|e| CutsplitError::FileWriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(CutsplitError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
