//! Error handling for Cutsplit
//!
//! Per-item host failures are recoverable and get counted by the engines.
//! Structural preconditions abort the operation before anything is written.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Cutsplit operations
pub type Result<T> = std::result::Result<T, CutsplitError>;

/// Main error type for Cutsplit operations
#[derive(Error, Debug)]
pub enum CutsplitError {
    // Precondition Errors
    #[error("No document is open")]
    NoDocument,

    #[error("Nothing is selected in document '{document}'")]
    NoSelection { document: String },

    #[error("Selection does not overlap the active artboard")]
    NoOverlap,

    #[error("Object too large to fit: {width_mm:.2}x{height_mm:.2} mm")]
    DoesNotFit { width_mm: f64, height_mm: f64 },

    #[error("No saved document found to derive file names from")]
    NoNamedDocument,

    #[error("File name '{name}' does not follow ORDER_COUNT_INFO convention")]
    InvalidFileName { name: String },

    // Scene Errors
    #[error("Document not found: {id}")]
    DocumentNotFound { id: usize },

    #[error("Layer not found: {id}")]
    LayerNotFound { id: usize },

    #[error("Item not found: {id}")]
    ItemNotFound { id: usize },

    #[error("Template not found: {id}")]
    TemplateNotFound { id: usize },

    #[error("Item {id} is locked")]
    ItemLocked { id: usize },

    #[error("Layer '{name}' is locked")]
    LayerLocked { name: String },

    #[error("Layer name '{name}' already exists in document")]
    DuplicateLayerName { name: String },

    #[error("Invalid placement: {reason}")]
    InvalidPlacement { reason: String },

    #[error("Invalid scene data: {reason}")]
    InvalidScene { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CutsplitError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            CutsplitError::NoDocument => "NO_DOCUMENT",
            CutsplitError::NoSelection { .. } => "NO_SELECTION",
            CutsplitError::NoOverlap => "NO_OVERLAP",
            CutsplitError::DoesNotFit { .. } => "DOES_NOT_FIT",
            CutsplitError::NoNamedDocument => "NO_NAMED_DOCUMENT",
            CutsplitError::InvalidFileName { .. } => "INVALID_FILE_NAME",
            CutsplitError::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            CutsplitError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            CutsplitError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            CutsplitError::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            CutsplitError::ItemLocked { .. } => "ITEM_LOCKED",
            CutsplitError::LayerLocked { .. } => "LAYER_LOCKED",
            CutsplitError::DuplicateLayerName { .. } => "DUPLICATE_LAYER_NAME",
            CutsplitError::InvalidPlacement { .. } => "INVALID_PLACEMENT",
            CutsplitError::InvalidScene { .. } => "INVALID_SCENE",
            CutsplitError::InvalidConfig { .. } => "INVALID_CONFIG",
            CutsplitError::FileReadError { .. } => "FILE_READ_ERROR",
            CutsplitError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            CutsplitError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            CutsplitError::Io(_) => "IO_ERROR",
            CutsplitError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error only affects a single item.
    ///
    /// Engines swallow recoverable errors, count them and move on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CutsplitError::ItemNotFound { .. }
                | CutsplitError::ItemLocked { .. }
                | CutsplitError::LayerLocked { .. }
                | CutsplitError::InvalidPlacement { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            CutsplitError::NoDocument => Some("Open an artwork document first."),
            CutsplitError::NoSelection { .. } => Some("Select the object to tile."),
            CutsplitError::NoOverlap => {
                Some("Move the selection onto the active artboard and try again.")
            }
            CutsplitError::DoesNotFit { .. } => {
                Some("Pick a larger page size or reduce the margins and gap.")
            }
            CutsplitError::NoNamedDocument => {
                Some("Save the artwork as ORDER_COUNT_INFO.ext before splitting.")
            }
            CutsplitError::InvalidFileName { .. } => {
                Some("Rename the file to ORDER_COUNT_INFO.ext, e.g. 12345_250_RedBox.ai.")
            }
            CutsplitError::LayerLocked { .. } => Some("Unlock the layer and retry."),
            CutsplitError::InvalidConfig { .. } => Some("Check the configuration values."),
            _ => None,
        }
    }
}
