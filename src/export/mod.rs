//! Naming and Export
//!
//! Derives output file names from the artwork's file name and writes the
//! print and cut documents to their folders.

pub mod naming;
pub mod sink;

pub use naming::{
    default_page_sizes, derive_base_name, find_named_document, page_size_tag, papers_needed,
    BaseName, NamedPageSize, CUSTOM_SIZE,
};
pub use sink::{ensure_dir, write_atomic, ArtifactKind, ExportRecord, ExportSink, JsonExporter};
