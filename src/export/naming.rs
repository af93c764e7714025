//! Output file naming
//!
//! Artwork files are named `{order}_{count}_{info}.{ext}`. Outputs are
//! named `{order}_{count}_{info}_{size}_{papers}` where `size` is the
//! matched sheet name and `papers` the number of sheets to print.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CutsplitError, Result};
use crate::scene::{mm_to_pt, DocId, SceneHost};

/// Tag used when the page matches no named size
pub const CUSTOM_SIZE: &str = "Custom";

/// Items per printed sheet
pub const ITEMS_PER_PAPER: u64 = 100;

/// Page size matching tolerance in points
const SIZE_TOLERANCE_PT: f64 = 1.0;

/// Prefix of documents that were never saved
const UNTITLED_PREFIX: &str = "Untitled";

/// A named sheet size, in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPageSize {
    pub name: String,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl NamedPageSize {
    pub fn new(name: impl Into<String>, width_mm: f64, height_mm: f64) -> Self {
        Self {
            name: name.into(),
            width_mm,
            height_mm,
        }
    }

    /// Whether a page in points matches this size within tolerance
    pub fn matches(&self, width_pt: f64, height_pt: f64) -> bool {
        (width_pt - mm_to_pt(self.width_mm)).abs() < SIZE_TOLERANCE_PT
            && (height_pt - mm_to_pt(self.height_mm)).abs() < SIZE_TOLERANCE_PT
    }
}

/// SRA3 and SRA3+ sheets
pub fn default_page_sizes() -> Vec<NamedPageSize> {
    vec![
        NamedPageSize::new("SRA3", 320.0, 450.0),
        NamedPageSize::new("SRA3+", 330.0, 488.0),
    ]
}

/// Name of the first size matching the page, else `"Custom"`
pub fn page_size_tag(width_pt: f64, height_pt: f64, sizes: &[NamedPageSize]) -> String {
    sizes
        .iter()
        .find(|size| size.matches(width_pt, height_pt))
        .map(|size| size.name.clone())
        .unwrap_or_else(|| CUSTOM_SIZE.to_string())
}

/// Sheets needed for an item count: `max(1, ceil(n / 100))`.
///
/// The count is read from its leading digits; anything unreadable needs
/// one sheet.
pub fn papers_needed(item_count: &str) -> u64 {
    let digits: String = item_count
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u64>() {
        Ok(count) => count.div_ceil(ITEMS_PER_PAPER).max(1),
        Err(_) => 1,
    }
}

/// Parts of a derived output name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseName {
    pub order_id: String,
    pub item_count: String,
    pub info: String,
    pub page_size: String,
    pub papers_needed: u64,
}

impl fmt::Display for BaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.order_id, self.item_count, self.info, self.page_size, self.papers_needed
        )
    }
}

/// Derive the output base name from an artwork file name and page size
pub fn derive_base_name(
    file_name: &str,
    width_pt: f64,
    height_pt: f64,
    sizes: &[NamedPageSize],
) -> Result<BaseName> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 2 {
        return Err(CutsplitError::InvalidFileName {
            name: file_name.to_string(),
        });
    }

    Ok(BaseName {
        order_id: parts[0].to_string(),
        item_count: parts[1].to_string(),
        info: parts[2..].join("_"),
        page_size: page_size_tag(width_pt, height_pt, sizes),
        papers_needed: papers_needed(parts[1]),
    })
}

/// First open document that has been saved under a real name
pub fn find_named_document<H: SceneHost + ?Sized>(host: &H) -> Option<(DocId, String)> {
    host.documents().into_iter().find_map(|doc| {
        let name = host.document_info(doc)?.name;
        (!name.starts_with(UNTITLED_PREFIX)).then_some((doc, name))
    })
}
