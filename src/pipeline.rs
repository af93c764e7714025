//! Operations
//!
//! The user-facing operations, each run against the host's active
//! document:
//! - Split: print and cut artifacts from one artwork
//! - Tile: a sheet of copies of the selected item
//! - Measure: the selection's size on the artboard
//! - Preview names: where a split would write, without writing

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::config::{SplitConfig, TileConfig};
use crate::engine::{
    clip_to_artboard, compute_grid, duplicate_document, partition, tile_item, unlock_all_layers,
    DuplicationReport, LockState, PartitionReport, TileReport,
};
use crate::error::{CutsplitError, Result};
use crate::export::{
    derive_base_name, find_named_document, ArtifactKind, BaseName, ExportRecord, ExportSink,
};
use crate::scene::{
    pt_to_mm, Bounds, ColorSpace, DocId, ItemId, LayerInfo, NewDocument, RulerUnit, SceneHost,
};

/// Name of the single layer on a fresh tiling sheet
const SHEET_LAYER_NAME: &str = "Layer 1";

/// Outcome of a split run
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// The document the print artifact came from
    pub original: DocId,
    /// The document the cut artifact came from
    pub clone: DocId,
    /// Lock flags the original had before the run
    pub lock_state: LockState,
    pub duplication: DuplicationReport,
    pub partition: PartitionReport,
    pub base_name: BaseName,
    pub artifacts: Vec<ExportRecord>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl SplitReport {
    /// Failures that were counted and skipped along the way
    pub fn total_failures(&self) -> usize {
        self.duplication.failed
            + self.partition.removal.failed
            + self.partition.flatten.move_failures
            + self.partition.keep.failed
    }
}

/// Where a split would write its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePreview {
    /// Name of the document the names derive from
    pub document: String,
    pub base_name: BaseName,
    pub print_path: PathBuf,
    pub cut_path: PathBuf,
}

/// Size of the selection on the artboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Selection clipped to the artboard
    pub clip: Bounds,
    pub width_pt: f64,
    pub height_pt: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Split the active document into print and cut artifacts.
///
/// The original keeps everything except cut lines; a clone keeps only cut
/// lines. Layers of the original stay unlocked afterwards; the prior lock
/// flags are returned in the report.
pub fn split_document<H: SceneHost + ?Sized>(
    host: &mut H,
    config: &SplitConfig,
    sink: &dyn ExportSink,
) -> Result<SplitReport> {
    let started_at = Utc::now();
    config.validate()?;

    let original = host.active_document().ok_or(CutsplitError::NoDocument)?;
    let classifier = config.classifier();
    info!(
        "Splitting '{}'",
        host.document_info(original)
            .map(|info| info.name)
            .unwrap_or_default()
    );

    let lock_state = unlock_all_layers(host, original)?;

    let duplication = duplicate_document(host, original, &config.duplication)?;
    let clone = duplication.document;
    let partition = partition(host, original, clone, &classifier);
    if !partition.flatten.is_complete() {
        warn!(
            "{} groups could not be ungrouped in the cut document",
            partition.flatten.remaining
        );
    }

    let preview = preview_names_for(&*host, original, config, sink)?;

    let print = sink.export(
        ArtifactKind::Print,
        &host.snapshot(original)?,
        &config.print_dir,
        &artifact_stem(&preview.base_name, &config.print_suffix),
    )?;
    let cut = sink.export(
        ArtifactKind::Cut,
        &host.snapshot(clone)?,
        &config.cut_dir,
        &artifact_stem(&preview.base_name, &config.cut_suffix),
    )?;

    host.set_active_document(original)?;

    let elapsed = Utc::now() - started_at;
    info!(
        "Split '{}' in {:.2}s",
        preview.base_name,
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    Ok(SplitReport {
        original,
        clone,
        lock_state,
        duplication,
        partition,
        base_name: preview.base_name,
        artifacts: vec![print, cut],
        started_at,
        elapsed,
    })
}

/// Artifact names a split of the active document would produce
pub fn preview_names<H: SceneHost + ?Sized>(
    host: &H,
    config: &SplitConfig,
    sink: &dyn ExportSink,
) -> Result<NamePreview> {
    let original = host.active_document().ok_or(CutsplitError::NoDocument)?;
    preview_names_for(host, original, config, sink)
}

fn preview_names_for<H: SceneHost + ?Sized>(
    host: &H,
    original: DocId,
    config: &SplitConfig,
    sink: &dyn ExportSink,
) -> Result<NamePreview> {
    let (_, document) = find_named_document(host).ok_or(CutsplitError::NoNamedDocument)?;
    let page = host
        .page_bounds(original)
        .ok_or(CutsplitError::DocumentNotFound { id: original.0 })?;
    let base_name = derive_base_name(&document, page.width(), page.height(), &config.page_sizes)?;

    let file_name =
        |suffix: &str| format!("{}.{}", artifact_stem(&base_name, suffix), sink.extension());
    let print_path = config.print_dir.join(file_name(&config.print_suffix));
    let cut_path = config.cut_dir.join(file_name(&config.cut_suffix));

    Ok(NamePreview {
        document,
        base_name,
        print_path,
        cut_path,
    })
}

fn artifact_stem(base: &BaseName, suffix: &str) -> String {
    format!("{}{}", base, suffix)
}

/// Measure the first selected item, clipped to the artboard
pub fn measure_selection<H: SceneHost + ?Sized>(host: &H) -> Result<Measurement> {
    let (_, item, artboard) = selected_item(host)?;
    let bounds = host
        .visible_bounds(item)
        .ok_or(CutsplitError::ItemNotFound { id: item.0 })?;
    let clip = clip_to_artboard(&bounds, &artboard)?;

    Ok(Measurement {
        clip,
        width_pt: clip.width(),
        height_pt: clip.height(),
        width_mm: pt_to_mm(clip.width()),
        height_mm: pt_to_mm(clip.height()),
    })
}

/// Tile the first selected item onto a new sheet.
///
/// Nothing is created when the item misses the artboard or does not fit
/// the sheet once.
pub fn tile_selection<H: SceneHost + ?Sized>(
    host: &mut H,
    config: &TileConfig,
) -> Result<TileReport> {
    config.validate()?;
    let request = config.to_request();

    let (_, item, artboard) = selected_item(&*host)?;
    let bounds = host
        .visible_bounds(item)
        .ok_or(CutsplitError::ItemNotFound { id: item.0 })?;
    compute_grid(&clip_to_artboard(&bounds, &artboard)?, &request)?;

    let sheet = host.create_document(&NewDocument {
        name: None,
        color_space: ColorSpace::Cmyk,
        ruler_unit: RulerUnit::Millimeters,
        width: request.page_width,
        height: request.page_height,
    })?;
    host.add_layer(sheet, &LayerInfo::new(SHEET_LAYER_NAME))?;
    info!("Created {} sheet for tiling", config.page.label());

    let report = tile_item(host, item, &artboard, sheet, &request)?;
    host.set_active_document(sheet)?;
    Ok(report)
}

fn selected_item<H: SceneHost + ?Sized>(host: &H) -> Result<(DocId, ItemId, Bounds)> {
    let doc = host.active_document().ok_or(CutsplitError::NoDocument)?;
    let item = *host
        .selection(doc)
        .first()
        .ok_or_else(|| CutsplitError::NoSelection {
            document: host
                .document_info(doc)
                .map(|info| info.name)
                .unwrap_or_default(),
        })?;
    let artboard = host
        .page_bounds(doc)
        .ok_or(CutsplitError::DocumentNotFound { id: doc.0 })?;
    Ok((doc, item, artboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::JsonExporter;
    use crate::scene::{DocumentData, Item, LayerData, MemoryHost, PaintSpec, ProcessColor};
    use approx::assert_relative_eq;

    fn host_with(data: DocumentData) -> MemoryHost {
        let mut host = MemoryHost::new();
        host.load_document(data).unwrap();
        host
    }

    #[test]
    fn test_split_without_document() {
        let mut host = MemoryHost::new();
        let err = split_document(&mut host, &SplitConfig::default(), &JsonExporter::new())
            .unwrap_err();
        assert!(matches!(err, CutsplitError::NoDocument));
    }

    #[test]
    fn test_bad_file_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = SplitConfig::default().rooted_at(dir.path());
        let mut host = host_with(
            DocumentData::new("artwork.ai", 100.0, 100.0).with_layer(
                LayerData::new("Art").with_item(
                    Item::path(Bounds::new(0.0, 10.0, 10.0, 0.0))
                        .with_stroke(Some(PaintSpec::spot("CutContour", ProcessColor::Gray(0.0)))),
                ),
            ),
        );

        let err = split_document(&mut host, &config, &JsonExporter::new()).unwrap_err();
        assert!(matches!(err, CutsplitError::InvalidFileName { .. }));
        assert!(!config.print_dir.exists());
        assert!(!config.cut_dir.exists());
    }

    #[test]
    fn test_preview_names() {
        let config = SplitConfig::default();
        let host = host_with(DocumentData::new("77_120_Stickers.ai", 100.0, 100.0));
        let preview = preview_names(&host, &config, &JsonExporter::new()).unwrap();
        assert_eq!(
            preview.print_path,
            PathBuf::from("PrintReady/77_120_Stickers_Custom_2_spaudai.json")
        );
        assert_eq!(
            preview.cut_path,
            PathBuf::from("Cut/77_120_Stickers_Custom_2_pjovimui.json")
        );
    }

    #[test]
    fn test_measure_clips_to_artboard() {
        let host = host_with(
            DocumentData::new("1_1_a.ai", 100.0, 100.0)
                .with_layer(LayerData::new("Art").with_item(Item::path(Bounds::new(
                    50.0, 80.0, 150.0, 20.0,
                ))))
                .with_selection(vec![0, 0]),
        );
        let m = measure_selection(&host).unwrap();
        assert_relative_eq!(m.width_pt, 50.0);
        assert_relative_eq!(m.height_pt, 60.0);
        assert_relative_eq!(m.width_mm, 50.0 * 25.4 / 72.0);
    }

    #[test]
    fn test_measure_needs_selection() {
        let host = host_with(DocumentData::new("1_1_a.ai", 100.0, 100.0));
        assert!(matches!(
            measure_selection(&host),
            Err(CutsplitError::NoSelection { .. })
        ));
    }

    #[test]
    fn test_tile_too_large_creates_no_sheet() {
        let mut host = host_with(
            DocumentData::new("1_1_a.ai", 2000.0, 2000.0)
                .with_layer(LayerData::new("Art").with_item(Item::path(Bounds::new(
                    0.0, 1500.0, 1500.0, 0.0,
                ))))
                .with_selection(vec![0, 0]),
        );
        let err = tile_selection(&mut host, &TileConfig::default()).unwrap_err();
        assert!(matches!(err, CutsplitError::DoesNotFit { .. }));
        assert_eq!(host.documents().len(), 1);
    }
}
