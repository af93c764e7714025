//! Tiling Tests
//!
//! End-to-end tests for tiling a selected object onto a new sheet.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use test_case::test_case;

use cutsplit::config::{PageSizeChoice, TileConfig};
use cutsplit::engine::{Margins, PLACEMENT_GROUP_NAME};
use cutsplit::pipeline::{measure_selection, tile_selection};
use cutsplit::scene::{
    mm_to_pt, pt_to_mm, Bounds, ColorSpace, DocId, DocumentData, Item, LayerData, MemoryHost,
    RulerUnit, SceneHost,
};
use cutsplit::CutsplitError;

const EPS: f64 = 1e-6;

/// A page with one selected rectangle of the given size in mm
fn host_with_selection(left_mm: f64, top_mm: f64, width_mm: f64, height_mm: f64) -> MemoryHost {
    host_with_item(label(left_mm, top_mm, width_mm, height_mm))
}

fn label(left_mm: f64, top_mm: f64, width_mm: f64, height_mm: f64) -> Item {
    let bounds = Bounds::new(
        mm_to_pt(left_mm),
        mm_to_pt(top_mm),
        mm_to_pt(left_mm + width_mm),
        mm_to_pt(top_mm - height_mm),
    );
    Item::path(bounds).named("label")
}

fn host_with_item(item: Item) -> MemoryHost {
    let data = DocumentData::new("1_1_Label.ai", mm_to_pt(500.0), mm_to_pt(500.0))
        .with_layer(LayerData::new("Art").with_item(item))
        .with_selection(vec![0, 0]);

    let mut host = MemoryHost::new();
    host.load_document(data).unwrap();
    host
}

fn sheet_items(host: &MemoryHost, sheet: DocId) -> Vec<Item> {
    let sheet = host.snapshot(sheet).unwrap();
    assert_eq!(sheet.layers.len(), 1);
    sheet.layers.into_iter().next().unwrap().items
}

#[test]
fn test_tile_fills_sheet_and_centers_grid() {
    let mut host = host_with_selection(10.0, 200.0, 100.0, 60.0);
    let report = tile_selection(&mut host, &TileConfig::default()).unwrap();

    // SRA3 minus L5 R5 T15 B15 leaves 310 x 420 mm; gap 1 mm.
    assert_eq!(report.cols, 3);
    assert_eq!(report.rows, 6);
    assert_eq!(report.count, 18);
    assert_relative_eq!(pt_to_mm(report.clip_width), 100.0, epsilon = EPS);

    let items = sheet_items(&host, report.document);
    assert_eq!(items.len(), 18);
    assert!(items.iter().all(Item::is_path));

    // Grid is 302 x 365 mm, so it shifts by 4 mm right and 27.5 mm down.
    let first = items[0].bounds().unwrap();
    assert_relative_eq!(pt_to_mm(first.left), 9.0, epsilon = EPS);
    assert_relative_eq!(pt_to_mm(first.top), 450.0 - 15.0 - 27.5, epsilon = EPS);

    let row1_col1 = items[4].bounds().unwrap();
    assert_relative_eq!(pt_to_mm(row1_col1.left), 9.0 + 101.0, epsilon = EPS);
    assert_relative_eq!(pt_to_mm(row1_col1.top), 407.5 - 61.0, epsilon = EPS);

    let last = items[17].bounds().unwrap();
    assert_relative_eq!(pt_to_mm(last.right), 320.0 - 5.0 - 4.0, epsilon = EPS);
    assert_relative_eq!(pt_to_mm(last.bottom), 15.0 + 27.5, epsilon = EPS);
}

#[test]
fn test_sheet_document_setup() {
    let mut host = host_with_selection(10.0, 200.0, 50.0, 50.0);
    let config = TileConfig {
        page: PageSizeChoice::Sra3Plus,
        ..TileConfig::default()
    };
    let report = tile_selection(&mut host, &config).unwrap();

    assert_eq!(host.active_document(), Some(report.document));
    let info = host.document_info(report.document).unwrap();
    assert_eq!(info.color_space, ColorSpace::Cmyk);
    assert_eq!(info.ruler_unit, RulerUnit::Millimeters);

    let page = host.page_bounds(report.document).unwrap();
    assert_relative_eq!(pt_to_mm(page.width()), 330.0, epsilon = EPS);
    assert_relative_eq!(pt_to_mm(page.height()), 488.0, epsilon = EPS);
}

#[test]
fn test_placement_group_is_dissolved() {
    let mut host = host_with_selection(10.0, 200.0, 50.0, 50.0);
    let report = tile_selection(&mut host, &TileConfig::default()).unwrap();

    let items = sheet_items(&host, report.document);
    assert!(items
        .iter()
        .all(|item| item.name.as_deref() != Some(PLACEMENT_GROUP_NAME)));
    assert!(host.groups(report.document).is_empty());
}

#[test]
fn test_source_document_is_unchanged() {
    let mut host = host_with_selection(10.0, 200.0, 50.0, 50.0);
    let before = host.snapshot(host.active_document().unwrap()).unwrap();

    tile_selection(&mut host, &TileConfig::default()).unwrap();

    let source = host.documents()[0];
    assert_eq!(host.snapshot(source).unwrap(), before);
}

#[test]
fn test_overhanging_copies_start_at_cell_origin() {
    // 40 mm of the 100 mm wide label hangs off the left edge.
    let mut host = host_with_selection(-40.0, 200.0, 100.0, 50.0);
    let config = TileConfig {
        margins_mm: Margins::uniform(0.0),
        gap_mm: 0.0,
        ..TileConfig::default()
    };
    let report = tile_selection(&mut host, &config).unwrap();

    assert_relative_eq!(pt_to_mm(report.clip_width), 60.0, epsilon = EPS);
    assert_eq!(report.cols, 5);
    assert_eq!(report.rows, 9);

    // Each copy's top-left sits on its cell origin, shifted by (320 - 300) / 2.
    let items = sheet_items(&host, report.document);
    let first = items[0].bounds().unwrap();
    assert_relative_eq!(pt_to_mm(first.left), 10.0, epsilon = EPS);
    assert_relative_eq!(pt_to_mm(first.top), 450.0, epsilon = EPS);
    assert_relative_eq!(pt_to_mm(first.width()), 100.0, epsilon = EPS);

    let second = items[1].bounds().unwrap();
    assert_relative_eq!(pt_to_mm(second.left), 70.0, epsilon = EPS);
}

#[test]
fn test_locked_selection_is_tiled() {
    let mut host = host_with_item(label(10.0, 200.0, 50.0, 50.0).locked());
    let report = tile_selection(&mut host, &TileConfig::default()).unwrap();

    assert_eq!(host.documents().len(), 2);
    let items = sheet_items(&host, report.document);
    assert_eq!(items.len(), report.count);
    assert!(items.iter().all(|item| !item.locked));
    assert!(items.iter().all(|item| item.name.as_deref() == Some("label")));
}

#[test]
fn test_tiny_selection_over_copy_limit_creates_nothing() {
    let mut host = host_with_selection(10.0, 200.0, 0.5, 0.5);
    let config = TileConfig {
        gap_mm: 0.0,
        ..TileConfig::default()
    };
    let err = tile_selection(&mut host, &config).unwrap_err();

    assert!(matches!(err, CutsplitError::InvalidConfig { .. }));
    assert_eq!(host.documents().len(), 1);
}

#[test]
fn test_selection_off_artboard_creates_nothing() {
    let mut host = host_with_selection(600.0, 200.0, 50.0, 50.0);
    let err = tile_selection(&mut host, &TileConfig::default()).unwrap_err();

    assert!(matches!(err, CutsplitError::NoOverlap));
    assert_eq!(host.documents().len(), 1);
}

#[test_case(320.0, 10.0 ; "wider than the margin box")]
#[test_case(10.0, 430.0 ; "taller than the margin box")]
fn test_too_large_is_rejected(width_mm: f64, height_mm: f64) {
    let mut host = host_with_selection(0.0, 440.0, width_mm, height_mm);
    let config = TileConfig::default();
    let err = tile_selection(&mut host, &config).unwrap_err();

    match err {
        CutsplitError::DoesNotFit {
            width_mm: w,
            height_mm: h,
        } => {
            assert_relative_eq!(w, width_mm, epsilon = EPS);
            assert_relative_eq!(h, height_mm, epsilon = EPS);
        }
        other => panic!("expected DoesNotFit, got {:?}", other),
    }
    assert_eq!(host.documents().len(), 1);
}

#[test]
fn test_measure_reports_millimetres() {
    let host = host_with_selection(10.0, 200.0, 85.0, 55.0);
    let m = measure_selection(&host).unwrap();
    assert_relative_eq!(m.width_mm, 85.0, epsilon = EPS);
    assert_relative_eq!(m.height_mm, 55.0, epsilon = EPS);
}
