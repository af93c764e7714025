//! Split Tests
//!
//! End-to-end tests for splitting artwork into print and cut documents.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use cutsplit::classify::CutMarker;
use cutsplit::config::SplitConfig;
use cutsplit::engine::restore_lock_state;
use cutsplit::export::{ArtifactKind, JsonExporter};
use cutsplit::pipeline::split_document;
use cutsplit::scene::{
    mm_to_pt, Bounds, DocumentData, Item, ItemBody, LayerData, MemoryHost, PaintSpec,
    PathAttributes, ProcessColor, Rgb, SceneHost,
};
use cutsplit::CutsplitError;

const MAGENTA: Rgb = Rgb::new(230, 46, 146);

fn square(x: f64, y: f64) -> Item {
    Item::path(Bounds::new(x, y + 10.0, x + 10.0, y)).with_fill(Some(PaintSpec::rgb(0, 0, 0)))
}

fn spot_stroke(x: f64, y: f64) -> Item {
    square(x, y).with_stroke(Some(PaintSpec::spot("CutContour", ProcessColor::Gray(1.0))))
}

fn fallback_fill(x: f64, y: f64) -> Item {
    square(x, y).with_fill(Some(PaintSpec::spot(
        "Thru-cut",
        ProcessColor::Rgb(MAGENTA),
    )))
}

fn named_cut(x: f64, y: f64) -> Item {
    square(x, y).named("CutContour")
}

/// Artwork on an SRA3 page with cut lines at several depths
fn artwork(name: &str) -> DocumentData {
    DocumentData::new(name, mm_to_pt(320.0), mm_to_pt(450.0))
        .with_layer(
            LayerData::new("Art")
                .with_item(square(0.0, 0.0))
                .with_item(spot_stroke(20.0, 0.0))
                .with_item(Item::group(vec![
                    fallback_fill(40.0, 0.0),
                    square(60.0, 0.0),
                    Item::group(vec![named_cut(80.0, 0.0), square(100.0, 0.0)]),
                ])),
        )
        .with_layer(
            LayerData::new("Text")
                .locked()
                .with_item(square(0.0, 100.0))
                .with_item(spot_stroke(20.0, 100.0)),
        )
        .with_layer(
            LayerData::new("scpro2_regmarks")
                .locked()
                .with_item(spot_stroke(0.0, 200.0))
                .with_item(Item::group(vec![square(20.0, 200.0)])),
        )
}

fn is_cut(item: &Item) -> bool {
    match &item.body {
        ItemBody::Path(path) => CutMarker::default().matches(&PathAttributes {
            name: item.name.clone(),
            stroke: path.stroke.clone(),
            fill: path.fill.clone(),
        }),
        _ => false,
    }
}

/// Count (cut, other) leaf paths under a list of items
fn count_paths(items: &[Item]) -> (usize, usize) {
    items.iter().fold((0, 0), |(cut, other), item| match item.children() {
        Some(children) => {
            let (c, o) = count_paths(children);
            (cut + c, other + o)
        }
        None if is_cut(item) => (cut + 1, other),
        None => (cut, other + 1),
    })
}

fn read(path: &Path) -> DocumentData {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn run_split(data: DocumentData, root: &Path) -> (MemoryHost, cutsplit::pipeline::SplitReport) {
    let mut host = MemoryHost::new();
    host.load_document(data).unwrap();
    let config = SplitConfig::default().rooted_at(root);
    let report = split_document(&mut host, &config, &JsonExporter::new()).unwrap();
    (host, report)
}

// === Artifact Tests ===

#[test]
fn test_split_writes_both_artifacts() {
    let dir = tempdir().unwrap();
    let (_, report) = run_split(artwork("12345_250_RedBox.ai"), dir.path());

    assert_eq!(report.base_name.to_string(), "12345_250_RedBox_SRA3_3");
    assert_eq!(report.artifacts.len(), 2);

    let print = &report.artifacts[0];
    let cut = &report.artifacts[1];
    assert_eq!(print.kind, ArtifactKind::Print);
    assert_eq!(
        print.path,
        dir.path()
            .join("PrintReady")
            .join("12345_250_RedBox_SRA3_3_spaudai.json")
    );
    assert_eq!(cut.kind, ArtifactKind::Cut);
    assert_eq!(
        cut.path,
        dir.path()
            .join("Cut")
            .join("12345_250_RedBox_SRA3_3_pjovimui.json")
    );
    assert!(print.path.exists());
    assert!(cut.path.exists());
    assert_eq!(fs::metadata(&print.path).unwrap().len(), print.size_bytes);
}

// === Partition Tests ===

#[test]
fn test_print_and_cut_are_complementary() {
    let dir = tempdir().unwrap();
    let source = artwork("12345_250_RedBox.ai");
    let (_, report) = run_split(source.clone(), dir.path());

    let print = read(&report.artifacts[0].path);
    let cut = read(&report.artifacts[1].path);

    for layer in ["Art", "Text"] {
        let (source_cut, source_other) = count_paths(&source.layer(layer).unwrap().items);
        let (print_cut, print_other) = count_paths(&print.layer(layer).unwrap().items);
        let (cut_cut, cut_other) = count_paths(&cut.layer(layer).unwrap().items);

        assert_eq!(print_cut, 0, "print layer {} still has cut lines", layer);
        assert_eq!(print_other, source_other, "print layer {} lost artwork", layer);
        assert_eq!(cut_cut, source_cut, "cut layer {} lost cut lines", layer);
        assert_eq!(cut_other, 0, "cut layer {} kept artwork", layer);
    }
}

#[test]
fn test_cut_document_is_flat() {
    let dir = tempdir().unwrap();
    let (_, report) = run_split(artwork("12345_250_RedBox.ai"), dir.path());
    let cut = read(&report.artifacts[1].path);

    let art = cut.layer("Art").unwrap();
    assert!(art.items.iter().all(Item::is_path));
    assert_eq!(art.items.len(), 3);
    assert!(report.partition.flatten.is_complete());
    assert_eq!(report.partition.flatten.dissolved, 2);
}

#[test]
fn test_protected_layer_is_untouched() {
    let dir = tempdir().unwrap();
    let source = artwork("12345_250_RedBox.ai");
    let (_, report) = run_split(source.clone(), dir.path());

    let expected = &source.layer("scpro2_regmarks").unwrap().items;
    let print = read(&report.artifacts[0].path);
    let cut = read(&report.artifacts[1].path);

    assert_eq!(&print.layer("scpro2_regmarks").unwrap().items, expected);
    assert_eq!(&cut.layer("scpro2_regmarks").unwrap().items, expected);
}

#[test]
fn test_layer_order_and_names_are_mirrored() {
    let dir = tempdir().unwrap();
    let (_, report) = run_split(artwork("12345_250_RedBox.ai"), dir.path());
    let cut = read(&report.artifacts[1].path);

    let names: Vec<&str> = cut.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Art", "Text", "scpro2_regmarks"]);
    assert!(cut.layers.iter().all(|l| !l.locked));
}

#[test]
fn test_locked_layers_can_be_restored() {
    let dir = tempdir().unwrap();
    let (mut host, report) = run_split(artwork("12345_250_RedBox.ai"), dir.path());

    assert_eq!(report.lock_state.locked_layers().count(), 2);
    restore_lock_state(&mut host, &report.lock_state).unwrap();

    let locked: Vec<String> = host
        .layers(report.original)
        .into_iter()
        .filter_map(|l| host.layer_info(l))
        .filter(|info| info.locked)
        .map(|info| info.name)
        .collect();
    assert_eq!(locked, vec!["Text".to_string(), "scpro2_regmarks".to_string()]);
}

#[test]
fn test_original_stays_active() {
    let dir = tempdir().unwrap();
    let (host, report) = run_split(artwork("12345_250_RedBox.ai"), dir.path());
    assert_eq!(host.active_document(), Some(report.original));
    assert_ne!(report.original, report.clone);
}

#[test]
fn test_cut_inside_compound_path_leaves_print_only() {
    let dir = tempdir().unwrap();
    let source = DocumentData::new("1_10_Compound.ai", 500.0, 500.0).with_layer(
        LayerData::new("Art")
            .with_item(Item::compound_path(vec![spot_stroke(0.0, 0.0), square(20.0, 0.0)]))
            .with_item(spot_stroke(40.0, 0.0)),
    );
    let (_, report) = run_split(source, dir.path());

    let print = read(&report.artifacts[0].path);
    assert_eq!(count_paths(&print.layer("Art").unwrap().items), (0, 1));

    // Compound paths are never ungrouped, so the cut side drops them whole.
    let cut = read(&report.artifacts[1].path);
    assert_eq!(count_paths(&cut.layer("Art").unwrap().items), (1, 0));
}

#[test]
fn test_unreadable_paint_is_not_cut() {
    let dir = tempdir().unwrap();
    let source = DocumentData::new("1_10_Odd.ai", 500.0, 500.0).with_layer(
        LayerData::new("Art")
            .with_item(square(0.0, 0.0).with_stroke(None).with_fill(None))
            .with_item(spot_stroke(20.0, 0.0)),
    );
    let (_, report) = run_split(source, dir.path());

    assert_eq!(report.partition.removal.removed, 1);
    assert_eq!(report.partition.keep.kept, 1);
    assert_eq!(report.partition.keep.removed, 1);
}

// === Precondition Tests ===

#[test]
fn test_untitled_document_cannot_be_named() {
    let dir = tempdir().unwrap();
    let mut host = MemoryHost::new();
    host.load_document(artwork("Untitled-3")).unwrap();

    let config = SplitConfig::default().rooted_at(dir.path());
    let err = split_document(&mut host, &config, &JsonExporter::new()).unwrap_err();

    assert!(matches!(err, CutsplitError::NoNamedDocument));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
