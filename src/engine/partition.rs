//! Partition Engine
//!
//! Splits a document and its clone into complementary halves:
//! - the removal walk strips cut lines from the original
//! - the flatten walk dissolves every group in the clone
//! - the keep walk leaves only cut lines in the clone
//!
//! Every container is read as a detached list of child ids before any of
//! its children are touched, so removals never skip or repeat a visit.
//! Protected layers are never visited.

use log::{debug, info, warn};

use crate::classify::Classifier;
use crate::scene::{Container, DocId, ItemId, ItemKind, Placement, SceneHost};

/// Groups dissolved per progress log line
const FLATTEN_CHUNK: usize = 20;

/// Outcome of the removal walk on the original
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: usize,
    pub failed: usize,
    pub layers_visited: usize,
    pub layers_skipped: usize,
}

/// Outcome of flattening the clone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub dissolved: usize,
    pub passes: usize,
    /// Groups left when the walk stopped
    pub remaining: usize,
    pub move_failures: usize,
}

impl FlattenReport {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// Outcome of the keep-only walk on the clone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepReport {
    pub kept: usize,
    pub removed: usize,
    pub failed: usize,
}

/// All three walks together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionReport {
    pub removal: RemovalReport,
    pub flatten: FlattenReport,
    pub keep: KeepReport,
}

/// Remove every cut line from the non-protected layers of `doc`.
///
/// Containers are never classified themselves; they are emptied of
/// matching descendants and kept.
pub fn remove_cut_items<H: SceneHost + ?Sized>(
    host: &mut H,
    doc: DocId,
    classifier: &Classifier,
) -> RemovalReport {
    let mut report = RemovalReport::default();

    for layer in host.layers(doc) {
        if classifier.is_protected(&*host, layer) {
            if let Some(info) = host.layer_info(layer) {
                debug!("Skipping protected layer: {}", info.name);
            }
            report.layers_skipped += 1;
            continue;
        }
        report.layers_visited += 1;
        remove_walk(host, Container::Layer(layer), classifier, &mut report);
    }

    info!(
        "Removed {} cut items from original ({} failed)",
        report.removed, report.failed
    );
    report
}

fn remove_walk<H: SceneHost + ?Sized>(
    host: &mut H,
    container: Container,
    classifier: &Classifier,
    report: &mut RemovalReport,
) {
    let items = host.children(container);
    for item in items {
        match host.item_kind(item) {
            Some(ItemKind::Path) => {
                if classifier.is_cut_item(&*host, item) {
                    match host.remove(item) {
                        Ok(()) => report.removed += 1,
                        Err(e) => {
                            warn!("Error removing cut item {}: {}", item, e);
                            report.failed += 1;
                        }
                    }
                }
            }
            Some(kind) if kind.is_container() => {
                remove_walk(host, Container::Item(item), classifier, report);
            }
            _ => {}
        }
    }
}

/// Move a group's children out in front of it, then delete the empty group.
///
/// Returns false when the group could not be dissolved; children that
/// refused to move stay inside it.
pub(crate) fn dissolve_group<H: SceneHost + ?Sized>(
    host: &mut H,
    group: ItemId,
    move_failures: &mut usize,
) -> bool {
    for child in host.children(Container::Item(group)) {
        if let Err(e) = host.move_item(child, Placement::Before(group)) {
            warn!("Error moving item {} out of group {}: {}", child, group, e);
            *move_failures += 1;
        }
    }

    if !host.children(Container::Item(group)).is_empty() {
        return false;
    }

    match host.remove(group) {
        Ok(()) => true,
        Err(e) => {
            warn!("Error removing emptied group {}: {}", group, e);
            false
        }
    }
}

/// Dissolve every group in `doc` outside protected layers.
///
/// Works pass by pass over the document's group collection. Stops when no
/// groups remain or when a whole pass dissolves nothing, and reports how
/// many groups were left behind.
pub fn flatten_groups<H: SceneHost + ?Sized>(
    host: &mut H,
    doc: DocId,
    classifier: &Classifier,
) -> FlattenReport {
    let mut report = FlattenReport::default();
    let eligible = |host: &H, group: ItemId| {
        host.item_layer(group)
            .map(|layer| !classifier.is_protected(host, layer))
            .unwrap_or(false)
    };

    loop {
        let view: &H = host;
        let groups: Vec<ItemId> = view
            .groups(doc)
            .into_iter()
            .filter(|g| eligible(view, *g))
            .collect();
        report.remaining = groups.len();
        if groups.is_empty() {
            break;
        }

        report.passes += 1;
        let mut progress = 0;
        for (index, group) in groups.into_iter().enumerate() {
            if host.item_kind(group) != Some(ItemKind::Group) {
                continue;
            }
            if dissolve_group(host, group, &mut report.move_failures) {
                progress += 1;
            }
            if (index + 1) % FLATTEN_CHUNK == 0 {
                debug!("Flatten pass {}: {} groups handled", report.passes, index + 1);
            }
        }
        report.dissolved += progress;

        if progress == 0 {
            warn!(
                "Could not dissolve any more groups, stopping with {} left",
                report.remaining
            );
            break;
        }
    }

    info!(
        "Flattened {} groups in {} passes ({} remaining)",
        report.dissolved, report.passes, report.remaining
    );
    report
}

/// Remove everything that is not a cut line from the non-protected layers.
///
/// Only direct layer children are examined, so run `flatten_groups` first.
pub fn keep_only_cut_items<H: SceneHost + ?Sized>(
    host: &mut H,
    doc: DocId,
    classifier: &Classifier,
) -> KeepReport {
    let mut report = KeepReport::default();
    let mut marked = Vec::new();

    for layer in host.layers(doc) {
        if classifier.is_protected(&*host, layer) {
            continue;
        }
        for item in host.children(Container::Layer(layer)) {
            let keep = host.item_kind(item) == Some(ItemKind::Path)
                && classifier.is_cut_item(&*host, item);
            if keep {
                report.kept += 1;
            } else {
                marked.push(item);
            }
        }
    }

    for item in marked {
        match host.remove(item) {
            Ok(()) => report.removed += 1,
            Err(e) => {
                warn!("Error removing non-cut item {}: {}", item, e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Clone keeps {} cut items, removed {} others ({} failed)",
        report.kept, report.removed, report.failed
    );
    report
}

/// Run the removal walk on `original` and flatten-then-keep on `clone`
pub fn partition<H: SceneHost + ?Sized>(
    host: &mut H,
    original: DocId,
    clone: DocId,
    classifier: &Classifier,
) -> PartitionReport {
    let removal = remove_cut_items(host, original, classifier);
    let flatten = flatten_groups(host, clone, classifier);
    let keep = keep_only_cut_items(host, clone, classifier);
    PartitionReport {
        removal,
        flatten,
        keep,
    }
}
