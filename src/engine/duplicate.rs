//! Duplication Engine
//!
//! Clones a document by mirroring its layers and appending a copy of every
//! top-level item to the layer with the same name. Per-item failures are
//! logged and counted; nothing already copied is rolled back.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CutsplitError, Result};
use crate::scene::{Container, DocId, LayerId, LayerInfo, NewDocument, Placement, SceneHost};

/// Prior lock flags, as returned by `unlock_all_layers`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockState {
    entries: Vec<(LayerId, bool)>,
}

impl LockState {
    /// Layers that were locked before unlocking
    pub fn locked_layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.entries
            .iter()
            .filter(|(_, locked)| *locked)
            .map(|(layer, _)| *layer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unlock every layer of a document.
///
/// This is a persistent change to the document. The returned state can be
/// handed to `restore_lock_state` if the caller wants the locks back.
pub fn unlock_all_layers<H: SceneHost + ?Sized>(host: &mut H, doc: DocId) -> Result<LockState> {
    let mut entries = Vec::new();
    for layer in host.layers(doc) {
        let info = host
            .layer_info(layer)
            .ok_or(CutsplitError::LayerNotFound { id: layer.0 })?;
        if info.locked {
            host.set_layer_locked(layer, false)?;
        }
        entries.push((layer, info.locked));
    }

    let state = LockState { entries };
    debug!(
        "Unlocked {} of {} layers",
        state.locked_layers().count(),
        state.len()
    );
    Ok(state)
}

/// Re-apply lock flags recorded by `unlock_all_layers`
pub fn restore_lock_state<H: SceneHost + ?Sized>(host: &mut H, state: &LockState) -> Result<()> {
    for (layer, locked) in &state.entries {
        host.set_layer_locked(*layer, *locked)?;
    }
    Ok(())
}

/// Chunking of per-layer item copies.
///
/// Chunks only pace progress logging; they do not change the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationOptions {
    pub min_chunk: usize,
    pub max_chunk: usize,
}

impl Default for DuplicationOptions {
    fn default() -> Self {
        Self {
            min_chunk: 10,
            max_chunk: 50,
        }
    }
}

impl DuplicationOptions {
    /// Chunk size for a layer holding `item_count` items
    pub fn chunk_size(&self, item_count: usize) -> usize {
        item_count.min(self.max_chunk).max(self.min_chunk).max(1)
    }
}

/// Outcome of a document duplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicationReport {
    /// The new document
    pub document: DocId,
    pub layers: usize,
    pub duplicated: usize,
    pub failed: usize,
}

/// Clone `source` into a new document.
///
/// Precondition: the source layers are unlocked (see `unlock_all_layers`).
/// Items on a still-locked layer fail individually and are counted.
pub fn duplicate_document<H: SceneHost + ?Sized>(
    host: &mut H,
    source: DocId,
    options: &DuplicationOptions,
) -> Result<DuplicationReport> {
    let info = host
        .document_info(source)
        .ok_or(CutsplitError::DocumentNotFound { id: source.0 })?;
    let page = host
        .page_bounds(source)
        .ok_or(CutsplitError::DocumentNotFound { id: source.0 })?;

    let clone = host.create_document(&NewDocument {
        name: None,
        color_space: info.color_space,
        ruler_unit: info.ruler_unit,
        width: page.width(),
        height: page.height(),
    })?;

    // Create every layer first, then fill them.
    let source_layers = host.layers(source);
    let mut layer_map: HashMap<String, LayerId> = HashMap::with_capacity(source_layers.len());
    for layer in &source_layers {
        let src = host
            .layer_info(*layer)
            .ok_or(CutsplitError::LayerNotFound { id: layer.0 })?;
        let dst = host.add_layer(
            clone,
            &LayerInfo {
                name: src.name.clone(),
                visible: src.visible,
                locked: false,
                template: src.template,
                printable: src.printable,
            },
        )?;
        layer_map.insert(src.name, dst);
    }

    let mut report = DuplicationReport {
        document: clone,
        layers: layer_map.len(),
        duplicated: 0,
        failed: 0,
    };

    for layer in &source_layers {
        let Some(name) = host.layer_info(*layer).map(|l| l.name) else {
            continue;
        };
        let Some(&dst) = layer_map.get(&name) else {
            warn!("No destination layer for '{}'", name);
            continue;
        };

        let items = host.children(Container::Layer(*layer));
        if items.is_empty() {
            continue;
        }

        let chunk_size = options.chunk_size(items.len());
        let chunks = items.len().div_ceil(chunk_size);
        for (index, chunk) in items.chunks(chunk_size).enumerate() {
            for item in chunk {
                match host.duplicate(*item, Placement::AtEnd(Container::Layer(dst))) {
                    Ok(_) => report.duplicated += 1,
                    Err(e) => {
                        warn!("Error duplicating item {} on '{}': {}", item, name, e);
                        report.failed += 1;
                    }
                }
            }
            debug!("Layer '{}': chunk {}/{} copied", name, index + 1, chunks);
        }
    }

    info!(
        "Cloned {} layers, {} items ({} failed)",
        report.layers, report.duplicated, report.failed
    );
    Ok(report)
}
