//! In-memory scene host
//!
//! Items live in an arena addressed by `ItemId`. Removed items leave a
//! tombstone so identifiers are never reused within one host.

use std::fs;
use std::path::Path;

use log::debug;

use super::data::{DocumentData, Item, ItemBody, ItemPath, LayerData, PathData};
use super::geometry::{Bounds, Point};
use super::host::{
    Container, DocId, DocumentInfo, ItemId, ItemKind, LayerId, LayerInfo, NewDocument,
    PathAttributes, Placement, SceneHost, TemplateId,
};
use super::paint::PaintSpec;
use crate::error::{CutsplitError, Result};

#[derive(Debug, Clone)]
struct DocumentSlot {
    info: DocumentInfo,
    artboard: Bounds,
    layers: Vec<LayerId>,
    selection: Vec<ItemId>,
}

#[derive(Debug, Clone)]
struct LayerSlot {
    doc: DocId,
    info: LayerInfo,
    items: Vec<ItemId>,
}

#[derive(Debug, Clone)]
enum NodeBody {
    Path {
        bounds: Bounds,
        stroke: Option<PaintSpec>,
        fill: Option<PaintSpec>,
    },
    Group(Vec<ItemId>),
    CompoundPath(Vec<ItemId>),
    Instance {
        template: TemplateId,
        origin: Point,
    },
}

#[derive(Debug, Clone)]
struct Node {
    layer: LayerId,
    parent: Container,
    name: Option<String>,
    locked: bool,
    body: NodeBody,
}

/// Scene host backed by plain vectors
#[derive(Debug, Default)]
pub struct MemoryHost {
    documents: Vec<Option<DocumentSlot>>,
    layers: Vec<LayerSlot>,
    nodes: Vec<Option<Node>>,
    /// Template definitions, independent of the items they came from
    templates: Vec<Item>,
    active: Option<DocId>,
    untitled_count: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a JSON document file; the document takes the file's name
    pub fn open(&mut self, path: &Path) -> Result<DocId> {
        let content = fs::read_to_string(path).map_err(|e| CutsplitError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut data: DocumentData = serde_json::from_str(&content)?;

        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            data.name = file_name.to_string();
        }

        debug!("Opened {} ({} paths)", path.display(), data.path_count());
        self.load_document(data)
    }

    /// Load a document tree and make it the active document
    pub fn load_document(&mut self, data: DocumentData) -> Result<DocId> {
        data.validate()?;

        let doc = DocId(self.documents.len());
        self.documents.push(Some(DocumentSlot {
            info: DocumentInfo {
                name: data.name.clone(),
                color_space: data.color_space,
                ruler_unit: data.ruler_unit,
            },
            artboard: data.artboard,
            layers: Vec::new(),
            selection: Vec::new(),
        }));

        for layer_data in &data.layers {
            let layer = self.push_layer(
                doc,
                LayerInfo {
                    name: layer_data.name.clone(),
                    visible: layer_data.visible,
                    locked: layer_data.locked,
                    template: layer_data.template,
                    printable: layer_data.printable,
                },
            );
            for item in &layer_data.items {
                let id = self.insert_tree(item, layer, Container::Layer(layer));
                self.layers[layer.0].items.push(id);
            }
        }

        let mut selection = Vec::new();
        for path in &data.selection {
            let id = self
                .resolve_path(doc, path)
                .ok_or_else(|| CutsplitError::InvalidScene {
                    reason: format!("selection path {:?} does not point at an item", path),
                })?;
            selection.push(id);
        }
        if let Some(slot) = self.documents[doc.0].as_mut() {
            slot.selection = selection;
        }

        self.active = Some(doc);
        Ok(doc)
    }

    /// Find the first item with the given name, depth first
    pub fn find_by_name(&self, doc: DocId, name: &str) -> Option<ItemId> {
        let mut stack: Vec<ItemId> = Vec::new();
        for layer in self.layers(doc).into_iter().rev() {
            stack.extend(self.layers[layer.0].items.iter().rev().copied());
        }

        while let Some(id) = stack.pop() {
            let node = self.node(id).ok()?;
            if node.name.as_deref() == Some(name) {
                return Some(id);
            }
            if let Some(children) = node_children(&node.body) {
                stack.extend(children.iter().rev().copied());
            }
        }
        None
    }

    /// Find a layer by name
    pub fn layer_by_name(&self, doc: DocId, name: &str) -> Option<LayerId> {
        self.layers(doc)
            .into_iter()
            .find(|l| self.layers[l.0].info.name == name)
    }

    pub fn set_selection(&mut self, doc: DocId, items: Vec<ItemId>) -> Result<()> {
        self.doc_slot_mut(doc)?.selection = items;
        Ok(())
    }

    /// Whether an item is still alive in the arena
    pub fn contains(&self, item: ItemId) -> bool {
        matches!(self.nodes.get(item.0), Some(Some(_)))
    }

    // Internal helpers

    fn doc_slot(&self, doc: DocId) -> Result<&DocumentSlot> {
        self.documents
            .get(doc.0)
            .and_then(|d| d.as_ref())
            .ok_or(CutsplitError::DocumentNotFound { id: doc.0 })
    }

    fn doc_slot_mut(&mut self, doc: DocId) -> Result<&mut DocumentSlot> {
        self.documents
            .get_mut(doc.0)
            .and_then(|d| d.as_mut())
            .ok_or(CutsplitError::DocumentNotFound { id: doc.0 })
    }

    fn layer_slot(&self, layer: LayerId) -> Result<&LayerSlot> {
        self.layers
            .get(layer.0)
            .ok_or(CutsplitError::LayerNotFound { id: layer.0 })
    }

    fn node(&self, item: ItemId) -> Result<&Node> {
        self.nodes
            .get(item.0)
            .and_then(|n| n.as_ref())
            .ok_or(CutsplitError::ItemNotFound { id: item.0 })
    }

    fn node_mut(&mut self, item: ItemId) -> Result<&mut Node> {
        self.nodes
            .get_mut(item.0)
            .and_then(|n| n.as_mut())
            .ok_or(CutsplitError::ItemNotFound { id: item.0 })
    }

    fn push_layer(&mut self, doc: DocId, info: LayerInfo) -> LayerId {
        let layer = LayerId(self.layers.len());
        self.layers.push(LayerSlot {
            doc,
            info,
            items: Vec::new(),
        });
        if let Some(Some(slot)) = self.documents.get_mut(doc.0) {
            slot.layers.push(layer);
        }
        layer
    }

    fn resolve_path(&self, doc: DocId, path: &[usize]) -> Option<ItemId> {
        let (layer_index, rest) = path.split_first()?;
        let layer = *self.doc_slot(doc).ok()?.layers.get(*layer_index)?;
        let mut container = Container::Layer(layer);
        let mut found = None;
        for index in rest {
            let id = *self.children(container).get(*index)?;
            container = Container::Item(id);
            found = Some(id);
        }
        found
    }

    fn item_path(&self, item: ItemId) -> Option<ItemPath> {
        let mut path = Vec::new();
        let mut current = item;
        loop {
            let node = self.node(current).ok()?;
            let siblings = self.children(node.parent);
            path.push(siblings.iter().position(|id| *id == current)?);
            match node.parent {
                Container::Item(parent) => current = parent,
                Container::Layer(layer) => {
                    let doc = self.layer_slot(layer).ok()?.doc;
                    let index = self.doc_slot(doc).ok()?.layers.iter().position(|l| *l == layer)?;
                    path.push(index);
                    break;
                }
            }
        }
        path.reverse();
        Some(path)
    }

    /// Allocate nodes for an item tree
    fn insert_tree(&mut self, item: &Item, layer: LayerId, parent: Container) -> ItemId {
        let id = ItemId(self.nodes.len());
        let body = match &item.body {
            ItemBody::Path(path) => NodeBody::Path {
                bounds: path.bounds,
                stroke: path.stroke.clone(),
                fill: path.fill.clone(),
            },
            ItemBody::Group { .. } => NodeBody::Group(Vec::new()),
            ItemBody::CompoundPath { .. } => NodeBody::CompoundPath(Vec::new()),
        };
        self.nodes.push(Some(Node {
            layer,
            parent,
            name: item.name.clone(),
            locked: item.locked,
            body,
        }));

        if let Some(children) = item.children() {
            let ids: Vec<ItemId> = children
                .iter()
                .map(|child| self.insert_tree(child, layer, Container::Item(id)))
                .collect();
            if let Some(Some(node)) = self.nodes.get_mut(id.0) {
                if let NodeBody::Group(list) | NodeBody::CompoundPath(list) = &mut node.body {
                    *list = ids;
                }
            }
        }
        id
    }

    /// Rebuild the persisted tree for an item; instances are materialized
    fn export_tree(&self, item: ItemId) -> Result<Item> {
        let node = self.node(item)?;
        let mut exported = match &node.body {
            NodeBody::Path {
                bounds,
                stroke,
                fill,
            } => Item {
                name: None,
                locked: false,
                body: ItemBody::Path(PathData {
                    bounds: *bounds,
                    stroke: stroke.clone(),
                    fill: fill.clone(),
                }),
            },
            NodeBody::Group(children) => Item::group(
                children
                    .iter()
                    .map(|c| self.export_tree(*c))
                    .collect::<Result<Vec<_>>>()?,
            ),
            NodeBody::CompoundPath(children) => Item::compound_path(
                children
                    .iter()
                    .map(|c| self.export_tree(*c))
                    .collect::<Result<Vec<_>>>()?,
            ),
            NodeBody::Instance { template, origin } => self.materialize(*template, *origin)?,
        };
        if node.name.is_some() {
            exported.name = node.name.clone();
        }
        exported.locked = node.locked;
        Ok(exported)
    }

    /// Copy of a template's definition with its top-left corner at `origin`
    fn materialize(&self, template: TemplateId, origin: Point) -> Result<Item> {
        let mut item = self
            .templates
            .get(template.0)
            .cloned()
            .ok_or(CutsplitError::TemplateNotFound { id: template.0 })?;
        if let Some(bounds) = item.bounds() {
            item.translate(origin.x - bounds.left, origin.y - bounds.top);
        }
        Ok(item)
    }

    fn drop_tree(&mut self, item: ItemId) {
        if let Some(node) = self.nodes.get_mut(item.0).and_then(|n| n.take()) {
            if let Some(children) = node_children(&node.body) {
                for child in children.clone() {
                    self.drop_tree(child);
                }
            }
        }
    }

    fn relayer_tree(&mut self, item: ItemId, layer: LayerId) {
        let children = match self.nodes.get_mut(item.0).and_then(|n| n.as_mut()) {
            Some(node) => {
                node.layer = layer;
                node_children(&node.body).cloned().unwrap_or_default()
            }
            None => return,
        };
        for child in children {
            self.relayer_tree(child, layer);
        }
    }

    fn child_list(&self, container: Container) -> Result<&Vec<ItemId>> {
        match container {
            Container::Layer(layer) => Ok(&self.layer_slot(layer)?.items),
            Container::Item(item) => node_children(&self.node(item)?.body).ok_or_else(|| {
                CutsplitError::InvalidPlacement {
                    reason: format!("item {} cannot hold children", item),
                }
            }),
        }
    }

    fn child_list_mut(&mut self, container: Container) -> Result<&mut Vec<ItemId>> {
        match container {
            Container::Layer(layer) => Ok(&mut self
                .layers
                .get_mut(layer.0)
                .ok_or(CutsplitError::LayerNotFound { id: layer.0 })?
                .items),
            Container::Item(item) => match &mut self.node_mut(item)?.body {
                NodeBody::Group(list) | NodeBody::CompoundPath(list) => Ok(list),
                _ => Err(CutsplitError::InvalidPlacement {
                    reason: format!("item {} cannot hold children", item),
                }),
            },
        }
    }

    fn container_layer(&self, container: Container) -> Result<LayerId> {
        match container {
            Container::Layer(layer) => {
                self.layer_slot(layer)?;
                Ok(layer)
            }
            Container::Item(item) => Ok(self.node(item)?.layer),
        }
    }

    /// Resolve a placement to a container and insertion index
    fn resolve_placement(&self, placement: Placement) -> Result<(Container, usize)> {
        match placement {
            Placement::AtBeginning(container) => {
                self.child_list(container)?;
                Ok((container, 0))
            }
            Placement::AtEnd(container) => Ok((container, self.child_list(container)?.len())),
            Placement::Before(sibling) => {
                let parent = self.node(sibling)?.parent;
                let index = self
                    .child_list(parent)?
                    .iter()
                    .position(|id| *id == sibling)
                    .ok_or(CutsplitError::ItemNotFound { id: sibling.0 })?;
                Ok((parent, index))
            }
        }
    }

    fn check_layer_writable(&self, layer: LayerId) -> Result<()> {
        let slot = self.layer_slot(layer)?;
        if slot.info.locked {
            return Err(CutsplitError::LayerLocked {
                name: slot.info.name.clone(),
            });
        }
        Ok(())
    }

    fn check_editable(&self, item: ItemId) -> Result<()> {
        let node = self.node(item)?;
        if node.locked {
            return Err(CutsplitError::ItemLocked { id: item.0 });
        }
        self.check_layer_writable(node.layer)
    }

    fn is_same_or_ancestor(&self, ancestor: ItemId, item: ItemId) -> bool {
        let mut current = item;
        loop {
            if current == ancestor {
                return true;
            }
            match self.node(current).map(|n| n.parent) {
                Ok(Container::Item(parent)) => current = parent,
                _ => return false,
            }
        }
    }

    /// Insert a fresh tree at a placement after checking the destination
    fn place_tree(&mut self, item: &Item, placement: Placement) -> Result<ItemId> {
        let (container, index) = self.resolve_placement(placement)?;
        let layer = self.container_layer(container)?;
        self.check_layer_writable(layer)?;

        let id = self.insert_tree(item, layer, container);
        self.child_list_mut(container)?.insert(index, id);
        Ok(id)
    }

    /// Unlink an item from its parent's child list
    fn unlink(&mut self, item: ItemId) -> Result<()> {
        let parent = self.node(item)?.parent;
        let list = self.child_list_mut(parent)?;
        if let Some(pos) = list.iter().position(|id| *id == item) {
            list.remove(pos);
        }
        Ok(())
    }

    fn bounds_of(&self, item: ItemId) -> Option<Bounds> {
        let node = self.node(item).ok()?;
        match &node.body {
            NodeBody::Path { bounds, .. } => Some(*bounds),
            NodeBody::Group(children) | NodeBody::CompoundPath(children) => children
                .iter()
                .filter_map(|c| self.bounds_of(*c))
                .reduce(|a, b| a.union(&b)),
            NodeBody::Instance { template, origin } => {
                self.materialize(*template, *origin).ok()?.bounds()
            }
        }
    }

    fn translate_tree(&mut self, item: ItemId, dx: f64, dy: f64) {
        let children = match self.nodes.get_mut(item.0).and_then(|n| n.as_mut()) {
            Some(node) => match &mut node.body {
                NodeBody::Path { bounds, .. } => {
                    *bounds = bounds.translated(dx, dy);
                    Vec::new()
                }
                NodeBody::Instance { origin, .. } => {
                    origin.x += dx;
                    origin.y += dy;
                    Vec::new()
                }
                NodeBody::Group(children) | NodeBody::CompoundPath(children) => children.clone(),
            },
            None => return,
        };
        for child in children {
            self.translate_tree(child, dx, dy);
        }
    }
}

fn node_children(body: &NodeBody) -> Option<&Vec<ItemId>> {
    match body {
        NodeBody::Group(children) | NodeBody::CompoundPath(children) => Some(children),
        _ => None,
    }
}

impl SceneHost for MemoryHost {
    fn documents(&self) -> Vec<DocId> {
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some())
            .map(|(i, _)| DocId(i))
            .collect()
    }

    fn active_document(&self) -> Option<DocId> {
        self.active.filter(|doc| self.doc_slot(*doc).is_ok())
    }

    fn set_active_document(&mut self, doc: DocId) -> Result<()> {
        self.doc_slot(doc)?;
        self.active = Some(doc);
        Ok(())
    }

    fn document_info(&self, doc: DocId) -> Option<DocumentInfo> {
        self.doc_slot(doc).ok().map(|d| d.info.clone())
    }

    fn page_bounds(&self, doc: DocId) -> Option<Bounds> {
        self.doc_slot(doc).ok().map(|d| d.artboard)
    }

    fn selection(&self, doc: DocId) -> Vec<ItemId> {
        self.doc_slot(doc)
            .map(|d| {
                d.selection
                    .iter()
                    .copied()
                    .filter(|id| self.contains(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn create_document(&mut self, setup: &NewDocument) -> Result<DocId> {
        if !(setup.width > 0.0 && setup.height > 0.0) {
            return Err(CutsplitError::InvalidScene {
                reason: format!("page size {}x{} is not positive", setup.width, setup.height),
            });
        }

        let name = match &setup.name {
            Some(name) => name.clone(),
            None => {
                self.untitled_count += 1;
                format!("Untitled-{}", self.untitled_count)
            }
        };

        let doc = DocId(self.documents.len());
        self.documents.push(Some(DocumentSlot {
            info: DocumentInfo {
                name,
                color_space: setup.color_space,
                ruler_unit: setup.ruler_unit,
            },
            artboard: Bounds::page(setup.width, setup.height),
            layers: Vec::new(),
            selection: Vec::new(),
        }));
        self.active = Some(doc);
        Ok(doc)
    }

    fn snapshot(&self, doc: DocId) -> Result<DocumentData> {
        let slot = self.doc_slot(doc)?;
        let mut layers = Vec::with_capacity(slot.layers.len());
        for layer in &slot.layers {
            let layer_slot = self.layer_slot(*layer)?;
            layers.push(LayerData {
                name: layer_slot.info.name.clone(),
                visible: layer_slot.info.visible,
                locked: layer_slot.info.locked,
                template: layer_slot.info.template,
                printable: layer_slot.info.printable,
                items: layer_slot
                    .items
                    .iter()
                    .map(|id| self.export_tree(*id))
                    .collect::<Result<Vec<_>>>()?,
            });
        }

        Ok(DocumentData {
            name: slot.info.name.clone(),
            color_space: slot.info.color_space,
            ruler_unit: slot.info.ruler_unit,
            artboard: slot.artboard,
            layers,
            selection: slot
                .selection
                .iter()
                .filter_map(|id| self.item_path(*id))
                .collect(),
        })
    }

    fn layers(&self, doc: DocId) -> Vec<LayerId> {
        self.doc_slot(doc)
            .map(|d| d.layers.clone())
            .unwrap_or_default()
    }

    fn layer_info(&self, layer: LayerId) -> Option<LayerInfo> {
        self.layer_slot(layer).ok().map(|l| l.info.clone())
    }

    fn set_layer_locked(&mut self, layer: LayerId, locked: bool) -> Result<()> {
        self.layers
            .get_mut(layer.0)
            .ok_or(CutsplitError::LayerNotFound { id: layer.0 })?
            .info
            .locked = locked;
        Ok(())
    }

    fn add_layer(&mut self, doc: DocId, info: &LayerInfo) -> Result<LayerId> {
        let taken = self
            .doc_slot(doc)?
            .layers
            .iter()
            .any(|l| self.layers[l.0].info.name == info.name);
        if taken {
            return Err(CutsplitError::DuplicateLayerName {
                name: info.name.clone(),
            });
        }
        Ok(self.push_layer(doc, info.clone()))
    }

    fn children(&self, container: Container) -> Vec<ItemId> {
        self.child_list(container).cloned().unwrap_or_default()
    }

    fn item_kind(&self, item: ItemId) -> Option<ItemKind> {
        self.node(item).ok().map(|n| match n.body {
            NodeBody::Path { .. } => ItemKind::Path,
            NodeBody::Group(_) => ItemKind::Group,
            NodeBody::CompoundPath(_) => ItemKind::CompoundPath,
            NodeBody::Instance { .. } => ItemKind::Instance,
        })
    }

    fn item_layer(&self, item: ItemId) -> Option<LayerId> {
        self.node(item).ok().map(|n| n.layer)
    }

    fn path_attributes(&self, item: ItemId) -> Option<PathAttributes> {
        let node = self.node(item).ok()?;
        match &node.body {
            NodeBody::Path { stroke, fill, .. } => Some(PathAttributes {
                name: node.name.clone(),
                stroke: stroke.clone(),
                fill: fill.clone(),
            }),
            _ => None,
        }
    }

    fn visible_bounds(&self, item: ItemId) -> Option<Bounds> {
        self.bounds_of(item)
    }

    fn groups(&self, doc: DocId) -> Vec<ItemId> {
        let mut groups = Vec::new();
        let mut stack: Vec<ItemId> = Vec::new();
        for layer in self.layers(doc) {
            stack.extend(self.layers[layer.0].items.iter().rev().copied());
            while let Some(id) = stack.pop() {
                let Ok(node) = self.node(id) else { continue };
                if matches!(node.body, NodeBody::Group(_)) {
                    groups.push(id);
                }
                if let Some(children) = node_children(&node.body) {
                    stack.extend(children.iter().rev().copied());
                }
            }
        }
        groups
    }

    fn set_item_name(&mut self, item: ItemId, name: &str) -> Result<()> {
        self.check_editable(item)?;
        self.node_mut(item)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_item_locked(&mut self, item: ItemId, locked: bool) -> Result<()> {
        self.node_mut(item)?.locked = locked;
        Ok(())
    }

    fn duplicate(&mut self, item: ItemId, placement: Placement) -> Result<ItemId> {
        self.check_layer_writable(self.node(item)?.layer)?;
        let tree = self.export_tree(item)?;
        self.place_tree(&tree, placement)
    }

    fn remove(&mut self, item: ItemId) -> Result<()> {
        self.check_editable(item)?;
        self.unlink(item)?;
        self.drop_tree(item);
        Ok(())
    }

    fn move_item(&mut self, item: ItemId, placement: Placement) -> Result<()> {
        self.check_editable(item)?;
        if let Placement::Before(sibling) = placement {
            if sibling == item {
                return Err(CutsplitError::InvalidPlacement {
                    reason: format!("item {} cannot be placed before itself", item),
                });
            }
        }

        let (container, _) = self.resolve_placement(placement)?;
        if let Container::Item(target) = container {
            if self.is_same_or_ancestor(item, target) {
                return Err(CutsplitError::InvalidPlacement {
                    reason: format!("item {} cannot move inside itself", item),
                });
            }
        }
        let layer = self.container_layer(container)?;
        self.check_layer_writable(layer)?;

        self.unlink(item)?;
        // Resolve again: unlinking may shift the target index.
        let (container, index) = self.resolve_placement(placement)?;
        self.child_list_mut(container)?.insert(index, item);
        self.node_mut(item)?.parent = container;
        self.relayer_tree(item, layer);
        Ok(())
    }

    fn create_group(&mut self, placement: Placement) -> Result<ItemId> {
        self.place_tree(&Item::group(Vec::new()), placement)
    }

    fn translate(&mut self, item: ItemId, dx: f64, dy: f64) -> Result<()> {
        self.check_editable(item)?;
        self.translate_tree(item, dx, dy);
        Ok(())
    }

    fn define_template(&mut self, doc: DocId, item: ItemId) -> Result<TemplateId> {
        self.doc_slot(doc)?;
        let mut prototype = self.export_tree(item)?;
        // Placed instances start unlocked.
        prototype.locked = false;
        let template = TemplateId(self.templates.len());
        self.templates.push(prototype);
        Ok(template)
    }

    fn instantiate(
        &mut self,
        template: TemplateId,
        placement: Placement,
        position: Point,
    ) -> Result<ItemId> {
        if template.0 >= self.templates.len() {
            return Err(CutsplitError::TemplateNotFound { id: template.0 });
        }
        let (container, index) = self.resolve_placement(placement)?;
        let layer = self.container_layer(container)?;
        self.check_layer_writable(layer)?;

        let id = ItemId(self.nodes.len());
        self.nodes.push(Some(Node {
            layer,
            parent: container,
            name: None,
            locked: false,
            body: NodeBody::Instance {
                template,
                origin: position,
            },
        }));
        self.child_list_mut(container)?.insert(index, id);
        Ok(id)
    }

    fn detach(&mut self, instance: ItemId) -> Result<ItemId> {
        self.check_editable(instance)?;
        let node = self.node(instance)?;
        let NodeBody::Instance { template, origin } = node.body else {
            return Err(CutsplitError::InvalidPlacement {
                reason: format!("item {} is not a template instance", instance),
            });
        };
        let name = node.name.clone();

        let mut copy = self.materialize(template, origin)?;
        if name.is_some() {
            copy.name = name;
        }
        let id = self.place_tree(&copy, Placement::Before(instance))?;
        self.unlink(instance)?;
        self.drop_tree(instance);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64) -> Item {
        Item::path(Bounds::new(x, y + 10.0, x + 10.0, y))
    }

    fn sample() -> (MemoryHost, DocId) {
        let data = DocumentData::new("12345_250_RedBox.ai", 200.0, 100.0)
            .with_layer(
                LayerData::new("Art")
                    .with_item(square(0.0, 0.0).named("a"))
                    .with_item(Item::group(vec![
                        square(20.0, 0.0).named("b"),
                        Item::group(vec![square(40.0, 0.0).named("c")]).named("inner"),
                    ])
                    .named("outer")),
            )
            .with_layer(LayerData::new("Marks").locked().with_item(square(90.0, 0.0).named("m")))
            .with_selection(vec![0, 1, 0]);
        let mut host = MemoryHost::new();
        let doc = host.load_document(data).unwrap();
        (host, doc)
    }

    #[test]
    fn test_load_and_snapshot_roundtrip() {
        let (host, doc) = sample();
        let snapshot = host.snapshot(doc).unwrap();
        assert_eq!(snapshot.layers.len(), 2);
        assert_eq!(snapshot.path_count(), 4);
        assert_eq!(snapshot.selection, vec![vec![0, 1, 0]]);
        assert_eq!(host.selection(doc), vec![host.find_by_name(doc, "b").unwrap()]);
    }

    #[test]
    fn test_groups_outermost_first() {
        let (host, doc) = sample();
        let groups = host.groups(doc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], host.find_by_name(doc, "outer").unwrap());
        assert_eq!(groups[1], host.find_by_name(doc, "inner").unwrap());
    }

    #[test]
    fn test_remove_in_locked_layer_fails() {
        let (mut host, doc) = sample();
        let marks = host.find_by_name(doc, "m").unwrap();
        assert!(matches!(
            host.remove(marks),
            Err(CutsplitError::LayerLocked { .. })
        ));
        assert!(host.contains(marks));
    }

    #[test]
    fn test_move_before_sibling() {
        let (mut host, doc) = sample();
        let outer = host.find_by_name(doc, "outer").unwrap();
        let b = host.find_by_name(doc, "b").unwrap();
        host.move_item(b, Placement::Before(outer)).unwrap();

        let art = host.layer_by_name(doc, "Art").unwrap();
        let top = host.children(Container::Layer(art));
        assert_eq!(top[1], b);
        assert_eq!(top[2], outer);
    }

    #[test]
    fn test_move_into_own_descendant_rejected() {
        let (mut host, doc) = sample();
        let outer = host.find_by_name(doc, "outer").unwrap();
        let inner = host.find_by_name(doc, "inner").unwrap();
        assert!(matches!(
            host.move_item(outer, Placement::AtEnd(Container::Item(inner))),
            Err(CutsplitError::InvalidPlacement { .. })
        ));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let (mut host, doc) = sample();
        let art = host.layer_by_name(doc, "Art").unwrap();
        let outer = host.find_by_name(doc, "outer").unwrap();
        let copy = host
            .duplicate(outer, Placement::AtEnd(Container::Layer(art)))
            .unwrap();

        host.remove(outer).unwrap();
        assert!(host.contains(copy));
        assert_eq!(host.children(Container::Item(copy)).len(), 2);
    }

    #[test]
    fn test_template_instance_detach() {
        let (mut host, doc) = sample();
        let art = host.layer_by_name(doc, "Art").unwrap();
        let a = host.find_by_name(doc, "a").unwrap();
        let template = host.define_template(doc, a).unwrap();
        host.remove(a).unwrap();

        let instance = host
            .instantiate(template, Placement::AtEnd(Container::Layer(art)), Point::new(100.0, 50.0))
            .unwrap();
        assert_eq!(host.item_kind(instance), Some(ItemKind::Instance));
        assert_eq!(
            host.visible_bounds(instance),
            Some(Bounds::new(100.0, 50.0, 110.0, 40.0))
        );

        let detached = host.detach(instance).unwrap();
        assert!(!host.contains(instance));
        assert_eq!(host.item_kind(detached), Some(ItemKind::Path));
        assert_eq!(
            host.visible_bounds(detached),
            Some(Bounds::new(100.0, 50.0, 110.0, 40.0))
        );
    }

    #[test]
    fn test_template_of_locked_item_places_unlocked_copies() {
        let (mut host, doc) = sample();
        let art = host.layer_by_name(doc, "Art").unwrap();
        let a = host.find_by_name(doc, "a").unwrap();
        host.set_item_locked(a, true).unwrap();
        assert!(matches!(host.remove(a), Err(CutsplitError::ItemLocked { .. })));

        let template = host.define_template(doc, a).unwrap();
        let instance = host
            .instantiate(template, Placement::AtEnd(Container::Layer(art)), Point::new(0.0, 50.0))
            .unwrap();
        let copy = host.detach(instance).unwrap();
        host.move_item(copy, Placement::AtBeginning(Container::Layer(art)))
            .unwrap();

        host.set_item_locked(a, false).unwrap();
        host.remove(a).unwrap();
    }

    #[test]
    fn test_create_document_untitled_names() {
        let mut host = MemoryHost::new();
        let setup = NewDocument {
            name: None,
            color_space: Default::default(),
            ruler_unit: Default::default(),
            width: 100.0,
            height: 100.0,
        };
        let first = host.create_document(&setup).unwrap();
        let second = host.create_document(&setup).unwrap();
        assert_eq!(host.document_info(first).unwrap().name, "Untitled-1");
        assert_eq!(host.document_info(second).unwrap().name, "Untitled-2");
        assert_eq!(host.active_document(), Some(second));
    }

    #[test]
    fn test_add_layer_rejects_duplicate_name() {
        let (mut host, doc) = sample();
        assert!(host.add_layer(doc, &LayerInfo::new("Art")).is_err());
        assert!(host.add_layer(doc, &LayerInfo::new("Cut")).is_ok());
    }
}
