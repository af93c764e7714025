//! Scene documents as stored on disk
//!
//! A document file is a JSON tree of layers and items. `MemoryHost` loads
//! it into an arena and snapshots it back into this shape for export.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::geometry::Bounds;
use super::paint::PaintSpec;
use crate::error::{CutsplitError, Result};

/// Document color space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    #[default]
    Cmyk,
    Rgb,
}

/// Unit shown on the document rulers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulerUnit {
    #[default]
    Points,
    Millimeters,
    Centimeters,
    Inches,
}

/// Index path to an item: layer index followed by child indices
pub type ItemPath = Vec<usize>;

fn default_true() -> bool {
    true
}

/// Persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub name: String,
    #[serde(default)]
    pub color_space: ColorSpace,
    #[serde(default)]
    pub ruler_unit: RulerUnit,
    /// Active artboard rectangle in points
    pub artboard: Bounds,
    #[serde(default)]
    pub layers: Vec<LayerData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<ItemPath>,
}

impl DocumentData {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            color_space: ColorSpace::default(),
            ruler_unit: RulerUnit::default(),
            artboard: Bounds::page(width, height),
            layers: Vec::new(),
            selection: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: LayerData) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_selection(mut self, path: ItemPath) -> Self {
        self.selection.push(path);
        self
    }

    /// Check structural invariants: unique layer names, resolvable selection
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.name.as_str()) {
                return Err(CutsplitError::DuplicateLayerName {
                    name: layer.name.clone(),
                });
            }
        }

        for path in &self.selection {
            if self.resolve(path).is_none() {
                return Err(CutsplitError::InvalidScene {
                    reason: format!("selection path {:?} does not point at an item", path),
                });
            }
        }

        Ok(())
    }

    /// Look up an item by index path
    pub fn resolve(&self, path: &[usize]) -> Option<&Item> {
        let (layer_index, rest) = path.split_first()?;
        let layer = self.layers.get(*layer_index)?;
        let (first, rest) = rest.split_first()?;
        let mut item = layer.items.get(*first)?;
        for index in rest {
            item = item.children()?.get(*index)?;
        }
        Some(item)
    }

    /// Number of path leaves across all layers
    pub fn path_count(&self) -> usize {
        self.layers.iter().map(|l| l.path_count()).sum()
    }

    pub fn layer(&self, name: &str) -> Option<&LayerData> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Persisted layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub template: bool,
    #[serde(default = "default_true")]
    pub printable: bool,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl LayerData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            template: false,
            printable: true,
            items: Vec::new(),
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn path_count(&self) -> usize {
        self.items.iter().map(Item::path_count).sum()
    }
}

/// Geometry and paint of a leaf path.
///
/// A missing stroke or fill means the attribute could not be read; an
/// unpainted path carries `PaintSpec::None` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<PaintSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<PaintSpec>,
}

/// Item variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemBody {
    Path(PathData),
    Group {
        #[serde(default)]
        children: Vec<Item>,
    },
    CompoundPath {
        #[serde(default)]
        children: Vec<Item>,
    },
}

/// Persisted page item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
    #[serde(flatten)]
    pub body: ItemBody,
}

impl Item {
    /// Unpainted path with the given bounds
    pub fn path(bounds: Bounds) -> Self {
        Self {
            name: None,
            locked: false,
            body: ItemBody::Path(PathData {
                bounds,
                stroke: Some(PaintSpec::None),
                fill: Some(PaintSpec::None),
            }),
        }
    }

    pub fn group(children: Vec<Item>) -> Self {
        Self {
            name: None,
            locked: false,
            body: ItemBody::Group { children },
        }
    }

    pub fn compound_path(children: Vec<Item>) -> Self {
        Self {
            name: None,
            locked: false,
            body: ItemBody::CompoundPath { children },
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Set the stroke; `None` models an unreadable attribute. No-op on containers.
    pub fn with_stroke(mut self, stroke: Option<PaintSpec>) -> Self {
        if let ItemBody::Path(path) = &mut self.body {
            path.stroke = stroke;
        }
        self
    }

    /// Set the fill; `None` models an unreadable attribute. No-op on containers.
    pub fn with_fill(mut self, fill: Option<PaintSpec>) -> Self {
        if let ItemBody::Path(path) = &mut self.body {
            path.fill = fill;
        }
        self
    }

    pub fn children(&self) -> Option<&Vec<Item>> {
        match &self.body {
            ItemBody::Path(_) => None,
            ItemBody::Group { children } | ItemBody::CompoundPath { children } => Some(children),
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self.body, ItemBody::Path(_))
    }

    /// Union of leaf bounds; `None` for an empty container
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.body {
            ItemBody::Path(path) => Some(path.bounds),
            ItemBody::Group { children } | ItemBody::CompoundPath { children } => children
                .iter()
                .filter_map(Item::bounds)
                .reduce(|a, b| a.union(&b)),
        }
    }

    /// Shift every leaf by the given offset
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match &mut self.body {
            ItemBody::Path(path) => path.bounds = path.bounds.translated(dx, dy),
            ItemBody::Group { children } | ItemBody::CompoundPath { children } => {
                for child in children {
                    child.translate(dx, dy);
                }
            }
        }
    }

    pub fn path_count(&self) -> usize {
        match &self.body {
            ItemBody::Path(_) => 1,
            ItemBody::Group { children } | ItemBody::CompoundPath { children } => {
                children.iter().map(Item::path_count).sum()
            }
        }
    }
}
