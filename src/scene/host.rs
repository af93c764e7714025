//! Scene capability interface
//!
//! The engines are written against `SceneHost` rather than a concrete
//! application. Accessors never fail: a missing document, layer or item
//! shows up as `None` or an empty collection. Mutators return `Result` and
//! are atomic per item.

use std::fmt;

use super::data::{ColorSpace, DocumentData, RulerUnit};
use super::geometry::{Bounds, Point};
use super::paint::PaintSpec;
use crate::error::Result;

macro_rules! scene_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

scene_id!(DocId);
scene_id!(LayerId);
scene_id!(ItemId);
scene_id!(TemplateId);

/// Something that holds an ordered list of items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Layer(LayerId),
    Item(ItemId),
}

/// Where a new or moved item lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AtBeginning(Container),
    AtEnd(Container),
    /// Immediately preceding a sibling, in the sibling's container
    Before(ItemId),
}

/// Item variants as seen through the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Path,
    Group,
    CompoundPath,
    /// Placed template instance that still links to its definition
    Instance,
}

impl ItemKind {
    /// Whether the item owns child items
    pub fn is_container(&self) -> bool {
        matches!(self, ItemKind::Group | ItemKind::CompoundPath)
    }
}

/// Layer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub template: bool,
    pub printable: bool,
}

impl LayerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            template: false,
            printable: true,
        }
    }
}

/// Document-level settings
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub name: String,
    pub color_space: ColorSpace,
    pub ruler_unit: RulerUnit,
}

/// Parameters for creating a document
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// `None` lets the host pick an "Untitled-N" name
    pub name: Option<String>,
    pub color_space: ColorSpace,
    pub ruler_unit: RulerUnit,
    /// Page width in points
    pub width: f64,
    /// Page height in points
    pub height: f64,
}

/// Attributes the classifier looks at on a leaf path.
///
/// `None` on stroke or fill means the attribute could not be read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathAttributes {
    pub name: Option<String>,
    pub stroke: Option<PaintSpec>,
    pub fill: Option<PaintSpec>,
}

/// Read/write access to a document scene graph
pub trait SceneHost {
    // Documents

    /// Open documents in open order
    fn documents(&self) -> Vec<DocId>;

    fn active_document(&self) -> Option<DocId>;

    fn set_active_document(&mut self, doc: DocId) -> Result<()>;

    fn document_info(&self, doc: DocId) -> Option<DocumentInfo>;

    /// Active artboard rectangle
    fn page_bounds(&self, doc: DocId) -> Option<Bounds>;

    fn selection(&self, doc: DocId) -> Vec<ItemId>;

    fn create_document(&mut self, setup: &NewDocument) -> Result<DocId>;

    /// Serializable copy of the whole document
    fn snapshot(&self, doc: DocId) -> Result<DocumentData>;

    // Layers

    fn layers(&self, doc: DocId) -> Vec<LayerId>;

    fn layer_info(&self, layer: LayerId) -> Option<LayerInfo>;

    fn set_layer_locked(&mut self, layer: LayerId, locked: bool) -> Result<()>;

    /// Append a layer after the existing ones
    fn add_layer(&mut self, doc: DocId, info: &LayerInfo) -> Result<LayerId>;

    // Items

    /// Current direct children of a container, as a detached list
    fn children(&self, container: Container) -> Vec<ItemId>;

    fn item_kind(&self, item: ItemId) -> Option<ItemKind>;

    /// Layer the item lives on
    fn item_layer(&self, item: ItemId) -> Option<LayerId>;

    /// Name and paint of a leaf path; `None` for anything else
    fn path_attributes(&self, item: ItemId) -> Option<PathAttributes>;

    fn visible_bounds(&self, item: ItemId) -> Option<Bounds>;

    /// Every group in the document, outermost first in stacking order
    fn groups(&self, doc: DocId) -> Vec<ItemId>;

    fn set_item_name(&mut self, item: ItemId, name: &str) -> Result<()>;

    /// Lock or unlock a single item; allowed on locked items
    fn set_item_locked(&mut self, item: ItemId, locked: bool) -> Result<()>;

    /// Deep copy; the copy has no link to its source
    fn duplicate(&mut self, item: ItemId, placement: Placement) -> Result<ItemId>;

    fn remove(&mut self, item: ItemId) -> Result<()>;

    fn move_item(&mut self, item: ItemId, placement: Placement) -> Result<()>;

    fn create_group(&mut self, placement: Placement) -> Result<ItemId>;

    fn translate(&mut self, item: ItemId, dx: f64, dy: f64) -> Result<()>;

    // Templates

    /// Capture an item as a reusable definition owned by `doc`
    fn define_template(&mut self, doc: DocId, item: ItemId) -> Result<TemplateId>;

    /// Place a linked instance whose top-left corner sits at `position`
    fn instantiate(
        &mut self,
        template: TemplateId,
        placement: Placement,
        position: Point,
    ) -> Result<ItemId>;

    /// Replace an instance with an independent copy of its definition
    fn detach(&mut self, instance: ItemId) -> Result<ItemId>;
}
