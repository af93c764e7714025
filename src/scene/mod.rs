//! Scene Model
//!
//! Documents, layers and items, the capability trait the engines run
//! against, and an in-memory host backed by JSON documents.

mod data;
mod geometry;
mod host;
mod memory;
mod paint;

pub use data::{
    ColorSpace, DocumentData, Item, ItemBody, ItemPath, LayerData, PathData, RulerUnit,
};
pub use geometry::{mm_to_pt, pt_to_mm, Bounds, Point, POINTS_PER_MM};
pub use host::{
    Container, DocId, DocumentInfo, ItemId, ItemKind, LayerId, LayerInfo, NewDocument,
    PathAttributes, Placement, SceneHost, TemplateId,
};
pub use memory::MemoryHost;
pub use paint::{PaintSpec, ProcessColor, Rgb};
