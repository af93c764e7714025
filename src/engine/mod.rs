//! Scene Engines
//!
//! The algorithms that run against a `SceneHost`:
//! - Duplication: clone a document layer by layer
//! - Partition: split original and clone by cut-line classification
//! - Tiling: lay out copies of a clipped item on a sheet

pub mod duplicate;
pub mod partition;
pub mod tiling;

pub use duplicate::{
    duplicate_document, restore_lock_state, unlock_all_layers, DuplicationOptions,
    DuplicationReport, LockState,
};
pub use partition::{
    flatten_groups, keep_only_cut_items, partition, remove_cut_items, FlattenReport, KeepReport,
    PartitionReport, RemovalReport,
};
pub use tiling::{
    clip_to_artboard, compute_grid, tile_item, GridLayout, Margins, TileReport, TileRequest,
    MAX_COPIES, PLACEMENT_GROUP_NAME,
};
