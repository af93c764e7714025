//! Cutsplit - Prepress Print/Cut Separation
//!
//! Cutsplit takes artwork that mixes printable geometry with cut lines and
//! produces two complementary documents:
//! 1. Print - everything except the cut lines
//! 2. Cut - only the cut lines, with groups flattened for the plotter
//!
//! A second operation tiles a selected object across a sheet.
//!
//! # Architecture
//!
//! - `scene`: document model and the `SceneHost` capability trait
//! - `classify`: the cut-line predicate and protected layers
//! - `engine`: duplication, partition and tiling algorithms
//! - `export`: output naming and artifact sinks
//! - `pipeline`: the operations, wired from the pieces above

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod scene;

pub use error::{CutsplitError, Result};
