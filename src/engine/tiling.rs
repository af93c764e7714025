//! Tiling Engine
//!
//! Replicates the visible part of an item across a sheet in a grid that
//! respects margins and a fixed gap, then centers the grid inside the
//! margin box. All lengths share one unit (points in practice).

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::partition::dissolve_group;
use crate::error::{CutsplitError, Result};
use crate::scene::{pt_to_mm, Bounds, Container, DocId, ItemId, Placement, Point, SceneHost};

/// Name given to the temporary placement container
pub const PLACEMENT_GROUP_NAME: &str = "Tiled Copies";

/// Largest number of copies one sheet may hold
pub const MAX_COPIES: usize = 10_000;

/// Page margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.left * factor,
            self.right * factor,
            self.top * factor,
            self.bottom * factor,
        )
    }
}

/// Target sheet and spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    pub page_width: f64,
    pub page_height: f64,
    pub margins: Margins,
    pub gap: f64,
}

impl TileRequest {
    pub fn available_width(&self) -> f64 {
        self.page_width - self.margins.left - self.margins.right
    }

    pub fn available_height(&self) -> f64 {
        self.page_height - self.margins.top - self.margins.bottom
    }
}

/// Computed grid for one clip size on one sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
    pub available_width: f64,
    pub available_height: f64,
}

impl GridLayout {
    pub fn count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn occupied_width(&self) -> f64 {
        self.cols as f64 * self.cell_width + (self.cols as f64 - 1.0) * self.gap
    }

    pub fn occupied_height(&self) -> f64 {
        self.rows as f64 * self.cell_height + (self.rows as f64 - 1.0) * self.gap
    }

    /// Offset that centers the grid inside the margin box, per axis
    pub fn centering_offset(&self) -> (f64, f64) {
        (
            (self.available_width - self.occupied_width()) / 2.0,
            (self.available_height - self.occupied_height()) / 2.0,
        )
    }

    /// Top-left corner of a cell before centering.
    ///
    /// Columns advance rightward from the left margin, rows advance
    /// downward from the top margin.
    pub fn cell_origin(&self, row: usize, col: usize, request: &TileRequest) -> Point {
        Point::new(
            request.margins.left + col as f64 * (self.cell_width + self.gap),
            request.page_height - request.margins.top - row as f64 * (self.cell_height + self.gap),
        )
    }
}

/// Clip an item's visible bounds to the artboard
pub fn clip_to_artboard(item: &Bounds, artboard: &Bounds) -> Result<Bounds> {
    let clip = item.intersect(artboard);
    if clip.width() <= 0.0 || clip.height() <= 0.0 {
        return Err(CutsplitError::NoOverlap);
    }
    Ok(clip)
}

/// Fit as many clip-sized cells as the margin box allows
pub fn compute_grid(clip: &Bounds, request: &TileRequest) -> Result<GridLayout> {
    let available_width = request.available_width();
    let available_height = request.available_height();
    let (w, h, gap) = (clip.width(), clip.height(), request.gap);

    let cols = ((available_width + gap) / (w + gap)).floor();
    let rows = ((available_height + gap) / (h + gap)).floor();
    if !(cols >= 1.0 && rows >= 1.0) {
        return Err(CutsplitError::DoesNotFit {
            width_mm: pt_to_mm(w),
            height_mm: pt_to_mm(h),
        });
    }
    if cols * rows > MAX_COPIES as f64 {
        return Err(CutsplitError::InvalidConfig {
            reason: format!(
                "{:.0} x {:.0} grid exceeds the {} copy limit for a {:.3}x{:.3} mm clip",
                rows,
                cols,
                MAX_COPIES,
                pt_to_mm(w),
                pt_to_mm(h)
            ),
        });
    }

    Ok(GridLayout {
        rows: rows as usize,
        cols: cols as usize,
        cell_width: w,
        cell_height: h,
        gap,
        available_width,
        available_height,
    })
}

/// Result of a tiling run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileReport {
    /// Document holding the copies
    pub document: DocId,
    pub rows: usize,
    pub cols: usize,
    pub count: usize,
    pub clip_width: f64,
    pub clip_height: f64,
}

/// Tile `item` into the first layer of `target`.
///
/// Fails before touching `target` if the item misses the artboard or one
/// copy does not fit the margin box.
pub fn tile_item<H: SceneHost + ?Sized>(
    host: &mut H,
    item: ItemId,
    artboard: &Bounds,
    target: DocId,
    request: &TileRequest,
) -> Result<TileReport> {
    let bounds = host
        .visible_bounds(item)
        .ok_or(CutsplitError::ItemNotFound { id: item.0 })?;
    let clip = clip_to_artboard(&bounds, artboard)?;
    let grid = compute_grid(&clip, request)?;
    debug!(
        "Clip {:.2}x{:.2} pt -> {} rows x {} cols",
        clip.width(),
        clip.height(),
        grid.rows,
        grid.cols
    );

    let layer = *host
        .layers(target)
        .first()
        .ok_or(CutsplitError::DocumentNotFound { id: target.0 })?;
    let layer = Container::Layer(layer);

    // The definition outlives its carrier. A duplicate keeps the source's
    // lock, so the carrier is unlocked before it is removed.
    let carrier = host.duplicate(item, Placement::AtBeginning(layer))?;
    host.set_item_locked(carrier, false)?;
    let template = host.define_template(target, carrier)?;
    host.remove(carrier)?;

    let copies = host.create_group(Placement::AtEnd(layer))?;
    host.set_item_name(copies, PLACEMENT_GROUP_NAME)?;

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let origin = grid.cell_origin(row, col, request);
            let instance = host.instantiate(template, Placement::AtEnd(layer), origin)?;
            let copy = host.detach(instance)?;
            host.move_item(copy, Placement::AtEnd(Container::Item(copies)))?;
        }
    }

    // Rows run downward, so vertical centering moves the grid down.
    let (dx, dy) = grid.centering_offset();
    host.translate(copies, dx, -dy)?;

    let mut move_failures = 0;
    if !dissolve_group(host, copies, &mut move_failures) {
        return Err(CutsplitError::InvalidScene {
            reason: format!(
                "could not ungroup {} ({} copies stuck)",
                PLACEMENT_GROUP_NAME, move_failures
            ),
        });
    }

    let report = TileReport {
        document: target,
        rows: grid.rows,
        cols: grid.cols,
        count: grid.count(),
        clip_width: clip.width(),
        clip_height: clip.height(),
    };
    info!(
        "Tiled {} copies ({} rows x {} cols)",
        report.count, report.rows, report.cols
    );
    Ok(report)
}
