//! Cut-line classification
//!
//! Decides whether a leaf path is a cut line. The decision is pure and
//! total: anything unreadable resolves to "not a cut line".
//!
//! Decision order, first match wins:
//! 1. Item name equals the marker
//! 2. Stroke is a spot color named like the marker
//! 3. Stroke spot fallback equals the marker RGB triple
//! 4. The same two spot checks against the fill

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::scene::{ItemId, LayerId, PaintSpec, PathAttributes, Rgb, SceneHost};

/// Default marker name used by cutting plotters
pub const DEFAULT_MARKER_NAME: &str = "CutContour";

/// Default spot fallback triple for the marker
pub const DEFAULT_MARKER_RGB: Rgb = Rgb::new(230, 46, 146);

/// Layers produced by the cutter's registration tooling
pub const DEFAULT_PROTECTED_LAYERS: [&str; 3] =
    ["scpro2_regmarks", "scpro2_printonly", "scpro2_printmargin"];

/// What marks a path as a cut line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutMarker {
    pub name: String,
    pub fallback_rgb: Rgb,
}

impl Default for CutMarker {
    fn default() -> Self {
        Self {
            name: DEFAULT_MARKER_NAME.to_string(),
            fallback_rgb: DEFAULT_MARKER_RGB,
        }
    }
}

impl CutMarker {
    /// Classify a leaf path by its attributes
    pub fn matches(&self, attrs: &PathAttributes) -> bool {
        if attrs.name.as_deref() == Some(self.name.as_str()) {
            return true;
        }

        [attrs.stroke.as_ref(), attrs.fill.as_ref()]
            .into_iter()
            .flatten()
            .any(|paint| self.matches_paint(paint))
    }

    fn matches_paint(&self, paint: &PaintSpec) -> bool {
        match paint.as_spot() {
            Some((spot_name, fallback)) => {
                spot_name == self.name || fallback.as_rgb() == Some(self.fallback_rgb)
            }
            None => false,
        }
    }
}

/// Fixed set of layer names exempt from partitioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedLayers {
    names: BTreeSet<String>,
}

impl Default for ProtectedLayers {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_LAYERS)
    }
}

impl ProtectedLayers {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, layer_name: &str) -> bool {
        self.names.contains(layer_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Marker plus protected-layer set, shared by both partition walks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classifier {
    pub marker: CutMarker,
    pub protected: ProtectedLayers,
}

impl Classifier {
    pub fn new(marker: CutMarker, protected: ProtectedLayers) -> Self {
        Self { marker, protected }
    }

    /// Whether the item is a leaf path carrying the cut marker.
    ///
    /// Containers and unknown items never match.
    pub fn is_cut_item<H: SceneHost + ?Sized>(&self, host: &H, item: ItemId) -> bool {
        host.path_attributes(item)
            .map(|attrs| self.marker.matches(&attrs))
            .unwrap_or(false)
    }

    /// Whether the layer is exempt from classification and mutation.
    ///
    /// An unreadable layer is treated as protected so it is left alone.
    pub fn is_protected<H: SceneHost + ?Sized>(&self, host: &H, layer: LayerId) -> bool {
        host.layer_info(layer)
            .map(|info| self.protected.contains(&info.name))
            .unwrap_or(true)
    }
}
