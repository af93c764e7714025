//! Paint attributes
//!
//! Paint is decided once when scene data is loaded. Engines match on
//! `PaintSpec` instead of probing host objects at runtime.

use serde::{Deserialize, Serialize};

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// A process (non-spot) color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessColor {
    Rgb(Rgb),
    Cmyk {
        cyan: f64,
        magenta: f64,
        yellow: f64,
        black: f64,
    },
    Gray(f64),
}

impl ProcessColor {
    /// The RGB triple, if this color is expressed in RGB
    pub fn as_rgb(&self) -> Option<Rgb> {
        match self {
            ProcessColor::Rgb(rgb) => Some(*rgb),
            _ => None,
        }
    }
}

/// Stroke or fill paint of a path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintSpec {
    /// Not stroked / not filled
    #[default]
    None,
    Process(ProcessColor),
    Spot {
        name: String,
        fallback: ProcessColor,
    },
}

impl PaintSpec {
    pub fn spot(name: impl Into<String>, fallback: ProcessColor) -> Self {
        PaintSpec::Spot {
            name: name.into(),
            fallback,
        }
    }

    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        PaintSpec::Process(ProcessColor::Rgb(Rgb::new(red, green, blue)))
    }

    /// Spot name and fallback color, if this is a spot paint
    pub fn as_spot(&self) -> Option<(&str, &ProcessColor)> {
        match self {
            PaintSpec::Spot { name, fallback } => Some((name.as_str(), fallback)),
            _ => None,
        }
    }

    pub fn is_painted(&self) -> bool {
        !matches!(self, PaintSpec::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_accessor() {
        let paint = PaintSpec::spot("CutContour", ProcessColor::Rgb(Rgb::new(230, 46, 146)));
        let (name, fallback) = paint.as_spot().unwrap();
        assert_eq!(name, "CutContour");
        assert_eq!(fallback.as_rgb(), Some(Rgb::new(230, 46, 146)));
        assert!(paint.is_painted());
    }

    #[test]
    fn test_paint_json_shape() {
        let json = serde_json::json!({
            "spot": { "name": "Thru-cut", "fallback": { "gray": 0.5 } }
        });
        let paint: PaintSpec = serde_json::from_value(json).unwrap();
        assert_eq!(
            paint,
            PaintSpec::spot("Thru-cut", ProcessColor::Gray(0.5))
        );

        let none: PaintSpec = serde_json::from_value(serde_json::json!("none")).unwrap();
        assert!(!none.is_painted());
    }
}
