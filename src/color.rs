use palette::{Hsv, IntoColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TonalError};

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components and provides conversions to HSV and CIELAB.
///
/// Serializes as a `[r, g, b]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Cylindrical HSV coordinates. Hue in degrees [0, 360), saturation and
/// value in percent [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

/// CIE L*a*b* coordinates relative to the D65 white point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabColor {
    #[serde(rename = "L")]
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `#FF8800` or `ff8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(TonalError::format(
                hex,
                format!("expected 6 hex digits, got {}", digits.len()),
            ));
        }
        // Checked up front so the byte slicing below stays on char boundaries.
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(TonalError::format(
                hex,
                format!("non-hex character '{bad}'"),
            ));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| TonalError::format(hex, e.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<f32>` with components in [0, 1].
    pub fn to_srgb_f32(self) -> Srgb<f32> {
        Srgb::new(self.r, self.g, self.b).into_format()
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    pub fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// Convert to HSV.
    pub fn to_hsv(self) -> HsvColor {
        let hsv: Hsv = self.to_srgb_f32().into_color();
        let mut hue = hsv.hue.into_positive_degrees();
        // Tiny negative angles normalize to exactly 360.0 in f32.
        if !(0.0..360.0).contains(&hue) {
            hue = 0.0;
        }
        HsvColor {
            hue,
            saturation: (hsv.saturation * 100.0).clamp(0.0, 100.0),
            value: (hsv.value * 100.0).clamp(0.0, 100.0),
        }
    }

    /// Convert to CIELAB (D65) through linear sRGB and XYZ.
    pub fn to_lab(self) -> LabColor {
        let lab: Lab = self.to_srgb_f32().into_color();
        LabColor {
            l: lab.l.clamp(0.0, 100.0),
            a: lab.a.clamp(-128.0, 127.0),
            b: lab.b.clamp(-128.0, 127.0),
        }
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
