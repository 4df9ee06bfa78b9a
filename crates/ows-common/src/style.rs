//! Colors and the styles attached to labels.

use serde::{Deserialize, Serialize};

use crate::{OwsError, OwsResult};

/// An RGBA color. A negative component in the mapfile sense ("no color")
/// is modelled as `Option<Color>` by the owners of a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    #[serde(default = "opaque")]
    pub alpha: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(s: &str) -> OwsResult<Self> {
        let hex = s.trim_start_matches('#');
        let component = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| OwsError::Config(format!("Invalid color: {}", s)))
        };

        match hex.len() {
            6 => Ok(Self::rgb(component(0..2)?, component(2..4)?, component(4..6)?)),
            8 => Ok(Self {
                red: component(0..2)?,
                green: component(2..4)?,
                blue: component(4..6)?,
                alpha: component(6..8)?,
            }),
            _ => Err(OwsError::Config(format!("Invalid color: {}", s))),
        }
    }

    pub fn to_hex(&self) -> String {
        if self.alpha == 255 {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }
}

/// Geometry a label style is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeomTransform {
    /// Behind the label text, sized to the label bounds
    #[default]
    LabelPoly,
    /// At the label anchor point
    LabelPnt,
}

/// A style drawn as part of a label (background box, marker, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelStyle {
    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(default)]
    pub color: Option<Color>,

    #[serde(default)]
    pub outline_color: Option<Color>,

    #[serde(default)]
    pub size: Option<f64>,

    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default)]
    pub angle: f64,

    #[serde(default)]
    pub offset_x: f64,

    #[serde(default)]
    pub offset_y: f64,

    #[serde(default)]
    pub geom_transform: GeomTransform,
}

fn default_width() -> f64 {
    1.0
}

impl LabelStyle {
    pub fn new() -> Self {
        Self {
            width: default_width(),
            ..Default::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        let c = Color::from_hex("00000080").unwrap();
        assert_eq!(c.alpha, 128);
        assert_eq!(c.to_hex(), "#00000080");
        assert_eq!(Color::rgb(1, 2, 3).to_hex(), "#010203");
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn test_label_style_defaults() {
        let style = LabelStyle::new();
        assert_eq!(style.width, 1.0);
        assert_eq!(style.geom_transform, GeomTransform::LabelPoly);
        assert!(style.color.is_none());
    }
}
