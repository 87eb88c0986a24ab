//! Colours, fonts, and the base sizes the renderer scales with zoom.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Colour must look like #RRGGBB, got {0:?}")]
    Format(String),
}

/// An sRGB colour, written and parsed as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorError::Format(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Sans,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Color,
    pub table_bg: Color,
    pub table_border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub row_alt_bg: Color,
    pub text: Color,
    pub pk: Color,
    pub fk: Color,
    pub line: Color,
    pub label_bg: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xF5, 0xEF, 0xE7),
            table_bg: Color::rgb(0xE8, 0xDF, 0xD0),
            table_border: Color::rgb(0x9B, 0x8F, 0x5E),
            header_bg: Color::rgb(0x9B, 0x8F, 0x5E),
            header_fg: Color::rgb(0xFF, 0xFF, 0xFF),
            row_alt_bg: Color::rgb(0xDF, 0xD4, 0xC1),
            text: Color::rgb(0x3E, 0x27, 0x23),
            pk: Color::rgb(0x87, 0x79, 0x5A),
            fk: Color::rgb(0xC4, 0x75, 0x6C),
            line: Color::rgb(0x9B, 0x8F, 0x5E),
            label_bg: Color::rgb(0xF5, 0xEF, 0xE7),
        }
    }
}

/// Base sizes at zoom 1.0 and the floors they never shrink below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub palette: Palette,
    pub header_font: FontFamily,
    pub column_font: FontFamily,
    pub header_font_px: f64,
    pub column_font_px: f64,
    pub label_font_px: f64,
    pub icon_px: f64,
    pub min_font_px: f64,
    pub border_width: f64,
    pub separator_width: f64,
    pub edge_width: f64,
    pub min_stroke_px: f64,
    pub arrow_size: f64,
    pub min_arrow_px: f64,
    /// Horizontal text inset inside a table box.
    pub inset: f64,
    /// Padding around an edge label's background plate.
    pub label_padding: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            header_font: FontFamily::Sans,
            column_font: FontFamily::Mono,
            header_font_px: 15.0,
            column_font_px: 12.0,
            label_font_px: 11.0,
            icon_px: 11.0,
            min_font_px: 6.0,
            border_width: 2.0,
            separator_width: 1.0,
            edge_width: 2.0,
            min_stroke_px: 1.0,
            arrow_size: 10.0,
            min_arrow_px: 4.0,
            inset: 10.0,
            label_padding: 3.0,
        }
    }
}
