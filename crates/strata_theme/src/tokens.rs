//! Token values stored in theme tables
//!
//! A token table maps style-token names to opaque leaf values. The resolution
//! engine never interprets values; it only moves them around. Hosts typically
//! store colors and numbers.

use crate::error::ThemeError;
use serde::{Deserialize, Serialize};

/// RGBA color with normalized `0.0..=1.0` channels.
///
/// Serializes to and from hex strings (`#rgb`, `#rrggbb`, `#rrggbbaa`).
///
/// ```
/// use strata_theme::tokens::Rgba;
///
/// let red = Rgba::parse("#ff0000").unwrap();
/// assert_eq!(red.r, 1.0);
/// assert_eq!(red.a, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Create a color from normalized channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Parse a `#rgb`, `#rrggbb`, or `#rrggbbaa` hex string.
    pub fn parse(value: &str) -> Result<Self, ThemeError> {
        let invalid = || ThemeError::InvalidColor(value.to_string());
        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        // digit slicing below indexes by byte, so the digits must be ASCII
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| -> Result<f32, ThemeError> {
            let byte = u8::from_str_radix(s, 16).map_err(|_| invalid())?;
            Ok(byte as f32 / 255.0)
        };
        // #rgb shorthand doubles each nibble
        let nibble = |s: &str| -> Result<f32, ThemeError> {
            let n = u8::from_str_radix(s, 16).map_err(|_| invalid())?;
            Ok((n * 16 + n) as f32 / 255.0)
        };

        match hex.len() {
            3 => Ok(Self::new(
                nibble(&hex[0..1])?,
                nibble(&hex[1..2])?,
                nibble(&hex[2..3])?,
                1.0,
            )),
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                1.0,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as a hex string (`#rrggbb`, or `#rrggbbaa` when translucent).
    pub fn to_hex_string(&self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a < 1.0 {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        } else {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex_string()
    }
}

/// Opaque leaf value held in a token table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Numeric token (sizes, opacities, weights).
    Number(f64),
    /// Color token, stored as parsed RGBA.
    Color(Rgba),
    /// Any other textual token (font stacks, keywords).
    Text(String),
}

impl TokenValue {
    /// The color payload, if this is a color token.
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    /// The numeric payload, if this is a number token.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// The textual payload, if this is a text token.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<f64> for TokenValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Rgba> for TokenValue {
    fn from(color: Rgba) -> Self {
        Self::Color(color)
    }
}

impl From<&str> for TokenValue {
    /// Hex-color strings become [`TokenValue::Color`]; anything else is text.
    fn from(value: &str) -> Self {
        match Rgba::parse(value) {
            Ok(color) => Self::Color(color),
            Err(_) => Self::Text(value.to_string()),
        }
    }
}
