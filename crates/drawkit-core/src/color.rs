//! Colour values as they appear in settings and style metadata.

use serde::{Deserialize, Serialize};

/// A colour as written by a user or stored in configuration.
///
/// Accepts a packed `0xRRGGBB` number, a `#rrggbb` string, or a `0x`-prefixed
/// hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Number(u32),
    Text(String),
}

impl From<u32> for ColorValue {
    fn from(value: u32) -> Self {
        ColorValue::Number(value)
    }
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        ColorValue::Text(value.to_string())
    }
}

impl ColorValue {
    /// Resolves the colour, using `fallback` when the value cannot be parsed.
    pub fn resolve_or(&self, fallback: u32) -> u32 {
        parse_color(self).unwrap_or(fallback)
    }
}

/// Parses a colour into a packed `0xRRGGBB` value.
///
/// Returns `None` for anything unparseable; callers supply their own fallback.
pub fn parse_color(value: &ColorValue) -> Option<u32> {
    match value {
        ColorValue::Number(n) if *n <= 0xFF_FFFF => Some(*n),
        ColorValue::Number(_) => None,
        ColorValue::Text(text) => {
            let text = text.trim();
            if let Some(hex) = text.strip_prefix('#') {
                if hex.len() != 6 {
                    return None;
                }
                parse_hex(hex)
            } else if let Some(hex) = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
            {
                if hex.is_empty() || hex.len() > 6 {
                    return None;
                }
                parse_hex(hex)
            } else {
                None
            }
        }
    }
}

fn parse_hex(hex: &str) -> Option<u32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
