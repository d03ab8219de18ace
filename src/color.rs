use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Sticker background: white RGB under zero alpha.
    pub const TRANSPARENT_WHITE: Color = Color::rgba(255, 255, 255, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`; the `#` is optional.
    pub fn parse(value: &str) -> Result<Self> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(anyhow!("invalid color '{}'", value));
        }
        let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).map(|v| v * 17);
        let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16);
        let parsed = match hex.len() {
            3 => Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?),
            4 => Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
            6 => Color::rgb(byte(0)?, byte(2)?, byte(4)?),
            8 => Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?),
            _ => {
                return Err(anyhow!(
                    "invalid color '{}' (expected #rgb, #rgba, #rrggbb or #rrggbbaa)",
                    value
                ));
            }
        };
        Ok(parsed)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        Color::parse(value)
    }
}
