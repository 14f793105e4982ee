//! RGB colors for block fills and the fixed diagram palette.

use serde::{Serialize, Serializer};

/// Amount subtracted from each channel of a rect fill to get its border.
pub const RECT_BORDER_DARKEN: u8 = 60;

/// A plain 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Subtract `amount` from every channel, flooring at zero.
    #[must_use]
    pub const fn darken(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_sub(amount),
            g: self.g.saturating_sub(amount),
            b: self.b.saturating_sub(amount),
        }
    }

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Background/border pair of a `rect` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectColors {
    pub fill: Rgb,
    pub border: Rgb,
}

impl RectColors {
    #[must_use]
    pub const fn from_fill(fill: Rgb) -> Self {
        Self { fill, border: fill.darken(RECT_BORDER_DARKEN) }
    }
}

// ── Palette ─────────────────────────────────────────────────────

pub const PARTICIPANT_FILL: Rgb = Rgb::new(0xE3, 0xF2, 0xFD);
pub const PARTICIPANT_STROKE: Rgb = Rgb::new(0x15, 0x65, 0xC0);
pub const LIFELINE_STROKE: Rgb = Rgb::new(0x90, 0xA4, 0xAE);
pub const NOTE_FILL: Rgb = Rgb::new(0xFF, 0xF9, 0xC4);
pub const NOTE_STROKE: Rgb = Rgb::new(0xF9, 0xA8, 0x25);
pub const BLOCK_FILL: Rgb = Rgb::new(0xF5, 0xF7, 0xF8);
pub const BLOCK_STROKE: Rgb = Rgb::new(0x78, 0x90, 0x9C);
pub const TEXT: Rgb = Rgb::new(0x1F, 0x1A, 0x17);
pub const MUTED_TEXT: Rgb = Rgb::new(0x54, 0x6E, 0x7A);

#[cfg(test)]
#[path = "color_test.rs"]
mod tests;
