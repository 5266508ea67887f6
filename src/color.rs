//! Hex codes and inverted text colors for sampled pixels.
//!
//! The sampler hands a [`Color`] straight to the presenter, so the string
//! helpers here only exist for callers that hold a CSS-style `rgb(r, g, b)`
//! value or a `#rrggbb` code. Anything that does not match is `None`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Color;

static RGB_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rgb\((\d+),\s*(\d+),\s*(\d+)\)$").expect("static regex"));

impl Color {
    /// `#rrggbb`, lowercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel `255 - value`, used as text color on top of `self`.
    pub fn inverted(&self) -> Color {
        Color::new(255 - self.r, 255 - self.g, 255 - self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parses `rgb(r, g, b)`. Channels above 255 are rejected.
pub fn parse_rgb(rgb: &str) -> Option<Color> {
    let caps = RGB_PATTERN.captures(rgb)?;
    let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
    Some(Color::new(channel(1)?, channel(2)?, channel(3)?))
}

/// Parses `#rrggbb` (either case).
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

pub fn rgb_to_hex(rgb: &str) -> Option<String> {
    parse_rgb(rgb).map(|c| c.to_hex())
}

pub fn invert_color(hex: &str) -> Option<String> {
    parse_hex(hex).map(|c| c.inverted().to_hex())
}
