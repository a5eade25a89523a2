use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

/// An opaque 8-bit RGB color. Its text form is `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (hex digits in either case).
    pub fn parse_hex(hex: &str) -> crate::Result<Self> {
        let malformed = || RenderError::MalformedColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation, truncated toward zero.
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Per-channel midpoint, rounding halves up.
    pub fn midpoint(self, other: Self) -> Self {
        let mid = |a: u8, b: u8| ((a as u16 + b as u16 + 1) / 2) as u8;
        Self {
            r: mid(self.r, other.r),
            g: mid(self.g, other.g),
            b: mid(self.b, other.b),
        }
    }

    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl FromStr for Rgb {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
