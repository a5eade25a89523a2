use fraktal_core::EscapeResult;

use crate::color::Rgb;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// A dense lookup table from escape count to color.
///
/// Built by [`Gradient::compute_palette`](crate::Gradient::compute_palette)
/// with one entry per possible count, so lookups never interpolate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn from_colors(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color for one escape-time result.
    ///
    /// Counts from 1 up to `len - 1` index the table. Contained points, a
    /// count of 0 (the very first iterate was outside) and counts past the
    /// end of the table all take `inside`.
    #[inline]
    pub fn color_for(&self, result: EscapeResult, inside: Rgb) -> Rgb {
        match result {
            EscapeResult::Escaped(n) if n > 0 => self.get(n as usize).unwrap_or(inside),
            _ => inside,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
