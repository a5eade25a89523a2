//! Editable color gradient: an ordered list of pivots plus the inside color.

use std::fmt;

use tracing::debug;

use crate::color::Rgb;
use crate::error::RenderError;
use crate::palette::Palette;

/// A gradient always keeps a start and an end.
pub const MIN_PIVOTS: usize = 2;

/// Stable identity of a pivot across edits, for UI list keys.
///
/// Allocated from a per-gradient counter and never reused. Not serialized:
/// restored gradients get fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PivotId(u64);

impl fmt::Display for PivotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gradient-pivot-{}", self.0)
    }
}

/// A control point: escape count `value` maps to `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientPivot {
    pub id: PivotId,
    pub value: u32,
    pub color: Rgb,
}

/// Ordered pivots plus the color used for points that never escape.
///
/// Pivots are kept non-decreasing by `value`: construction sorts them and
/// every edit clamps against the neighbours. Equality compares stops and the
/// inside color; pivot ids are ignored.
#[derive(Debug, Clone)]
pub struct Gradient {
    pivots: Vec<GradientPivot>,
    inside: Rgb,
    next_id: u64,
}

impl PartialEq for Gradient {
    fn eq(&self, other: &Self) -> bool {
        self.inside == other.inside
            && self.pivots.len() == other.pivots.len()
            && self
                .pivots
                .iter()
                .zip(&other.pivots)
                .all(|(a, b)| a.value == b.value && a.color == b.color)
    }
}

impl Eq for Gradient {}

impl Gradient {
    /// Build a gradient from `(value, color)` stops. Stops are sorted by
    /// value; fewer than [`MIN_PIVOTS`] is an error.
    pub fn new(
        stops: impl IntoIterator<Item = (u32, Rgb)>,
        inside: Rgb,
    ) -> crate::Result<Self> {
        let mut gradient = Self {
            pivots: Vec::new(),
            inside,
            next_id: 0,
        };
        let mut stops: Vec<(u32, Rgb)> = stops.into_iter().collect();
        if stops.len() < MIN_PIVOTS {
            return Err(RenderError::TooFewPivots { min: MIN_PIVOTS });
        }
        stops.sort_by_key(|&(value, _)| value);
        for (value, color) in stops {
            let id = gradient.allocate_id();
            gradient.pivots.push(GradientPivot { id, value, color });
        }
        Ok(gradient)
    }

    fn allocate_id(&mut self) -> PivotId {
        let id = PivotId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn pivots(&self) -> &[GradientPivot] {
        &self.pivots
    }

    pub fn inside_color(&self) -> Rgb {
        self.inside
    }

    pub fn pivot(&self, index: usize) -> crate::Result<&GradientPivot> {
        self.pivots.get(index).ok_or(RenderError::PivotOutOfRange {
            index,
            len: self.pivots.len(),
        })
    }

    /// `(value, color)` pairs, ignoring ids.
    pub fn stops(&self) -> Vec<(u32, Rgb)> {
        self.pivots.iter().map(|p| (p.value, p.color)).collect()
    }

    /// Insert a pivot after `index` and return it.
    ///
    /// Between two pivots the new one takes the rounded midpoint of their
    /// values and colors. After the last pivot it duplicates it, extending
    /// the gradient. The new pivot always lands at `index + 1`.
    pub fn insert_pivot(&mut self, index: usize) -> crate::Result<GradientPivot> {
        let before = *self.pivot(index)?;
        let (value, color) = match self.pivots.get(index + 1) {
            Some(after) => (
                ((before.value as u64 + after.value as u64 + 1) / 2) as u32,
                before.color.midpoint(after.color),
            ),
            None => (before.value, before.color),
        };
        let pivot = GradientPivot {
            id: self.allocate_id(),
            value,
            color,
        };
        self.pivots.insert(index + 1, pivot);
        debug!(index = index + 1, value, id = %pivot.id, "Inserted gradient pivot");
        Ok(pivot)
    }

    /// Remove the pivot at `index`, refusing to go below [`MIN_PIVOTS`].
    pub fn delete_pivot(&mut self, index: usize) -> crate::Result<()> {
        self.pivot(index)?;
        if self.pivots.len() <= MIN_PIVOTS {
            return Err(RenderError::TooFewPivots { min: MIN_PIVOTS });
        }
        let removed = self.pivots.remove(index);
        debug!(index, id = %removed.id, "Deleted gradient pivot");
        Ok(())
    }

    /// Move a pivot, clamped between its neighbours so the order survives.
    ///
    /// The first pivot is bounded below by 0 and every pivot above by
    /// `num_colors - 1`. Returns the value actually applied.
    pub fn set_pivot_value(
        &mut self,
        index: usize,
        value: i64,
        num_colors: u32,
    ) -> crate::Result<u32> {
        if num_colors == 0 {
            return Err(RenderError::InvalidColorCount(num_colors));
        }
        self.pivot(index)?;

        let top = num_colors - 1;
        let lower = match index.checked_sub(1) {
            Some(prev) => self.pivots[prev].value.min(top),
            None => 0,
        };
        let upper = match self.pivots.get(index + 1) {
            Some(next) => next.value.min(top),
            None => top,
        }
        .max(lower);

        let applied = value.clamp(lower as i64, upper as i64) as u32;
        self.pivots[index].value = applied;
        Ok(applied)
    }

    pub fn set_pivot_color(&mut self, index: usize, hex: &str) -> crate::Result<()> {
        let color = Rgb::parse_hex(hex)?;
        self.pivot(index)?;
        self.pivots[index].color = color;
        Ok(())
    }

    pub fn set_inside_color(&mut self, hex: &str) -> crate::Result<()> {
        self.inside = Rgb::parse_hex(hex)?;
        Ok(())
    }

    /// Fit the pivots to a new color count after the iteration limit changed.
    ///
    /// Values above the new top are clamped to it. A last pivot that sat on
    /// the old top follows the top, so the gradient stretches with the limit.
    pub fn retarget(&mut self, old_num_colors: u32, new_num_colors: u32) {
        let old_top = old_num_colors.saturating_sub(1);
        let new_top = new_num_colors.saturating_sub(1);
        if let Some(last) = self.pivots.last_mut() {
            if last.value == old_top {
                last.value = new_top;
            }
        }
        self.clamp_to(new_num_colors);
    }

    /// Clamp every pivot into `[0, num_colors - 1]`.
    pub fn clamp_to(&mut self, num_colors: u32) {
        let top = num_colors.saturating_sub(1);
        for pivot in &mut self.pivots {
            pivot.value = pivot.value.min(top);
        }
    }

    /// Expand the gradient into a dense palette of `num_colors` entries.
    ///
    /// Pivots are taken in value order. Missing ends are filled with
    /// synthetic pivots at 0 (first color) and `num_colors - 1` (last color).
    /// Each channel is interpolated linearly over every integer between
    /// consecutive pivots, both ends included.
    pub fn compute_palette(&self, num_colors: u32) -> crate::Result<Palette> {
        if num_colors == 0 {
            return Err(RenderError::InvalidColorCount(num_colors));
        }
        let top = num_colors - 1;

        let mut stops: Vec<(u32, Rgb)> = self
            .pivots
            .iter()
            .map(|p| (p.value.min(top), p.color))
            .collect();
        stops.sort_by_key(|&(value, _)| value);

        let (first_value, first_color) = stops[0];
        if first_value != 0 {
            stops.insert(0, (0, first_color));
        }
        let (last_value, last_color) = stops[stops.len() - 1];
        if last_value != top {
            stops.push((top, last_color));
        }

        let mut colors = vec![first_color; num_colors as usize];
        for pair in stops.windows(2) {
            let (start, from) = pair[0];
            let (end, to) = pair[1];
            if start == end {
                colors[end as usize] = to;
                continue;
            }
            let span = (end - start) as f64;
            for value in start..=end {
                colors[value as usize] = from.lerp(to, (value - start) as f64 / span);
            }
        }

        Ok(Palette::from_colors(colors))
    }
}

impl Default for Gradient {
    fn default() -> Self {
        let top = fraktal_core::DEFAULT_ITERATION_LIMIT - 1;
        Self {
            pivots: vec![
                GradientPivot {
                    id: PivotId(0),
                    value: 0,
                    color: Rgb::BLACK,
                },
                GradientPivot {
                    id: PivotId(1),
                    value: top,
                    color: Rgb::new(255, 0, 255),
                },
            ],
            inside: Rgb::BLACK,
            next_id: 2,
        }
    }
}
