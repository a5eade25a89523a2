use fraktal_core::{Dimensions, EscapeResult};

/// Per-pixel escape results for one frame, row-major.
///
/// This is the compute output before coloring. Keeping it apart from the
/// pixels lets gradient edits recolor a frame without iterating again.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationMatrix {
    pub width: u32,
    pub height: u32,
    pub data: Vec<EscapeResult>,
}

impl IterationMatrix {
    /// A matrix with every cell `Contained`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![EscapeResult::Contained; width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The cell at column `x`, row `y`, or `None` outside the matrix.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<EscapeResult> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
