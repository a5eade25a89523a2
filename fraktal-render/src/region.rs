/// A rectangle of matrix cells, used as the unit of pending work.
///
/// A region is resolved by computing its border first. The interior is
/// then either filled (when the whole border is contained) or split into
/// three smaller regions with [`trisect`](Self::trisect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Column of the top-left cell.
    pub x: u32,
    /// Row of the top-left cell.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the region is too thin to have an interior.
    fn is_solid(&self) -> bool {
        self.width <= 2 || self.height <= 2
    }

    /// Cells on the outer ring, row by row. A region at most two cells thin
    /// is all border.
    pub fn border(&self) -> impl Iterator<Item = (u32, u32)> {
        let Region {
            x,
            y,
            width,
            height,
        } = *self;
        let solid = self.is_solid();
        (y..y + height).flat_map(move |row| {
            let full_row = solid || row == y || row == y + height - 1;
            // Middle rows only touch the left and right columns.
            let step = if full_row { 1 } else { width - 1 };
            (x..x + width)
                .step_by(step as usize)
                .map(move |col| (col, row))
        })
    }

    pub fn border_len(&self) -> usize {
        if self.is_empty() {
            0
        } else if self.is_solid() {
            self.cell_count()
        } else {
            2 * (self.width as usize + self.height as usize) - 4
        }
    }

    /// Everything inside the border, if anything is.
    pub fn interior(&self) -> Option<Region> {
        if self.is_solid() {
            return None;
        }
        Some(Region::new(
            self.x + 1,
            self.y + 1,
            self.width - 2,
            self.height - 2,
        ))
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let Region {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height).flat_map(move |row| (x..x + width).map(move |col| (col, row)))
    }

    /// Split the interior into three strips across its longer side.
    ///
    /// Strips may be empty when the interior is narrower than three cells.
    pub fn trisect(&self) -> Option<[Region; 3]> {
        let inner = self.interior()?;
        let Region {
            x,
            y,
            width,
            height,
        } = inner;
        Some(if width >= height {
            let a = width / 3;
            let b = (width - a) / 2;
            let c = width - a - b;
            [
                Region::new(x, y, a, height),
                Region::new(x + a, y, b, height),
                Region::new(x + a + b, y, c, height),
            ]
        } else {
            let a = height / 3;
            let b = (height - a) / 2;
            let c = height - a - b;
            [
                Region::new(x, y, width, a),
                Region::new(x, y + a, width, b),
                Region::new(x, y + a + b, width, c),
            ]
        })
    }

    /// Squared distance in cells from `(px, py)` to the nearest cell of the
    /// region; zero when the point is inside.
    pub fn distance_sq_to(&self, (px, py): (u32, u32)) -> u64 {
        fn axis(p: u32, start: u32, len: u32) -> u64 {
            let end = start + len.saturating_sub(1);
            if p < start {
                (start - p) as u64
            } else if p > end {
                (p - end) as u64
            } else {
                0
            }
        }
        let dx = axis(px, self.x, self.width);
        let dy = axis(py, self.y, self.height);
        dx * dx + dy * dy
    }
}
