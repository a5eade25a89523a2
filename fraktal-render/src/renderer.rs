use rayon::prelude::*;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::matrix::IterationMatrix;
use crate::palette::Palette;

/// Written where the buffer has no corresponding matrix cell.
pub const NO_DATA: Rgb = Rgb::BLACK;

/// Color `matrix` into `buffer`, shifted by `offset` pixels.
///
/// Buffer pixel `(x, y)` reads matrix cell `(x - offset.0, y - offset.1)`.
/// Cells outside the matrix write [`NO_DATA`], so a drag offset leaves a
/// black margin instead of smearing the edge. The buffer is resized to the
/// matrix first if the two disagree. Rows are colored in parallel.
pub fn render(
    buffer: &mut PixelBuffer,
    matrix: &IterationMatrix,
    palette: &Palette,
    inside: Rgb,
    offset: (i32, i32),
) {
    buffer.resize(matrix.width, matrix.height);
    if matrix.is_empty() {
        return;
    }

    let width = matrix.width as usize;
    let (dx, dy) = (offset.0 as i64, offset.1 as i64);
    let no_data = NO_DATA.to_rgba();

    buffer
        .pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let src_y = y as i64 - dy;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let src_x = x as i64 - dx;
                let cell = if src_x < 0 || src_y < 0 {
                    None
                } else {
                    u32::try_from(src_x)
                        .ok()
                        .zip(u32::try_from(src_y).ok())
                        .and_then(|(sx, sy)| matrix.get(sx, sy))
                };
                let rgba = match cell {
                    Some(result) => palette.color_for(result, inside).to_rgba(),
                    None => no_data,
                };
                px.copy_from_slice(&rgba);
            }
        });

    debug!(
        width = matrix.width,
        height = matrix.height,
        dx = offset.0,
        dy = offset.1,
        "Rendered pixel buffer"
    );
}
