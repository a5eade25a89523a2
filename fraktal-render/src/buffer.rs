use fraktal_core::Dimensions;

use crate::color::Rgb;

/// An RGBA pixel buffer, 4 bytes per pixel, row-major order.
///
/// This is what the host draws. Alpha is always 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer filled with opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        };
        buffer.fill(Rgb::BLACK);
        buffer
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Reallocate for a new size. Contents are reset to opaque black.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        *self = Self::new(width, height);
    }

    pub fn fill(&mut self, color: Rgb) {
        let rgba = color.to_rgba();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// The RGBA bytes at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black_opaque() {
        let buf = PixelBuffer::new(4, 4);
        assert_eq!(buf.pixels.len(), 4 * 4 * 4);
        for chunk in buf.pixels.chunks_exact(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn resize_reallocates() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.fill(Rgb::WHITE);
        buf.resize(2, 2);
        assert_eq!(buf.pixel(1, 1), Some([255, 255, 255, 255]));

        buf.resize(3, 1);
        assert_eq!(buf.as_bytes().len(), 3 * 4);
        assert_eq!(buf.pixel(2, 0), Some([0, 0, 0, 255]));
        assert_eq!(buf.pixel(0, 1), None);
    }
}
