use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::{lerp, Complex};
use crate::error::CoreError;

/// Smallest accepted `scale`. Below this the per-pixel step approaches the
/// `f64` spacing of typical centers and neighbouring pixels collapse.
pub const MIN_SCALE: f64 = 1e-13;

/// Largest accepted `scale`.
pub const MAX_SCALE: f64 = 1e4;

/// Pixel dimensions of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Corners of the visible region of the complex plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub top_left: Complex,
    pub btm_right: Complex,
}

/// The camera: which part of the complex plane the pixel grid shows.
///
/// `scale` is the width of the visible region in complex-plane units; the
/// visible height follows from the aspect ratio so pixels stay square.
/// Every transform returns a new value, the receiver is never modified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Centre of the viewport in the complex plane.
    pub center: Complex,

    /// Complex-plane units spanned by the viewport width.
    pub scale: f64,

    pub dimensions: Dimensions,
}

impl Viewpoint {
    /// Default view of the Mandelbrot set: the whole set with a small margin.
    pub fn default_mandelbrot(width: u32, height: u32) -> crate::Result<Self> {
        Self::new(Complex::new(-0.5, 0.0), 3.0, width, height)
    }

    /// Default view for Julia sets, centred on the origin.
    pub fn default_julia(width: u32, height: u32) -> crate::Result<Self> {
        Self::new(Complex::ZERO, 3.5, width, height)
    }

    /// Create a viewpoint, rejecting empty grids and unusable scales.
    pub fn new(center: Complex, scale: f64, width: u32, height: u32) -> crate::Result<Self> {
        validate_dimensions(width, height)?;
        validate_scale(scale)?;
        validate_center(center)?;
        Ok(Self {
            center,
            scale,
            dimensions: Dimensions { width, height },
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Height over width.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.dimensions.height as f64 / self.dimensions.width as f64
    }

    /// Complex-plane units covered by one pixel (pixels are square).
    #[inline]
    pub fn pixel_size(&self) -> f64 {
        self.scale / self.dimensions.width as f64
    }

    /// Complex-plane height of the visible region.
    pub fn plane_height(&self) -> f64 {
        self.scale * self.aspect()
    }

    pub fn limits(&self) -> Limits {
        let half_w = self.scale / 2.0;
        let half_h = self.plane_height() / 2.0;
        Limits {
            top_left: self.center + Complex::new(-half_w, half_h),
            btm_right: self.center + Complex::new(half_w, -half_h),
        }
    }

    /// Map a (possibly fractional) pixel coordinate to the complex plane.
    ///
    /// `(0, 0)` is the top-left corner. Pixel y grows downwards while the
    /// imaginary axis grows upwards.
    #[inline]
    pub fn pixel_to_complex(&self, x: f64, y: f64) -> Complex {
        let Limits {
            top_left,
            btm_right,
        } = self.limits();
        Complex::new(
            lerp(top_left.re, btm_right.re, x / self.dimensions.width as f64),
            lerp(top_left.im, btm_right.im, y / self.dimensions.height as f64),
        )
    }

    /// Recenter on the point `(dx, dy)` pixels away from the centre pixel.
    ///
    /// Positive `dx` moves the view right, positive `dy` moves it down.
    pub fn pan(&self, dx: i32, dy: i32) -> Self {
        let step = self.pixel_size();
        Self {
            center: self.center + Complex::new(dx as f64 * step, -(dy as f64) * step),
            ..*self
        }
    }

    pub fn zoom_in(&self) -> crate::Result<Self> {
        self.with_scale(self.scale / 2.0)
    }

    pub fn zoom_out(&self) -> crate::Result<Self> {
        self.with_scale(self.scale * 2.0)
    }

    /// Zoom in by 2× keeping the point under `(px, py)` fixed on screen.
    pub fn zoom_in_around(&self, px: f64, py: f64) -> crate::Result<Self> {
        self.zoom_around(0.5, px, py)
    }

    /// Zoom out by 2× keeping the point under `(px, py)` fixed on screen.
    pub fn zoom_out_around(&self, px: f64, py: f64) -> crate::Result<Self> {
        self.zoom_around(2.0, px, py)
    }

    /// Multiply `scale` by `factor`, solving for the centre that keeps the
    /// complex point under `(px, py)` at the same pixel.
    pub fn zoom_around(&self, factor: f64, px: f64, py: f64) -> crate::Result<Self> {
        let new_scale = self.scale * factor;
        validate_scale(new_scale)?;

        let target = self.pixel_to_complex(px, py);
        let fx = px / self.dimensions.width as f64 - 0.5;
        let fy = 0.5 - py / self.dimensions.height as f64;
        let center = target - Complex::new(fx * new_scale, fy * new_scale * self.aspect());
        validate_center(center)?;

        debug!(factor, px, py, scale = new_scale, "Zoom around point");
        Ok(Self {
            center,
            scale: new_scale,
            ..*self
        })
    }

    /// Change the pixel grid. The scale is kept, so the zoom level survives
    /// a resize and only the visible plane height changes.
    pub fn set_size(&self, width: u32, height: u32) -> crate::Result<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            dimensions: Dimensions { width, height },
            ..*self
        })
    }

    pub fn with_center(&self, center: Complex) -> crate::Result<Self> {
        validate_center(center)?;
        Ok(Self { center, ..*self })
    }

    pub fn with_scale(&self, scale: f64) -> crate::Result<Self> {
        validate_scale(scale)?;
        Ok(Self { scale, ..*self })
    }

    /// Human-readable summary: centre and half-extents on both axes.
    pub fn describe_range(&self) -> String {
        format!(
            "{:e} ±{:e} {:+e} i ±{:e} i",
            self.center.re,
            self.scale / 2.0,
            self.center.im,
            self.plane_height() / 2.0
        )
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            center: Complex::new(-0.5, 0.0),
            scale: 3.0,
            dimensions: Dimensions {
                width: 800,
                height: 600,
            },
        }
    }
}

fn validate_dimensions(width: u32, height: u32) -> crate::Result<()> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidViewport {
            reason: format!("dimensions must be > 0, got {width}×{height}"),
        });
    }
    Ok(())
}

fn validate_scale(scale: f64) -> crate::Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CoreError::InvalidViewport {
            reason: format!("scale must be positive and finite, got {scale}"),
        });
    }
    if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(CoreError::InvalidViewport {
            reason: format!("scale {scale:e} outside [{MIN_SCALE:e}, {MAX_SCALE:e}]"),
        });
    }
    Ok(())
}

fn validate_center(center: Complex) -> crate::Result<()> {
    if !center.is_finite() {
        return Err(CoreError::InvalidViewport {
            reason: format!("center must be finite, got {center}"),
        });
    }
    Ok(())
}
