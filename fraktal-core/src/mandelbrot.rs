use crate::complex::Complex;
use crate::fractal::{escape_time, EscapeResult, Fractal, DEFAULT_ESCAPE_RADIUS};

/// The Mandelbrot set: `z_{n+1} = z_n² + c` from `z₀ = 0`, where `c` is the
/// point being classified.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mandelbrot;

/// Returns `true` if `c` lies inside the main cardioid.
///
/// Closed-form test that skips the full iteration budget for a large share
/// of the default view.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

impl Fractal for Mandelbrot {
    #[inline]
    fn initial(&self, _point: Complex) -> Complex {
        Complex::ZERO
    }

    #[inline]
    fn step(&self, z: Complex, c: Complex) -> Complex {
        z.square() + c
    }

    fn check(&self, c: Complex, iteration_limit: u32, escape_radius: f64) -> EscapeResult {
        // Orbits of points in either region stay within |z| <= 2, so the
        // shortcut only holds for radii at least that large.
        if escape_radius >= DEFAULT_ESCAPE_RADIUS
            && (in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im))
        {
            return EscapeResult::Contained;
        }
        escape_time(self, c, iteration_limit, escape_radius)
    }
}
