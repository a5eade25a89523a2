use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::julia::Julia;
use crate::mandelbrot::Mandelbrot;

/// Bailout radius: once `|z|` reaches this the orbit is considered escaped.
pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

/// Iteration limit used by fresh sessions.
pub const DEFAULT_ITERATION_LIMIT: u32 = 50;

/// Largest accepted iteration limit. The palette holds one color per count.
pub const MAX_ITERATION_LIMIT: u32 = 1 << 20;

/// Accept `limit` if it lies in `1..=MAX_ITERATION_LIMIT`.
pub fn validate_iteration_limit(limit: u32) -> crate::Result<u32> {
    if limit == 0 || limit > MAX_ITERATION_LIMIT {
        return Err(CoreError::InvalidIterationLimit(limit));
    }
    Ok(limit)
}

/// The outcome of iterating a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeResult {
    /// `|z|` reached the escape radius on step `n` (0-based: `Escaped(0)`
    /// means the very first iterate was already outside).
    Escaped(u32),

    /// The orbit stayed bounded for the whole iteration limit.
    Contained,
}

impl EscapeResult {
    /// The escape count, or `None` for contained points.
    #[inline]
    pub fn escape_count(self) -> Option<u32> {
        match self {
            Self::Escaped(n) => Some(n),
            Self::Contained => None,
        }
    }
}

/// An escape-time fractal family.
///
/// A family only describes where the orbit starts and how it advances; the
/// counting loop is shared in [`check`](Self::check). The scheduler holds
/// kernels as `Arc<dyn Fractal>`, so adding a family never touches it.
pub trait Fractal: Send + Sync {
    /// `z₀` for the orbit of `point`.
    fn initial(&self, point: Complex) -> Complex;

    /// One application of the iterated map.
    fn step(&self, z: Complex, point: Complex) -> Complex;

    /// Iterate `point` until it escapes or `iteration_limit` steps have run.
    ///
    /// The map is applied before each escape test, so the returned count is
    /// the 0-based index of the first iterate with `|z| >= escape_radius`.
    fn check(&self, point: Complex, iteration_limit: u32, escape_radius: f64) -> EscapeResult {
        escape_time(self, point, iteration_limit, escape_radius)
    }
}

/// The generic escape-time loop behind [`Fractal::check`].
#[inline]
pub fn escape_time<F: Fractal + ?Sized>(
    fractal: &F,
    point: Complex,
    iteration_limit: u32,
    escape_radius: f64,
) -> EscapeResult {
    let escape_radius_sq = escape_radius * escape_radius;
    let mut z = fractal.initial(point);
    for n in 0..iteration_limit {
        z = fractal.step(z, point);
        if z.norm_sq() >= escape_radius_sq {
            return EscapeResult::Escaped(n);
        }
    }
    EscapeResult::Contained
}

/// Parameter-free discriminant of [`FractalParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FractalKind {
    Mandelbrot,
    Julia,
}

impl FractalKind {
    pub const ALL: [FractalKind; 2] = [FractalKind::Mandelbrot, FractalKind::Julia];

    /// Stable lowercase name used by settings and `set_fractal`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mandelbrot => "mandelbrot",
            Self::Julia => "julia",
        }
    }

    pub fn from_name(name: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| CoreError::UnknownFractal(name.to_string()))
    }
}

/// Family selection together with that family's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FractalParams {
    Mandelbrot,
    Julia { c: Complex },
}

impl FractalParams {
    pub fn kind(&self) -> FractalKind {
        match self {
            Self::Mandelbrot => FractalKind::Mandelbrot,
            Self::Julia { .. } => FractalKind::Julia,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Default parameters for a family.
    pub fn default_for(kind: FractalKind) -> Self {
        match kind {
            FractalKind::Mandelbrot => Self::Mandelbrot,
            FractalKind::Julia => Self::Julia {
                c: Julia::default_c(),
            },
        }
    }

    /// Resolve a family by name. `c` is used by families that take a
    /// constant; `None` selects that family's default.
    pub fn from_name(name: &str, c: Option<Complex>) -> crate::Result<Self> {
        let params = match FractalKind::from_name(name)? {
            FractalKind::Mandelbrot => Self::Mandelbrot,
            FractalKind::Julia => Self::Julia {
                c: c.unwrap_or_else(Julia::default_c),
            },
        };
        Ok(params)
    }

    /// Build the kernel for these parameters.
    pub fn kernel(&self) -> Arc<dyn Fractal> {
        match *self {
            Self::Mandelbrot => Arc::new(Mandelbrot),
            Self::Julia { c } => Arc::new(Julia::new(c)),
        }
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self::Mandelbrot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve() {
        assert_eq!(
            FractalParams::from_name("mandelbrot", None).unwrap(),
            FractalParams::Mandelbrot
        );
        assert_eq!(
            FractalParams::from_name(" Julia ", None).unwrap(),
            FractalParams::Julia {
                c: Julia::default_c()
            }
        );
        let c = Complex::new(-0.8, 0.156);
        assert_eq!(
            FractalParams::from_name("julia", Some(c)).unwrap(),
            FractalParams::Julia { c }
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            FractalParams::from_name("burning-ship", None),
            Err(CoreError::UnknownFractal("burning-ship".into()))
        );
    }

    #[test]
    fn kind_round_trip() {
        for kind in FractalKind::ALL {
            assert_eq!(FractalParams::default_for(kind).kind(), kind);
            assert_eq!(FractalKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn kernel_dispatch_matches_family() {
        let c = Complex::new(3.0, 0.0);
        // Mandelbrot: first iterate is c itself, so it escapes at once.
        assert_eq!(
            FractalParams::Mandelbrot.kernel().check(c, 10, DEFAULT_ESCAPE_RADIUS),
            EscapeResult::Escaped(0)
        );
        // Julia with c = 0 maps the origin to itself forever.
        let julia = FractalParams::Julia { c: Complex::ZERO };
        assert_eq!(
            julia.kernel().check(Complex::ZERO, 10, DEFAULT_ESCAPE_RADIUS),
            EscapeResult::Contained
        );
    }

    #[test]
    fn zero_limit_is_contained() {
        let kernel = FractalParams::Mandelbrot.kernel();
        assert_eq!(
            kernel.check(Complex::new(100.0, 0.0), 0, DEFAULT_ESCAPE_RADIUS),
            EscapeResult::Contained
        );
    }

    #[test]
    fn iteration_limit_bounds() {
        assert_eq!(validate_iteration_limit(1), Ok(1));
        assert_eq!(
            validate_iteration_limit(MAX_ITERATION_LIMIT),
            Ok(MAX_ITERATION_LIMIT)
        );
        assert_eq!(
            validate_iteration_limit(0),
            Err(CoreError::InvalidIterationLimit(0))
        );
        assert_eq!(
            validate_iteration_limit(MAX_ITERATION_LIMIT + 1),
            Err(CoreError::InvalidIterationLimit(MAX_ITERATION_LIMIT + 1))
        );
    }

    #[test]
    fn serde_tagging() {
        let json = serde_json::to_string(&FractalParams::Julia {
            c: Complex::new(0.5, -0.25),
        })
        .unwrap();
        assert_eq!(json, r#"{"family":"julia","c":{"re":0.5,"im":-0.25}}"#);
        let back: FractalParams = serde_json::from_str(r#"{"family":"mandelbrot"}"#).unwrap();
        assert_eq!(back, FractalParams::Mandelbrot);
    }
}
