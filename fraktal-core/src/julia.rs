use crate::complex::Complex;
use crate::fractal::Fractal;

/// A Julia set: `z_{n+1} = z_n² + c` for a fixed constant `c`, starting from
/// the point being classified.
#[derive(Debug, Clone, Copy)]
pub struct Julia {
    c: Complex,
}

impl Julia {
    pub fn new(c: Complex) -> Self {
        Self { c }
    }

    /// Default constant: `c = 0.285 + 0.01i`.
    pub fn default_c() -> Complex {
        Complex::new(0.285, 0.01)
    }

    /// The constant `c` defining this Julia set.
    pub fn c(&self) -> Complex {
        self.c
    }
}

impl Default for Julia {
    fn default() -> Self {
        Self::new(Self::default_c())
    }
}

impl Fractal for Julia {
    #[inline]
    fn initial(&self, point: Complex) -> Complex {
        point
    }

    #[inline]
    fn step(&self, z: Complex, _point: Complex) -> Complex {
        z.square() + self.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::{EscapeResult, DEFAULT_ESCAPE_RADIUS};

    #[test]
    fn far_point_escapes_immediately() {
        let result = Julia::default().check(Complex::new(10.0, 0.0), 50, DEFAULT_ESCAPE_RADIUS);
        assert_eq!(result, EscapeResult::Escaped(0));
    }

    #[test]
    fn c_zero_unit_disc_is_contained() {
        // With c = 0 the map is z ↦ z², which keeps |z| < 1 bounded.
        let j = Julia::new(Complex::ZERO);
        for p in [Complex::ZERO, Complex::new(0.5, 0.5), Complex::new(-0.9, 0.0)] {
            assert_eq!(j.check(p, 100, DEFAULT_ESCAPE_RADIUS), EscapeResult::Contained);
        }
    }

    #[test]
    fn c_zero_outside_unit_circle_escapes() {
        // 1.5² = 2.25 ≥ 2 on the first step.
        let j = Julia::new(Complex::ZERO);
        assert_eq!(
            j.check(Complex::new(1.5, 0.0), 100, DEFAULT_ESCAPE_RADIUS),
            EscapeResult::Escaped(0)
        );
        // 1.2² = 1.44, 1.44² ≈ 2.07.
        assert_eq!(
            j.check(Complex::new(1.2, 0.0), 100, DEFAULT_ESCAPE_RADIUS),
            EscapeResult::Escaped(1)
        );
    }

    #[test]
    fn constant_is_distinct_from_coordinate() {
        // Same coordinate, different constants, different outcomes.
        let p = Complex::new(0.0, 0.0);
        let bounded = Julia::new(Complex::new(-1.0, 0.0));
        let escaping = Julia::new(Complex::new(1.0, 0.0));
        assert_eq!(bounded.check(p, 100, DEFAULT_ESCAPE_RADIUS), EscapeResult::Contained);
        assert!(matches!(
            escaping.check(p, 100, DEFAULT_ESCAPE_RADIUS),
            EscapeResult::Escaped(_)
        ));
    }

    #[test]
    fn deterministic_results() {
        let j = Julia::default();
        let points = [
            Complex::new(0.0, 0.0),
            Complex::new(0.5, 0.5),
            Complex::new(-1.0, 0.3),
            Complex::new(0.0, 1.0),
        ];
        let run1: Vec<_> = points.iter().map(|&p| j.check(p, 256, 2.0)).collect();
        let run2: Vec<_> = points.iter().map(|&p| j.check(p, 256, 2.0)).collect();
        assert_eq!(run1, run2);
    }
}
