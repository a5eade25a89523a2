pub mod complex;
pub mod error;
pub mod fractal;
pub mod julia;
pub mod mandelbrot;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use fractal::{
    validate_iteration_limit, EscapeResult, Fractal, FractalKind, FractalParams,
    DEFAULT_ESCAPE_RADIUS, DEFAULT_ITERATION_LIMIT, MAX_ITERATION_LIMIT,
};
pub use julia::Julia;
pub use mandelbrot::Mandelbrot;
pub use viewport::{Dimensions, Limits, Viewpoint, MAX_SCALE, MIN_SCALE};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
