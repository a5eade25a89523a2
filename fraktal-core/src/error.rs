use thiserror::Error;

/// Errors originating from the viewpoint model and fractal kernels.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("invalid iteration limit: {0} (must be between 1 and 1048576)")]
    InvalidIterationLimit(u32),

    #[error("unknown fractal family: {0:?}")]
    UnknownFractal(String),
}
