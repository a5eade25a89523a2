use thiserror::Error;

/// Errors originating from palette construction and gradient editing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("malformed color {0:?} (expected #rrggbb)")]
    MalformedColor(String),

    #[error("pivot index {index} out of range for {len} pivots")]
    PivotOutOfRange { index: usize, len: usize },

    #[error("a gradient needs at least {min} pivots")]
    TooFewPivots { min: usize },

    #[error("invalid color count: {0} (must be >= 1)")]
    InvalidColorCount(u32),

    #[error(transparent)]
    Core(#[from] fraktal_core::CoreError),
}
