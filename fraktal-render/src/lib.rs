pub mod buffer;
pub mod color;
pub mod error;
pub mod gradient;
pub mod matrix;
pub mod palette;
pub mod region;
pub mod renderer;
pub mod scheduler;

pub use buffer::PixelBuffer;
pub use color::Rgb;
pub use error::RenderError;
pub use gradient::{Gradient, GradientPivot, PivotId, MIN_PIVOTS};
pub use matrix::IterationMatrix;
pub use palette::Palette;
pub use region::Region;
pub use renderer::{render, NO_DATA};
pub use scheduler::{
    ComputeInputs, ComputedFrame, Epoch, Progress, Scheduler, SchedulerState, Throttle, Tick,
    TickBudget,
};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
