pub mod app_dir;
pub mod error;
pub mod preferences;
pub mod presets;
pub mod session;
pub mod settings;
pub mod worker;

pub use error::{AppError, SettingsError};
pub use preferences::AppPreferences;
pub use presets::{Preset, PRESETS};
pub use session::{FrameReport, Session};
pub use settings::{Settings, SETTINGS_VERSION};
pub use worker::{ComputeRequest, WorkerEvent, WorkerHandle};

/// Convenience result type for the app crate.
pub type Result<T> = std::result::Result<T, AppError>;
