use thiserror::Error;

use fraktal_core::CoreError;
use fraktal_render::RenderError;

/// Why a settings string could not be turned back into [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unsupported settings version {0:?}")]
    UnsupportedVersion(String),

    #[error("settings payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("settings payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings describe an invalid view: {0}")]
    Core(#[from] CoreError),

    #[error("settings describe an invalid gradient: {0}")]
    Render(#[from] RenderError),
}

/// Errors surfaced by session operations and the worker.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
