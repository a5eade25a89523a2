use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use fraktal_core::{validate_iteration_limit, Viewpoint, DEFAULT_ITERATION_LIMIT};
use fraktal_render::{Scheduler, Throttle};

// ---------------------------------------------------------------------------
// Application preferences
// ---------------------------------------------------------------------------

/// Host-side configuration persisted next to the executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_iteration_limit")]
    pub default_iteration_limit: u32,
    /// Time one adaptive tick may take before the quantum shrinks.
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: u64,
    #[serde(default = "default_initial_quantum")]
    pub initial_quantum: usize,
    /// Fill regions whose whole border is contained without iterating them.
    #[serde(default)]
    pub border_fill: bool,
    #[serde(default = "default_true")]
    pub restore_last_view: bool,
    /// Settings string of the last session, restored on startup.
    #[serde(default)]
    pub last_settings: Option<String>,
}

fn default_window_width() -> u32 {
    800
}
fn default_window_height() -> u32 {
    600
}
fn default_iteration_limit() -> u32 {
    DEFAULT_ITERATION_LIMIT
}
fn default_frame_budget_ms() -> u64 {
    Throttle::DEFAULT_FRAME_BUDGET.as_millis() as u64
}
fn default_initial_quantum() -> usize {
    Throttle::DEFAULT_QUANTUM
}
fn default_true() -> bool {
    true
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            default_iteration_limit: default_iteration_limit(),
            frame_budget_ms: default_frame_budget_ms(),
            initial_quantum: default_initial_quantum(),
            border_fill: false,
            restore_last_view: true,
            last_settings: None,
        }
    }
}

impl AppPreferences {
    /// Load preferences from next to the executable, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&crate::app_dir::preferences_path())
    }

    /// Load preferences from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<AppPreferences>(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    return prefs.validated();
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    /// Persist preferences next to the executable. Failures are logged.
    pub fn save(&self) {
        let path = crate::app_dir::preferences_path();
        if let Err(e) = self.save_to(&path) {
            error!("Failed to write preferences: {e}");
        }
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)?;
        debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// Replace values the core would reject with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if let Err(e) = validate_iteration_limit(self.default_iteration_limit) {
            warn!("Ignoring default_iteration_limit from preferences: {e}");
            self.default_iteration_limit = defaults.default_iteration_limit;
        }
        if let Err(e) = Viewpoint::default_mandelbrot(self.window_width, self.window_height) {
            warn!("Ignoring window size from preferences: {e}");
            self.window_width = defaults.window_width;
            self.window_height = defaults.window_height;
        }
        self
    }

    /// Throttle configured from these preferences.
    pub fn throttle(&self) -> Throttle {
        Throttle::new(
            Duration::from_millis(self.frame_budget_ms),
            self.initial_quantum,
        )
    }

    /// Scheduler configured from these preferences.
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.throttle()).with_border_fill(self.border_fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("fraktal-prefs-{}-{name}", std::process::id()))
            .join("preferences.json")
    }

    #[test]
    fn missing_fields_take_defaults() {
        let prefs: AppPreferences =
            serde_json::from_str(r#"{"window_width": 1024, "restore_last_view": false}"#).unwrap();
        assert_eq!(prefs.window_width, 1024);
        assert_eq!(prefs.window_height, 600);
        assert!(!prefs.restore_last_view);
        assert_eq!(prefs.default_iteration_limit, DEFAULT_ITERATION_LIMIT);
        assert_eq!(prefs.frame_budget_ms, 16);
        assert_eq!(prefs.last_settings, None);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip");
        let prefs = AppPreferences {
            window_width: 320,
            last_settings: Some("1:abc".into()),
            ..AppPreferences::default()
        };
        prefs.save_to(&path).unwrap();
        assert_eq!(AppPreferences::load_from(&path), prefs);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppPreferences::load_from(&path), AppPreferences::default());
        assert_eq!(
            AppPreferences::load_from(&temp_path("absent")),
            AppPreferences::default()
        );
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn out_of_range_values_fall_back_to_defaults() {
        let path = temp_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"window_width": 0, "window_height": 480, "default_iteration_limit": 0,
                "frame_budget_ms": 8}"#,
        )
        .unwrap();
        let prefs = AppPreferences::load_from(&path);
        let defaults = AppPreferences::default();
        assert_eq!(prefs.window_width, defaults.window_width);
        assert_eq!(prefs.window_height, defaults.window_height);
        assert_eq!(prefs.default_iteration_limit, DEFAULT_ITERATION_LIMIT);
        assert_eq!(prefs.frame_budget_ms, 8);
        let _ = fs::remove_dir_all(path.parent().unwrap());

        let valid = AppPreferences {
            window_width: 320,
            default_iteration_limit: 75,
            ..defaults
        };
        assert_eq!(valid.clone().validated(), valid);
    }

    #[test]
    fn scheduler_follows_border_fill() {
        assert!(!AppPreferences::default().scheduler().border_fill());
        let prefs: AppPreferences = serde_json::from_str(r#"{"border_fill": true}"#).unwrap();
        assert!(prefs.scheduler().border_fill());
    }

    #[test]
    fn throttle_uses_configured_budget() {
        let prefs = AppPreferences {
            frame_budget_ms: 8,
            initial_quantum: 1000,
            ..AppPreferences::default()
        };
        let throttle = prefs.throttle();
        assert_eq!(throttle.frame_budget(), Duration::from_millis(8));
        assert_eq!(throttle.quantum(), 1000);
    }
}
