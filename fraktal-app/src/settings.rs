use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fraktal_core::{
    validate_iteration_limit, Complex, Dimensions, FractalParams, Viewpoint,
    DEFAULT_ITERATION_LIMIT,
};
use fraktal_render::{ComputeInputs, Gradient, Rgb};

use crate::error::SettingsError;

/// Prefix of every settings string this build writes.
pub const SETTINGS_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The complete shareable state of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub viewpoint: Viewpoint,
    pub fractal: FractalParams,
    pub iteration_limit: u32,
    pub gradient: Gradient,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewpoint: Viewpoint::default(),
            fractal: FractalParams::default(),
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            gradient: Gradient::default(),
        }
    }
}

impl Settings {
    /// What the scheduler needs to compute a frame for these settings.
    pub fn compute_inputs(&self) -> ComputeInputs {
        ComputeInputs::new(self.viewpoint, self.fractal, self.iteration_limit)
    }

    /// Encode as `"1:"` followed by URL-safe unpadded base64 of the JSON form.
    ///
    /// Pivot ids are not part of the encoding.
    pub fn serialize(&self) -> Result<String, SettingsError> {
        let json = serde_json::to_vec(&SettingsPayload::from(self))?;
        Ok(format!(
            "{SETTINGS_VERSION}:{}",
            URL_SAFE_NO_PAD.encode(json)
        ))
    }

    /// Decode a settings string, reporting exactly what was wrong with it.
    pub fn deserialize(serialized: &str) -> Result<Self, SettingsError> {
        let serialized = serialized.trim();
        let (version, body) = serialized
            .split_once(':')
            .ok_or_else(|| SettingsError::UnsupportedVersion(String::new()))?;
        if version != SETTINGS_VERSION {
            return Err(SettingsError::UnsupportedVersion(version.to_string()));
        }

        let json = URL_SAFE_NO_PAD.decode(body)?;
        let payload: SettingsPayload = serde_json::from_slice(&json)?;
        payload.into_settings()
    }

    /// Lenient form of [`deserialize`](Self::deserialize) for host input.
    ///
    /// Blank input yields the defaults. Malformed input yields `None` and is
    /// logged; the caller keeps its current state.
    pub fn restore(serialized: &str) -> Option<Self> {
        if serialized.trim().is_empty() {
            debug!("Empty settings string, using defaults");
            return Some(Self::default());
        }
        match Self::deserialize(serialized) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring malformed settings string: {e}");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

/// JSON layout of a settings string.
///
/// Colors travel as text and the view as raw numbers so that decoding can
/// report invalid values through the core and render error types.
#[derive(Debug, Serialize, Deserialize)]
struct SettingsPayload {
    center: Complex,
    scale: f64,
    dimensions: Dimensions,
    fractal: FractalParams,
    iteration_limit: u32,
    gradient: GradientPayload,
}

#[derive(Debug, Serialize, Deserialize)]
struct GradientPayload {
    inside: String,
    pivots: Vec<PivotPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PivotPayload {
    value: u32,
    color: String,
}

impl From<&Settings> for SettingsPayload {
    fn from(settings: &Settings) -> Self {
        let gradient = &settings.gradient;
        Self {
            center: settings.viewpoint.center,
            scale: settings.viewpoint.scale,
            dimensions: settings.viewpoint.dimensions,
            fractal: settings.fractal,
            iteration_limit: settings.iteration_limit,
            gradient: GradientPayload {
                inside: gradient.inside_color().to_hex(),
                pivots: gradient
                    .pivots()
                    .iter()
                    .map(|p| PivotPayload {
                        value: p.value,
                        color: p.color.to_hex(),
                    })
                    .collect(),
            },
        }
    }
}

impl SettingsPayload {
    fn into_settings(self) -> Result<Settings, SettingsError> {
        let viewpoint = Viewpoint::new(
            self.center,
            self.scale,
            self.dimensions.width,
            self.dimensions.height,
        )?;
        let iteration_limit = validate_iteration_limit(self.iteration_limit)?;

        let inside = Rgb::parse_hex(&self.gradient.inside)?;
        let stops = self
            .gradient
            .pivots
            .iter()
            .map(|p| Ok((p.value, Rgb::parse_hex(&p.color)?)))
            .collect::<fraktal_render::Result<Vec<_>>>()?;
        let mut gradient = Gradient::new(stops, inside)?;
        gradient.clamp_to(iteration_limit);

        Ok(Settings {
            viewpoint,
            fractal: self.fractal,
            iteration_limit,
            gradient,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
