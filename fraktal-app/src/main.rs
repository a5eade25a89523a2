use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info, warn};

use fraktal_app::{presets, AppPreferences, Session, Settings, WorkerHandle};
use fraktal_core::{validate_iteration_limit, EscapeResult, Viewpoint};

/// Give up on a single frame after this long.
const FRAME_TIMEOUT: Duration = Duration::from_secs(600);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Fraktal");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Usage: `fraktal [--threaded] [PRESET | SETTINGS]`
///
/// Computes one frame, logs a summary and prints the settings string that
/// reproduces it.
fn run() -> fraktal_app::Result<()> {
    let mut prefs = AppPreferences::load();

    let mut threaded = false;
    let mut source = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--threaded" => threaded = true,
            "--list-presets" => {
                for preset in &fraktal_app::PRESETS {
                    println!("{}", preset.name);
                }
                return Ok(());
            }
            _ => source = Some(arg),
        }
    }

    let settings = initial_settings(source.as_deref(), &prefs)?;
    info!(
        fractal = settings.fractal.name(),
        iteration_limit = settings.iteration_limit,
        range = %settings.viewpoint.describe_range(),
        "Initial view"
    );

    let shared = if threaded {
        run_threaded(&settings, &prefs)?;
        settings.serialize()?
    } else {
        let mut session = Session::with_scheduler(settings, prefs.scheduler())?;
        let mut frames = 0u64;
        loop {
            frames += 1;
            if session.frame().completed {
                break;
            }
        }
        if let Some(frame) = session.shown_frame() {
            log_summary(&frame.matrix.data, frames, frame.elapsed);
        }
        session.serialize_settings()?
    };

    println!("{shared}");
    prefs.last_settings = Some(shared);
    prefs.save();
    Ok(())
}

/// Preset name or settings string from the command line, else the last
/// session if enabled, else defaults sized from preferences.
fn initial_settings(source: Option<&str>, prefs: &AppPreferences) -> fraktal_app::Result<Settings> {
    if let Some(source) = source {
        if let Some(preset) = presets::find(source) {
            info!("Using preset {:?}", preset.name);
            return Ok(preset.settings(prefs.window_width, prefs.window_height)?);
        }
        if let Some(settings) = Settings::restore(source) {
            return Ok(settings);
        }
        warn!("Argument is neither a preset nor a settings string, using defaults");
    } else if prefs.restore_last_view {
        if let Some(settings) = prefs.last_settings.as_deref().and_then(Settings::restore) {
            info!("Restored last view");
            return Ok(settings);
        }
    }

    let defaults = AppPreferences::default();
    let limit = validate_iteration_limit(prefs.default_iteration_limit).unwrap_or_else(|e| {
        warn!("{e}, using {}", defaults.default_iteration_limit);
        defaults.default_iteration_limit
    });
    let viewpoint = Viewpoint::default_mandelbrot(prefs.window_width, prefs.window_height)
        .or_else(|e| {
            warn!("{e}, using a {}x{} window", defaults.window_width, defaults.window_height);
            Viewpoint::default_mandelbrot(defaults.window_width, defaults.window_height)
        })?;
    let mut settings = Settings {
        viewpoint,
        ..Settings::default()
    };
    settings
        .gradient
        .retarget(settings.iteration_limit, limit);
    settings.iteration_limit = limit;
    Ok(settings)
}

fn run_threaded(settings: &Settings, prefs: &AppPreferences) -> fraktal_app::Result<()> {
    let mut worker = WorkerHandle::spawn_with(prefs.scheduler())?;
    worker.submit(settings.compute_inputs());
    match worker.wait_completed(FRAME_TIMEOUT) {
        Some(frame) => log_summary(&frame.matrix.data, 1, frame.elapsed),
        None => warn!("Worker did not finish within {:?}", FRAME_TIMEOUT),
    }
    Ok(())
}

fn log_summary(cells: &[EscapeResult], frames: u64, elapsed: Duration) {
    let contained = cells
        .iter()
        .filter(|r| **r == EscapeResult::Contained)
        .count();
    info!(
        pixels = cells.len(),
        contained,
        frames,
        elapsed_ms = elapsed.as_millis() as u64,
        "Frame complete"
    );
}
