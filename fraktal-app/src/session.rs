use tracing::{debug, warn};

use fraktal_core::{
    validate_iteration_limit, Complex, Dimensions, FractalKind, FractalParams, Viewpoint,
};
use fraktal_render::{
    render, ComputedFrame, Epoch, Palette, PixelBuffer, Scheduler, Throttle,
    Tick, TickBudget,
};

use crate::settings::Settings;

/// What one call to [`Session::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Epoch of the current settings.
    pub epoch: Epoch,
    /// Progress of that epoch in `[0, 1]`.
    pub progress: f64,
    /// The matrix for `epoch` finished during this call.
    pub completed: bool,
    /// The pixel buffer was redrawn.
    pub rendered: bool,
}

/// The state behind one interactive view.
///
/// Every operation validates first and only then replaces the settings, so a
/// rejected edit leaves the session as it was. Changes that affect the
/// matrix are submitted to the scheduler right away; [`frame`](Self::frame)
/// advances the computation and redraws.
pub struct Session {
    settings: Settings,
    scheduler: Scheduler,
    palette: Palette,
    shown: Option<ComputedFrame>,
    buffer: PixelBuffer,
    drag_offset: (i32, i32),
    focus: Option<(u32, u32)>,
    needs_render: bool,
}

impl Session {
    pub fn new(settings: Settings, throttle: Throttle) -> crate::Result<Self> {
        Self::with_scheduler(settings, Scheduler::new(throttle))
    }

    pub fn with_scheduler(mut settings: Settings, scheduler: Scheduler) -> crate::Result<Self> {
        settings.gradient.clamp_to(settings.iteration_limit);
        let palette = settings
            .gradient
            .compute_palette(settings.iteration_limit)?;
        let Dimensions { width, height } = settings.viewpoint.dimensions;
        let mut session = Self {
            settings,
            scheduler,
            palette,
            shown: None,
            buffer: PixelBuffer::new(width, height),
            drag_offset: (0, 0),
            focus: None,
            needs_render: false,
        };
        session.resubmit();
        Ok(session)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The frame currently on screen, if any has completed.
    pub fn shown_frame(&self) -> Option<&ComputedFrame> {
        self.shown.as_ref()
    }

    /// Pixel the current computation works outwards from, when it is not
    /// the view centre.
    pub fn focus(&self) -> Option<(u32, u32)> {
        self.focus
    }

    fn resubmit(&mut self) -> Epoch {
        let inputs = self.settings.compute_inputs();
        match self.focus {
            Some(focus) => self.scheduler.submit_focused(inputs, focus),
            None => self.scheduler.submit(inputs),
        }
    }

    fn set_view(&mut self, viewpoint: Viewpoint) -> crate::Result<&Settings> {
        self.set_view_focused(viewpoint, None)
    }

    fn set_view_focused(
        &mut self,
        viewpoint: Viewpoint,
        focus: Option<(u32, u32)>,
    ) -> crate::Result<&Settings> {
        debug!(range = %viewpoint.describe_range(), "View changed");
        self.settings.viewpoint = viewpoint;
        self.focus = focus;
        self.resubmit();
        self.needs_render = true;
        Ok(&self.settings)
    }

    fn recolor(&mut self) -> crate::Result<&Settings> {
        self.palette = self
            .settings
            .gradient
            .compute_palette(self.settings.iteration_limit)?;
        self.needs_render = true;
        Ok(&self.settings)
    }

    // -- View ---------------------------------------------------------------

    pub fn set_viewpoint(&mut self, center: Complex, scale: f64) -> crate::Result<&Settings> {
        let viewpoint = self
            .settings
            .viewpoint
            .with_center(center)?
            .with_scale(scale)?;
        self.set_view(viewpoint)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) -> crate::Result<&Settings> {
        let viewpoint = self.settings.viewpoint.pan(dx, dy);
        self.set_view(viewpoint)
    }

    pub fn zoom_in(&mut self) -> crate::Result<&Settings> {
        let viewpoint = self.settings.viewpoint.zoom_in()?;
        self.set_view(viewpoint)
    }

    pub fn zoom_out(&mut self) -> crate::Result<&Settings> {
        let viewpoint = self.settings.viewpoint.zoom_out()?;
        self.set_view(viewpoint)
    }

    /// Zoom in keeping pixel `(px, py)` fixed. That pixel is computed first.
    pub fn zoom_in_around(&mut self, px: f64, py: f64) -> crate::Result<&Settings> {
        let viewpoint = self.settings.viewpoint.zoom_in_around(px, py)?;
        self.set_view_focused(viewpoint, Some(cursor_pixel(px, py)))
    }

    pub fn zoom_out_around(&mut self, px: f64, py: f64) -> crate::Result<&Settings> {
        let viewpoint = self.settings.viewpoint.zoom_out_around(px, py)?;
        self.set_view_focused(viewpoint, Some(cursor_pixel(px, py)))
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> crate::Result<&Settings> {
        let viewpoint = self.settings.viewpoint.set_size(width, height)?;
        self.set_view(viewpoint)
    }

    /// Move the shown image by `(dx, dy)` pixels without recomputing.
    pub fn drag(&mut self, dx: i32, dy: i32) {
        if self.drag_offset != (dx, dy) {
            self.drag_offset = (dx, dy);
            self.needs_render = true;
        }
    }

    /// Commit the drag as a pan. The content under the cursor stays put.
    pub fn end_drag(&mut self) -> crate::Result<&Settings> {
        let (dx, dy) = std::mem::take(&mut self.drag_offset);
        self.pan(-dx, -dy)
    }

    // -- Fractal ------------------------------------------------------------

    /// Select a family by name. `c` applies to families with a constant.
    pub fn set_fractal(&mut self, name: &str, c: Option<Complex>) -> crate::Result<&Settings> {
        let params = FractalParams::from_name(name, c)?;
        self.set_fractal_params(params)
    }

    /// Switching family also moves to that family's default view.
    pub fn set_fractal_params(&mut self, params: FractalParams) -> crate::Result<&Settings> {
        if params.kind() != self.settings.fractal.kind() {
            let Dimensions { width, height } = self.settings.viewpoint.dimensions;
            self.settings.viewpoint = match params.kind() {
                FractalKind::Mandelbrot => Viewpoint::default_mandelbrot(width, height)?,
                FractalKind::Julia => Viewpoint::default_julia(width, height)?,
            };
        }
        debug!(fractal = params.name(), "Fractal changed");
        self.settings.fractal = params;
        self.focus = None;
        self.resubmit();
        self.needs_render = true;
        Ok(&self.settings)
    }

    /// Change the iteration limit; the gradient follows the new color count.
    pub fn set_iteration_limit(&mut self, limit: u32) -> crate::Result<&Settings> {
        let limit = validate_iteration_limit(limit)?;
        let old = self.settings.iteration_limit;
        self.settings.gradient.retarget(old, limit);
        self.settings.iteration_limit = limit;
        debug!(from = old, to = limit, "Iteration limit changed");
        self.focus = None;
        self.resubmit();
        self.recolor()
    }

    // -- Gradient -----------------------------------------------------------

    /// The new pivot lands at `index + 1`.
    pub fn insert_pivot(&mut self, index: usize) -> crate::Result<&Settings> {
        self.settings.gradient.insert_pivot(index)?;
        self.recolor()
    }

    pub fn delete_pivot(&mut self, index: usize) -> crate::Result<&Settings> {
        self.settings.gradient.delete_pivot(index)?;
        self.recolor()
    }

    pub fn set_pivot_value(&mut self, index: usize, value: i64) -> crate::Result<&Settings> {
        let num_colors = self.settings.iteration_limit;
        self.settings
            .gradient
            .set_pivot_value(index, value, num_colors)?;
        self.recolor()
    }

    pub fn set_pivot_color(&mut self, index: usize, hex: &str) -> crate::Result<&Settings> {
        self.settings.gradient.set_pivot_color(index, hex)?;
        self.recolor()
    }

    pub fn set_inside_color(&mut self, hex: &str) -> crate::Result<&Settings> {
        self.settings.gradient.set_inside_color(hex)?;
        self.recolor()
    }

    // -- Settings -----------------------------------------------------------

    pub fn serialize_settings(&self) -> crate::Result<String> {
        Ok(self.settings.serialize()?)
    }

    /// Apply a settings string. Blank input resets to defaults; malformed
    /// input is ignored and the session is left unchanged.
    pub fn restore(&mut self, serialized: &str) -> Option<Settings> {
        let settings = Settings::restore(serialized)?;
        match self.apply_settings(settings.clone()) {
            Ok(_) => Some(settings),
            Err(e) => {
                warn!("Could not apply restored settings: {e}");
                None
            }
        }
    }

    /// Pivots above the last color of `settings` are clamped to it.
    pub fn apply_settings(&mut self, mut settings: Settings) -> crate::Result<&Settings> {
        settings.gradient.clamp_to(settings.iteration_limit);
        let palette = settings
            .gradient
            .compute_palette(settings.iteration_limit)?;
        self.settings = settings;
        self.palette = palette;
        self.drag_offset = (0, 0);
        self.focus = None;
        self.resubmit();
        self.needs_render = true;
        Ok(&self.settings)
    }

    // -- Output -------------------------------------------------------------

    /// Progress of the current settings' computation in `[0, 1]`.
    pub fn compute_progress(&self) -> f64 {
        self.scheduler
            .progress()
            .map_or(1.0, |(_, progress)| progress.fraction())
    }

    /// RGBA bytes of the shown image, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.buffer.dimensions()
    }

    /// Advance the computation by one adaptive tick and redraw if needed.
    pub fn frame(&mut self) -> FrameReport {
        let epoch = self.resubmit();
        let completed = match self.scheduler.tick(TickBudget::Adaptive) {
            Tick::Completed { frame, .. } => {
                self.scheduler.take_completed();
                self.shown = Some(frame);
                self.needs_render = true;
                true
            }
            Tick::Progress { .. } | Tick::Idle => false,
        };

        let rendered = self.needs_render && self.redraw();
        FrameReport {
            epoch,
            progress: self.compute_progress(),
            completed,
            rendered,
        }
    }

    fn redraw(&mut self) -> bool {
        let Some(frame) = &self.shown else {
            return false;
        };
        let offset = display_offset(frame, &self.settings.viewpoint, self.drag_offset);
        render(
            &mut self.buffer,
            &frame.matrix,
            &self.palette,
            self.settings.gradient.inside_color(),
            offset,
        );
        self.needs_render = false;
        true
    }
}

/// The pixel under a cursor position. Negative and NaN positions map to 0;
/// the scheduler clamps to the image.
fn cursor_pixel(px: f64, py: f64) -> (u32, u32) {
    (px.max(0.0) as u32, py.max(0.0) as u32)
}

/// Pixel offset at which to draw `frame` so it lines up with `current`.
///
/// While a recomputation is pending the shown frame belongs to an older
/// view; when only the center differs it is drawn shifted instead of
/// snapping back. The live drag offset is added on top.
fn display_offset(frame: &ComputedFrame, current: &Viewpoint, drag: (i32, i32)) -> (i32, i32) {
    let shown = &frame.inputs.viewpoint;
    if shown.scale != current.scale || shown.dimensions != current.dimensions {
        return drag;
    }
    let step = current.pixel_size();
    let delta = shown.center - current.center;
    (
        drag.0.saturating_add((delta.re / step).round() as i32),
        drag.1.saturating_sub((delta.im / step).round() as i32),
    )
}
