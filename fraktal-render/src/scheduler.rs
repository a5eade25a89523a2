use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use fraktal_core::{
    Dimensions, EscapeResult, Fractal, FractalParams, Viewpoint, DEFAULT_ESCAPE_RADIUS,
};

use crate::matrix::IterationMatrix;
use crate::region::Region;

// ---------------------------------------------------------------------------
// Epochs and progress
// ---------------------------------------------------------------------------

/// Identifies one computation. Strictly increasing across submissions, so
/// anything tagged with an older epoch is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(pub u64);

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pixels done out of the matrix total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Everything that determines the iteration matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputeInputs {
    pub viewpoint: Viewpoint,
    pub fractal: FractalParams,
    pub iteration_limit: u32,
    pub escape_radius: f64,
}

impl ComputeInputs {
    /// Inputs with the default escape radius.
    pub fn new(viewpoint: Viewpoint, fractal: FractalParams, iteration_limit: u32) -> Self {
        Self {
            viewpoint,
            fractal,
            iteration_limit,
            escape_radius: DEFAULT_ESCAPE_RADIUS,
        }
    }
}

/// A finished matrix together with the inputs that produced it.
#[derive(Debug, Clone)]
pub struct ComputedFrame {
    pub epoch: Epoch,
    pub inputs: ComputeInputs,
    pub matrix: Arc<IterationMatrix>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Computing,
    Completed,
}

/// How much work one [`Scheduler::tick`] may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickBudget {
    /// A fixed number of pixels.
    Pixels(usize),
    /// Whatever the [`Throttle`] currently allows.
    Adaptive,
}

/// Outcome of one tick.
#[derive(Debug, Clone)]
pub enum Tick {
    Progress { epoch: Epoch, progress: Progress },
    /// Emitted exactly once per epoch.
    Completed { epoch: Epoch, frame: ComputedFrame },
    Idle,
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

/// Sizes the per-tick quantum from how long the previous tick took.
///
/// A tick slower than the frame budget halves the quantum; one that used
/// less than half of it doubles the quantum. Both moves are bounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle {
    frame_budget: Duration,
    quantum: usize,
    min_quantum: usize,
    max_quantum: usize,
}

impl Throttle {
    pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(16);
    pub const DEFAULT_QUANTUM: usize = 4096;
    pub const MIN_QUANTUM: usize = 64;
    pub const MAX_QUANTUM: usize = 1 << 20;

    pub fn new(frame_budget: Duration, initial_quantum: usize) -> Self {
        Self::with_bounds(
            frame_budget,
            initial_quantum,
            Self::MIN_QUANTUM,
            Self::MAX_QUANTUM,
        )
    }

    pub fn with_bounds(
        frame_budget: Duration,
        initial_quantum: usize,
        min_quantum: usize,
        max_quantum: usize,
    ) -> Self {
        let min_quantum = min_quantum.max(1);
        let max_quantum = max_quantum.max(min_quantum);
        Self {
            frame_budget,
            quantum: initial_quantum.clamp(min_quantum, max_quantum),
            min_quantum,
            max_quantum,
        }
    }

    pub fn quantum(&self) -> usize {
        self.quantum
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Feed back the duration of the tick that just ran.
    pub fn record(&mut self, elapsed: Duration) {
        let before = self.quantum;
        if elapsed > self.frame_budget {
            self.quantum = (self.quantum / 2).max(self.min_quantum);
        } else if elapsed < self.frame_budget / 2 {
            self.quantum = self.quantum.saturating_mul(2).min(self.max_quantum);
        }
        if self.quantum != before {
            debug!(
                elapsed_us = elapsed.as_micros() as u64,
                from = before,
                to = self.quantum,
                "Throttle adjusted quantum"
            );
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FRAME_BUDGET, Self::DEFAULT_QUANTUM)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// How far (in pixels) a center shift may be from a whole pixel and still
/// count as a pan of the previous frame.
const PAN_SNAP: f64 = 1e-3;

/// A region waiting in the queue. The nearest to the focus pops first, ties
/// in submission order.
#[derive(Debug, PartialEq, Eq)]
struct Pending {
    distance: u64,
    order: u64,
    region: Region,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Job {
    epoch: Epoch,
    inputs: ComputeInputs,
    kernel: Arc<dyn Fractal>,
    matrix: IterationMatrix,
    pending: BinaryHeap<Pending>,
    focus: (u32, u32),
    next_order: u64,
    done: usize,
    started: Instant,
}

impl Job {
    fn progress(&self) -> Progress {
        Progress {
            completed: self.done,
            total: self.matrix.len(),
        }
    }

    fn push(&mut self, region: Region) {
        if region.is_empty() {
            return;
        }
        self.pending.push(Pending {
            distance: region.distance_sq_to(self.focus),
            order: self.next_order,
            region,
        });
        self.next_order += 1;
    }

    fn refocus(&mut self, focus: (u32, u32)) {
        self.focus = focus;
        self.pending = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|p| Pending {
                distance: p.region.distance_sq_to(focus),
                ..p
            })
            .collect();
    }
}

/// Incremental, restartable computation of one iteration matrix at a time.
///
/// The caller drives it with [`tick`](Self::tick). Work is queued as
/// rectangular regions and taken nearest the focus first: the zoom cursor
/// after a zoom around a point, the view centre otherwise. Submitting
/// different inputs while a computation is running supersedes it: the
/// partial matrix is dropped and the epoch advances.
///
/// When new inputs differ from the last completed frame only by a whole
/// pixel shift of the centre, the overlapping cells are copied from that
/// frame and only the newly exposed strips are computed.
pub struct Scheduler {
    epoch: Epoch,
    last_inputs: Option<ComputeInputs>,
    job: Option<Job>,
    completed: Option<ComputedFrame>,
    last_frame: Option<ComputedFrame>,
    throttle: Throttle,
    border_fill: bool,
}

impl Scheduler {
    pub fn new(throttle: Throttle) -> Self {
        Self {
            epoch: Epoch::default(),
            last_inputs: None,
            job: None,
            completed: None,
            last_frame: None,
            throttle,
            border_fill: false,
        }
    }

    /// Fill a region's interior without iterating when its whole border is
    /// contained.
    ///
    /// The border is sampled at pixel centres, so a thin filament of escaping
    /// points crossing the region can be missed. Off by default.
    pub fn with_border_fill(mut self, enabled: bool) -> Self {
        self.border_fill = enabled;
        self
    }

    pub fn border_fill(&self) -> bool {
        self.border_fill
    }

    pub fn state(&self) -> SchedulerState {
        if self.job.is_some() {
            SchedulerState::Computing
        } else if self.completed.is_some() {
            SchedulerState::Completed
        } else {
            SchedulerState::Idle
        }
    }

    /// The most recently assigned epoch.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Start computing `inputs`, nearest the view centre first, and return
    /// the epoch that identifies it.
    ///
    /// Inputs equal to the last submission keep the current epoch and any
    /// work already done for it.
    pub fn submit(&mut self, inputs: ComputeInputs) -> Epoch {
        self.submit_with_focus(inputs, None)
    }

    /// Like [`submit`](Self::submit), but compute outwards from pixel
    /// `focus`. Resubmitting identical inputs with a new focus reorders the
    /// remaining work.
    pub fn submit_focused(&mut self, inputs: ComputeInputs, focus: (u32, u32)) -> Epoch {
        self.submit_with_focus(inputs, Some(focus))
    }

    fn submit_with_focus(&mut self, inputs: ComputeInputs, focus: Option<(u32, u32)>) -> Epoch {
        let Dimensions { width, height } = inputs.viewpoint.dimensions;
        let focus = focus.map_or((width / 2, height / 2), |(x, y)| {
            (x.min(width - 1), y.min(height - 1))
        });

        if self.last_inputs.as_ref() == Some(&inputs) {
            if let Some(job) = self.job.as_mut().filter(|job| job.focus != focus) {
                debug!(epoch = %job.epoch, x = focus.0, y = focus.1, "Refocused computation");
                job.refocus(focus);
            }
            return self.epoch;
        }

        let previous = self.epoch;
        self.epoch = Epoch(previous.0 + 1);
        if let Some(old) = self.job.take() {
            debug!(
                superseded = %old.epoch,
                epoch = %self.epoch,
                done = old.done,
                total = old.matrix.len(),
                "Superseding in-flight computation"
            );
        }
        self.completed = None;

        let (matrix, dirty) = match self.reuse_after_pan(&inputs) {
            Some(seeded) => seeded,
            None => (
                IterationMatrix::new(width, height),
                vec![Region::new(0, 0, width, height)],
            ),
        };
        let dirty_cells: usize = dirty.iter().map(Region::cell_count).sum();
        let mut job = Job {
            epoch: self.epoch,
            inputs,
            kernel: inputs.fractal.kernel(),
            done: matrix.len() - dirty_cells,
            matrix,
            pending: BinaryHeap::new(),
            focus,
            next_order: 0,
            started: Instant::now(),
        };
        for region in dirty {
            job.push(region);
        }
        self.job = Some(job);
        self.last_inputs = Some(inputs);

        debug!(
            epoch = %self.epoch,
            fractal = inputs.fractal.name(),
            width,
            height,
            iteration_limit = inputs.iteration_limit,
            dirty_cells,
            "Submitted computation"
        );
        self.epoch
    }

    /// Seed a matrix for `inputs` from the last completed frame when the
    /// change is a whole-pixel pan. Returns the matrix and the exposed strips
    /// still to compute.
    fn reuse_after_pan(&self, inputs: &ComputeInputs) -> Option<(IterationMatrix, Vec<Region>)> {
        let last = self.last_frame.as_ref()?;
        let (dx, dy) = pan_offset(&last.inputs, inputs)?;
        let Dimensions { width, height } = inputs.viewpoint.dimensions;
        let (w, h) = (width as i64, height as i64);
        if dx.abs() >= w || dy.abs() >= h {
            return None;
        }

        // New cell (x, y) shows what old cell (x + dx, y + dy) showed.
        let mut matrix = IterationMatrix::new(width, height);
        for y in 0..h {
            let sy = y + dy;
            if !(0..h).contains(&sy) {
                continue;
            }
            for x in 0..w {
                let sx = x + dx;
                if (0..w).contains(&sx) {
                    matrix.data[(y * w + x) as usize] = last.matrix.data[(sy * w + sx) as usize];
                }
            }
        }

        let (fresh_x0, fresh_x1) = if dx > 0 { (w - dx, w) } else { (0, -dx) };
        let (fresh_y0, fresh_y1) = if dy > 0 { (h - dy, h) } else { (0, -dy) };
        let (kept_x0, kept_x1) = if dx > 0 { (0, w - dx) } else { (-dx, w) };
        let mut dirty = Vec::new();
        if dx != 0 {
            dirty.push(Region::new(
                fresh_x0 as u32,
                0,
                (fresh_x1 - fresh_x0) as u32,
                height,
            ));
        }
        if dy != 0 {
            dirty.push(Region::new(
                kept_x0 as u32,
                fresh_y0 as u32,
                (kept_x1 - kept_x0) as u32,
                (fresh_y1 - fresh_y0) as u32,
            ));
        }

        debug!(
            from = %last.epoch,
            dx,
            dy,
            "Reusing completed frame after pan"
        );
        Some((matrix, dirty))
    }

    /// Compute at least one pending region and at most one quantum of
    /// border cells beyond the first.
    pub fn tick(&mut self, budget: TickBudget) -> Tick {
        let border_fill = self.border_fill;
        let Some(job) = self.job.as_mut() else {
            return Tick::Idle;
        };

        let quantum = match budget {
            TickBudget::Pixels(n) => n.max(1),
            TickBudget::Adaptive => self.throttle.quantum(),
        };
        let slice_started = Instant::now();

        let mut batch = Vec::new();
        let mut cells = 0;
        while cells < quantum {
            let Some(next) = job.pending.pop() else {
                break;
            };
            cells += next.region.border_len();
            batch.push(next.region);
        }

        let width = job.matrix.width as usize;
        let indices: Vec<usize> = batch
            .iter()
            .flat_map(|region| region.border())
            .map(|(x, y)| y as usize * width + x as usize)
            .collect();
        let results = compute_cells(job, &indices);
        for (&index, &result) in indices.iter().zip(&results) {
            job.matrix.data[index] = result;
        }
        job.done += indices.len();

        let mut offset = 0;
        for region in batch {
            let border = &results[offset..offset + region.border_len()];
            offset += border.len();
            let enclosed = border.iter().all(|r| *r == EscapeResult::Contained);
            match region.interior() {
                Some(inner) if border_fill && enclosed => {
                    for (x, y) in inner.cells() {
                        job.matrix.data[y as usize * width + x as usize] = EscapeResult::Contained;
                    }
                    job.done += inner.cell_count();
                }
                _ => {
                    for part in region.trisect().into_iter().flatten() {
                        job.push(part);
                    }
                }
            }
        }

        if budget == TickBudget::Adaptive {
            self.throttle.record(slice_started.elapsed());
        }

        if !job.pending.is_empty() {
            return Tick::Progress {
                epoch: job.epoch,
                progress: job.progress(),
            };
        }

        let Some(job) = self.job.take() else {
            return Tick::Idle;
        };
        let elapsed = job.started.elapsed();
        info!(
            epoch = %job.epoch,
            pixels = job.matrix.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Computation complete"
        );
        let frame = ComputedFrame {
            epoch: job.epoch,
            inputs: job.inputs,
            matrix: Arc::new(job.matrix),
            elapsed,
        };
        self.completed = Some(frame.clone());
        self.last_frame = Some(frame.clone());
        Tick::Completed {
            epoch: frame.epoch,
            frame,
        }
    }

    /// Progress of the current epoch, if there is one in flight or finished.
    pub fn progress(&self) -> Option<(Epoch, Progress)> {
        if let Some(job) = &self.job {
            return Some((job.epoch, job.progress()));
        }
        self.completed.as_ref().map(|frame| {
            let total = frame.matrix.len();
            (
                frame.epoch,
                Progress {
                    completed: total,
                    total,
                },
            )
        })
    }

    /// Hand over the finished frame. The scheduler returns to idle.
    pub fn take_completed(&mut self) -> Option<ComputedFrame> {
        self.completed.take()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Throttle::default())
    }
}

/// Whole-pixel shift `(dx, dy)` such that cell `(x, y)` of `new` shows cell
/// `(x + dx, y + dy)` of `old`, or `None` when anything but the centre
/// changed.
fn pan_offset(old: &ComputeInputs, new: &ComputeInputs) -> Option<(i64, i64)> {
    let same_frame = old.fractal == new.fractal
        && old.iteration_limit == new.iteration_limit
        && old.escape_radius == new.escape_radius
        && old.viewpoint.scale == new.viewpoint.scale
        && old.viewpoint.dimensions == new.viewpoint.dimensions;
    if !same_frame {
        return None;
    }
    let step = new.viewpoint.pixel_size();
    let dx = (new.viewpoint.center.re - old.viewpoint.center.re) / step;
    let dy = (old.viewpoint.center.im - new.viewpoint.center.im) / step;
    let (rx, ry) = (dx.round(), dy.round());
    if !rx.is_finite() || !ry.is_finite() {
        return None;
    }
    if (dx - rx).abs() > PAN_SNAP || (dy - ry).abs() > PAN_SNAP {
        return None;
    }
    Some((rx as i64, ry as i64))
}

/// Evaluate the kernel for each row-major cell index in parallel.
fn compute_cells(job: &Job, indices: &[usize]) -> Vec<EscapeResult> {
    let inputs = job.inputs;
    let width = inputs.viewpoint.width() as usize;
    let kernel = job.kernel.as_ref();

    indices
        .par_iter()
        .map(|&index| {
            let x = (index % width) as f64;
            let y = (index / width) as f64;
            let point = inputs.viewpoint.pixel_to_complex(x, y);
            kernel.check(point, inputs.iteration_limit, inputs.escape_radius)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(width: u32, height: u32, limit: u32) -> ComputeInputs {
        ComputeInputs::new(
            Viewpoint::default_mandelbrot(width, height).unwrap(),
            FractalParams::Mandelbrot,
            limit,
        )
    }

    fn run_to_completion(scheduler: &mut Scheduler, budget: TickBudget) -> ComputedFrame {
        loop {
            match scheduler.tick(budget) {
                Tick::Completed { frame, .. } => return frame,
                Tick::Progress { .. } => {}
                Tick::Idle => panic!("scheduler went idle before completing"),
            }
        }
    }

    #[test]
    fn idle_until_submitted() {
        let mut s = Scheduler::default();
        assert_eq!(s.state(), SchedulerState::Idle);
        assert!(matches!(s.tick(TickBudget::Pixels(10)), Tick::Idle));
        assert_eq!(s.progress(), None);
    }

    #[test]
    fn ticks_progress_monotonically_and_complete_once() {
        let mut s = Scheduler::default();
        let epoch = s.submit(inputs(10, 7, 30));
        assert_eq!(epoch, Epoch(1));
        assert_eq!(s.state(), SchedulerState::Computing);

        let mut last = 0;
        let mut completions = 0;
        for _ in 0..20 {
            match s.tick(TickBudget::Pixels(16)) {
                Tick::Progress { epoch: e, progress } => {
                    assert_eq!(e, epoch);
                    assert_eq!(progress.total, 70);
                    assert!(progress.completed > last);
                    last = progress.completed;
                }
                Tick::Completed { epoch: e, frame } => {
                    assert_eq!(e, epoch);
                    assert_eq!(frame.matrix.len(), 70);
                    completions += 1;
                }
                Tick::Idle => break,
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(s.state(), SchedulerState::Completed);
        assert_eq!(
            s.progress(),
            Some((epoch, Progress { completed: 70, total: 70 }))
        );
        assert!(s.take_completed().is_some());
        assert_eq!(s.state(), SchedulerState::Idle);
    }

    #[test]
    fn quantum_size_does_not_change_the_result() {
        let mut a = Scheduler::default();
        a.submit(inputs(13, 9, 40));
        let whole = run_to_completion(&mut a, TickBudget::Pixels(usize::MAX));

        let mut b = Scheduler::default();
        b.submit(inputs(13, 9, 40));
        let sliced = run_to_completion(&mut b, TickBudget::Pixels(5));

        assert_eq!(whole.matrix, sliced.matrix);
    }

    #[test]
    fn identical_inputs_keep_epoch() {
        let mut s = Scheduler::default();
        let first = s.submit(inputs(8, 8, 20));
        s.tick(TickBudget::Pixels(10));
        let done = s.progress().unwrap().1.completed;
        assert!(done > 0);
        assert_eq!(s.submit(inputs(8, 8, 20)), first);
        assert_eq!(s.progress().unwrap().1.completed, done);
    }

    #[test]
    fn first_tick_starts_with_the_outer_ring() {
        let mut s = Scheduler::default();
        s.submit(inputs(8, 8, 20));
        match s.tick(TickBudget::Pixels(1)) {
            Tick::Progress { progress, .. } => assert_eq!(progress.completed, 28),
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Progress after the outer ring and one more region.
    fn after_two_regions(s: &mut Scheduler) -> usize {
        s.tick(TickBudget::Pixels(1));
        match s.tick(TickBudget::Pixels(1)) {
            Tick::Progress { progress, .. } => progress.completed,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn regions_nearest_the_focus_are_computed_first() {
        // A 31×8 ring is 74 cells. Its 29×6 interior splits into columns
        // 9, 10 and 10 wide, with rings of 26, 28 and 28 cells.
        let mut left = Scheduler::default();
        left.submit_focused(inputs(31, 8, 20), (2, 4));
        assert_eq!(after_two_regions(&mut left), 74 + 26);

        let mut right = Scheduler::default();
        right.submit_focused(inputs(31, 8, 20), (28, 4));
        assert_eq!(after_two_regions(&mut right), 74 + 28);

        // The order differs but the result does not.
        let a = run_to_completion(&mut left, TickBudget::Adaptive);
        let b = run_to_completion(&mut right, TickBudget::Adaptive);
        assert_eq!(a.matrix, b.matrix);
    }

    #[test]
    fn refocus_reorders_pending_work() {
        let mut s = Scheduler::default();
        let epoch = s.submit(inputs(30, 9, 20));
        s.tick(TickBudget::Pixels(1));
        assert_eq!(s.submit_focused(inputs(30, 9, 20), (0, 4)), epoch);
        s.tick(TickBudget::Pixels(1));

        // The 28×7 interior split into columns at x = 1, 10 and 19. The
        // centre focus would have taken the middle one; the left one went.
        let pending: Vec<Region> = s
            .job
            .as_ref()
            .unwrap()
            .pending
            .iter()
            .map(|p| p.region)
            .collect();
        assert!(pending.contains(&Region::new(10, 1, 9, 7)));
        assert!(pending.contains(&Region::new(19, 1, 10, 7)));
        assert!(!pending.contains(&Region::new(1, 1, 9, 7)));
    }

    #[test]
    fn pan_reuses_the_completed_frame() {
        let base = inputs(24, 18, 60);
        let mut s = Scheduler::default();
        s.submit(base);
        let first = run_to_completion(&mut s, TickBudget::Adaptive);

        let mut panned = base;
        panned.viewpoint = base.viewpoint.pan(5, -3);
        s.submit(panned);
        // Only the 5-wide column and the 3-tall row are left to compute.
        let (_, progress) = s.progress().unwrap();
        assert_eq!(progress.completed, 24 * 18 - (5 * 18 + 19 * 3));

        let second = run_to_completion(&mut s, TickBudget::Adaptive);
        for y in 3..18u32 {
            for x in 0..19u32 {
                assert_eq!(
                    second.matrix.get(x, y),
                    first.matrix.get(x + 5, y - 3),
                    "cell ({x}, {y})"
                );
            }
        }

        // Exposed strips are computed fresh for the new view.
        let kernel = panned.fractal.kernel();
        for (x, y) in [(23u32, 0u32), (20, 10), (0, 0), (10, 2)] {
            let point = panned.viewpoint.pixel_to_complex(x as f64, y as f64);
            assert_eq!(
                second.matrix.get(x, y),
                Some(kernel.check(point, 60, panned.escape_radius))
            );
        }
    }

    #[test]
    fn pan_never_seeds_from_a_superseded_partial() {
        let base = inputs(20, 20, 40);
        let mut s = Scheduler::default();
        s.submit(base);
        s.tick(TickBudget::Pixels(1));

        // Nothing has completed, so a pan starts from scratch.
        let mut panned = base;
        panned.viewpoint = base.viewpoint.pan(2, 0);
        s.submit(panned);
        assert_eq!(s.progress().unwrap().1.completed, 0);
        run_to_completion(&mut s, TickBudget::Adaptive);

        // A zoom in flight is superseded by a pan of the completed frame.
        let mut zoomed = panned;
        zoomed.viewpoint = panned.viewpoint.zoom_in().unwrap();
        s.submit(zoomed);
        s.tick(TickBudget::Pixels(1));
        let mut again = panned;
        again.viewpoint = panned.viewpoint.pan(0, 4);
        s.submit(again);
        assert_eq!(s.progress().unwrap().1.completed, 20 * 16);
    }

    #[test]
    fn anything_but_a_pan_recomputes_everything() {
        let base = inputs(16, 16, 30);
        let mut s = Scheduler::default();
        s.submit(base);
        run_to_completion(&mut s, TickBudget::Adaptive);

        let mut changed = base;
        changed.viewpoint = base.viewpoint.pan(3, 0).zoom_in().unwrap();
        s.submit(changed);
        assert_eq!(s.progress().unwrap().1.completed, 0);

        let mut far = base;
        far.viewpoint = base.viewpoint.pan(16, 0);
        s.submit(far);
        assert_eq!(s.progress().unwrap().1.completed, 0);
    }

    #[test]
    fn border_fill_skips_enclosed_interiors() {
        // Entirely inside the main cardioid.
        let viewpoint = Viewpoint::new(fraktal_core::Complex::new(-0.2, 0.0), 0.2, 30, 30).unwrap();
        let inputs = ComputeInputs::new(viewpoint, FractalParams::Mandelbrot, 100);

        let mut s = Scheduler::default().with_border_fill(true);
        assert!(s.border_fill());
        s.submit(inputs);
        match s.tick(TickBudget::Pixels(1)) {
            Tick::Completed { frame, .. } => {
                assert!(frame.matrix.data.iter().all(|r| *r == EscapeResult::Contained))
            }
            other => panic!("expected one tick, got {other:?}"),
        }

        let mut plain = Scheduler::default();
        plain.submit(inputs);
        assert!(matches!(plain.tick(TickBudget::Pixels(1)), Tick::Progress { .. }));
    }

    #[test]
    fn new_inputs_supersede() {
        let mut s = Scheduler::default();
        let old = s.submit(inputs(8, 8, 20));
        s.tick(TickBudget::Pixels(10));
        let new = s.submit(inputs(8, 8, 21));
        assert!(new > old);
        assert_eq!(s.progress(), Some((new, Progress { completed: 0, total: 64 })));

        loop {
            match s.tick(TickBudget::Pixels(7)) {
                Tick::Progress { epoch, .. } => assert_eq!(epoch, new),
                Tick::Completed { epoch, frame } => {
                    assert_eq!(epoch, new);
                    assert_eq!(frame.inputs.iteration_limit, 21);
                    break;
                }
                Tick::Idle => panic!("went idle"),
            }
        }
    }

    #[test]
    fn resubmit_after_completion_is_a_no_op() {
        let mut s = Scheduler::default();
        let epoch = s.submit(inputs(4, 4, 10));
        run_to_completion(&mut s, TickBudget::Adaptive);
        s.take_completed();
        assert_eq!(s.submit(inputs(4, 4, 10)), epoch);
        assert!(matches!(s.tick(TickBudget::Adaptive), Tick::Idle));
    }

    #[test]
    fn center_pixel_of_default_view_is_contained() {
        let mut s = Scheduler::default();
        s.submit(inputs(4, 4, 50));
        let frame = run_to_completion(&mut s, TickBudget::Adaptive);
        // Pixel (2, 2) maps to -0.5 + 0i, inside the main cardioid.
        assert_eq!(frame.matrix.get(2, 2), Some(EscapeResult::Contained));
        // Pixel (0, 0) maps to -2 + 1.5i, already outside after one step.
        assert_eq!(frame.matrix.get(0, 0), Some(EscapeResult::Escaped(0)));
    }

    #[test]
    fn throttle_halves_and_doubles() {
        let budget = Duration::from_millis(16);
        let mut t = Throttle::with_bounds(budget, 1024, 64, 4096);
        t.record(Duration::from_millis(20));
        assert_eq!(t.quantum(), 512);
        t.record(Duration::from_millis(10));
        assert_eq!(t.quantum(), 512);
        t.record(Duration::from_millis(2));
        assert_eq!(t.quantum(), 1024);
        for _ in 0..10 {
            t.record(Duration::ZERO);
        }
        assert_eq!(t.quantum(), 4096);
        for _ in 0..10 {
            t.record(Duration::from_secs(1));
        }
        assert_eq!(t.quantum(), 64);
    }

    #[test]
    fn throttle_clamps_initial_quantum() {
        let t = Throttle::with_bounds(Duration::from_millis(16), 1, 64, 128);
        assert_eq!(t.quantum(), 64);
    }

    #[test]
    fn progress_fraction() {
        let p = Progress { completed: 25, total: 100 };
        assert!((p.fraction() - 0.25).abs() < 1e-12);
        assert!(!p.is_complete());
        assert_eq!(Progress { completed: 0, total: 0 }.fraction(), 1.0);
    }
}
