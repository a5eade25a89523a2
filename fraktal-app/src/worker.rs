use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use fraktal_render::{
    ComputeInputs, ComputedFrame, Epoch, Progress, Scheduler, Throttle, Tick, TickBudget,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A computation request, tagged with the epoch the handle assigned to it.
#[derive(Debug, Clone, Copy)]
pub struct ComputeRequest {
    pub epoch: Epoch,
    pub inputs: ComputeInputs,
    /// Pixel to compute outwards from; the view centre when `None`.
    pub focus: Option<(u32, u32)>,
}

/// Sent from the worker thread back to the handle.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Progress { epoch: Epoch, progress: Progress },
    Completed { epoch: Epoch, frame: ComputedFrame },
}

impl WorkerEvent {
    pub fn epoch(&self) -> Epoch {
        match self {
            Self::Progress { epoch, .. } | Self::Completed { epoch, .. } => *epoch,
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owner side of a background compute thread.
///
/// Only events for the most recent submission are ever returned; anything
/// the worker produced for an older epoch is dropped on receipt.
pub struct WorkerHandle {
    tx: Option<mpsc::Sender<ComputeRequest>>,
    rx: mpsc::Receiver<WorkerEvent>,
    latest: Epoch,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawn the worker thread. It runs until the handle is dropped.
    pub fn spawn(throttle: Throttle) -> crate::Result<Self> {
        Self::spawn_with(Scheduler::new(throttle))
    }

    /// Spawn the worker thread around a configured scheduler.
    pub fn spawn_with(scheduler: Scheduler) -> crate::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<ComputeRequest>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();

        let thread = thread::Builder::new()
            .name("compute-worker".into())
            .spawn(move || {
                debug!("Compute worker thread started");
                compute_worker(req_rx, event_tx, scheduler);
                debug!("Compute worker thread exiting");
            })?;

        Ok(Self {
            tx: Some(req_tx),
            rx: event_rx,
            latest: Epoch::default(),
            thread: Some(thread),
        })
    }

    /// Queue `inputs`, superseding whatever was submitted before.
    pub fn submit(&mut self, inputs: ComputeInputs) -> Epoch {
        self.send(inputs, None)
    }

    /// Like [`submit`](Self::submit), computing outwards from pixel `focus`.
    pub fn submit_focused(&mut self, inputs: ComputeInputs, focus: (u32, u32)) -> Epoch {
        self.send(inputs, Some(focus))
    }

    fn send(&mut self, inputs: ComputeInputs, focus: Option<(u32, u32)>) -> Epoch {
        self.latest = Epoch(self.latest.0 + 1);
        let request = ComputeRequest {
            epoch: self.latest,
            inputs,
            focus,
        };
        let sent = self.tx.as_ref().map(|tx| tx.send(request));
        if !matches!(sent, Some(Ok(()))) {
            warn!(epoch = %self.latest, "Compute worker is gone, request dropped");
        }
        self.latest
    }

    pub fn latest_epoch(&self) -> Epoch {
        self.latest
    }

    /// Drain pending events, keeping only those for the latest epoch.
    pub fn poll(&self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if event.epoch() == self.latest {
                events.push(event);
            }
        }
        events
    }

    /// Block until the latest submission completes or `timeout` passes.
    pub fn wait_completed(&self, timeout: Duration) -> Option<ComputedFrame> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(WorkerEvent::Completed { epoch, frame }) if epoch == self.latest => {
                    return Some(frame)
                }
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Compute worker thread panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

/// Keep only the most recent request in the channel.
fn drain_latest(initial: ComputeRequest, rx: &mpsc::Receiver<ComputeRequest>) -> ComputeRequest {
    let mut req = initial;
    while let Ok(newer) = rx.try_recv() {
        req = newer;
    }
    req
}

fn submit_request(scheduler: &mut Scheduler, req: &ComputeRequest) {
    match req.focus {
        Some(focus) => scheduler.submit_focused(req.inputs, focus),
        None => scheduler.submit(req.inputs),
    };
}

fn compute_worker(
    rx: mpsc::Receiver<ComputeRequest>,
    tx: mpsc::Sender<WorkerEvent>,
    mut scheduler: Scheduler,
) {
    let mut last_frame: Option<ComputedFrame> = None;

    while let Ok(initial) = rx.recv() {
        let mut req = drain_latest(initial, &rx);
        submit_request(&mut scheduler, &req);

        loop {
            // Restart on a newer request between ticks.
            match rx.try_recv() {
                Ok(newer) => {
                    req = drain_latest(newer, &rx);
                    debug!(epoch = %req.epoch, "Worker picked up newer request");
                    submit_request(&mut scheduler, &req);
                }
                Err(TryRecvError::Disconnected) => return,
                Err(TryRecvError::Empty) => {}
            }

            let event = match scheduler.tick(TickBudget::Adaptive) {
                Tick::Progress { progress, .. } => WorkerEvent::Progress {
                    epoch: req.epoch,
                    progress,
                },
                Tick::Completed { frame, .. } => {
                    scheduler.take_completed();
                    last_frame = Some(frame.clone());
                    WorkerEvent::Completed {
                        epoch: req.epoch,
                        frame,
                    }
                }
                // Same inputs as the frame already computed.
                Tick::Idle => match &last_frame {
                    Some(frame) if frame.inputs == req.inputs => WorkerEvent::Completed {
                        epoch: req.epoch,
                        frame: frame.clone(),
                    },
                    _ => break,
                },
            };

            let done = matches!(event, WorkerEvent::Completed { .. });
            if tx.send(event).is_err() {
                return; // Handle dropped.
            }
            if done {
                break;
            }
        }
    }
}
