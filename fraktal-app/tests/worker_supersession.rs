use std::time::{Duration, Instant};

use fraktal_app::{WorkerEvent, WorkerHandle};
use fraktal_core::{Complex, FractalParams, Viewpoint};
use fraktal_render::{ComputeInputs, Throttle};

fn slow_inputs() -> ComputeInputs {
    // Seahorse valley boundary at a high limit: slow-escaping points.
    ComputeInputs::new(
        Viewpoint::new(Complex::new(-0.75, 0.1), 0.05, 400, 400).unwrap(),
        FractalParams::Mandelbrot,
        20_000,
    )
}

fn quick_inputs() -> ComputeInputs {
    ComputeInputs::new(
        Viewpoint::default_julia(24, 24).unwrap(),
        FractalParams::Julia {
            c: Complex::new(-1.0, 0.0),
        },
        64,
    )
}

#[test]
fn only_the_latest_epoch_is_observed() {
    let mut worker = WorkerHandle::spawn(Throttle::default()).unwrap();
    let stale = worker.submit(slow_inputs());
    let latest = worker.submit(quick_inputs());
    assert!(latest > stale);

    let deadline = Instant::now() + Duration::from_secs(60);
    let mut completed = None;
    while completed.is_none() && Instant::now() < deadline {
        for event in worker.poll() {
            assert_eq!(event.epoch(), latest);
            if let WorkerEvent::Completed { frame, .. } = event {
                completed = Some(frame);
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    let frame = completed.expect("latest submission never completed");
    assert_eq!(frame.inputs, quick_inputs());
    assert_eq!(frame.matrix.len(), 24 * 24);
}

#[test]
fn progress_for_an_epoch_is_monotonic() {
    let mut worker = WorkerHandle::spawn(Throttle::with_bounds(
        Duration::from_millis(16),
        64,
        64,
        64,
    ))
    .unwrap();
    let epoch = worker.submit(ComputeInputs::new(
        Viewpoint::default_mandelbrot(40, 30).unwrap(),
        FractalParams::Mandelbrot,
        100,
    ));

    let deadline = Instant::now() + Duration::from_secs(60);
    let mut last = 0;
    let mut done = false;
    while !done && Instant::now() < deadline {
        for event in worker.poll() {
            match event {
                WorkerEvent::Progress { epoch: e, progress } => {
                    assert_eq!(e, epoch);
                    assert!(progress.completed >= last);
                    assert_eq!(progress.total, 40 * 30);
                    last = progress.completed;
                }
                WorkerEvent::Completed { epoch: e, .. } => {
                    assert_eq!(e, epoch);
                    done = true;
                }
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(done);
}

#[test]
fn resubmission_after_completion_supersedes_cleanly() {
    let mut worker = WorkerHandle::spawn(Throttle::default()).unwrap();
    worker.submit(quick_inputs());
    assert!(worker.wait_completed(Duration::from_secs(30)).is_some());

    let second = worker.submit(slow_inputs());
    let third = worker.submit(quick_inputs());
    assert!(third > second);
    let frame = worker.wait_completed(Duration::from_secs(60)).unwrap();
    assert_eq!(frame.inputs, quick_inputs());
    assert!(worker.poll().iter().all(|e| e.epoch() == third));
}
