//! Block helpers for scenario tests.
//!
//! Each helper opens or re-attaches a frame around a block and closes it
//! the way the helper name says, aborting the frame when the block fails.

use nexus_common::error::FrameResult;
use nexus_frames::{Frame, FrameOptions, FrameScheduler, ObjectHandle};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a scheduler for a test, with tracing installed.
pub fn scheduler() -> FrameScheduler {
    init_tracing();
    FrameScheduler::new()
}

/// Runs `block` in a writable frame and commits it.
pub fn frame<R>(
    scheduler: &FrameScheduler,
    block: impl FnOnce(&Frame) -> FrameResult<R>,
) -> FrameResult<R> {
    scheduler.run(block)
}

/// Runs `block` in a writable frame with a frame-scoped read observer and
/// commits it.
pub fn observed_frame<R>(
    scheduler: &FrameScheduler,
    observer: impl Fn(ObjectHandle) + Send + Sync + 'static,
    block: impl FnOnce(&Frame) -> FrameResult<R>,
) -> FrameResult<R> {
    scheduler.run_with(FrameOptions::writable().with_read_observer(observer), block)
}

/// Runs `block` in a writable frame and aborts it.
pub fn aborted<R>(
    scheduler: &FrameScheduler,
    block: impl FnOnce(&Frame) -> FrameResult<R>,
) -> FrameResult<R> {
    let frame = scheduler.open(FrameOptions::writable())?;
    let result = block(&frame);
    scheduler.abort(&frame)?;
    result
}

/// Runs `block` in a speculative frame and aborts it.
pub fn speculation<R>(
    scheduler: &FrameScheduler,
    block: impl FnOnce(&Frame) -> FrameResult<R>,
) -> FrameResult<R> {
    let frame = scheduler.speculate()?;
    let result = block(&frame);
    scheduler.abort(&frame)?;
    result
}

/// Runs `block` in a writable frame and suspends it, leaving it open.
pub fn suspended(
    scheduler: &FrameScheduler,
    block: impl FnOnce(&Frame) -> FrameResult<()>,
) -> FrameResult<Frame> {
    let frame = scheduler.open(FrameOptions::writable())?;
    if let Err(e) = block(&frame) {
        scheduler.abort(&frame)?;
        return Err(e);
    }
    scheduler.suspend()
}

/// Restores a suspended frame, runs `block` in it, and commits it.
pub fn restored<R>(
    scheduler: &FrameScheduler,
    frame: Frame,
    block: impl FnOnce(&Frame) -> FrameResult<R>,
) -> FrameResult<R> {
    scheduler.restore(frame.clone())?;
    let result = block(&frame).and_then(|value| scheduler.commit(&frame).map(|()| value));
    if result.is_err() && frame.is_open() {
        scheduler.abort(&frame)?;
    }
    result
}
