//! Frame scheduling.
//!
//! The scheduler is the single authority over frame ids, the set of open
//! frames, and each thread's current frame. Opening, committing, and
//! aborting a frame each run under one brief critical section, so every
//! frame sees a consistent "who else is open" set.
//!
//! # Commit Validation
//!
//! ```text
//!            open(A)        open(B)     commit(B)      commit(A)
//! time  ───────┼──────────────┼────────────┼──────────────┼──────▶
//!              │ A: id 2      │ B: id 3    │ x = "b"      │ x: record seen
//!              │ invalid {}   │ invalid {2}│ published    │ at open (genesis)
//!              │              │            │              │ ≠ record seen now
//!              │              │            │              │ (3) → Aborted
//! ```
//!
//! For every value a frame modified, the record visible when the frame
//! opened is compared with the record a frame opened now would see. If
//! they differ, a concurrent frame committed a write to that value first
//! and the commit fails with [`FrameError::Aborted`]. The failed frame is
//! left open; the caller aborts it.
//!
//! # Lock Order
//!
//! Scheduler state, then record chains, then a frame's state or modified
//! set. A record chain is never held while taking the scheduler lock, and
//! observers always run with no lock held.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use nexus_common::config::FrameConfig;
use nexus_common::error::{FrameError, FrameResult};
use nexus_common::types::FrameId;
use parking_lot::Mutex;

use crate::frame::{Frame, FrameOptions, FrameSnapshot, FrameState};
use crate::observer::{
    CommitObserverHandle, CommitSet, ObjectHandle, ObserverRegistry, ReadObserverGuard,
};
use crate::record::Claim;

/// Statistics about a frame scheduler.
#[derive(Debug, Default)]
pub struct FrameStats {
    /// Total frames opened.
    pub opened: AtomicU64,
    /// Total frames committed.
    pub committed: AtomicU64,
    /// Total frames aborted.
    pub aborted: AtomicU64,
    /// Total commit conflicts detected.
    pub conflicts: AtomicU64,
    /// Total records allocated.
    pub records_created: AtomicU64,
    /// Total records overwritten in place instead of allocated.
    pub records_reused: AtomicU64,
}

impl FrameStats {
    /// Creates new stats.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_created(&self) {
        self.records_created.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub(crate) fn record_claim(&self, claim: Claim) {
        match claim {
            Claim::Created(_) => self.record_created(),
            Claim::Reused(_) => {
                self.records_reused.fetch_add(1, AtomicOrdering::Relaxed);
            }
        }
    }
}

/// Mutable scheduler state, guarded by one lock.
struct SchedulerState {
    /// Next frame id to hand out.
    next_frame_id: FrameId,
    /// Open frames, each with the oldest id its snapshot may still select.
    open_frames: BTreeMap<FrameId, FrameId>,
    /// Highest committed frame id.
    max_committed: FrameId,
    /// Current frame of each thread.
    current: HashMap<ThreadId, Frame>,
}

impl SchedulerState {
    fn new() -> Self {
        Self {
            next_frame_id: FrameId::FIRST,
            open_frames: BTreeMap::new(),
            max_committed: FrameId::GENESIS,
            current: HashMap::new(),
        }
    }

    fn open_ids(&self) -> HashSet<FrameId> {
        self.open_frames.keys().copied().collect()
    }

    /// Clears the current slot of whichever thread holds `frame`.
    fn detach(&mut self, frame: &Frame) {
        self.current.retain(|_, current| current != frame);
    }
}

pub(crate) struct SchedulerInner {
    state: Mutex<SchedulerState>,
    observers: Arc<ObserverRegistry>,
    config: FrameConfig,
    stats: FrameStats,
}

impl SchedulerInner {
    pub(crate) fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub(crate) fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Returns the lowest frame id any open frame may still select, or
    /// `None` when record reuse is disabled.
    pub(crate) fn reuse_limit(&self) -> Option<FrameId> {
        if !self.config.reuse_records {
            return None;
        }
        let state = self.state.lock();
        Some(
            state
                .open_frames
                .values()
                .copied()
                .min()
                .unwrap_or(state.next_frame_id),
        )
    }
}

/// Allocates frame ids, tracks open frames, and serializes commit and
/// abort.
///
/// `FrameScheduler` is a cheap handle; clones share the same state. Each
/// scheduler is independent, so tests create a fresh one per test.
///
/// # Example
///
/// ```rust
/// use nexus_frames::{FrameScheduler, FramedValue};
///
/// # fn main() -> nexus_common::FrameResult<()> {
/// let scheduler = FrameScheduler::new();
/// let counter = FramedValue::with_initial(0u32);
///
/// scheduler.run(|frame| counter.writable(frame, |n| *n += 1))?;
/// assert_eq!(counter.read_committed(&scheduler)?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Arc<SchedulerInner>,
}

impl FrameScheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::from_config(FrameConfig::default())
    }

    /// Creates a scheduler with a custom configuration.
    pub fn with_config(config: FrameConfig) -> FrameResult<Self> {
        config.validate().map_err(FrameError::invalid_config)?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: FrameConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                state: Mutex::new(SchedulerState::new()),
                observers: Arc::new(ObserverRegistry::new(config.dedupe_read_notifications)),
                config,
                stats: FrameStats::new(),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.inner.config
    }

    /// Returns statistics.
    pub fn stats(&self) -> &FrameStats {
        &self.inner.stats
    }

    /// Returns the observer registry.
    pub fn observers(&self) -> &ObserverRegistry {
        &self.inner.observers
    }

    /// Returns the number of open frames, including suspended ones.
    pub fn open_frame_count(&self) -> usize {
        self.inner.state.lock().open_frames.len()
    }

    /// Returns the highest committed frame id.
    pub fn max_committed(&self) -> FrameId {
        self.inner.state.lock().max_committed
    }

    /// Opens a frame and makes it current on the calling thread.
    pub fn open(&self, options: FrameOptions) -> FrameResult<Frame> {
        let thread = thread::current().id();
        let mut state = self.inner.state.lock();

        if let Some(current) = state.current.get(&thread) {
            return Err(FrameError::AlreadyCurrent {
                current: current.id(),
            });
        }
        if self.inner.config.open_limit_reached(state.open_frames.len()) {
            return Err(FrameError::TooManyOpenFrames {
                limit: self.inner.config.max_open_frames,
            });
        }

        let id = state.next_frame_id;
        state.next_frame_id = id.next();

        let write_id = (!options.read_only).then_some(id);
        let snapshot = FrameSnapshot::new(id, write_id, state.open_ids());
        state.open_frames.insert(id, snapshot.pin());

        let read_scope = options
            .read_observer
            .map(|observer| self.inner.observers.read_scope(observer));
        let frame = Frame::new(
            Arc::clone(&self.inner),
            snapshot,
            read_scope,
            options.write_observer,
        );
        state.current.insert(thread, frame.clone());
        drop(state);

        self.inner.stats.opened.fetch_add(1, AtomicOrdering::Relaxed);
        tracing::debug!(frame = %id, read_only = options.read_only, "opened frame");
        Ok(frame)
    }

    /// Returns the calling thread's current frame.
    pub fn current(&self) -> Option<Frame> {
        self.inner
            .state
            .lock()
            .current
            .get(&thread::current().id())
            .cloned()
    }

    /// Commits the calling thread's current frame.
    pub fn close(&self) -> FrameResult<()> {
        let frame = self.current().ok_or(FrameError::NoCurrentFrame)?;
        self.commit(&frame)
    }

    /// Commits `frame`, publishing its writes to frames opened afterwards.
    ///
    /// Fails with [`FrameError::Aborted`] if a concurrent frame committed a
    /// write to a value this frame modified. The frame then stays open and
    /// must be aborted.
    pub fn commit(&self, frame: &Frame) -> FrameResult<()> {
        self.check_owner(frame)?;
        let id = frame.id();

        let (observers, commit_set) = {
            let mut state = self.inner.state.lock();
            frame.ensure_open()?;
            if frame.is_speculative() {
                return Err(FrameError::SpeculativeCommit { frame: id });
            }

            let modified = frame.modified_states();
            if !modified.is_empty() {
                let previous = frame.snapshot().without_own_writes();
                let current = FrameSnapshot::new(state.next_frame_id, None, state.open_ids());
                if let Some(object) = modified
                    .iter()
                    .find(|object| object.has_conflict(&previous, &current))
                {
                    let object = object.handle().id();
                    self.inner.stats.conflicts.fetch_add(1, AtomicOrdering::Relaxed);
                    tracing::warn!(frame = %id, object = %object, "commit conflict");
                    return Err(FrameError::Aborted { frame: id, object });
                }
            }

            state.open_frames.remove(&id);
            if id > state.max_committed {
                state.max_committed = id;
            }
            frame.set_state(FrameState::Committed);
            state.detach(frame);

            let observers = if modified.is_empty() {
                Vec::new()
            } else {
                self.inner.observers.commit_observers()
            };
            let handles: HashSet<ObjectHandle> =
                modified.iter().map(|object| object.handle()).collect();
            (observers, CommitSet::new(id, handles))
        };

        self.inner.stats.committed.fetch_add(1, AtomicOrdering::Relaxed);
        tracing::debug!(frame = %id, modified = commit_set.len(), "committed frame");

        for observer in observers {
            observer(&commit_set);
        }
        Ok(())
    }

    /// Aborts `frame`. Its writes become permanently invisible.
    pub fn abort(&self, frame: &Frame) -> FrameResult<()> {
        self.check_owner(frame)?;
        let id = frame.id();

        let retagged = {
            let mut state = self.inner.state.lock();
            frame.ensure_open()?;
            frame.set_state(FrameState::Aborted);
            // The id stays in the open set until every record is retagged,
            // otherwise a frame opened meanwhile would see the writes.
            let retagged: usize = frame
                .modified_states()
                .iter()
                .map(|object| object.abandon(id))
                .sum();
            state.open_frames.remove(&id);
            state.detach(frame);
            retagged
        };

        self.inner.stats.aborted.fetch_add(1, AtomicOrdering::Relaxed);
        tracing::debug!(frame = %id, records = retagged, "aborted frame");
        Ok(())
    }

    /// Marks the calling thread's current frame speculative, opening a
    /// writable frame first if none is current. A speculative frame can
    /// only be aborted.
    pub fn speculate(&self) -> FrameResult<Frame> {
        let frame = match self.current() {
            Some(frame) => frame,
            None => self.open(FrameOptions::writable())?,
        };
        frame.mark_speculative();
        tracing::debug!(frame = %frame.id(), "speculating");
        Ok(frame)
    }

    /// Detaches the calling thread's current frame without closing it.
    pub fn suspend(&self) -> FrameResult<Frame> {
        let frame = self
            .inner
            .state
            .lock()
            .current
            .remove(&thread::current().id())
            .ok_or(FrameError::NoCurrentFrame)?;
        tracing::debug!(frame = %frame.id(), "suspended frame");
        Ok(frame)
    }

    /// Makes a suspended frame current on the calling thread again.
    pub fn restore(&self, frame: Frame) -> FrameResult<()> {
        self.check_owner(&frame)?;
        let thread = thread::current().id();
        let mut state = self.inner.state.lock();

        frame.ensure_open()?;
        if let Some(current) = state.current.get(&thread) {
            return Err(FrameError::AlreadyCurrent {
                current: current.id(),
            });
        }
        let id = frame.id();
        state.current.insert(thread, frame);
        drop(state);

        tracing::debug!(frame = %id, "restored frame");
        Ok(())
    }

    /// Runs `block` in a new writable frame.
    ///
    /// The frame commits if `block` succeeds and is aborted if `block`
    /// fails or the commit conflicts.
    pub fn run<R>(&self, block: impl FnOnce(&Frame) -> FrameResult<R>) -> FrameResult<R> {
        self.run_with(FrameOptions::writable(), block)
    }

    /// Runs `block` in a new read-only frame.
    pub fn run_read_only<R>(&self, block: impl FnOnce(&Frame) -> FrameResult<R>) -> FrameResult<R> {
        self.run_with(FrameOptions::read_only(), block)
    }

    /// Runs `block` in a new frame opened with `options`.
    pub fn run_with<R>(
        &self,
        options: FrameOptions,
        block: impl FnOnce(&Frame) -> FrameResult<R>,
    ) -> FrameResult<R> {
        let frame = self.open(options)?;
        let guard = AbortOnDrop {
            scheduler: self,
            frame: &frame,
        };
        let value = block(&frame)?;
        self.commit(&frame)?;
        drop(guard);
        Ok(value)
    }

    /// Runs `block` with `observer` notified of every framed read the
    /// calling thread makes through this scheduler until `block` returns.
    /// Reads made by other threads meanwhile are not reported.
    pub fn observe_reads<R>(
        &self,
        observer: impl Fn(ObjectHandle) + Send + Sync + 'static,
        block: impl FnOnce() -> R,
    ) -> R {
        let _guard = ReadObserverGuard::push(&self.inner.observers, Arc::new(observer));
        block()
    }

    /// Registers an observer called after each commit that modified at
    /// least one object. Dropping the returned handle unregisters it.
    pub fn register_commit_observer(
        &self,
        observer: impl Fn(&CommitSet) + Send + Sync + 'static,
    ) -> CommitObserverHandle {
        let token = self.inner.observers.register_commit(Arc::new(observer));
        CommitObserverHandle::new(Arc::clone(&self.inner.observers), token)
    }

    /// Returns the snapshot a read-only frame opened now would get.
    pub(crate) fn latest_snapshot(&self) -> FrameSnapshot {
        let state = self.inner.state.lock();
        FrameSnapshot::new(state.next_frame_id, None, state.open_ids())
    }

    fn check_owner(&self, frame: &Frame) -> FrameResult<()> {
        if frame.belongs_to(&self.inner) {
            Ok(())
        } else {
            Err(FrameError::ForeignFrame { frame: frame.id() })
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("FrameScheduler")
            .field("next_frame_id", &state.next_frame_id)
            .field("open_frames", &state.open_frames.len())
            .field("max_committed", &state.max_committed)
            .finish()
    }
}

/// Aborts a frame on drop unless it was already closed.
struct AbortOnDrop<'a> {
    scheduler: &'a FrameScheduler,
    frame: &'a Frame,
}

impl Drop for AbortOnDrop<'_> {
    fn drop(&mut self) {
        if self.frame.is_open() {
            if let Err(e) = self.scheduler.abort(self.frame) {
                tracing::warn!(frame = %self.frame.id(), error = %e, "failed to abort frame");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::value::FramedValue;

    fn create_scheduler() -> FrameScheduler {
        FrameScheduler::with_config(FrameConfig::for_testing()).unwrap()
    }

    #[test]
    fn test_frame_lifecycle() {
        let scheduler = create_scheduler();

        let frame = scheduler.open(FrameOptions::writable()).unwrap();
        assert_eq!(frame.id(), FrameId::FIRST);
        assert_eq!(frame.write_id(), Some(frame.id()));
        assert_eq!(frame.state(), FrameState::Open);
        assert_eq!(scheduler.current(), Some(frame.clone()));
        assert_eq!(scheduler.open_frame_count(), 1);

        scheduler.commit(&frame).unwrap();
        assert_eq!(frame.state(), FrameState::Committed);
        assert_eq!(scheduler.current(), None);
        assert_eq!(scheduler.open_frame_count(), 0);
        assert_eq!(scheduler.max_committed(), frame.id());
    }

    #[test]
    fn test_frame_ids_increase() {
        let scheduler = create_scheduler();
        let mut last = FrameId::GENESIS;
        for _ in 0..10 {
            let frame = scheduler.open(FrameOptions::read_only()).unwrap();
            assert!(frame.id() > last);
            last = frame.id();
            scheduler.commit(&frame).unwrap();
        }
    }

    #[test]
    fn test_snapshot_captures_open_frames() {
        let scheduler = create_scheduler();
        scheduler.open(FrameOptions::writable()).unwrap();
        let first = scheduler.suspend().unwrap();
        let second = scheduler.open(FrameOptions::writable()).unwrap();

        assert!(second.snapshot().is_invalid(first.id()));
        assert!(!first.snapshot().is_invalid(second.id()));

        scheduler.commit(&second).unwrap();
        scheduler.abort(&first).unwrap();
    }

    #[test]
    fn test_double_commit() {
        let scheduler = create_scheduler();
        let frame = scheduler.open(FrameOptions::writable()).unwrap();
        scheduler.commit(&frame).unwrap();

        assert!(matches!(
            scheduler.commit(&frame),
            Err(FrameError::NotOpen { state: "Committed", .. })
        ));
        assert!(scheduler.abort(&frame).is_err());
    }

    #[test]
    fn test_open_while_current() {
        let scheduler = create_scheduler();
        let frame = scheduler.open(FrameOptions::writable()).unwrap();
        assert_eq!(
            scheduler.open(FrameOptions::writable()).unwrap_err(),
            FrameError::AlreadyCurrent { current: frame.id() }
        );
        scheduler.close().unwrap();
        assert_eq!(scheduler.close().unwrap_err(), FrameError::NoCurrentFrame);
    }

    #[test]
    fn test_conflict_leaves_frame_open() {
        let scheduler = create_scheduler();
        let value = FramedValue::with_initial(0);

        let a = scheduler.open(FrameOptions::writable()).unwrap();
        value.set(&a, 1).unwrap();
        let a = scheduler.suspend().unwrap();

        let b = scheduler.open(FrameOptions::writable()).unwrap();
        value.set(&b, 2).unwrap();
        scheduler.commit(&b).unwrap();

        scheduler.restore(a.clone()).unwrap();
        let err = scheduler.commit(&a).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(a.state(), FrameState::Open);
        assert_eq!(scheduler.current(), Some(a.clone()));
        assert_eq!(scheduler.stats().conflicts.load(AtomicOrdering::Relaxed), 1);

        scheduler.abort(&a).unwrap();
        assert_eq!(value.read_committed(&scheduler).unwrap(), 2);
    }

    #[test]
    fn test_disjoint_writes_do_not_conflict() {
        let scheduler = create_scheduler();
        let x = FramedValue::with_initial(0);
        let y = FramedValue::with_initial(0);

        let a = scheduler.open(FrameOptions::writable()).unwrap();
        x.set(&a, 1).unwrap();
        let a = scheduler.suspend().unwrap();

        scheduler.run(|b| y.set(b, 2)).unwrap();

        scheduler.restore(a.clone()).unwrap();
        scheduler.commit(&a).unwrap();
        assert_eq!(x.read_committed(&scheduler).unwrap(), 1);
        assert_eq!(y.read_committed(&scheduler).unwrap(), 2);
    }

    #[test]
    fn test_speculative_frame_cannot_commit() {
        let scheduler = create_scheduler();
        let value = FramedValue::with_initial("a");

        let frame = scheduler.speculate().unwrap();
        assert!(frame.is_speculative());
        value.set(&frame, "preview").unwrap();
        assert_eq!(value.readable(&frame).unwrap(), "preview");

        assert_eq!(
            scheduler.commit(&frame).unwrap_err(),
            FrameError::SpeculativeCommit { frame: frame.id() }
        );
        scheduler.abort(&frame).unwrap();
        assert_eq!(value.read_committed(&scheduler).unwrap(), "a");
    }

    #[test]
    fn test_speculate_marks_current() {
        let scheduler = create_scheduler();
        let frame = scheduler.open(FrameOptions::writable()).unwrap();
        let speculative = scheduler.speculate().unwrap();
        assert_eq!(frame, speculative);
        assert!(frame.is_speculative());
        scheduler.abort(&frame).unwrap();
    }

    #[test]
    fn test_restore_closed_frame() {
        let scheduler = create_scheduler();
        scheduler.open(FrameOptions::writable()).unwrap();
        let frame = scheduler.suspend().unwrap();
        assert_eq!(scheduler.current(), None);
        scheduler.abort(&frame).unwrap();

        assert!(matches!(
            scheduler.restore(frame),
            Err(FrameError::NotOpen { state: "Aborted", .. })
        ));
    }

    #[test]
    fn test_foreign_frame() {
        let scheduler = create_scheduler();
        let other = create_scheduler();
        other.open(FrameOptions::writable()).unwrap();
        let frame = other.suspend().unwrap();

        assert_eq!(
            scheduler.commit(&frame).unwrap_err(),
            FrameError::ForeignFrame { frame: frame.id() }
        );
        other.abort(&frame).unwrap();
    }

    #[test]
    fn test_open_limit() {
        let config = FrameConfig {
            max_open_frames: 2,
            ..FrameConfig::default()
        };
        let scheduler = FrameScheduler::with_config(config).unwrap();
        scheduler.open(FrameOptions::read_only()).unwrap();
        let a = scheduler.suspend().unwrap();
        scheduler.open(FrameOptions::read_only()).unwrap();
        let b = scheduler.suspend().unwrap();

        assert_eq!(
            scheduler.open(FrameOptions::read_only()).unwrap_err(),
            FrameError::TooManyOpenFrames { limit: 2 }
        );
        scheduler.commit(&a).unwrap();
        scheduler.commit(&b).unwrap();
    }

    #[test]
    fn test_invalid_config() {
        let config = FrameConfig {
            max_open_frames: 1,
            ..FrameConfig::default()
        };
        assert!(matches!(
            FrameScheduler::with_config(config),
            Err(FrameError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_run_aborts_on_error() {
        let scheduler = create_scheduler();
        let value = FramedValue::with_initial(0);

        let result: FrameResult<()> = scheduler.run(|frame| {
            value.set(frame, 5)?;
            Err(FrameError::NoCurrentFrame)
        });
        assert!(result.is_err());
        assert_eq!(value.read_committed(&scheduler).unwrap(), 0);
        assert_eq!(scheduler.open_frame_count(), 0);
        assert_eq!(scheduler.stats().aborted.load(AtomicOrdering::Relaxed), 1);
    }

    #[test]
    fn test_commit_observer_skips_empty() {
        let scheduler = create_scheduler();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _handle = scheduler.register_commit_observer(move |_| {
            c.fetch_add(1, AtomicOrdering::Relaxed);
        });

        scheduler.run(|_| Ok(())).unwrap();
        assert_eq!(calls.load(AtomicOrdering::Relaxed), 0);

        let value = FramedValue::with_initial(0);
        scheduler.run(|frame| value.set(frame, 1)).unwrap();
        assert_eq!(calls.load(AtomicOrdering::Relaxed), 1);
    }

    #[test]
    fn test_reuse_limit() {
        let scheduler = create_scheduler();
        assert_eq!(scheduler.inner.reuse_limit(), Some(FrameId::FIRST));

        scheduler.open(FrameOptions::read_only()).unwrap();
        let a = scheduler.suspend().unwrap();
        let b = scheduler.open(FrameOptions::read_only()).unwrap();
        scheduler.commit(&b).unwrap();
        assert_eq!(scheduler.inner.reuse_limit(), Some(a.id()));

        scheduler.commit(&a).unwrap();
        assert_eq!(scheduler.inner.reuse_limit(), Some(FrameId::new(4)));

        let scheduler = FrameScheduler::with_config(FrameConfig::without_reuse()).unwrap();
        assert_eq!(scheduler.inner.reuse_limit(), None);
    }

    #[test]
    fn test_stats() {
        let scheduler = create_scheduler();
        let value = FramedValue::with_initial(0);
        scheduler.run(|frame| value.set(frame, 1)).unwrap();
        let frame = scheduler.open(FrameOptions::writable()).unwrap();
        scheduler.abort(&frame).unwrap();

        let stats = scheduler.stats();
        assert_eq!(stats.opened.load(AtomicOrdering::Relaxed), 2);
        assert_eq!(stats.committed.load(AtomicOrdering::Relaxed), 1);
        assert_eq!(stats.aborted.load(AtomicOrdering::Relaxed), 1);
        assert_eq!(stats.records_created.load(AtomicOrdering::Relaxed), 1);
    }
}
