//! Frames and snapshot visibility.
//!
//! A frame is an isolated view of every framed value. Its snapshot is fixed
//! when it opens: its own id plus the ids of all frames that were open at
//! that moment.
//!
//! # Read Visibility Rules
//!
//! A record tagged `f` is visible to a frame if:
//! 1. `f` is not `INVALID`, AND
//! 2. `f` is the frame's own write id, OR
//! 3. `f` is not newer than the frame and was not open when the frame
//!    opened
//!
//! Among visible records the highest tag wins.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use nexus_common::error::{FrameError, FrameResult};
use nexus_common::types::{FrameId, ObjectId};
use parking_lot::Mutex;

use crate::observer::{ObjectHandle, ReadObserver, ReadScope, WriteObserver};
use crate::scheduler::SchedulerInner;
use crate::value::{FramedObject, StateObject};

/// State of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Frame is open and accepts reads (and writes, if writable).
    Open,
    /// Frame was committed.
    Committed,
    /// Frame was aborted.
    Aborted,
}

impl FrameState {
    /// Returns the state name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FrameState::Open => "Open",
            FrameState::Committed => "Committed",
            FrameState::Aborted => "Aborted",
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FrameState::Open)
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed visibility view of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    /// Snapshot id.
    id: FrameId,
    /// Tag of records this frame writes, if writable.
    write_id: Option<FrameId>,
    /// Frames that were open when this snapshot was taken.
    invalid: HashSet<FrameId>,
}

impl FrameSnapshot {
    /// Creates a new snapshot.
    pub fn new(id: FrameId, write_id: Option<FrameId>, invalid: HashSet<FrameId>) -> Self {
        Self {
            id,
            write_id,
            invalid,
        }
    }

    /// Returns the snapshot id.
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Returns the write id, if the frame is writable.
    pub fn write_id(&self) -> Option<FrameId> {
        self.write_id
    }

    /// Returns the frames treated as invisible.
    pub fn invalid(&self) -> &HashSet<FrameId> {
        &self.invalid
    }

    /// Returns true if `frame` is treated as invisible.
    pub fn is_invalid(&self, frame: FrameId) -> bool {
        self.invalid.contains(&frame)
    }

    /// Checks whether a record tagged `tag` is visible.
    #[inline]
    pub fn is_visible(&self, tag: FrameId) -> bool {
        if !tag.is_valid() {
            return false;
        }
        if Some(tag) == self.write_id {
            return true;
        }
        tag <= self.id && !self.invalid.contains(&tag)
    }

    /// Returns the oldest frame id whose records this snapshot may still
    /// select.
    pub fn pin(&self) -> FrameId {
        self.invalid
            .iter()
            .copied()
            .min()
            .map_or(self.id, |oldest| oldest.min(self.id))
    }

    /// Returns the view this frame had before any of its own writes.
    pub(crate) fn without_own_writes(&self) -> Self {
        let mut invalid = self.invalid.clone();
        invalid.insert(self.id);
        Self {
            id: self.id,
            write_id: None,
            invalid,
        }
    }
}

/// Options for opening a frame.
#[derive(Clone, Default)]
pub struct FrameOptions {
    pub(crate) read_only: bool,
    pub(crate) read_observer: Option<ReadObserver>,
    pub(crate) write_observer: Option<WriteObserver>,
}

impl FrameOptions {
    /// Options for a writable frame.
    pub fn writable() -> Self {
        Self::default()
    }

    /// Options for a read-only frame.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Sets a read observer scoped to the frame.
    pub fn with_read_observer(
        mut self,
        observer: impl Fn(ObjectHandle) + Send + Sync + 'static,
    ) -> Self {
        self.read_observer = Some(Arc::new(observer));
        self
    }

    /// Sets a write observer scoped to the frame.
    pub fn with_write_observer(
        mut self,
        observer: impl Fn(ObjectHandle) + Send + Sync + 'static,
    ) -> Self {
        self.write_observer = Some(Arc::new(observer));
        self
    }

    /// Returns true if frames opened with these options are read-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl fmt::Debug for FrameOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameOptions")
            .field("read_only", &self.read_only)
            .field("read_observer", &self.read_observer.is_some())
            .field("write_observer", &self.write_observer.is_some())
            .finish()
    }
}

/// An isolated view of all framed values.
///
/// `Frame` is a cheap handle; clones refer to the same frame. Frames are
/// opened, committed, and aborted through their
/// [`FrameScheduler`](crate::FrameScheduler).
#[derive(Clone)]
pub struct Frame {
    inner: Arc<FrameInner>,
}

struct FrameInner {
    scheduler: Arc<SchedulerInner>,
    snapshot: FrameSnapshot,
    read_scope: Option<Arc<ReadScope>>,
    write_observer: Option<WriteObserver>,
    state: Mutex<FrameState>,
    speculative: AtomicBool,
    modified: Mutex<HashMap<ObjectId, Arc<dyn StateObject>>>,
}

impl Frame {
    pub(crate) fn new(
        scheduler: Arc<SchedulerInner>,
        snapshot: FrameSnapshot,
        read_scope: Option<Arc<ReadScope>>,
        write_observer: Option<WriteObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(FrameInner {
                scheduler,
                snapshot,
                read_scope,
                write_observer,
                state: Mutex::new(FrameState::Open),
                speculative: AtomicBool::new(false),
                modified: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the frame id.
    pub fn id(&self) -> FrameId {
        self.inner.snapshot.id
    }

    /// Returns the write id, or `None` for a read-only frame.
    pub fn write_id(&self) -> Option<FrameId> {
        self.inner.snapshot.write_id
    }

    /// Returns the frame's snapshot.
    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.inner.snapshot
    }

    /// Returns the current state.
    pub fn state(&self) -> FrameState {
        *self.inner.state.lock()
    }

    /// Returns true if the frame is open.
    pub fn is_open(&self) -> bool {
        self.state() == FrameState::Open
    }

    /// Returns true if the frame cannot write.
    pub fn is_read_only(&self) -> bool {
        self.inner.snapshot.write_id.is_none()
    }

    /// Returns true if the frame is speculative and will only be aborted.
    pub fn is_speculative(&self) -> bool {
        self.inner.speculative.load(AtomicOrdering::Acquire)
    }

    /// Returns true if the frame has written any framed object.
    pub fn has_pending_changes(&self) -> bool {
        !self.inner.modified.lock().is_empty()
    }

    /// Returns true if `object` was written in this frame.
    pub fn was_modified(&self, object: &impl FramedObject) -> bool {
        self.inner
            .modified
            .lock()
            .contains_key(&object.handle().id())
    }

    /// Returns the handles of all objects written in this frame.
    pub fn modified_objects(&self) -> Vec<ObjectHandle> {
        self.inner
            .modified
            .lock()
            .values()
            .map(|object| object.handle())
            .collect()
    }

    pub(crate) fn scheduler(&self) -> &Arc<SchedulerInner> {
        &self.inner.scheduler
    }

    pub(crate) fn belongs_to(&self, scheduler: &Arc<SchedulerInner>) -> bool {
        Arc::ptr_eq(&self.inner.scheduler, scheduler)
    }

    pub(crate) fn ensure_open(&self) -> FrameResult<()> {
        let state = self.state();
        if state.is_terminal() {
            return Err(FrameError::NotOpen {
                frame: self.id(),
                state: state.as_str(),
            });
        }
        Ok(())
    }

    /// Returns the write id of an open writable frame.
    pub(crate) fn writable_id(&self) -> FrameResult<FrameId> {
        self.ensure_open()?;
        self.write_id()
            .ok_or(FrameError::ReadOnly { frame: self.id() })
    }

    pub(crate) fn set_state(&self, state: FrameState) {
        *self.inner.state.lock() = state;
    }

    pub(crate) fn mark_speculative(&self) {
        self.inner.speculative.store(true, AtomicOrdering::Release);
    }

    pub(crate) fn notify_read(&self, handle: ObjectHandle) {
        self.inner
            .scheduler
            .observers()
            .notify_read(self.inner.read_scope.as_ref(), handle);
    }

    pub(crate) fn notify_write(&self, handle: ObjectHandle) {
        if let Some(observer) = &self.inner.write_observer {
            observer(handle);
        }
    }

    /// Adds `object` to the modified set. Returns true if it was not
    /// already present.
    pub(crate) fn record_modified(&self, object: Arc<dyn StateObject>) -> bool {
        let id = object.handle().id();
        let mut modified = self.inner.modified.lock();
        if modified.contains_key(&id) {
            return false;
        }
        modified.insert(id, object);
        true
    }

    pub(crate) fn modified_states(&self) -> Vec<Arc<dyn StateObject>> {
        self.inner.modified.lock().values().cloned().collect()
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Frame {}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id())
            .field("write_id", &self.write_id())
            .field("state", &self.state())
            .field("speculative", &self.is_speculative())
            .field("invalid", &self.inner.snapshot.invalid.len())
            .finish()
    }
}
