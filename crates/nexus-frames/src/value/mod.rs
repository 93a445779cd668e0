//! Framed values.
//!
//! A [`FramedValue`] is a single mutable field whose history is kept in a
//! [`RecordChain`]. All access goes through a [`Frame`]: reads select the
//! record visible to the frame, and the first write in a frame claims a
//! record tagged with the frame's write id. Later writes in the same frame
//! mutate that record in place.
//!
//! ```text
//! frame 5 writes "b"           frame 7 (opened while 5 was open) reads
//! ┌────────────────────┐       ┌────────────────────┐
//! │ [1] frame 5   "b"  │ ◀──── │ invisible: 5 ∈ invalid
//! │ [0] genesis   "a"  │ ◀──── │ reads "a"          │
//! └────────────────────┘       └────────────────────┘
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use nexus_common::error::{FrameError, FrameResult};
use nexus_common::types::{FrameId, ObjectId};
use parking_lot::RwLock;

use crate::frame::{Frame, FrameSnapshot};
use crate::observer::{ObjectHandle, ObjectKind};
use crate::record::{Claim, RecordChain};
use crate::scheduler::FrameScheduler;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

fn next_object_id() -> ObjectId {
    ObjectId::new(NEXT_OBJECT_ID.fetch_add(1, AtomicOrdering::Relaxed))
}

/// An object whose state is managed by frames.
pub trait FramedObject {
    /// Returns the identity reported to observers.
    fn handle(&self) -> ObjectHandle;

    /// Returns the object id.
    fn id(&self) -> ObjectId {
        self.handle().id()
    }
}

/// Commit-time hooks of a framed object.
pub(crate) trait StateObject: Send + Sync {
    fn handle(&self) -> ObjectHandle;

    /// Returns true if the record `previous` selects differs from the one
    /// `current` selects. Objects with nothing visible to `previous` were
    /// created by the committing frame and never conflict.
    fn has_conflict(&self, previous: &FrameSnapshot, current: &FrameSnapshot) -> bool;

    /// Retags the records written by `frame` as `INVALID`.
    fn abandon(&self, frame: FrameId) -> usize;
}

struct ValueCell<T> {
    id: ObjectId,
    kind: ObjectKind,
    chain: RwLock<RecordChain<T>>,
}

impl<T: Send + Sync> StateObject for ValueCell<T> {
    fn handle(&self) -> ObjectHandle {
        ObjectHandle::new(self.id, self.kind)
    }

    fn has_conflict(&self, previous: &FrameSnapshot, current: &FrameSnapshot) -> bool {
        let chain = self.chain.read();
        let Some(previous) = chain.readable(previous) else {
            return false;
        };
        match chain.readable(current) {
            Some(current) => {
                current != previous
                    || chain.record(current).frame_id() != chain.record(previous).frame_id()
            }
            None => false,
        }
    }

    fn abandon(&self, frame: FrameId) -> usize {
        self.chain.write().retag(frame, FrameId::INVALID)
    }
}

/// A single mutable field with isolated, versioned state.
///
/// `FramedValue` is a cheap handle; clones share the same field. Equality
/// and hashing compare identity, not contents.
pub struct FramedValue<T> {
    cell: Arc<ValueCell<T>>,
}

impl<T> Clone for FramedValue<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> FramedValue<T> {
    /// Creates a value in `frame`. The value is invisible to every other
    /// frame until `frame` commits.
    pub fn new(frame: &Frame, value: T) -> FrameResult<Self> {
        Self::new_of_kind(frame, value, ObjectKind::Value)
    }

    /// Creates a value that every frame can see, as if it existed before
    /// any frame opened.
    pub fn with_initial(value: T) -> Self {
        Self::initial_of_kind(value, ObjectKind::Value)
    }

    pub(crate) fn new_of_kind(frame: &Frame, value: T, kind: ObjectKind) -> FrameResult<Self> {
        let write_id = frame.writable_id()?;
        let framed = Self::from_chain(RecordChain::new(write_id, value), kind);
        let state: Arc<dyn StateObject> = framed.cell.clone();
        frame.record_modified(state);
        frame.scheduler().stats().record_created();
        frame.notify_write(framed.handle());
        Ok(framed)
    }

    pub(crate) fn initial_of_kind(value: T, kind: ObjectKind) -> Self {
        Self::from_chain(RecordChain::new(FrameId::GENESIS, value), kind)
    }

    fn from_chain(chain: RecordChain<T>, kind: ObjectKind) -> Self {
        Self {
            cell: Arc::new(ValueCell {
                id: next_object_id(),
                kind,
                chain: RwLock::new(chain),
            }),
        }
    }

    /// Returns a copy of the value visible to `frame`.
    pub fn readable(&self, frame: &Frame) -> FrameResult<T> {
        self.with_readable(frame, T::clone)
    }

    /// Calls `f` with the value visible to `frame`.
    ///
    /// `f` runs under the value's read lock and must not write this value.
    pub fn with_readable<R>(&self, frame: &Frame, f: impl FnOnce(&T) -> R) -> FrameResult<R> {
        frame.ensure_open()?;
        frame.notify_read(self.handle());
        let chain = self.cell.chain.read();
        let index = chain
            .readable(frame.snapshot())
            .ok_or_else(|| self.no_readable_record(frame))?;
        Ok(f(chain.record(index).value()))
    }

    /// Calls `f` with a mutable reference to this frame's copy of the value.
    ///
    /// The first write in a frame copies the visible value into a record
    /// tagged with the frame's write id, then notifies the frame's write
    /// observer. `f` runs under the value's write lock and must not access
    /// this value.
    pub fn writable<R>(&self, frame: &Frame, f: impl FnOnce(&mut T) -> R) -> FrameResult<R> {
        let write_id = frame.writable_id()?;
        let handle = self.handle();
        frame.notify_read(handle);

        let scheduler = frame.scheduler();
        let owned = self.cell.chain.read().find_tagged(write_id).is_some();
        let reuse_limit = if owned { None } else { scheduler.reuse_limit() };

        let (result, first_write) = {
            let mut chain = self.cell.chain.write();
            let (index, first_write) = match chain.find_tagged(write_id) {
                Some(index) => (index, false),
                None => {
                    let readable = chain
                        .readable(frame.snapshot())
                        .ok_or_else(|| self.no_readable_record(frame))?;
                    let value = chain.record(readable).value().clone();
                    let claim = chain.claim(write_id, value, reuse_limit);
                    scheduler.stats().record_claim(claim);
                    if let Claim::Reused(index) = claim {
                        tracing::trace!(object = %self.id(), record = %index, frame = %write_id, "reused record");
                    }
                    let state: Arc<dyn StateObject> = self.cell.clone();
                    (claim.index(), frame.record_modified(state))
                }
            };
            (f(chain.value_mut(index)), first_write)
        };

        if first_write {
            frame.notify_write(handle);
        }
        Ok(result)
    }

    /// Replaces this frame's copy of the value.
    pub fn set(&self, frame: &Frame, value: T) -> FrameResult<()> {
        self.writable(frame, |slot| *slot = value)
    }

    /// Returns the value the most recent commits made visible, as a new
    /// frame opened now would see it. Does not notify observers.
    pub fn read_committed(&self, scheduler: &FrameScheduler) -> FrameResult<T> {
        let snapshot = scheduler.latest_snapshot();
        let chain = self.cell.chain.read();
        chain
            .readable(&snapshot)
            .map(|index| chain.record(index).value().clone())
            .ok_or(FrameError::NoReadableRecord {
                object: self.id(),
                frame: snapshot.id(),
            })
    }

    /// Prepends a record tagged `frame_id` to the chain.
    pub fn prepend_record(&self, frame_id: FrameId, value: T) {
        self.cell.chain.write().prepend(frame_id, value);
    }

    /// Returns the tag and value of the newest record.
    pub fn first_record(&self) -> (FrameId, T) {
        let chain = self.cell.chain.read();
        let first = chain.first();
        (first.frame_id(), first.value().clone())
    }

    /// Returns the number of records in the chain.
    pub fn chain_len(&self) -> usize {
        self.cell.chain.read().len()
    }

    /// Returns the record tags, newest first.
    pub fn record_tags(&self) -> Vec<FrameId> {
        self.cell.chain.read().tags()
    }

    fn no_readable_record(&self, frame: &Frame) -> FrameError {
        FrameError::NoReadableRecord {
            object: self.id(),
            frame: frame.id(),
        }
    }
}

impl<T> FramedObject for FramedValue<T> {
    fn handle(&self) -> ObjectHandle {
        ObjectHandle::new(self.cell.id, self.cell.kind)
    }
}

impl<T> PartialEq for FramedValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cell.id == other.cell.id
    }
}

impl<T> Eq for FramedValue<T> {}

impl<T> Hash for FramedValue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.id.hash(state);
    }
}

impl<T> fmt::Debug for FramedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramedValue")
            .field("id", &self.cell.id)
            .field("kind", &self.cell.kind)
            .field("records", &self.cell.chain.read().len())
            .finish()
    }
}
