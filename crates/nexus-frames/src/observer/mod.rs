//! Read, write, and commit observers.
//!
//! Observers are plain callbacks. None of them is ever invoked while a
//! scheduler or record lock is held, so an observer may freely read framed
//! values or register further observers.
//!
//! - Read observers run whenever a framed value is read. They are either
//!   global (registered on the scheduler for the duration of a block and
//!   seeing only reads made by the registering thread) or scoped to a
//!   single frame. An observer is never re-entered for an object it is
//!   already being notified about on the same thread.
//! - Write observers are scoped to a frame and run on the first write of
//!   each value within that frame.
//! - Commit observers are registered on the scheduler and run after every
//!   successful commit that modified at least one value.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use nexus_common::types::{FrameId, ObjectId};
use parking_lot::{Mutex, RwLock};

/// Callback invoked when a framed object is read.
pub type ReadObserver = Arc<dyn Fn(ObjectHandle) + Send + Sync>;

/// Callback invoked on the first write of a framed object within a frame.
pub type WriteObserver = Arc<dyn Fn(ObjectHandle) + Send + Sync>;

/// Callback invoked with the objects modified by a committed frame.
pub type CommitObserver = Arc<dyn Fn(&CommitSet) + Send + Sync>;

/// Kind of framed object behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A single framed value.
    Value,
    /// A versioned list.
    List,
    /// A versioned map.
    Map,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Value => write!(f, "value"),
            ObjectKind::List => write!(f, "list"),
            ObjectKind::Map => write!(f, "map"),
        }
    }
}

/// Identity of a framed object as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    id: ObjectId,
    kind: ObjectKind,
}

impl ObjectHandle {
    /// Creates a new handle.
    pub const fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self { id, kind }
    }

    /// Returns the object id.
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the object kind.
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.id)
    }
}

/// The set of objects modified by one committed frame.
#[derive(Debug, Clone)]
pub struct CommitSet {
    frame: FrameId,
    objects: HashSet<ObjectHandle>,
}

impl CommitSet {
    pub(crate) fn new(frame: FrameId, objects: HashSet<ObjectHandle>) -> Self {
        Self { frame, objects }
    }

    /// Returns the id of the committed frame.
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Returns true if `handle` was modified.
    pub fn contains(&self, handle: &ObjectHandle) -> bool {
        self.objects.contains(handle)
    }

    /// Returns true if an object with `id` was modified.
    pub fn contains_id(&self, id: ObjectId) -> bool {
        self.objects.iter().any(|handle| handle.id == id)
    }

    /// Returns the number of modified objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if nothing was modified.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates the modified objects in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectHandle> {
        self.objects.iter()
    }
}

/// A read observer together with the objects it has already been told
/// about.
pub(crate) struct ReadScope {
    token: u64,
    observer: ReadObserver,
    seen: Option<Mutex<HashSet<ObjectId>>>,
    in_flight: Mutex<HashSet<(ThreadId, ObjectId)>>,
}

impl ReadScope {
    pub(crate) fn new(token: u64, observer: ReadObserver, dedupe: bool) -> Self {
        Self {
            token,
            observer,
            seen: dedupe.then(|| Mutex::new(HashSet::new())),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }

    /// Calls the observer unless it has already seen `handle` (when
    /// deduping) or is currently being notified about `handle` on this
    /// thread.
    pub(crate) fn notify(&self, handle: ObjectHandle) {
        if let Some(seen) = &self.seen {
            if !seen.lock().insert(handle.id) {
                return;
            }
        }
        let key = (thread::current().id(), handle.id);
        if !self.in_flight.lock().insert(key) {
            return;
        }
        let _in_flight = InFlight { scope: self, key };
        (self.observer)(handle);
    }
}

/// Clears an in-flight notification, also when the observer panics.
struct InFlight<'a> {
    scope: &'a ReadScope,
    key: (ThreadId, ObjectId),
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.scope.in_flight.lock().remove(&self.key);
    }
}

impl fmt::Debug for ReadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadScope")
            .field("token", &self.token)
            .field("dedupe", &self.seen.is_some())
            .finish()
    }
}

/// Registry of the global read observers and commit observers of one
/// scheduler.
///
/// Global read observers are kept per registering thread.
pub struct ObserverRegistry {
    next_token: AtomicU64,
    dedupe_reads: bool,
    read_scopes: RwLock<HashMap<ThreadId, Vec<Arc<ReadScope>>>>,
    commit_observers: RwLock<Vec<(u64, CommitObserver)>>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    pub(crate) fn new(dedupe_reads: bool) -> Self {
        Self {
            next_token: AtomicU64::new(1),
            dedupe_reads,
            read_scopes: RwLock::new(HashMap::new()),
            commit_observers: RwLock::new(Vec::new()),
        }
    }

    /// Allocates a registration token. Tokens are increasing, so they
    /// order observers by registration.
    pub(crate) fn next_token(&self) -> u64 {
        self.next_token.fetch_add(1, AtomicOrdering::Relaxed)
    }

    /// Creates a read scope with this registry's dedupe setting.
    pub(crate) fn read_scope(&self, observer: ReadObserver) -> Arc<ReadScope> {
        Arc::new(ReadScope::new(
            self.next_token(),
            observer,
            self.dedupe_reads,
        ))
    }

    /// Pushes a global read observer for the calling thread. Returns its
    /// token.
    pub(crate) fn push_read_observer(&self, observer: ReadObserver) -> u64 {
        let scope = self.read_scope(observer);
        let token = scope.token();
        self.read_scopes
            .write()
            .entry(thread::current().id())
            .or_default()
            .push(scope);
        token
    }

    /// Removes a global read observer registered by `thread`.
    pub(crate) fn remove_read_observer(&self, thread: ThreadId, token: u64) -> bool {
        let mut scopes = self.read_scopes.write();
        let Some(registered) = scopes.get_mut(&thread) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|scope| scope.token() != token);
        let removed = registered.len() != before;
        if registered.is_empty() {
            scopes.remove(&thread);
        }
        removed
    }

    /// Notifies the calling thread's global read observers and the frame's
    /// own, in registration order.
    pub(crate) fn notify_read(&self, frame_scope: Option<&Arc<ReadScope>>, handle: ObjectHandle) {
        let mut scopes: Vec<Arc<ReadScope>> = self
            .read_scopes
            .read()
            .get(&thread::current().id())
            .cloned()
            .unwrap_or_default();
        if let Some(scope) = frame_scope {
            let at = scopes.partition_point(|s| s.token() < scope.token());
            scopes.insert(at, Arc::clone(scope));
        }
        for scope in scopes {
            scope.notify(handle);
        }
    }

    /// Returns the number of global read observers across all threads.
    pub fn read_observer_count(&self) -> usize {
        self.read_scopes.read().values().map(Vec::len).sum()
    }

    /// Registers a commit observer. Returns its token.
    pub(crate) fn register_commit(&self, observer: CommitObserver) -> u64 {
        let token = self.next_token();
        self.commit_observers.write().push((token, observer));
        token
    }

    /// Unregisters a commit observer.
    pub(crate) fn unregister_commit(&self, token: u64) -> bool {
        let mut observers = self.commit_observers.write();
        let before = observers.len();
        observers.retain(|(t, _)| *t != token);
        observers.len() != before
    }

    /// Copies the registered commit observers.
    pub(crate) fn commit_observers(&self) -> Vec<CommitObserver> {
        self.commit_observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    /// Returns the number of registered commit observers.
    pub fn commit_observer_count(&self) -> usize {
        self.commit_observers.read().len()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("read_observers", &self.read_observer_count())
            .field("commit_observers", &self.commit_observer_count())
            .finish()
    }
}

/// Registration of a commit observer.
///
/// The observer stays registered until the handle is dropped or
/// [`CommitObserverHandle::unregister`] is called.
#[must_use = "dropping the handle unregisters the observer"]
pub struct CommitObserverHandle {
    registry: Arc<ObserverRegistry>,
    token: u64,
}

impl CommitObserverHandle {
    pub(crate) fn new(registry: Arc<ObserverRegistry>, token: u64) -> Self {
        Self { registry, token }
    }

    /// Unregisters the observer.
    pub fn unregister(self) {
        drop(self);
    }
}

impl Drop for CommitObserverHandle {
    fn drop(&mut self) {
        self.registry.unregister_commit(self.token);
    }
}

impl fmt::Debug for CommitObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitObserverHandle")
            .field("token", &self.token)
            .finish()
    }
}

/// Pops a global read observer when dropped.
pub(crate) struct ReadObserverGuard<'a> {
    registry: &'a ObserverRegistry,
    thread: ThreadId,
    token: u64,
}

impl<'a> ReadObserverGuard<'a> {
    pub(crate) fn push(registry: &'a ObserverRegistry, observer: ReadObserver) -> Self {
        let token = registry.push_read_observer(observer);
        Self {
            registry,
            thread: thread::current().id(),
            token,
        }
    }
}

impl Drop for ReadObserverGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove_read_observer(self.thread, self.token);
    }
}
