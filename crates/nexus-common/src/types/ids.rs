//! Core identifier types for nexus frames.
//!
//! These types provide type-safe wrappers around numeric identifiers,
//! preventing accidental misuse of frame ids where object ids are expected
//! and vice versa.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame identifier - identifies a frame and tags the records it writes.
///
/// Frame ids are allocated by a scheduler in strictly increasing order and
/// are never reused. They are used to:
/// - Bound what a frame can read (its snapshot ceiling)
/// - Tag the records a writable frame creates
/// - Decide whether a record was written concurrently with a reader
///
/// Two ids are reserved: [`FrameId::INVALID`] tags records of aborted frames
/// and is never visible, [`FrameId::GENESIS`] tags state that existed before
/// any frame and is visible to every frame.
///
/// # Example
///
/// ```rust
/// use nexus_common::types::FrameId;
///
/// let frame = FrameId::new(7);
/// assert!(frame.is_valid());
/// assert!(FrameId::GENESIS < frame);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FrameId(u64);

impl FrameId {
    /// Invalid frame ID. Records carrying it are invisible to every frame.
    pub const INVALID: Self = Self(0);

    /// Tag of records that existed before any frame was opened.
    pub const GENESIS: Self = Self(1);

    /// First id handed out to an opened frame.
    pub const FIRST: Self = Self(2);

    /// Creates a new `FrameId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next frame ID.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Checks if this is a valid frame ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INVALID => write!(f, "FrameId(INVALID)"),
            Self::GENESIS => write!(f, "FrameId(GENESIS)"),
            _ => write!(f, "FrameId({})", self.0),
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<FrameId> for u64 {
    #[inline]
    fn from(id: FrameId) -> Self {
        id.0
    }
}

/// Object identifier - the identity of one framed value.
///
/// Every framed value (scalar field or collection) gets a process-unique
/// object id at construction. Observers and modified-sets refer to objects
/// by this id instead of by address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Invalid object ID, used as a sentinel value.
    pub const INVALID: Self = Self(0);

    /// Creates a new `ObjectId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid object ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "ObjectId(INVALID)")
        } else {
            write!(f, "ObjectId({})", self.0)
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ObjectId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}
