//! # nexus-frames
//!
//! Frame-based transactional memory for NexusDB.
//!
//! This crate implements:
//! - Versioned record chains with snapshot visibility
//! - Framed values and versioned list/map adapters
//! - A frame scheduler with optimistic commit-time conflict detection
//! - Read, write, and commit observers
//!
//! ## Example
//!
//! ```rust
//! use nexus_frames::{FrameOptions, FrameScheduler, FramedValue};
//!
//! # fn main() -> nexus_common::FrameResult<()> {
//! let scheduler = FrameScheduler::new();
//! let street = FramedValue::with_initial(String::from("123 Any Street"));
//!
//! let frame = scheduler.open(FrameOptions::writable())?;
//! street.set(&frame, String::from("456 New Street"))?;
//! scheduler.commit(&frame)?;
//!
//! let reader = scheduler.open(FrameOptions::read_only())?;
//! assert_eq!(street.readable(&reader)?, "456 New Street");
//! scheduler.commit(&reader)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Versioned record chains
pub mod record;

/// Framed values
pub mod value;

/// Frames and snapshots
pub mod frame;

/// Frame lifecycle and conflict detection
pub mod scheduler;

/// Read, write, and commit observers
pub mod observer;

/// Versioned list and map adapters
pub mod collections;

pub use collections::{FramedList, FramedMap};
pub use frame::{Frame, FrameOptions, FrameSnapshot, FrameState};
pub use observer::{CommitObserverHandle, CommitSet, ObjectHandle, ObjectKind};
pub use scheduler::{FrameScheduler, FrameStats};
pub use value::{FramedObject, FramedValue};
