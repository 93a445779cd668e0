//! Frame error types.
//!
//! Errors fall into three groups:
//! - Commit conflicts ([`FrameError::Aborted`]), the only expected failure,
//!   recoverable by aborting and re-running the work in a fresh frame.
//! - Usage errors (writing through a read-only frame, closing a frame twice,
//!   mutating through a read-only view). These are programmer errors.
//! - Internal errors (a record chain with nothing readable where one is
//!   required). These indicate a bug in the runtime.

use std::fmt;
use thiserror::Error;

use crate::types::{FrameId, ObjectId};

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // Frame lifecycle errors (0x0300 - 0x03FF)
    /// Frame was aborted by a conflicting commit.
    FrameAborted = 0x0300,
    /// Frame is not open.
    FrameNotOpen = 0x0301,
    /// Frame does not permit writes.
    FrameReadOnly = 0x0302,
    /// No frame is current on the calling thread.
    NoCurrentFrame = 0x0303,
    /// A frame is already current on the calling thread.
    FrameAlreadyCurrent = 0x0304,
    /// A speculative frame was asked to commit.
    SpeculativeCommit = 0x0305,
    /// Frame belongs to another scheduler.
    ForeignFrame = 0x0306,
    /// Too many frames are open.
    TooManyOpenFrames = 0x0307,

    // Record errors (0x0400 - 0x04FF)
    /// No record in a chain is readable by the frame.
    NoReadableRecord = 0x0400,

    // Collection errors (0x0500 - 0x05FF)
    /// Mutation attempted through a read-only view.
    ViewMutation = 0x0500,
    /// Position or range outside a collection's bounds.
    IndexOutOfBounds = 0x0501,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x03 => "Frame",
            0x04 => "Record",
            0x05 => "Collection",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for nexus frames.
///
/// # Example
///
/// ```rust
/// use nexus_common::error::{FrameError, FrameResult};
/// use nexus_common::types::FrameId;
///
/// fn write_in(frame: FrameId, read_only: bool) -> FrameResult<()> {
///     if read_only {
///         return Err(FrameError::ReadOnly { frame });
///     }
///     Ok(())
/// }
///
/// assert!(write_in(FrameId::new(2), true).unwrap_err().is_usage_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    // ==========================================================================
    // Conflicts
    // ==========================================================================
    /// Commit failed because another frame committed a write to the same
    /// object after this frame opened. The frame is still open and must be
    /// aborted by the caller.
    #[error("frame {frame} aborted: object {object} was written by a concurrent commit")]
    Aborted {
        /// The frame whose commit failed.
        frame: FrameId,
        /// The first object found in conflict.
        object: ObjectId,
    },

    // ==========================================================================
    // Usage Errors
    // ==========================================================================
    /// Write attempted in a frame that has no write id.
    #[error("frame {frame} is read-only")]
    ReadOnly {
        /// The read-only frame.
        frame: FrameId,
    },

    /// Operation requires an open frame.
    #[error("frame {frame} is not open (state: {state})")]
    NotOpen {
        /// The frame.
        frame: FrameId,
        /// Its terminal state.
        state: &'static str,
    },

    /// No frame is current on the calling thread.
    #[error("no frame is current on this thread")]
    NoCurrentFrame,

    /// The calling thread already has a current frame.
    #[error("frame {current} is already current on this thread")]
    AlreadyCurrent {
        /// The frame that is current.
        current: FrameId,
    },

    /// Speculative frames are always aborted, never committed.
    #[error("speculative frame {frame} cannot be committed")]
    SpeculativeCommit {
        /// The speculative frame.
        frame: FrameId,
    },

    /// Mutation attempted through a read-only collection view.
    #[error("cannot {operation} through a read-only view")]
    ViewMutation {
        /// The rejected operation.
        operation: &'static str,
    },

    /// Position or range outside the contents the frame sees.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending position (the range end for ranges).
        index: usize,
        /// The collection length.
        len: usize,
    },

    /// Frame was handed to a scheduler that did not open it.
    #[error("frame {frame} belongs to a different scheduler")]
    ForeignFrame {
        /// The foreign frame.
        frame: FrameId,
    },

    /// The configured open-frame limit was reached.
    #[error("cannot open more than {limit} frames")]
    TooManyOpenFrames {
        /// The configured limit.
        limit: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Internal Errors
    // ==========================================================================
    /// No record of an object is visible to the frame. Reachable when a frame
    /// reads an object created by a frame it cannot see.
    #[error("no readable record of object {object} for frame {frame}")]
    NoReadableRecord {
        /// The object read.
        object: ObjectId,
        /// The reading frame.
        frame: FrameId,
    },
}

impl FrameError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Aborted { .. } => ErrorCode::FrameAborted,
            Self::ReadOnly { .. } => ErrorCode::FrameReadOnly,
            Self::NotOpen { .. } => ErrorCode::FrameNotOpen,
            Self::NoCurrentFrame => ErrorCode::NoCurrentFrame,
            Self::AlreadyCurrent { .. } => ErrorCode::FrameAlreadyCurrent,
            Self::SpeculativeCommit { .. } => ErrorCode::SpeculativeCommit,
            Self::ViewMutation { .. } => ErrorCode::ViewMutation,
            Self::IndexOutOfBounds { .. } => ErrorCode::IndexOutOfBounds,
            Self::ForeignFrame { .. } => ErrorCode::ForeignFrame,
            Self::TooManyOpenFrames { .. } => ErrorCode::TooManyOpenFrames,
            Self::InvalidConfig { .. } => ErrorCode::InvalidArgument,
            Self::NoReadableRecord { .. } => ErrorCode::NoReadableRecord,
        }
    }

    /// Returns true if this error is a commit conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    /// Returns true if this error is caused by misuse of the API.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::ReadOnly { .. }
                | Self::NotOpen { .. }
                | Self::NoCurrentFrame
                | Self::AlreadyCurrent { .. }
                | Self::SpeculativeCommit { .. }
                | Self::ViewMutation { .. }
                | Self::IndexOutOfBounds { .. }
                | Self::ForeignFrame { .. }
                | Self::TooManyOpenFrames { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Returns true if this error indicates a broken runtime invariant.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::NoReadableRecord { .. })
    }

    /// Creates a view mutation error.
    #[must_use]
    pub const fn view_mutation(operation: &'static str) -> Self {
        Self::ViewMutation { operation }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
