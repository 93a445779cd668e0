//! Error handling for nexus frames.
//!
//! This module provides a unified error type and result alias used
//! across the frame runtime and its collection adapters.

mod frame;

pub use frame::{ErrorCode, FrameError};

/// Result type alias for frame operations.
pub type FrameResult<T> = std::result::Result<T, FrameError>;
