//! # nexus-common
//!
//! Common types, errors, and configuration for nexus frames.
//!
//! This crate provides the foundational types shared by the frame runtime
//! and the code that drives it. It includes:
//!
//! - **Types**: Identifiers for frames (`FrameId`) and framed objects (`ObjectId`)
//! - **Errors**: Unified error handling with `FrameError`
//! - **Config**: Scheduler configuration (`FrameConfig`)
//!
//! ## Example
//!
//! ```rust
//! use nexus_common::types::{FrameId, ObjectId};
//! use nexus_common::error::FrameResult;
//!
//! fn example() -> FrameResult<()> {
//!     let frame = FrameId::new(2);
//!     let object = ObjectId::new(1);
//!     assert!(frame.is_valid() && object.is_valid());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::FrameConfig;
pub use error::{ErrorCode, FrameError, FrameResult};
pub use types::{FrameId, ObjectId};
