//! Type definitions for nexus frames.
//!
//! This module contains the identifier types shared by the frame runtime
//! and its collaborators.

mod ids;

pub use ids::{FrameId, ObjectId};
