//! Configuration for nexus frames.
//!
//! This module provides the configuration structure for frame schedulers.

mod frame;

pub use frame::FrameConfig;
