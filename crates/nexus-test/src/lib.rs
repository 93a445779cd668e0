//! # nexus-test
//!
//! Integration tests for nexus frames.
//!
//! This crate contains:
//! - A small framed model shared by the scenario tests
//! - Block helpers for opening, suspending, and restoring frames
//! - Scenario tests under `tests/`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Framed test model
pub mod model;

/// Test utilities and helpers
pub mod utils;
