//! Frame scheduler configuration.
//!
//! These structures define the tunable aspects of a frame scheduler.

use serde::{Deserialize, Serialize};

/// Frame scheduler configuration.
///
/// # Example
///
/// ```rust
/// use nexus_common::config::FrameConfig;
///
/// let config = FrameConfig::default();
/// assert!(config.reuse_records);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Reuse records that no frame can select any more instead of growing
    /// record chains.
    /// Default: true
    pub reuse_records: bool,

    /// Maximum number of simultaneously open frames. 0 means unlimited.
    /// Default: 0
    pub max_open_frames: usize,

    /// Notify each read observer scope only once per object.
    /// Default: true
    pub dedupe_read_notifications: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            reuse_records: true,
            max_open_frames: 0,
            dedupe_read_notifications: true,
        }
    }
}

impl FrameConfig {
    /// Creates a configuration that never reuses records, so chain length
    /// reflects every frame that wrote a value.
    #[must_use]
    pub fn without_reuse() -> Self {
        Self {
            reuse_records: false,
            ..Default::default()
        }
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            reuse_records: true,
            max_open_frames: 4096,
            dedupe_read_notifications: true,
        }
    }

    /// Returns true if the open-frame limit is reached by `open` frames.
    #[must_use]
    pub const fn open_limit_reached(&self, open: usize) -> bool {
        self.max_open_frames != 0 && open >= self.max_open_frames
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_open_frames == 1 {
            return Err("max_open_frames must be 0 (unlimited) or at least 2".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FrameConfig::default();
        assert!(config.reuse_records);
        assert_eq!(config.max_open_frames, 0);
        assert!(config.dedupe_read_notifications);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_limit() {
        let config = FrameConfig {
            max_open_frames: 2,
            ..Default::default()
        };
        assert!(!config.open_limit_reached(1));
        assert!(config.open_limit_reached(2));
        assert!(!FrameConfig::default().open_limit_reached(10_000));
    }

    #[test]
    fn test_invalid_limit() {
        let config = FrameConfig {
            max_open_frames: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: FrameConfig = serde_json::from_str(r#"{"reuse_records": false}"#).unwrap();
        assert_eq!(config, FrameConfig::without_reuse());
    }
}
