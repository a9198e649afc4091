//! Runtime configuration for the overlay.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```
//! use ship_overlay::config::{OverlayConfig, PositionHandlePolicy};
//! let config = OverlayConfig::from_json_str(r#"{ "position_policy": "every_frame" }"#).unwrap();
//! assert_eq!(config.position_policy, PositionHandlePolicy::EveryFrame);
//! assert_eq!(config.near_far_threshold, 1750.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crew::Rgb;
use crate::error::ConfigError;
use crate::{DEFAULT_MARKER_COLOR, MARKER_SIZE, NEAR_FAR_THRESHOLD};

/// Byte offsets describing where ship data lives inside an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLayout {
    /// Offset of the `u32` actor identity from the actor base.
    pub actor_id_offset: u64,
    /// Offset of the root component pointer from the actor base.
    pub root_component_offset: u64,
    /// Offset of the world location (three `f32`) inside the root component.
    pub location_offset: u64,
    /// Offset of the crew ownership component pointer from the actor base.
    pub crew_component_offset: u64,
    /// Offset of the 16-byte crew identifier inside the ownership component.
    pub crew_id_offset: u64,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            actor_id_offset: 0x18,
            root_component_offset: 0x170,
            location_offset: 0x11C,
            crew_component_offset: 0x5E0,
            crew_id_offset: 0xD0,
        }
    }
}

/// When a ship re-reads the address of its position component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionHandlePolicy {
    /// Resolve once at spawn and never again.
    Fixed,
    /// Re-resolve once when a position read fails, then retry.
    #[default]
    ReResolveOnFailure,
    /// Re-resolve before every position read.
    EveryFrame,
}

/// Tunable overlay behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Distance at which near actors hand over to far actors.
    pub near_far_threshold: f32,
    /// Marker diameter in pixels; icon and label offsets scale from it.
    pub marker_size: f32,
    /// Marker colour for ships whose crew is unknown.
    pub default_marker_color: Rgb,
    /// Position component re-resolution policy.
    pub position_policy: PositionHandlePolicy,
    /// Actor memory layout.
    pub layout: MemoryLayout,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            near_far_threshold: NEAR_FAR_THRESHOLD,
            marker_size: MARKER_SIZE,
            default_marker_color: Rgb(DEFAULT_MARKER_COLOR),
            position_policy: PositionHandlePolicy::default(),
            layout: MemoryLayout::default(),
        }
    }
}

impl OverlayConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let json = fs::read_to_string(path_ref).map_err(|e| ConfigError::io(path_ref, e))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = OverlayConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn nested_layout_overrides_single_offset() {
        let config = OverlayConfig::from_json_str(r#"{ "layout": { "location_offset": 64 } }"#)
            .expect("layout override should parse");
        assert_eq!(config.layout.location_offset, 64);
        assert_eq!(
            config.layout.actor_id_offset,
            MemoryLayout::default().actor_id_offset
        );
    }

    #[test]
    fn colour_parses_from_array() {
        let config =
            OverlayConfig::from_json_str(r#"{ "default_marker_color": [10, 20, 30] }"#)
                .expect("colour should parse");
        assert_eq!(config.default_marker_color, Rgb::new(10, 20, 30));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = OverlayConfig::from_json_str(r#"{ "position_policy": "sometimes" }"#)
            .expect_err("unknown policy should fail");
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = OverlayConfig::load("/nonexistent/overlay.json")
            .expect_err("missing file should fail");
        assert!(err.to_string().contains("/nonexistent/overlay.json"));
    }
}
