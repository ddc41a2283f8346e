//! Editor configuration.

use crate::persist::STORAGE_KEY;
use pd_core::registry::{DEFAULT_AUTOPLAY_INTERVAL_MS, DUPLICATE_OFFSET};
use pd_core::viewport::{BASE_CANVAS, CanvasSize, Device};
use serde::{Deserialize, Serialize};

/// Session settings. Every field has a default, so a partial JSON object
/// (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo depth. `None` keeps every step.
    pub history_depth: Option<usize>,
    /// Key the published document is stored under.
    pub storage_key: String,
    /// Coordinate space nodes are stored in.
    pub base_canvas: CanvasSize,
    pub initial_device: Device,
    /// Autoplay interval for carousels that don't set one.
    pub autoplay_interval_ms: u32,
    /// Position offset for duplicated nodes.
    pub duplicate_offset: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: None,
            storage_key: STORAGE_KEY.to_string(),
            base_canvas: BASE_CANVAS,
            initial_device: Device::Desktop,
            autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            duplicate_offset: DUPLICATE_OFFSET,
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| format!("invalid editor config: {e}"))?;
        if config.base_canvas.width <= 0.0 || config.base_canvas.height <= 0.0 {
            return Err("base canvas must have a positive size".to_string());
        }
        if config.storage_key.is_empty() {
            return Err("storage key must not be empty".to_string());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EditorConfig::from_json("{}"), Ok(EditorConfig::default()));
    }

    #[test]
    fn partial_override() {
        let config =
            EditorConfig::from_json(r#"{"historyDepth": 50, "initialDevice": "mobile"}"#).unwrap();
        assert_eq!(config.history_depth, Some(50));
        assert_eq!(config.initial_device, Device::Mobile);
        assert_eq!(config.storage_key, "data");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EditorConfig::from_json(r#"{"storageKey": ""}"#).is_err());
        assert!(EditorConfig::from_json(r#"{"baseCanvas": {"width": 0, "height": 10}}"#).is_err());
        assert!(EditorConfig::from_json("[]").is_err());
    }
}
