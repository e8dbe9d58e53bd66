//! Engine Configuration
//!
//! Tunables for the ordering engine, loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::reindex::DEFAULT_MIN_GAP;

/// Ordering engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fractional remainder below which a committed key triggers a reindex
    pub reindex_min_gap: f64,
    /// Pointer movement in pixels before a press becomes a drag
    pub drag_threshold_px: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reindex_min_gap: DEFAULT_MIN_GAP,
            drag_threshold_px: task_dragdrop::DRAG_THRESHOLD_PX,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidInput(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> DomainResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Internal(format!("read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !(self.reindex_min_gap > 0.0 && self.reindex_min_gap < 1.0) {
            return Err(DomainError::InvalidInput(format!(
                "reindex_min_gap must be in (0, 1), got {}",
                self.reindex_min_gap
            )));
        }
        if self.drag_threshold_px < 0 {
            return Err(DomainError::InvalidInput(format!(
                "drag_threshold_px must not be negative, got {}",
                self.drag_threshold_px
            )));
        }
        Ok(())
    }
}
