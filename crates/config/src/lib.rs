//! Shared configuration for freeform sculpting
//!
//! This crate is the single source of truth for the tunables of the carve
//! pipeline and the undo history. Values are plain data with serde support so
//! a host application can load them from JSON.

use serde::{Deserialize, Serialize};

/// Default number of subdivide/relax/smooth passes per carve
pub const DEFAULT_PASSES: u32 = 1;

/// Edges longer than `detail * DEFAULT_SPLIT_RATIO` are subdivided
pub const DEFAULT_SPLIT_RATIO: f32 = 4.0 / 3.0;

/// Weight of the tangential Laplacian step
pub const DEFAULT_SMOOTH_FACTOR: f32 = 0.5;

/// Vertices at or above this subdivision level are not split again
pub const DEFAULT_MAX_LEVEL: u32 = 16;

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Refinement settings for one carve invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveConfig {
    /// Number of subdivide/relax/smooth passes per carve
    pub passes: u32,
    /// Split threshold as a multiple of the brush detail length
    pub split_ratio: f32,
    /// Whether edges are flipped to improve triangle quality after splitting
    pub relax_enabled: bool,
    /// Whether the working set is smoothed after relaxing
    pub smooth_enabled: bool,
    /// Weight of the tangential smoothing step (0.0 - 1.0)
    pub smooth_factor: f32,
    /// Whether vertices are displaced along the averaged normal before refining
    pub displacement_enabled: bool,
    /// Maximum subdivision level a vertex may reach
    pub max_level: u32,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            split_ratio: DEFAULT_SPLIT_RATIO,
            relax_enabled: true,
            smooth_enabled: true,
            smooth_factor: DEFAULT_SMOOTH_FACTOR,
            displacement_enabled: false,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl CarveConfig {
    /// Squared maximum edge length for a brush with the given detail.
    pub fn max_edge_length_sqr(&self, detail: f32) -> f32 {
        let max_length = self.split_ratio * detail;
        max_length * max_length
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passes == 0 {
            return Err(ConfigError::Invalid {
                field: "passes",
                reason: "at least one pass is required".to_string(),
            });
        }
        if !(self.split_ratio.is_finite() && self.split_ratio > 0.0) {
            return Err(ConfigError::Invalid {
                field: "split_ratio",
                reason: format!("must be positive, got {}", self.split_ratio),
            });
        }
        if !(0.0..=1.0).contains(&self.smooth_factor) {
            return Err(ConfigError::Invalid {
                field: "smooth_factor",
                reason: format!("must be within 0.0..=1.0, got {}", self.smooth_factor),
            });
        }
        Ok(())
    }
}

/// Undo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undoable action units (oldest are dropped)
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Top-level sculpting configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptConfig {
    pub carve: CarveConfig,
    pub history: HistoryConfig,
}

impl SculptConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.carve.validate()?;
        if self.history.limit == 0 {
            return Err(ConfigError::Invalid {
                field: "history.limit",
                reason: "must keep at least one undo step".to_string(),
            });
        }
        Ok(())
    }
}
