//! Tunable parameters for derivation, scoring and mesh validation
//!
//! Defaults match the production constants; a JSON file can override any
//! subset of them.

use crate::error::{QalxError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV: &str = "QALX_CONFIG";

/// Configuration shared by the derivation engine, the security gate and the mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QalxConfig {
    /// Coherence below this blocks key derivation and node validation
    pub min_coherence: f64,
    /// Size in bytes of the freshly seeded entropy pool
    pub entropy_pool_size: usize,
    /// Minimum length of a normalized pattern fingerprint
    pub min_pattern_length: usize,
    /// Mesh score used where no measured score is available
    pub default_mesh_score: f64,
    /// Resonance floor for tags without a dedicated policy
    pub resonance_threshold: f64,
    /// Composite floor for tags without a dedicated policy
    pub composite_threshold: f64,
    /// Absolute QRE floor the gate enforces for every tag
    pub qre_floor: f64,
}

impl Default for QalxConfig {
    fn default() -> Self {
        Self {
            min_coherence: 0.85,
            entropy_pool_size: 1024,
            min_pattern_length: 8,
            default_mesh_score: 1.0,
            resonance_threshold: 0.5,
            composite_threshold: 0.5,
            qre_floor: 2.0,
        }
    }
}

impl QalxConfig {
    /// Load a config from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| QalxError::Config(format!("{}: {}", path.display(), e)))?;
        let config: QalxConfig = serde_json::from_str(&data)
            .map_err(|e| QalxError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the file named by `QALX_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.entropy_pool_size == 0 {
            return Err(QalxError::Config("entropy_pool_size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.min_coherence) {
            return Err(QalxError::Config(format!(
                "min_coherence must lie in [0, 1], got {}",
                self.min_coherence
            )));
        }
        if self.min_pattern_length == 0 {
            return Err(QalxError::Config("min_pattern_length must be positive".into()));
        }
        Ok(())
    }
}
