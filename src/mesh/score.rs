//! Mesh score — a weighted blend of six operational sub-metrics

use crate::scoring::normalize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshMetrics {
    /// Mean trust weight across peers, [0, 1]
    pub avg_trust_weight: f64,
    /// [0, 100]
    pub uptime_percent: f64,
    /// [0, 10]; higher is worse
    pub path_variance: f64,
    /// [0, 1]
    pub glyph_coherence: f64,
    /// Fraction of QRE validations passing, [0, 1]
    pub qre_validation_rate: f64,
    /// Seconds, [0, 10]; higher is worse
    pub reconfig_time: f64,
}

impl Default for MeshMetrics {
    fn default() -> Self {
        Self {
            avg_trust_weight: 0.9,
            uptime_percent: 99.0,
            path_variance: 2.0,
            glyph_coherence: 0.95,
            qre_validation_rate: 0.98,
            reconfig_time: 1.2,
        }
    }
}

impl MeshMetrics {
    pub fn score(&self) -> f64 {
        let trust = normalize(self.avg_trust_weight, 0.0, 1.0);
        let vitality = normalize(self.uptime_percent, 0.0, 100.0);
        let resilience = 1.0 - normalize(self.path_variance, 0.0, 10.0);
        let harmony = normalize(self.glyph_coherence, 0.0, 1.0);
        let resistance = normalize(self.qre_validation_rate, 0.0, 1.0);
        let adaptability = normalize(self.reconfig_time, 0.0, 10.0);

        0.2 * trust
            + 0.2 * vitality
            + 0.2 * resilience
            + 0.2 * harmony
            + 0.1 * resistance
            + 0.1 * (1.0 - adaptability)
    }
}
