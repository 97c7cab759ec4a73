//! SecurityGate — tag-conditioned resonance/composite thresholds plus a QRE floor
//!
//! A vector passes only if resonance clears the policy's resonance floor and
//! both the composite product and the QRE score clear their floors.

use super::policy::{PolicyTable, ThresholdPolicy};
use super::qre::compute_qre;
use crate::config::QalxConfig;
use crate::metrics::{MetricsRecord, ModulationVector};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Everything the gate computed for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    pub tag: String,
    /// Whether the edge relaxation of the tag's policy applied
    pub edge: bool,
    pub resonance_threshold: f64,
    pub composite_threshold: f64,
    /// Ethics score after the policy boost
    pub ethics_score: f64,
    pub drift_compensation: f64,
    pub volatility_bonus: f64,
    /// None when resonance failed before the composite was computed
    pub composite: Option<f64>,
    pub qre: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone)]
pub struct SecurityGate {
    policies: PolicyTable,
    qre_floor: f64,
    min_coherence: f64,
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::from_config(&QalxConfig::default())
    }
}

impl SecurityGate {
    pub fn from_config(config: &QalxConfig) -> Self {
        Self::with_policies(PolicyTable::from_config(config), config)
    }

    pub fn with_policies(policies: PolicyTable, config: &QalxConfig) -> Self {
        Self {
            policies,
            qre_floor: config.qre_floor,
            min_coherence: config.min_coherence,
        }
    }

    pub fn min_coherence(&self) -> f64 {
        self.min_coherence
    }

    pub fn validate(
        &self,
        metrics: &MetricsRecord,
        resonance: f64,
        vector: &ModulationVector,
        mesh_score: f64,
    ) -> bool {
        self.evaluate(metrics, resonance, vector, mesh_score).passed
    }

    pub fn evaluate(
        &self,
        metrics: &MetricsRecord,
        resonance: f64,
        vector: &ModulationVector,
        mesh_score: f64,
    ) -> GateReport {
        let policy: &ThresholdPolicy = self.policies.lookup(&vector.tag);
        let mut adjusted = vector.clone();

        let edge = policy.edge.as_ref().filter(|e| {
            vector.intensity < e.intensity_below && metrics.coherence < e.coherence_below
        });

        let (resonance_threshold, composite_threshold, drift_compensation, volatility_bonus) =
            match edge {
                Some(e) => {
                    adjusted.ethics_score += e.ethics_boost * mesh_score;
                    let t = vector.timestamp;
                    let drift = 1.0 + e.drift_rate * ((t % 1000) as f64).abs() / 1000.0;
                    let volatility =
                        e.volatility_weight * ((t % 360) as f64 * PI / 180.0).sin().abs();
                    (e.resonance_threshold, e.composite_threshold, drift, volatility)
                }
                None => {
                    adjusted.ethics_score += policy.ethics_boost * mesh_score;
                    (policy.resonance_threshold, policy.composite_threshold, 1.0, 0.0)
                }
            };

        let mut report = GateReport {
            tag: vector.tag.clone(),
            edge: edge.is_some(),
            resonance_threshold,
            composite_threshold,
            ethics_score: adjusted.ethics_score,
            drift_compensation,
            volatility_bonus,
            composite: None,
            qre: None,
            passed: false,
        };

        if resonance < resonance_threshold {
            log::debug!(
                "Gate rejected tag '{}': resonance {:.3} < {:.3}",
                vector.tag,
                resonance,
                resonance_threshold
            );
            return report;
        }

        let composite = metrics.coherence
            * resonance
            * adjusted.ethics_score
            * mesh_score
            * drift_compensation
            + volatility_bonus;
        let qre = compute_qre(metrics, &adjusted, mesh_score, resonance);
        report.composite = Some(composite);
        report.qre = Some(qre);
        report.passed = composite > composite_threshold && qre > self.qre_floor;

        log::debug!(
            "Gate tag='{}' edge={} composite={:.4} (>{:.2}) qre={:.4} (>{:.2}) passed={}",
            vector.tag,
            report.edge,
            composite,
            composite_threshold,
            qre,
            self.qre_floor,
            report.passed
        );
        report
    }
}
