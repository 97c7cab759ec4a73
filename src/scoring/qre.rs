//! QRE — the composite resistance score
//!
//! Five factors, each clamped into [0.1, 1.0], summed and log-scaled:
//! score = log2(sum + 1), so the score lies in [log2(1.5), log2(6)] ≈ [0.58, 2.58].

use crate::metrics::{MetricsRecord, ModulationVector, PHI};

/// Clamp `(x - min) / (max - min)` into [0.1, 1.0]; NaN stays NaN
pub fn normalize(x: f64, min: f64, max: f64) -> f64 {
    ((x - min) / (max - min)).clamp(0.1, 1.0)
}

/// The individual normalized factors behind a QRE score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QreFactors {
    pub entropy_spread: f64,
    pub period_obfuscation: f64,
    pub hybrid_distortion: f64,
    pub modulation: f64,
    pub weighted_resonance: f64,
}

impl QreFactors {
    pub fn compute(
        metrics: &MetricsRecord,
        vector: &ModulationVector,
        mesh_score: f64,
        resonance: f64,
    ) -> Self {
        Self {
            entropy_spread: normalize(metrics.entropy_score * metrics.entropy_quality, 0.1, 1.0),
            period_obfuscation: normalize((metrics.phase_shift * PHI).sin().abs(), 0.1, 1.0),
            hybrid_distortion: normalize((metrics.phase * PHI).sin().abs(), 0.1, 1.0),
            modulation: normalize(vector.intensity * vector.ethics_score * mesh_score, 0.1, 1.0),
            weighted_resonance: normalize(1.0 / (1.0 + resonance), 0.1, 1.0),
        }
    }

    pub fn sum(&self) -> f64 {
        self.entropy_spread
            + self.period_obfuscation
            + self.hybrid_distortion
            + self.modulation
            + self.weighted_resonance
    }

    pub fn score(&self) -> f64 {
        (self.sum() + 1.0).log2()
    }
}

pub fn compute_qre(
    metrics: &MetricsRecord,
    vector: &ModulationVector,
    mesh_score: f64,
    resonance: f64,
) -> f64 {
    QreFactors::compute(metrics, vector, mesh_score, resonance).score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> (MetricsRecord, ModulationVector) {
        let v = ModulationVector::trust(1_234_567_890);
        (MetricsRecord::with_vector(&v), v)
    }

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(0.0, 0.1, 1.0), 0.1);
        assert_eq!(normalize(5.0, 0.1, 1.0), 1.0);
        assert!((normalize(0.55, 0.1, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(normalize(-3.0, 0.1, 1.0), 0.1);
    }

    #[test]
    fn test_nan_is_not_masked() {
        assert!(normalize(f64::NAN, 0.1, 1.0).is_nan());
        let (mut m, v) = healthy();
        m.phase = f64::NAN;
        assert!(compute_qre(&m, &v, 1.0, 1.0).is_nan());
    }

    #[test]
    fn test_healthy_metrics_pass_baseline() {
        let (m, v) = healthy();
        let qre = compute_qre(&m, &v, 1.0, 1.0);
        assert!(qre >= 2.0, "QRE too low: {}", qre);
    }

    #[test]
    fn test_score_bounds() {
        let (mut m, v) = healthy();
        let high = compute_qre(&m, &v, 1.0, 0.0);
        assert!(high <= 6f64.log2() + 1e-12);

        m.entropy_score = 0.0;
        m.phase = 0.0;
        m.phase_shift = 0.0;
        let weak = ModulationVector::new("trust", 0.0, 0.0, 0);
        let low = compute_qre(&m, &weak, 1.0, 100.0);
        assert!((low - 1.5f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_modulation() {
        let (m, _) = healthy();
        let mut last = 0.0;
        for intensity in [0.1, 0.3, 0.5, 0.7, 0.9] {
            let v = ModulationVector::new("trust", intensity, 1.0, 0);
            let qre = compute_qre(&m, &v, 1.0, 1.0);
            assert!(qre >= last);
            last = qre;
        }
    }

    #[test]
    fn test_higher_resonance_lowers_score() {
        let (m, v) = healthy();
        assert!(compute_qre(&m, &v, 1.0, 0.2) > compute_qre(&m, &v, 1.0, 2.0));
    }
}
