//! Harmonic generator
//!
//! Pure functions of a [`ModulationVector`] and the golden ratio.

use super::ModulationVector;
use std::f64::consts::PI;

/// Golden ratio φ = (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;

/// Tag-specific multipliers; unknown tags use 1.0
const TAG_MULTIPLIERS: &[(&str, f64)] = &[
    ("trust", 1.0),
    ("joy", 1.1),
    ("clarity", 1.05),
    ("resilience", 1.15),
    ("calm", 0.95),
    ("fear", 0.8),
];

pub fn tag_multiplier(tag: &str) -> f64 {
    TAG_MULTIPLIERS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// Three vector-driven harmonics: scaled base, sinusoidal perturbation, squared blend
pub fn harmonics(vector: &ModulationVector) -> Vec<f64> {
    let base = vector.intensity * vector.ethics_score * tag_multiplier(&vector.tag);
    let angle = (vector.timestamp % 360) as f64 * PI / 180.0;
    vec![
        base * PHI,
        base + angle.sin(),
        (base * PHI + vector.ethics_score).powi(2),
    ]
}

/// Context-free harmonics: 1, φ, φ², φ³
pub fn base_harmonics() -> Vec<f64> {
    vec![1.0, PHI, PHI.powi(2), PHI.powi(3)]
}
