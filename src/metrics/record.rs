//! MetricsRecord — a measurement state shared by derivation, scoring and the mesh
//!
//! Invariant: the last element of `coherence_history` equals `coherence` after
//! any mutation made through this type's methods.

use super::harmonics::harmonics;
use super::ModulationVector;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a record or mesh node. `Revoked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Active,
    Revoked,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Active => "active",
            NodeState::Revoked => "revoked",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key sizing profile used when initialising a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyProfile {
    /// 32-byte keys
    Standard,
    /// 4096-byte keys
    HighSecurity,
}

impl KeyProfile {
    pub fn key_length(&self) -> usize {
        match self {
            KeyProfile::Standard => 32,
            KeyProfile::HighSecurity => 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Signal quality, nominally in [0, 1]
    pub coherence: f64,
    /// Radians
    pub phase: f64,
    pub amplitude: f64,
    pub harmonics: Vec<f64>,
    pub entropy_score: f64,
    pub entropy_quality: f64,
    pub entropy_level: u32,
    pub coherence_threshold: f64,
    pub resistance: f64,
    pub strength: f64,
    pub phase_shift: f64,
    pub key_strength: u32,
    pub key_length: usize,
    pub signature: String,
    pub pattern: String,
    pub mesh_node_id: String,
    pub coherence_history: Vec<f64>,
    pub validation_score: f64,
    pub state: NodeState,
    /// Unix epoch seconds
    pub timestamp: i64,
}

impl MetricsRecord {
    /// The healthy default record for a modulation vector
    pub fn with_vector(vector: &ModulationVector) -> Self {
        Self::with_profile(vector, KeyProfile::HighSecurity)
    }

    pub fn with_profile(vector: &ModulationVector, profile: KeyProfile) -> Self {
        let coherence = 0.99;
        Self {
            coherence,
            phase: PI / 2.0,
            amplitude: 1.0,
            harmonics: harmonics(vector),
            entropy_score: 0.98,
            entropy_quality: 0.99,
            entropy_level: 10,
            coherence_threshold: 0.90,
            resistance: 0.95,
            strength: 0.95,
            phase_shift: PI / 4.0,
            key_strength: 256,
            key_length: profile.key_length(),
            signature: Uuid::new_v4().to_string(),
            pattern: "default-pattern".to_string(),
            mesh_node_id: Uuid::new_v4().to_string(),
            coherence_history: vec![coherence],
            validation_score: 1.0,
            state: NodeState::Active,
            timestamp: vector.timestamp,
        }
    }

    /// Set coherence and record it in the history
    pub fn set_coherence(&mut self, value: f64) {
        self.coherence = value;
        self.coherence_history.push(value);
    }

    /// Apply a modulation vector, returning the modulated record
    pub fn modulate(&self, vector: &ModulationVector) -> Self {
        let mut next = self.clone();
        next.entropy_quality *= vector.intensity;
        next.resistance += vector.ethics_score * 0.01;
        next.set_coherence(self.coherence + vector.intensity * 0.01);
        next.validation_score += vector.ethics_score * 0.05;
        next.timestamp = vector.timestamp;
        next.pattern = format!("{}:{}", self.pattern, vector.tag);
        next
    }

    /// Advance the record to a new timestamp, shifting phase and entropy
    pub fn evolve(&self, timestamp: i64) -> Self {
        let shift = (timestamp % 360) as f64 * (PI / 180.0);
        let mut next = self.clone();
        next.phase += shift;
        next.timestamp = timestamp;
        next.entropy_score *= 1.0 + (shift / PI * 0.01);
        next.pattern = format!("{}:t{}", self.pattern, timestamp);
        next
    }

    pub fn summary(&self) -> String {
        format!(
            "MetricsRecord | coherence={:.3} | phase={:.3} | amplitude={:.3} | harmonics={} | key_length={} | state={}",
            self.coherence,
            self.phase,
            self.amplitude,
            self.harmonics.len(),
            self.key_length,
            self.state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trust() -> ModulationVector {
        ModulationVector::trust(1_234_567_890)
    }

    #[test]
    fn test_default_record() {
        let m = MetricsRecord::with_vector(&trust());
        assert_eq!(m.coherence, 0.99);
        assert_eq!(m.harmonics.len(), 3);
        assert_eq!(m.key_length, 4096);
        assert_eq!(m.state, NodeState::Active);
        assert_eq!(m.timestamp, 1_234_567_890);
        assert_eq!(m.coherence_history.last(), Some(&m.coherence));
        assert_ne!(m.signature, m.mesh_node_id);
    }

    #[test]
    fn test_standard_profile() {
        let m = MetricsRecord::with_profile(&trust(), KeyProfile::Standard);
        assert_eq!(m.key_length, 32);
    }

    #[test]
    fn test_modulate_keeps_history_invariant() {
        let m = MetricsRecord::with_vector(&trust());
        let v = ModulationVector::new("joy", 0.5, 0.8, 99);
        let next = m.modulate(&v);
        assert!((next.coherence - 0.995).abs() < 1e-12);
        assert_eq!(next.coherence_history.len(), 2);
        assert_eq!(next.coherence_history.last(), Some(&next.coherence));
        assert!((next.entropy_quality - 0.495).abs() < 1e-12);
        assert!((next.validation_score - 1.04).abs() < 1e-12);
        assert_eq!(next.timestamp, 99);
        assert_eq!(next.pattern, "default-pattern:joy");
        // the source record is untouched
        assert_eq!(m.coherence, 0.99);
    }

    #[test]
    fn test_evolve() {
        let m = MetricsRecord::with_vector(&trust());
        let next = m.evolve(180);
        assert!((next.phase - (m.phase + PI)).abs() < 1e-12);
        assert!((next.entropy_score - m.entropy_score * 1.01).abs() < 1e-12);
        assert_eq!(next.timestamp, 180);
        assert_eq!(next.pattern, "default-pattern:t180");
        assert_eq!(next.coherence_history, m.coherence_history);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&NodeState::Revoked).unwrap();
        assert_eq!(json, "\"revoked\"");
        assert_eq!(NodeState::Active.to_string(), "active");
    }
}
