//! MeshNode — an addressable, immutable wrapper around a MetricsRecord
//!
//! Mutations return a new node; the network commits it under its lock.

use crate::error::{QalxError, Result};
use crate::metrics::{MetricsRecord, ModulationVector, NodeState};
use crate::scoring::SecurityGate;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REVOKED_SUFFIX: &str = ":revoked";

/// First 8 characters of an identifier, for log lines
pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Fixed-width fingerprint: little-endian f64 coherence, phase, amplitude, base-64 encoded
pub fn generate_pattern(metrics: &MetricsRecord) -> String {
    let mut buf = Vec::with_capacity(24);
    buf.extend_from_slice(&metrics.coherence.to_le_bytes());
    buf.extend_from_slice(&metrics.phase.to_le_bytes());
    buf.extend_from_slice(&metrics.amplitude.to_le_bytes());
    STANDARD.encode(buf)
}

/// Check a fingerprint against prior patterns (case-insensitive) and a minimum length
pub fn validate_pattern<S: AsRef<str>>(pattern: &str, history: &[S], min_length: usize) -> Result<()> {
    let normalized = pattern.to_lowercase();
    if history
        .iter()
        .any(|p| p.as_ref().to_lowercase() == normalized)
    {
        return Err(QalxError::PatternNotUnique(pattern.to_string()));
    }
    let length = normalized.chars().count();
    if length < min_length {
        return Err(QalxError::PatternTooShort {
            length,
            minimum: min_length,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub id: String,
    pub metrics: MetricsRecord,
    pub pattern: String,
    pub coherence_history: Vec<f64>,
    pub state: NodeState,
    pub timestamp: i64,
}

impl MeshNode {
    /// Wrap a record into a fresh, active node
    pub fn new(metrics: MetricsRecord) -> Self {
        let id = Uuid::new_v4().to_string();
        let pattern = generate_pattern(&metrics);
        let mut coherence_history = metrics.coherence_history.clone();
        coherence_history.push(metrics.coherence);
        let timestamp = metrics.timestamp;
        let mut metrics = metrics;
        metrics.mesh_node_id = id.clone();
        metrics.state = NodeState::Active;
        Self {
            id,
            metrics,
            pattern,
            coherence_history,
            state: NodeState::Active,
            timestamp,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == NodeState::Active
    }

    pub fn is_revoked(&self) -> bool {
        self.state == NodeState::Revoked
    }

    /// The pattern as generated, without any revocation marker
    pub fn fingerprint(&self) -> &str {
        self.pattern
            .strip_suffix(REVOKED_SUFFIX)
            .unwrap_or(&self.pattern)
    }

    /// Record a new coherence sample and make it current
    pub fn with_coherence(&self, value: f64) -> Self {
        let mut next = self.clone();
        next.coherence_history.push(value);
        next.metrics.set_coherence(value);
        next
    }

    /// Fold a peer's coherence and validation score into this node
    pub fn with_propagated(&self, from: &MeshNode) -> Self {
        let mut next = self.clone();
        next.coherence_history.push(from.metrics.coherence);
        next.metrics.validation_score =
            (self.metrics.validation_score + from.metrics.validation_score) / 2.0;
        next
    }

    /// Terminal revocation; the pattern suffix is applied at most once
    pub fn revoked(&self) -> Self {
        let mut next = self.clone();
        next.state = NodeState::Revoked;
        next.metrics.state = NodeState::Revoked;
        if !next.pattern.ends_with(REVOKED_SUFFIX) {
            next.pattern.push_str(REVOKED_SUFFIX);
        }
        next
    }

    /// Coherence, lifecycle and security-gate checks; the first failure is reported
    pub fn validate(
        &self,
        resonance: f64,
        vector: &ModulationVector,
        mesh_score: f64,
        gate: &SecurityGate,
    ) -> Result<()> {
        if self.metrics.coherence < gate.min_coherence() {
            return Err(QalxError::CoherenceTooLow {
                node_id: self.id.clone(),
                coherence: self.metrics.coherence,
                minimum: gate.min_coherence(),
            });
        }
        if !self.is_active() {
            return Err(QalxError::NodeNotActive {
                node_id: self.id.clone(),
                state: self.state,
            });
        }
        if !gate.validate(&self.metrics, resonance, vector, mesh_score) {
            return Err(QalxError::SecurityGateFailed {
                node_id: self.id.clone(),
            });
        }
        Ok(())
    }
}
