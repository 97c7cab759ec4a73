//! Error taxonomy for QALX
//!
//! Every failure is returned to the caller as a value. Nothing is retried
//! internally; retry policy belongs to the caller.

use crate::metrics::NodeState;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QalxError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QalxError {
    #[error("Insufficient coherence for key derivation: {coherence:.3} < {minimum:.3}")]
    InsufficientCoherence { coherence: f64, minimum: f64 },

    #[error("Mesh node {node_id} coherence below threshold: {coherence:.3} < {minimum:.3}")]
    CoherenceTooLow {
        node_id: String,
        coherence: f64,
        minimum: f64,
    },

    #[error("Mesh node {node_id} is not active (state={state})")]
    NodeNotActive { node_id: String, state: NodeState },

    #[error("Security gate rejected mesh node {node_id}")]
    SecurityGateFailed { node_id: String },

    #[error("Pattern is not unique in mesh history: {0}")]
    PatternNotUnique(String),

    #[error("Pattern too short: {length} < {minimum}")]
    PatternTooShort { length: usize, minimum: usize },

    #[error("Node not found in mesh network: {0}")]
    NodeNotFound(String),

    #[error("Failed to seed entropy pool: {0}")]
    EntropySeed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = QalxError::InsufficientCoherence {
            coherence: 0.5,
            minimum: 0.85,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient coherence for key derivation: 0.500 < 0.850"
        );

        let err = QalxError::NodeNotActive {
            node_id: "abc".into(),
            state: NodeState::Revoked,
        };
        assert!(err.to_string().contains("state=revoked"));
    }
}
