//! ModulationVector — the tagged, weighted input that biases derivation and scoring
//!
//! Intensity and ethics score are conceptually in [0, 1] but are not clamped;
//! out-of-range values flow through the arithmetic downstream.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An immutable modulation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulationVector {
    /// Free-form tag, e.g. "trust"
    pub tag: String,
    pub intensity: f64,
    pub ethics_score: f64,
    /// Unix epoch seconds
    pub timestamp: i64,
}

impl ModulationVector {
    pub fn new(tag: impl Into<String>, intensity: f64, ethics_score: f64, timestamp: i64) -> Self {
        Self {
            tag: tag.into(),
            intensity,
            ethics_score,
            timestamp,
        }
    }

    /// Build a vector stamped with the current wall-clock time
    pub fn now(tag: impl Into<String>, intensity: f64, ethics_score: f64) -> Self {
        Self::new(tag, intensity, ethics_score, Utc::now().timestamp())
    }

    /// The full-strength "trust" vector used when re-validating mesh nodes
    pub fn trust(timestamp: i64) -> Self {
        Self::new("trust", 1.0, 1.0, timestamp)
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }
}

/// Outcome of checking a vector against a [`TagValidator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagVerdict {
    pub allowed: bool,
    pub reason: String,
}

impl TagVerdict {
    fn allow(reason: &str) -> Self {
        Self {
            allowed: true,
            reason: reason.to_string(),
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
        }
    }
}

/// Admission filter for modulation vectors: minimum intensity plus a tag whitelist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagValidator {
    pub min_intensity: f64,
    pub allowed_tags: Vec<String>,
}

impl Default for TagValidator {
    fn default() -> Self {
        Self {
            min_intensity: 0.5,
            allowed_tags: vec!["trust".into(), "clarity".into(), "resilience".into()],
        }
    }
}

impl TagValidator {
    pub fn validate(&self, vector: &ModulationVector) -> TagVerdict {
        if vector.intensity < self.min_intensity {
            return TagVerdict::deny("Intensity too low");
        }
        if !self.allowed_tags.iter().any(|t| *t == vector.tag) {
            return TagVerdict::deny("Tag not allowed");
        }
        TagVerdict::allow("Valid")
    }

    /// An action is allowed when at least one of the supplied vectors is
    pub fn validate_action(&self, action: &str, vectors: &[ModulationVector]) -> TagVerdict {
        if vectors.iter().any(|v| self.validate(v).allowed) {
            log::debug!("Action '{}' allowed by modulation vector", action);
            TagVerdict::allow("Action allowed by modulation vector")
        } else {
            TagVerdict::deny("No valid modulation vectors for action")
        }
    }
}
