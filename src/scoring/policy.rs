//! Tag-conditioned threshold policies
//!
//! Each modulation tag maps to a [`ThresholdPolicy`]; tags without an entry
//! use the default policy. Adding a tag is a table insert.

use crate::config::QalxConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relaxation applied when a vector and record are both below the edge bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAdjustment {
    /// Edge applies when intensity is strictly below this
    pub intensity_below: f64,
    /// ...and coherence is strictly below this
    pub coherence_below: f64,
    pub resonance_threshold: f64,
    pub composite_threshold: f64,
    /// Ethics boost per unit of mesh score
    pub ethics_boost: f64,
    /// Composite is multiplied by 1 + drift_rate * |t mod 1000| / 1000
    pub drift_rate: f64,
    /// Composite gains volatility_weight * |sin((t mod 360)°)|
    pub volatility_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub resonance_threshold: f64,
    pub composite_threshold: f64,
    /// Ethics boost per unit of mesh score
    pub ethics_boost: f64,
    pub edge: Option<EdgeAdjustment>,
}

impl ThresholdPolicy {
    pub fn fixed(resonance_threshold: f64, composite_threshold: f64) -> Self {
        Self {
            resonance_threshold,
            composite_threshold,
            ethics_boost: 0.0,
            edge: None,
        }
    }

    /// The built-in policy for the "trust" tag
    pub fn trust() -> Self {
        Self {
            resonance_threshold: 0.4,
            composite_threshold: 0.45,
            ethics_boost: 0.01,
            edge: Some(EdgeAdjustment {
                intensity_below: 0.90,
                coherence_below: 0.90,
                resonance_threshold: 0.35,
                composite_threshold: 0.40,
                ethics_boost: 0.02,
                drift_rate: 0.01,
                volatility_weight: 0.02,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyTable {
    default: ThresholdPolicy,
    by_tag: HashMap<String, ThresholdPolicy>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::from_config(&QalxConfig::default())
    }
}

impl PolicyTable {
    pub fn from_config(config: &QalxConfig) -> Self {
        let mut table = Self {
            default: ThresholdPolicy::fixed(config.resonance_threshold, config.composite_threshold),
            by_tag: HashMap::new(),
        };
        table.insert("trust", ThresholdPolicy::trust());
        table
    }

    pub fn insert(&mut self, tag: impl Into<String>, policy: ThresholdPolicy) {
        self.by_tag.insert(tag.into(), policy);
    }

    pub fn lookup(&self, tag: &str) -> &ThresholdPolicy {
        self.by_tag.get(tag).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_to_default() {
        let table = PolicyTable::default();
        let p = table.lookup("joy");
        assert_eq!(p.resonance_threshold, 0.5);
        assert_eq!(p.composite_threshold, 0.5);
        assert!(p.edge.is_none());
        assert_eq!(table.lookup("trust"), &ThresholdPolicy::trust());
    }

    #[test]
    fn test_default_follows_config() {
        let config = QalxConfig {
            resonance_threshold: 0.6,
            composite_threshold: 0.7,
            ..QalxConfig::default()
        };
        let table = PolicyTable::from_config(&config);
        assert_eq!(table.lookup("joy"), &ThresholdPolicy::fixed(0.6, 0.7));
    }

    #[test]
    fn test_new_tags_are_additive() {
        let mut table = PolicyTable::default();
        table.insert("clarity", ThresholdPolicy::fixed(0.3, 0.3));
        assert_eq!(table.lookup("clarity").resonance_threshold, 0.3);
        assert_eq!(table.lookup("trust"), &ThresholdPolicy::trust());
    }
}
