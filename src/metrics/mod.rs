//! Metrics model — measurement records, modulation inputs and harmonics
//!
//! - MetricsRecord: the measurement state a node or derivation works from
//! - ModulationVector: tagged, weighted input biasing derivation and scoring
//! - harmonics: deterministic φ-based harmonic series

mod harmonics;
mod modulation;
mod record;

pub use harmonics::{base_harmonics, harmonics, tag_multiplier, PHI};
pub use modulation::{ModulationVector, TagValidator, TagVerdict};
pub use record::{KeyProfile, MetricsRecord, NodeState};
