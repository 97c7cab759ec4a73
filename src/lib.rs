//! QALX — entropy-mixing key derivation, composite resistance scoring and
//! trust-state propagation across an in-memory mesh of nodes.
//!
//! - metrics: measurement records, modulation vectors, harmonics
//! - entropy: the shared entropy pool and key derivation engine
//! - scoring: the QRE score and the tag-conditioned security gate
//! - mesh: nodes, the mesh network, revocation and pattern history

pub mod config;
pub mod entropy;
pub mod error;
pub mod mesh;
pub mod metrics;
pub mod scoring;

pub use config::QalxConfig;
pub use entropy::{sign, EntropyPool, KeyDerivationEngine};
pub use error::{QalxError, Result};
pub use mesh::{MeshMetrics, MeshNetwork, MeshNode};
pub use metrics::{MetricsRecord, ModulationVector, NodeState};
pub use scoring::{compute_qre, GateReport, SecurityGate};
