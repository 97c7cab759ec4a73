//! Mesh — addressable nodes, trust-state propagation and pattern history
//!
//! Nodes are values: every mutation yields a new node which the network
//! commits under its lock. Revocation is terminal and never deletes a node.

mod memory;
mod network;
mod node;
mod score;

pub use crate::metrics::NodeState;
pub use memory::ValidationMemory;
pub use network::MeshNetwork;
pub use node::{generate_pattern, validate_pattern, MeshNode, REVOKED_SUFFIX};
pub use score::MeshMetrics;
