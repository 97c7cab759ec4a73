//! MeshNetwork — the shared node map and its propagation rules
//!
//! All reads hand out snapshots; all writes go through one lock so no caller
//! can observe a node whose state and pattern came from different writers.
//! Nodes are never removed: revocation is a state transition.

use super::memory::ValidationMemory;
use super::node::{short_id, validate_pattern, MeshNode};
use super::score::MeshMetrics;
use crate::config::QalxConfig;
use crate::error::{QalxError, Result};
use crate::metrics::{MetricsRecord, ModulationVector};
use crate::scoring::SecurityGate;
use log::{info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct MeshState {
    nodes: HashMap<String, MeshNode>,
    memory: HashMap<String, ValidationMemory>,
}

pub struct MeshNetwork {
    state: RwLock<MeshState>,
    gate: SecurityGate,
    mesh_metrics: MeshMetrics,
    default_mesh_score: f64,
    min_pattern_length: usize,
}

impl Default for MeshNetwork {
    fn default() -> Self {
        Self::new(&QalxConfig::default())
    }
}

impl MeshNetwork {
    pub fn new(config: &QalxConfig) -> Self {
        Self {
            state: RwLock::new(MeshState::default()),
            gate: SecurityGate::from_config(config),
            mesh_metrics: MeshMetrics::default(),
            default_mesh_score: config.default_mesh_score,
            min_pattern_length: config.min_pattern_length,
        }
    }

    pub fn with_mesh_metrics(mut self, mesh_metrics: MeshMetrics) -> Self {
        self.mesh_metrics = mesh_metrics;
        self
    }

    /// Current blended mesh score
    pub fn mesh_score(&self) -> f64 {
        self.mesh_metrics.score()
    }

    /// Insert or overwrite a node by id
    pub fn add_node(&self, node: MeshNode) {
        info!("Added node {} to mesh", short_id(&node.id));
        self.state.write().nodes.insert(node.id.clone(), node);
    }

    /// Create a node from metrics and insert it if its pattern is unique in the mesh
    pub fn admit(&self, metrics: MetricsRecord) -> Result<MeshNode> {
        let node = MeshNode::new(metrics);
        let mut state = self.state.write();
        {
            let history: Vec<&str> = state.nodes.values().map(MeshNode::fingerprint).collect();
            validate_pattern(&node.pattern, &history, self.min_pattern_length)?;
        }
        state.nodes.insert(node.id.clone(), node.clone());
        info!("Admitted node {} with pattern {}", short_id(&node.id), node.pattern);
        Ok(node)
    }

    /// Snapshot of a node
    pub fn get(&self, id: &str) -> Option<MeshNode> {
        self.state.read().nodes.get(id).cloned()
    }

    /// Replace a node with `f(node)` under the lock, returning the committed value
    pub fn apply<F>(&self, id: &str, f: F) -> Result<MeshNode>
    where
        F: FnOnce(&MeshNode) -> MeshNode,
    {
        let mut state = self.state.write();
        let current = state
            .nodes
            .get(id)
            .ok_or_else(|| QalxError::NodeNotFound(id.to_string()))?;
        let mut next = f(current);
        next.id = id.to_string();
        state.nodes.insert(next.id.clone(), next.clone());
        Ok(next)
    }

    pub fn update_coherence(&self, id: &str, value: f64) -> Result<MeshNode> {
        self.apply(id, |node| node.with_coherence(value))
    }

    /// Push `from`'s coherence and validation score into `to`, then re-validate `to`
    pub fn propagate_metrics(&self, from_id: &str, to_id: &str) -> Result<()> {
        let mut state = self.state.write();
        let (from, to) = match (state.nodes.get(from_id), state.nodes.get(to_id)) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                warn!(
                    "Propagation {} -> {} references a missing node",
                    short_id(from_id),
                    short_id(to_id)
                );
                let missing = if state.nodes.contains_key(from_id) { to_id } else { from_id };
                return Err(QalxError::NodeNotFound(missing.to_string()));
            }
        };

        let updated = to.with_propagated(from);
        let result = self.revalidate(&updated);
        state.nodes.insert(updated.id.clone(), updated);
        state
            .memory
            .entry(to_id.to_string())
            .or_default()
            .record(result.is_ok());

        if let Err(e) = &result {
            warn!("Node {} failed re-validation after propagation: {}", short_id(to_id), e);
        }
        result
    }

    /// Validate every node with the default trust vector and blended mesh score
    pub fn validate_all_nodes(&self) -> HashMap<String, Result<()>> {
        let mut state = self.state.write();
        let results: HashMap<String, Result<()>> = state
            .nodes
            .iter()
            .map(|(id, node)| (id.clone(), self.revalidate(node)))
            .collect();
        for (id, result) in &results {
            state.memory.entry(id.clone()).or_default().record(result.is_ok());
        }
        results
    }

    /// Mark a node revoked. The reason is logged, not retained.
    pub fn revoke_node(&self, id: &str, reason: &str) -> Result<MeshNode> {
        let node = self.apply(id, MeshNode::revoked)?;
        info!("Revoked node {}: {}", short_id(id), reason);
        Ok(node)
    }

    /// Revoke every node except `id`; returns how many nodes were touched
    pub fn propagate_revocation(&self, id: &str) -> usize {
        let mut state = self.state.write();
        let mut count = 0;
        for (node_id, node) in state.nodes.iter_mut() {
            if node_id != id {
                *node = node.revoked();
                count += 1;
            }
        }
        info!("Propagated revocation from {} to {} nodes", short_id(id), count);
        count
    }

    pub fn validation_memory(&self, id: &str) -> Option<ValidationMemory> {
        self.state.read().memory.get(id).cloned()
    }

    /// Fingerprints of every node ever added, revoked ones included
    pub fn pattern_history(&self) -> Vec<String> {
        self.state
            .read()
            .nodes
            .values()
            .map(|n| n.fingerprint().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> String {
        let state = self.state.read();
        let active = state.nodes.values().filter(|n| n.is_active()).count();
        format!(
            "MeshNetwork | {} nodes | {} active | {} revoked | mesh score {:.3}",
            state.nodes.len(),
            active,
            state.nodes.len() - active,
            self.mesh_score()
        )
    }

    fn revalidate(&self, node: &MeshNode) -> Result<()> {
        let vector = ModulationVector::trust(node.timestamp);
        node.validate(self.default_mesh_score, &vector, self.mesh_score(), &self.gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::REVOKED_SUFFIX;
    use crate::metrics::NodeState;
    use std::sync::Arc;

    fn make_node() -> MeshNode {
        MeshNode::new(MetricsRecord::with_vector(&ModulationVector::trust(1_234_567_890)))
    }

    fn network_with(n: usize) -> (MeshNetwork, Vec<String>) {
        let net = MeshNetwork::default();
        let ids = (0..n)
            .map(|_| {
                let node = make_node();
                let id = node.id.clone();
                net.add_node(node);
                id
            })
            .collect();
        (net, ids)
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let net = MeshNetwork::default();
        let node = make_node();
        net.add_node(node.clone());
        net.add_node(node.clone());
        assert_eq!(net.len(), 1);
        assert_eq!(net.get(&node.id), Some(node));
    }

    #[test]
    fn test_revoke_node_twice() {
        let (net, ids) = network_with(1);
        net.revoke_node(&ids[0], "test reason").unwrap();
        net.revoke_node(&ids[0], "test reason").unwrap();
        let node = net.get(&ids[0]).unwrap();
        assert_eq!(node.state, NodeState::Revoked);
        assert_eq!(node.pattern.matches(REVOKED_SUFFIX).count(), 1);
        assert!(matches!(
            net.revoke_node("missing", "x"),
            Err(QalxError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_propagate_metrics() {
        let (net, ids) = network_with(2);
        net.apply(&ids[0], |n| {
            let mut next = n.with_coherence(0.95);
            next.metrics.validation_score = 0.5;
            next
        })
        .unwrap();
        let before = net.get(&ids[1]).unwrap();

        assert_eq!(net.propagate_metrics(&ids[0], &ids[1]), Ok(()));

        let after = net.get(&ids[1]).unwrap();
        assert_eq!(after.coherence_history.len(), before.coherence_history.len() + 1);
        assert_eq!(after.coherence_history.last(), Some(&0.95));
        assert!((after.metrics.validation_score - 0.75).abs() < 1e-12);
        assert_eq!(net.validation_memory(&ids[1]).unwrap().history, vec![true]);
    }

    #[test]
    fn test_propagate_revalidates_destination() {
        let (net, ids) = network_with(2);
        net.revoke_node(&ids[1], "compromised").unwrap();
        let err = net.propagate_metrics(&ids[0], &ids[1]).unwrap_err();
        assert!(matches!(err, QalxError::NodeNotActive { .. }));
        // the history update is still committed
        assert_eq!(net.get(&ids[1]).unwrap().coherence_history.len(), 3);
        assert_eq!(net.validation_memory(&ids[1]).unwrap().history, vec![false]);
    }

    #[test]
    fn test_propagate_missing_node() {
        let (net, ids) = network_with(1);
        assert_eq!(
            net.propagate_metrics("ghost", &ids[0]),
            Err(QalxError::NodeNotFound("ghost".into()))
        );
        assert_eq!(
            net.propagate_metrics(&ids[0], "ghost"),
            Err(QalxError::NodeNotFound("ghost".into()))
        );
    }

    #[test]
    fn test_validate_all_nodes() {
        let (net, ids) = network_with(3);
        net.update_coherence(&ids[2], 0.6).unwrap();
        let results = net.validate_all_nodes();
        assert_eq!(results.len(), 3);
        assert_eq!(results[&ids[0]], Ok(()));
        assert_eq!(results[&ids[1]], Ok(()));
        assert!(matches!(results[&ids[2]], Err(QalxError::CoherenceTooLow { .. })));

        net.validate_all_nodes();
        assert!(net.validation_memory(&ids[0]).unwrap().improving());
        assert!(!net.validation_memory(&ids[2]).unwrap().improving());
    }

    #[test]
    fn test_propagate_revocation_spares_origin() {
        let (net, ids) = network_with(4);
        net.revoke_node(&ids[1], "early").unwrap();
        assert_eq!(net.propagate_revocation(&ids[0]), 3);
        assert!(net.get(&ids[0]).unwrap().is_active());
        for id in &ids[1..] {
            let node = net.get(id).unwrap();
            assert!(node.is_revoked());
            assert_eq!(node.pattern.matches(REVOKED_SUFFIX).count(), 1);
        }
        assert_eq!(net.len(), 4, "revocation never removes nodes");
    }

    #[test]
    fn test_admit_rejects_replayed_pattern() {
        let net = MeshNetwork::default();
        let metrics = MetricsRecord::with_vector(&ModulationVector::trust(0));
        net.admit(metrics.clone()).unwrap();
        assert!(matches!(
            net.admit(metrics.clone()),
            Err(QalxError::PatternNotUnique(_))
        ));

        let mut fresh = metrics;
        fresh.amplitude = 0.75;
        assert!(net.admit(fresh).is_ok());
        assert_eq!(net.len(), 2);
        assert_eq!(net.pattern_history().len(), 2);
    }

    #[test]
    fn test_revoked_fingerprint_cannot_return() {
        let net = MeshNetwork::default();
        let metrics = MetricsRecord::with_vector(&ModulationVector::trust(0));
        let node = net.admit(metrics.clone()).unwrap();
        net.revoke_node(&node.id, "compromised").unwrap();

        assert_eq!(
            net.admit(metrics),
            Err(QalxError::PatternNotUnique(node.pattern.clone()))
        );
        assert_eq!(net.pattern_history(), vec![node.pattern]);
    }

    #[test]
    fn test_poor_mesh_score_fails_propagation() {
        let poor = MeshMetrics {
            avg_trust_weight: 0.2,
            uptime_percent: 20.0,
            path_variance: 9.0,
            glyph_coherence: 0.2,
            qre_validation_rate: 0.2,
            reconfig_time: 8.0,
        };
        let net = MeshNetwork::default().with_mesh_metrics(poor);
        assert!((net.mesh_score() - 0.18).abs() < 1e-9);

        let a = make_node();
        let b = make_node();
        net.add_node(a.clone());
        net.add_node(b.clone());
        assert!(matches!(
            net.propagate_metrics(&a.id, &b.id),
            Err(QalxError::SecurityGateFailed { .. })
        ));
        assert!(matches!(
            net.validate_all_nodes()[&a.id],
            Err(QalxError::SecurityGateFailed { .. })
        ));
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        let (net, ids) = network_with(8);
        let net = Arc::new(net);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let net = Arc::clone(&net);
                let ids = ids.clone();
                std::thread::spawn(move || {
                    for (i, id) in ids.iter().enumerate() {
                        match (t + i) % 4 {
                            0 => {
                                net.revoke_node(id, "load").unwrap();
                            }
                            1 => {
                                net.update_coherence(id, 0.9).unwrap();
                            }
                            2 => {
                                let _ = net.propagate_metrics(id, &ids[(i + 1) % ids.len()]);
                            }
                            _ => {
                                net.validate_all_nodes();
                            }
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for id in &ids {
            let node = net.get(id).unwrap();
            assert_eq!(node.is_revoked(), node.pattern.ends_with(REVOKED_SUFFIX));
            assert!(node.pattern.matches(REVOKED_SUFFIX).count() <= 1);
        }
    }
}
