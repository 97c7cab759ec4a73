//! Key derivation — harvest, mix, amplify
//!
//! 1. harvest: 32 bytes from sinusoids of the record's coherence, phase,
//!    amplitude and harmonics
//! 2. mix: fold the harvest and a modulation bias into the shared pool
//! 3. amplify: spread the mixed pool over 64 bytes with phase/harmonic sines
//!
//! The output is opaque key material for this system's own signature
//! encoding, not a general-purpose key.

use super::EntropyPool;
use crate::config::QalxConfig;
use crate::error::{QalxError, Result};
use crate::metrics::{base_harmonics, MetricsRecord, ModulationVector};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::f64::consts::PI;
use std::sync::Arc;

pub const HARVEST_LEN: usize = 32;
pub const KEY_LEN: usize = 64;

/// Map a value in [-1, 1] onto a byte; out-of-range and NaN saturate
fn unit_to_byte(x: f64) -> u8 {
    ((x + 1.0) * 128.0) as u8
}

/// Derives key material from metrics and modulation against a shared pool
#[derive(Debug, Clone)]
pub struct KeyDerivationEngine {
    pool: Arc<EntropyPool>,
    min_coherence: f64,
}

impl KeyDerivationEngine {
    pub fn new(pool: Arc<EntropyPool>, config: &QalxConfig) -> Self {
        Self {
            pool,
            min_coherence: config.min_coherence,
        }
    }

    /// Seed a fresh pool from the OS RNG sized per the config
    pub fn from_config(config: &QalxConfig) -> Result<Self> {
        let pool = EntropyPool::seeded(config.entropy_pool_size)?;
        Ok(Self::new(Arc::new(pool), config))
    }

    pub fn pool(&self) -> &Arc<EntropyPool> {
        &self.pool
    }

    pub fn derive_key(
        &self,
        metrics: &MetricsRecord,
        vector: &ModulationVector,
        mesh_score: f64,
    ) -> Result<Vec<u8>> {
        if metrics.coherence < self.min_coherence {
            log::warn!(
                "Key derivation rejected: coherence {:.3} < {:.3}",
                metrics.coherence,
                self.min_coherence
            );
            return Err(QalxError::InsufficientCoherence {
                coherence: metrics.coherence,
                minimum: self.min_coherence,
            });
        }

        let harvested = harvest(metrics);
        let bias = (vector.intensity * vector.ethics_score * mesh_score * 128.0) as u8;
        let mixed = self.pool.mix(&harvested, bias);
        Ok(amplify(&mixed, metrics, vector))
    }
}

fn harvest(metrics: &MetricsRecord) -> [u8; HARVEST_LEN] {
    let factors: Vec<f64> = [metrics.coherence, metrics.phase, metrics.amplitude]
        .into_iter()
        .chain(metrics.harmonics.iter().copied())
        .collect();
    let mut buf = [0u8; HARVEST_LEN];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = unit_to_byte((factors[i % factors.len()] * PI).sin());
    }
    buf
}

fn amplify(mixed: &[u8], metrics: &MetricsRecord, vector: &ModulationVector) -> Vec<u8> {
    let fallback;
    let harmonics = if metrics.harmonics.is_empty() {
        fallback = base_harmonics();
        &fallback
    } else {
        &metrics.harmonics
    };
    let vector_phase = (vector.intensity * vector.ethics_score * PI).sin();
    (0..KEY_LEN)
        .map(|i| {
            let h = harmonics[i % harmonics.len()];
            let phase = (metrics.phase * h * vector_phase).sin();
            mixed[i % mixed.len()] ^ unit_to_byte(phase)
        })
        .collect()
}

/// Base-64 encoding of raw key bytes; reversible, not an authenticated signature
pub fn sign(key: &[u8]) -> String {
    STANDARD.encode(key)
}

pub fn decode_signature(signature: &str) -> Option<Vec<u8>> {
    STANDARD.decode(signature).ok()
}
