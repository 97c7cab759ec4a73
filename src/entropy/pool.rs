//! EntropyPool — lock-guarded mixing state shared by every derivation
//!
//! Seeded once from the OS random source, then replaced by a SHA-512 digest on
//! each mix. A mix reads, hashes and writes the pool under one lock, so every
//! derivation observes a complete checkpoint of the previous one.

use crate::error::{QalxError, Result};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};

struct PoolState {
    bytes: Vec<u8>,
    generation: u64,
}

pub struct EntropyPool {
    state: Mutex<PoolState>,
}

impl EntropyPool {
    /// Seed a pool of `size` bytes from the operating system's secure RNG
    pub fn seeded(size: usize) -> Result<Self> {
        let mut bytes = vec![0u8; size];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| QalxError::EntropySeed(e.to_string()))?;
        log::info!("Entropy pool seeded with {} bytes", size);
        Ok(Self::from_seed(bytes))
    }

    /// Build a pool from caller-supplied bytes (deterministic, for tests and replay)
    pub fn from_seed(seed: Vec<u8>) -> Self {
        Self {
            state: Mutex::new(PoolState {
                bytes: seed,
                generation: 0,
            }),
        }
    }

    /// Fold harvested bytes and a bias into the pool, returning the new pool contents.
    ///
    /// pool' = SHA-512(pool || harvested || harvested ^ bias)
    pub fn mix(&self, harvested: &[u8], bias: u8) -> Vec<u8> {
        let biased: Vec<u8> = harvested.iter().map(|b| b ^ bias).collect();

        let mut state = self.state.lock();
        let mut hasher = Sha512::new();
        hasher.update(&state.bytes);
        hasher.update(harvested);
        hasher.update(&biased);
        state.bytes = hasher.finalize().to_vec();
        state.generation += 1;
        log::debug!("Entropy pool advanced to generation {}", state.generation);
        state.bytes.clone()
    }

    /// Number of mixes applied since seeding
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn len(&self) -> usize {
        self.state.lock().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short SHA-256 fingerprint of the current pool, safe to log
    pub fn fingerprint(&self) -> String {
        let state = self.state.lock();
        let digest = Sha256::digest(&state.bytes);
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Debug for EntropyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyPool")
            .field("len", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}
