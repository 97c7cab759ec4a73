//! Entropy & key derivation
//!
//! - EntropyPool: the shared, lock-guarded mixing state
//! - KeyDerivationEngine: harvest/mix/amplify over an injected pool
//! - sign: base-64 signature encoding of derived keys

mod derive;
mod pool;

pub use derive::{decode_signature, sign, KeyDerivationEngine, HARVEST_LEN, KEY_LEN};
pub use pool::EntropyPool;
