//! ValidationMemory — per-node record of validation outcomes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationMemory {
    pub history: Vec<bool>,
}

impl ValidationMemory {
    pub fn record(&mut self, passed: bool) {
        self.history.push(passed);
    }

    /// At least two outcomes, and the latest one passed
    pub fn improving(&self) -> bool {
        self.history.len() >= 2 && self.history.last() == Some(&true)
    }

    pub fn pass_rate(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().filter(|p| **p).count() as f64 / self.history.len() as f64
    }
}
