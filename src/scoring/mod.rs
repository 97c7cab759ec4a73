//! Composite scoring and the security validation gate
//!
//! - qre: the five-factor, log-scaled resistance score
//! - policy: tag → threshold policy table
//! - gate: resonance/composite/QRE validation

mod gate;
mod policy;
mod qre;

pub use gate::{GateReport, SecurityGate};
pub use policy::{EdgeAdjustment, PolicyTable, ThresholdPolicy};
pub use qre::{compute_qre, normalize, QreFactors};
