mod confirmation_gate;
mod secret_collector;

pub use confirmation_gate::{ConfirmationGate, GateDecision};
pub use secret_collector::SecretCollector;
