//! Ports (traits) for the wipe code core
//!
//! These traits define the collaborators the core depends on. They are
//! ports in hexagonal architecture: the orchestration logic depends on
//! these abstractions, not on a concrete store or user interface.

mod security_store;
mod transport;

pub use security_store::{CommitOutcome, SecurityStateStore};
pub use transport::Transport;
