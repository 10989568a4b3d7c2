//! Adapters - concrete implementations of ports (traits)

mod credential_record;
mod file_store;
mod memory_store;
mod scripted_transport;
mod terminal;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use scripted_transport::{Reply, ScriptedTransport, TransportEvent};
pub use terminal::TerminalTransport;
