//! Use cases (orchestration)
//!
//! This module contains use cases that orchestrate operations across ports.

mod change_wipe_code;

pub use change_wipe_code::{change_wipe_code, ChangeWipeCode, WipeCodeConfig};
