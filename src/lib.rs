//! Wipe code lifecycle for hardware security devices
//!
//! A wipe code is a second secret that, entered at the unlock prompt, erases
//! the device instead of unlocking it. This crate sets, changes and removes
//! it: it picks the confirmation dialog, collects the unlocking PIN and the
//! new wipe code over an interactive [`ports::Transport`], and commits the
//! change atomically through a [`ports::SecurityStateStore`].
//!
//! ```
//! use wipeguard::adapters::{MemoryStore, Reply, ScriptedTransport};
//! use wipeguard::model::{ChangeRequest, Salt, SecretValue, SuccessKind, OperationResult};
//! use wipeguard::use_cases::{change_wipe_code, WipeCodeConfig};
//!
//! let mut store = MemoryStore::with_pin(&SecretValue::from_str("1234"), &Salt::empty());
//! let transport = ScriptedTransport::new(vec![
//!     Reply::Confirm,
//!     Reply::secret("1234"),
//!     Reply::secret("5678"),
//!     Reply::secret("5678"),
//! ]);
//!
//! let result = change_wipe_code(
//!     &mut store,
//!     transport,
//!     ChangeRequest::set(),
//!     WipeCodeConfig::default(),
//! )?;
//! assert_eq!(result, OperationResult::success(SuccessKind::Enabled));
//! # Ok::<(), wipeguard::WipeguardError>(())
//! ```

pub mod adapters;
pub mod api;
pub mod error;
pub mod logic;
pub mod model;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use error::{WipeguardError, WipeguardResult};

// Re-export public API
pub use api::{change_wipe_code, ChangeWipeCodeRequest, FailureResponse, SuccessResponse};
