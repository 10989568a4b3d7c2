//! SecurityStateStore trait - persistent credential pair (PIN, wipe code)

use crate::model::{ProtectionState, Salt, SecretValue};

/// Result of an atomic wipe code commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// PIN authorized the change and the new wipe code is persisted
    Committed,
    /// PIN did not match; the wipe code is untouched
    Unauthorized,
    /// Write failed (storage full, hardware fault); nothing was written
    StorageFault,
}

impl CommitOutcome {
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Capability to query and atomically mutate device credentials
///
/// Implementations own PIN verification and persistence. The core only
/// sequences calls and never sees stored digests.
pub trait SecurityStateStore {
    /// Whether the device has been set up at all
    fn is_initialized(&self) -> bool;

    fn has_pin(&self) -> bool;

    fn has_wipe_code(&self) -> bool;

    /// Salted verification against the stored unlocking PIN
    ///
    /// Returns `true` only if a PIN is stored and matches. May count as an
    /// unlock attempt.
    fn check_pin(&mut self, pin: &SecretValue, salt: &Salt) -> bool;

    /// Verify `pin` and replace the wipe code in one atomic step
    ///
    /// An empty `new_wipe_code` removes the wipe code. Anything other than
    /// [`CommitOutcome::Committed`] leaves the credential pair unchanged.
    ///
    /// On a device with a PIN the commit counts as an unlock attempt, the
    /// same way [`check_pin`](Self::check_pin) does. An `Unauthorized`
    /// outcome therefore still persists the raised failure counter, and a
    /// `Committed` one resets it.
    fn change_wipe_code(
        &mut self,
        pin: &SecretValue,
        salt: &Salt,
        new_wipe_code: &SecretValue,
    ) -> CommitOutcome;

    /// Snapshot of both protection flags
    fn protection_state(&self) -> ProtectionState {
        ProtectionState::new(self.has_pin(), self.has_wipe_code())
    }
}

impl<S: SecurityStateStore + ?Sized> SecurityStateStore for &mut S {
    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn has_pin(&self) -> bool {
        (**self).has_pin()
    }

    fn has_wipe_code(&self) -> bool {
        (**self).has_wipe_code()
    }

    fn check_pin(&mut self, pin: &SecretValue, salt: &Salt) -> bool {
        (**self).check_pin(pin, salt)
    }

    fn change_wipe_code(
        &mut self,
        pin: &SecretValue,
        salt: &Salt,
        new_wipe_code: &SecretValue,
    ) -> CommitOutcome {
        (**self).change_wipe_code(pin, salt, new_wipe_code)
    }
}
