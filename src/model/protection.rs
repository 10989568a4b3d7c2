/// Whether a PIN and a wipe code are currently configured.
///
/// Read fresh from the store at the start of every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtectionState {
    pub has_pin: bool,
    pub has_wipe_code: bool,
}

impl ProtectionState {
    pub fn new(has_pin: bool, has_wipe_code: bool) -> Self {
        Self {
            has_pin,
            has_wipe_code,
        }
    }
}

/// A request to set, change or remove the wipe code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeRequest {
    /// `true` deletes the wipe code, `false` sets or changes it
    pub remove: bool,
}

impl ChangeRequest {
    pub fn set() -> Self {
        Self { remove: false }
    }

    pub fn remove() -> Self {
        Self { remove: true }
    }
}
