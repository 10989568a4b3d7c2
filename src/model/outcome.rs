use std::fmt;

/// Result of running a confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    Cancelled,
    /// The request is invalid for the current state; no dialog was shown
    Rejected(&'static str),
}

/// What a successful change did to the wipe code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessKind {
    Enabled,
    Changed,
    Removed,
}

impl SuccessKind {
    /// Derive the kind from the state before the change and the new value.
    pub fn from_change(had_wipe_code: bool, new_value_empty: bool) -> Self {
        match (had_wipe_code, new_value_empty) {
            (_, true) => Self::Removed,
            (true, false) => Self::Changed,
            (false, false) => Self::Enabled,
        }
    }

    /// Protocol-facing message returned to the host.
    pub fn wire_message(self) -> &'static str {
        match self {
            Self::Enabled => "Wipe code set",
            Self::Changed => "Wipe code changed",
            Self::Removed => "Wipe code removed",
        }
    }

    /// Status line shown on the device.
    pub fn screen_message(self) -> &'static str {
        match self {
            Self::Enabled => "Wipe code enabled.",
            Self::Changed => "Wipe code changed.",
            Self::Removed => "Wipe code disabled.",
        }
    }
}

/// Why an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotInitialized,
    PinInvalid,
    Rejected,
    StoreError,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Device is not initialized",
            Self::PinInvalid => "PIN invalid",
            Self::Rejected => REJECT_ALREADY_DISABLED,
            Self::StoreError => "Failed to write credential store",
        }
    }
}

pub(crate) const REJECT_ALREADY_DISABLED: &str = "Wipe code protection is already disabled";

/// Terminal outcome of a wipe code change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Success {
        kind: SuccessKind,
        message: &'static str,
    },
    Cancelled,
    Failed {
        kind: FailureKind,
    },
}

impl OperationResult {
    pub fn success(kind: SuccessKind) -> Self {
        Self::Success {
            kind,
            message: kind.wire_message(),
        }
    }

    pub fn failed(kind: FailureKind) -> Self {
        Self::Failed { kind }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { message, .. } => write!(f, "{}", message),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Failed { kind } => write!(f, "{}", kind.message()),
        }
    }
}
