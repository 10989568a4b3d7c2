//! Texts shown to the user during a wipe code change
//!
//! Rendering belongs to the transport. These types only decide which
//! screen applies and what it says.

pub const WIPE_CODE_TITLE: &str = "Wipe code settings";

/// The confirmation screen that opens a wipe code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDialog {
    /// Remove an existing wipe code
    Disable,
    /// Replace an existing wipe code
    Change,
    /// Set a wipe code for the first time
    Enable,
}

impl ConfirmationDialog {
    /// Stable identifier of the screen, usable by transports for routing.
    pub fn id(self) -> &'static str {
        match self {
            Self::Disable => "disable_wipe_code",
            Self::Change => "change_wipe_code",
            Self::Enable => "set_wipe_code",
        }
    }

    pub fn title(self) -> &'static str {
        WIPE_CODE_TITLE
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Disable => "disable wipe code protection?",
            Self::Change => "change the wipe code?",
            Self::Enable => "enable wipe code?",
        }
    }

    /// Informational bullet lines. Only the enable screen carries any.
    pub fn info_lines(self) -> &'static [&'static str] {
        match self {
            Self::Enable => &["Wipe code can be used to erase all data from this device."],
            Self::Disable | Self::Change => &[],
        }
    }
}

/// A popup that needs acknowledgment before the flow continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// New wipe code equals the PIN
    InvalidWipeCode,
    /// Wipe code entries differ
    CodeMismatch,
}

impl Notice {
    pub fn title(self) -> &'static str {
        match self {
            Self::InvalidWipeCode => "Invalid wipe code",
            Self::CodeMismatch => "Code mismatch",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Self::InvalidWipeCode => {
                "The wipe code must be different from your PIN.\n\nPlease try again."
            }
            Self::CodeMismatch => "The wipe codes you entered do not match.\n\nPlease try again.",
        }
    }
}

/// A terminal screen; shown without waiting for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeScreen {
    Success(&'static str),
    PinInvalid,
}

impl OutcomeScreen {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Success(text) => text,
            Self::PinInvalid => "The PIN you have entered is not valid.",
        }
    }
}

/// Prompt labels for the secrets collected during a change.
pub mod prompts {
    pub const ENTER_PIN: &str = "Enter PIN";
    pub const ENTER_NEW_WIPE_CODE: &str = "Enter new wipe code";
    pub const REENTER_WIPE_CODE: &str = "Re-enter wipe code";
    pub const ENTER_NEW_PIN: &str = "Enter new PIN";
    pub const REENTER_NEW_PIN: &str = "Re-enter new PIN";
}
