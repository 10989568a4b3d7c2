//! Transport trait - the interactive channel to the user
//!
//! Every method that waits for the user is a suspension point and may
//! resolve to [`TransportError::Cancelled`].
//!
//! [`TransportError::Cancelled`]: crate::error::TransportError::Cancelled

use crate::error::TransportResult;
use crate::model::{ConfirmationDialog, Notice, OutcomeScreen, Salt, SecretValue};

pub trait Transport {
    /// Show a confirmation dialog and wait for the user's choice
    ///
    /// `Ok(true)` means confirmed, `Ok(false)` means the user declined.
    fn confirm(&mut self, dialog: ConfirmationDialog) -> TransportResult<bool>;

    /// Ask for a secret (PIN or wipe code)
    fn request_secret(&mut self, prompt: &str) -> TransportResult<SecretValue>;

    /// Ask for the unlocking PIN together with its external salt
    fn request_unlock_secret(&mut self, prompt: &str) -> TransportResult<(SecretValue, Salt)>;

    /// Show a notice and wait until the user acknowledges it
    fn show_notice(&mut self, notice: Notice) -> TransportResult<()>;

    /// Show a final status screen; does not wait for input
    fn show_outcome(&mut self, screen: &OutcomeScreen);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn confirm(&mut self, dialog: ConfirmationDialog) -> TransportResult<bool> {
        (**self).confirm(dialog)
    }

    fn request_secret(&mut self, prompt: &str) -> TransportResult<SecretValue> {
        (**self).request_secret(prompt)
    }

    fn request_unlock_secret(&mut self, prompt: &str) -> TransportResult<(SecretValue, Salt)> {
        (**self).request_unlock_secret(prompt)
    }

    fn show_notice(&mut self, notice: Notice) -> TransportResult<()> {
        (**self).show_notice(notice)
    }

    fn show_outcome(&mut self, screen: &OutcomeScreen) {
        (**self).show_outcome(screen)
    }
}
