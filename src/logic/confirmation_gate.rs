//! Confirmation gate
//!
//! Picks the confirmation dialog for a wipe code request, or rejects the
//! request before anything is shown.

use tracing::debug;

use crate::error::TransportResult;
use crate::model::{
    ChangeRequest, ConfirmationDialog, ConfirmationOutcome, ProtectionState,
    REJECT_ALREADY_DISABLED,
};
use crate::ports::Transport;

/// What the gate decided for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Dialog(ConfirmationDialog),
    Rejected(&'static str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationGate;

impl ConfirmationGate {
    /// Map `(remove, has_wipe_code)` to a dialog. Total over all four inputs.
    pub fn decide(request: ChangeRequest, state: ProtectionState) -> GateDecision {
        match (request.remove, state.has_wipe_code) {
            (true, true) => GateDecision::Dialog(ConfirmationDialog::Disable),
            (false, true) => GateDecision::Dialog(ConfirmationDialog::Change),
            (false, false) => GateDecision::Dialog(ConfirmationDialog::Enable),
            (true, false) => GateDecision::Rejected(REJECT_ALREADY_DISABLED),
        }
    }

    /// Decide, then present the dialog (if any) and wait for the user
    pub fn run<T: Transport>(
        transport: &mut T,
        request: ChangeRequest,
        state: ProtectionState,
    ) -> TransportResult<ConfirmationOutcome> {
        match Self::decide(request, state) {
            GateDecision::Rejected(reason) => Ok(ConfirmationOutcome::Rejected(reason)),
            GateDecision::Dialog(dialog) => {
                debug!(dialog = dialog.id(), "Requesting confirmation");
                if transport.confirm(dialog)? {
                    Ok(ConfirmationOutcome::Confirmed)
                } else {
                    Ok(ConfirmationOutcome::Cancelled)
                }
            }
        }
    }
}
