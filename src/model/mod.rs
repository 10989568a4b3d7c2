mod dialog;
mod outcome;
mod protection;
mod secret;

pub use dialog::{prompts, ConfirmationDialog, Notice, OutcomeScreen, WIPE_CODE_TITLE};
pub(crate) use outcome::REJECT_ALREADY_DISABLED;
pub use outcome::{ConfirmationOutcome, FailureKind, OperationResult, SuccessKind};
pub use protection::{ChangeRequest, ProtectionState};
pub use secret::{Salt, SecretValue};
