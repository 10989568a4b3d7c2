//! Change wipe code use case
//!
//! Sequences confirmation, PIN entry, wipe code entry and the atomic store
//! commit. The flow is an explicit stage machine; every stage that talks to
//! the user can end in cancellation, which drops all secrets collected so far
//! without touching the store.

use tracing::{debug, info, info_span, warn};

use crate::error::{TransportError, WipeguardResult};
use crate::logic::{ConfirmationGate, SecretCollector};
use crate::model::{
    prompts, ChangeRequest, ConfirmationOutcome, FailureKind, OperationResult, OutcomeScreen,
    ProtectionState, Salt, SecretValue, SuccessKind,
};
use crate::ports::{CommitOutcome, SecurityStateStore, Transport};

/// Options for a wipe code change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WipeCodeConfig {
    /// Verify the PIN before asking for the new wipe code. The commit
    /// re-verifies regardless; turn this off for stores where every check
    /// consumes an unlock attempt.
    pub precheck_pin: bool,
    /// Report commit write failures as [`FailureKind::StoreError`] instead of
    /// folding them into [`FailureKind::PinInvalid`]
    pub report_storage_faults: bool,
}

impl Default for WipeCodeConfig {
    fn default() -> Self {
        Self {
            precheck_pin: true,
            report_storage_faults: false,
        }
    }
}

#[derive(Debug)]
enum Stage {
    Start,
    CollectingPin,
    PreCheckingPin {
        pin: SecretValue,
        salt: Salt,
    },
    CollectingWipeCode {
        pin: SecretValue,
        salt: Salt,
    },
    Committing {
        pin: SecretValue,
        salt: Salt,
        new_wipe_code: SecretValue,
    },
    Done(OperationResult),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::CollectingPin => "collecting_pin",
            Stage::PreCheckingPin { .. } => "prechecking_pin",
            Stage::CollectingWipeCode { .. } => "collecting_wipe_code",
            Stage::Committing { .. } => "committing",
            Stage::Done(_) => "done",
        }
    }
}

/// Orchestrates one wipe code change against a store and a transport
///
/// Both collaborators are handed in at construction; pass `&mut` references
/// to keep using them afterwards.
pub struct ChangeWipeCode<S, T> {
    store: S,
    transport: T,
    config: WipeCodeConfig,
}

impl<S, T> ChangeWipeCode<S, T>
where
    S: SecurityStateStore,
    T: Transport,
{
    pub fn new(store: S, transport: T) -> Self {
        Self::with_config(store, transport, WipeCodeConfig::default())
    }

    pub fn with_config(store: S, transport: T, config: WipeCodeConfig) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// Run the change to a terminal outcome
    ///
    /// # Errors
    ///
    /// Only a broken transport (not a user cancellation) is an error.
    pub fn run(&mut self, request: ChangeRequest) -> WipeguardResult<OperationResult> {
        let span = info_span!("change_wipe_code", remove = request.remove);
        let _guard = span.enter();

        if !self.store.is_initialized() {
            warn!("Device is not initialized");
            return Ok(OperationResult::failed(FailureKind::NotInitialized));
        }

        let state = self.store.protection_state();
        let mut stage = Stage::Start;

        let result = loop {
            debug!(stage = stage.name(), "Entering stage");
            let next = match stage {
                Stage::Done(result) => break result,
                other => self.step(other, request, state),
            };
            stage = match next {
                Ok(next) => next,
                Err(TransportError::Cancelled) => Stage::Done(OperationResult::Cancelled),
                Err(e) => return Err(e.into()),
            };
        };

        self.report(&result);
        Ok(result)
    }

    fn step(
        &mut self,
        stage: Stage,
        request: ChangeRequest,
        state: ProtectionState,
    ) -> Result<Stage, TransportError> {
        let next = match stage {
            Stage::Start => match ConfirmationGate::run(&mut self.transport, request, state)? {
                ConfirmationOutcome::Confirmed => Stage::CollectingPin,
                ConfirmationOutcome::Cancelled => Stage::Done(OperationResult::Cancelled),
                ConfirmationOutcome::Rejected(reason) => {
                    warn!(reason, "Request rejected");
                    Stage::Done(OperationResult::failed(FailureKind::Rejected))
                }
            },

            Stage::CollectingPin => {
                let (pin, salt) = if state.has_pin {
                    SecretCollector::new(&mut self.transport)
                        .collect_unlock_secret(prompts::ENTER_PIN)?
                } else {
                    (SecretValue::empty(), Salt::empty())
                };

                if request.remove {
                    Stage::Committing {
                        pin,
                        salt,
                        new_wipe_code: SecretValue::empty(),
                    }
                } else {
                    Stage::PreCheckingPin { pin, salt }
                }
            }

            Stage::PreCheckingPin { pin, salt } => {
                if self.config.precheck_pin
                    && self.store.has_pin()
                    && !self.store.check_pin(&pin, &salt)
                {
                    self.pin_invalid()
                } else {
                    Stage::CollectingWipeCode { pin, salt }
                }
            }

            Stage::CollectingWipeCode { pin, salt } => {
                let new_wipe_code = SecretCollector::new(&mut self.transport)
                    .collect_new_secret_confirmed(
                        prompts::ENTER_NEW_WIPE_CODE,
                        prompts::REENTER_WIPE_CODE,
                        Some(&pin),
                    )?;
                Stage::Committing {
                    pin,
                    salt,
                    new_wipe_code,
                }
            }

            Stage::Committing {
                pin,
                salt,
                new_wipe_code,
            } => match self.store.change_wipe_code(&pin, &salt, &new_wipe_code) {
                CommitOutcome::Committed => {
                    let kind =
                        SuccessKind::from_change(state.has_wipe_code, new_wipe_code.is_empty());
                    self.transport
                        .show_outcome(&OutcomeScreen::Success(kind.screen_message()));
                    Stage::Done(OperationResult::success(kind))
                }
                CommitOutcome::StorageFault if self.config.report_storage_faults => {
                    warn!("Credential store refused the write");
                    Stage::Done(OperationResult::failed(FailureKind::StoreError))
                }
                outcome @ (CommitOutcome::Unauthorized | CommitOutcome::StorageFault) => {
                    warn!(?outcome, "Commit refused");
                    self.pin_invalid()
                }
            },

            Stage::Done(result) => Stage::Done(result),
        };
        Ok(next)
    }

    fn pin_invalid(&mut self) -> Stage {
        self.transport.show_outcome(&OutcomeScreen::PinInvalid);
        Stage::Done(OperationResult::failed(FailureKind::PinInvalid))
    }

    fn report(&self, result: &OperationResult) {
        match result {
            OperationResult::Success { kind, .. } => info!(?kind, "Wipe code updated"),
            OperationResult::Cancelled => info!("Wipe code change cancelled"),
            OperationResult::Failed { kind } => info!(?kind, "Wipe code change failed"),
        }
    }
}

/// Run a wipe code change with the given collaborators
pub fn change_wipe_code<S, T>(
    store: S,
    transport: T,
    request: ChangeRequest,
    config: WipeCodeConfig,
) -> WipeguardResult<OperationResult>
where
    S: SecurityStateStore,
    T: Transport,
{
    ChangeWipeCode::with_config(store, transport, config).run(request)
}
