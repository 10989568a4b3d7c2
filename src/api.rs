//! Wire-facing entry point
//!
//! Maps the `ChangeWipeCode` request to a success or failure response the
//! way the command dispatch layer reports them to the host.

use serde::{Deserialize, Serialize};

use crate::error::{TransportError, WipeguardError};
use crate::model::{ChangeRequest, FailureKind, OperationResult};
use crate::ports::{SecurityStateStore, Transport};
use crate::use_cases::{change_wipe_code as change_wipe_code_use_case, WipeCodeConfig};

pub use crate::model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeWipeCodeRequest {
    #[serde(default)]
    pub remove: bool,
}

impl From<ChangeWipeCodeRequest> for ChangeRequest {
    fn from(msg: ChangeWipeCodeRequest) -> Self {
        ChangeRequest { remove: msg.remove }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    NotInitialized,
    ProcessError,
    PinInvalid,
    ActionCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub code: FailureCode,
    pub message: String,
}

impl FailureResponse {
    fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<FailureKind> for FailureResponse {
    fn from(kind: FailureKind) -> Self {
        let code = match kind {
            FailureKind::NotInitialized => FailureCode::NotInitialized,
            FailureKind::PinInvalid => FailureCode::PinInvalid,
            FailureKind::Rejected | FailureKind::StoreError => FailureCode::ProcessError,
        };
        Self::new(code, kind.message())
    }
}

impl From<&WipeguardError> for FailureResponse {
    fn from(err: &WipeguardError) -> Self {
        match err {
            WipeguardError::Transport(TransportError::Cancelled) => {
                Self::new(FailureCode::ActionCancelled, "Cancelled")
            }
            WipeguardError::Transport(e @ TransportError::Disconnected { .. }) => {
                Self::new(FailureCode::ActionCancelled, e.to_string())
            }
            WipeguardError::Storage(e) => Self::new(FailureCode::ProcessError, e.to_string()),
        }
    }
}

/// Either side of the response, tagged for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Success(SuccessResponse),
    Failure(FailureResponse),
}

impl From<Result<SuccessResponse, FailureResponse>> for Response {
    fn from(result: Result<SuccessResponse, FailureResponse>) -> Self {
        match result {
            Ok(success) => Response::Success(success),
            Err(failure) => Response::Failure(failure),
        }
    }
}

pub fn to_response(result: OperationResult) -> Result<SuccessResponse, FailureResponse> {
    match result {
        OperationResult::Success { message, .. } => Ok(SuccessResponse {
            message: message.to_string(),
        }),
        OperationResult::Cancelled => Err(FailureResponse::new(
            FailureCode::ActionCancelled,
            "Cancelled",
        )),
        OperationResult::Failed { kind } => Err(kind.into()),
    }
}

/// Handle a `ChangeWipeCode` message end to end
pub fn change_wipe_code<S, T>(
    store: S,
    transport: T,
    msg: ChangeWipeCodeRequest,
    config: WipeCodeConfig,
) -> Result<SuccessResponse, FailureResponse>
where
    S: SecurityStateStore,
    T: Transport,
{
    match change_wipe_code_use_case(store, transport, msg.into(), config) {
        Ok(result) => to_response(result),
        Err(e) => Err(FailureResponse::from(&e)),
    }
}
