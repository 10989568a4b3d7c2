//! Secret collection over the interactive transport
//!
//! New secrets are entered twice. The collection loop is an explicit state
//! machine so every re-entry passes through a transport call, where the
//! user can cancel.

use tracing::debug;

use crate::error::TransportResult;
use crate::model::{Notice, Salt, SecretValue};
use crate::ports::Transport;

/// States of the double-entry loop
#[derive(Debug)]
enum Collecting {
    First,
    Second { first: SecretValue },
    Notify(Notice),
}

pub struct SecretCollector<'a, T: Transport> {
    transport: &'a mut T,
}

impl<'a, T: Transport> SecretCollector<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self { transport }
    }

    /// Single prompt for the unlocking PIN and its salt. No local validation.
    pub fn collect_unlock_secret(&mut self, prompt: &str) -> TransportResult<(SecretValue, Salt)> {
        self.transport.request_unlock_secret(prompt)
    }

    /// Collect a new secret entered twice
    ///
    /// Loops until both entries match and the value differs from
    /// `reject_if_equals`. A mismatch or a forbidden value shows a notice
    /// and starts over. An empty first entry is asked again without a notice.
    /// Returns only on success or when the transport fails or is cancelled.
    pub fn collect_new_secret_confirmed(
        &mut self,
        first_prompt: &str,
        second_prompt: &str,
        reject_if_equals: Option<&SecretValue>,
    ) -> TransportResult<SecretValue> {
        let mut state = Collecting::First;
        let mut round = 1u32;

        loop {
            state = match state {
                Collecting::First => {
                    let first = self.transport.request_secret(first_prompt)?;
                    if first.is_empty() {
                        debug!(round, "Empty entry, asking again");
                        Collecting::First
                    } else if reject_if_equals.is_some_and(|forbidden| *forbidden == first) {
                        Collecting::Notify(Notice::InvalidWipeCode)
                    } else {
                        Collecting::Second { first }
                    }
                }
                Collecting::Second { first } => {
                    let second = self.transport.request_secret(second_prompt)?;
                    if first == second {
                        debug!(round, "Secret confirmed");
                        return Ok(first);
                    }
                    Collecting::Notify(Notice::CodeMismatch)
                }
                Collecting::Notify(notice) => {
                    debug!(round, notice = notice.title(), "Entry refused");
                    self.transport.show_notice(notice)?;
                    round += 1;
                    Collecting::First
                }
            };
        }
    }
}
