//! Scripted transport
//!
//! Replays a fixed list of user replies and records every screen and prompt
//! it was asked to show. Used to drive flows without a human, mainly in
//! tests. An exhausted script behaves like a user who walked away: the
//! next suspension point is cancelled.

use std::collections::VecDeque;

use crate::error::{TransportError, TransportResult};
use crate::model::{ConfirmationDialog, Notice, OutcomeScreen, Salt, SecretValue};
use crate::ports::Transport;

/// One user action at a suspension point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Confirm,
    Decline,
    Secret(String),
    Acknowledge,
    Cancel,
    Disconnect,
}

impl Reply {
    pub fn secret(value: &str) -> Self {
        Reply::Secret(value.to_string())
    }
}

/// Something the transport was asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Dialog(ConfirmationDialog),
    Prompt(String),
    Notice(Notice),
    Outcome(OutcomeScreen),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    salt: Salt,
    events: Vec<TransportEvent>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            salt: Salt::empty(),
            events: Vec::new(),
        }
    }

    /// Salt returned alongside the unlocking PIN
    pub fn with_salt(mut self, salt: Salt) -> Self {
        self.salt = salt;
        self
    }

    pub fn events(&self) -> &[TransportEvent] {
        &self.events
    }

    pub fn dialogs_shown(&self) -> Vec<ConfirmationDialog> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Dialog(dialog) => Some(*dialog),
                _ => None,
            })
            .collect()
    }

    pub fn prompts_shown(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Prompt(prompt) => Some(prompt.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn notices_shown(&self) -> Vec<Notice> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Notice(notice) => Some(*notice),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes_shown(&self) -> Vec<OutcomeScreen> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Outcome(screen) => Some(screen.clone()),
                _ => None,
            })
            .collect()
    }

    /// Replies not consumed yet
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    fn next_reply(&mut self) -> TransportResult<Reply> {
        match self.replies.pop_front() {
            None | Some(Reply::Cancel) => Err(TransportError::Cancelled),
            Some(Reply::Disconnect) => Err(TransportError::Disconnected {
                reason: "scripted disconnect".to_string(),
            }),
            Some(reply) => Ok(reply),
        }
    }

    fn unexpected(expected: &str) -> TransportError {
        TransportError::Disconnected {
            reason: format!("script out of step, expected {expected}"),
        }
    }
}

impl Transport for ScriptedTransport {
    fn confirm(&mut self, dialog: ConfirmationDialog) -> TransportResult<bool> {
        self.events.push(TransportEvent::Dialog(dialog));
        match self.next_reply()? {
            Reply::Confirm => Ok(true),
            Reply::Decline => Ok(false),
            _ => Err(Self::unexpected("a confirmation")),
        }
    }

    fn request_secret(&mut self, prompt: &str) -> TransportResult<SecretValue> {
        self.events.push(TransportEvent::Prompt(prompt.to_string()));
        match self.next_reply()? {
            Reply::Secret(value) => Ok(SecretValue::from_str(&value)),
            _ => Err(Self::unexpected("a secret")),
        }
    }

    fn request_unlock_secret(&mut self, prompt: &str) -> TransportResult<(SecretValue, Salt)> {
        let secret = self.request_secret(prompt)?;
        Ok((secret, self.salt.clone()))
    }

    fn show_notice(&mut self, notice: Notice) -> TransportResult<()> {
        self.events.push(TransportEvent::Notice(notice));
        match self.next_reply()? {
            Reply::Acknowledge => Ok(()),
            _ => Err(Self::unexpected("an acknowledgment")),
        }
    }

    fn show_outcome(&mut self, screen: &OutcomeScreen) {
        self.events.push(TransportEvent::Outcome(screen.clone()));
    }
}
