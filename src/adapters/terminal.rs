//! Line-oriented terminal transport
//!
//! Dialogs and prompts are written to `output`; answers are read one line
//! at a time from `input`. End of input cancels the pending step, and so
//! does an empty line at a secret prompt.

use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::warn;
use zeroize::Zeroize;

use crate::error::{TransportError, TransportResult};
use crate::model::{ConfirmationDialog, Notice, OutcomeScreen, Salt, SecretValue};
use crate::ports::Transport;

pub struct TerminalTransport<R, W> {
    input: R,
    output: W,
}

impl TerminalTransport<io::StdinLock<'static>, io::Stderr> {
    /// Read from stdin, prompt on stderr so stdout stays machine-readable
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalTransport<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write(&mut self, args: fmt::Arguments<'_>) -> TransportResult<()> {
        self.output
            .write_fmt(args)
            .and_then(|()| self.output.flush())
            .map_err(disconnected)
    }

    /// Next line without its terminator, `None` at end of input
    fn read_line(&mut self) -> TransportResult<Option<String>> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                let len = line.trim_end_matches(['\r', '\n']).len();
                line.truncate(len);
                Ok(Some(line))
            }
            Err(e) => {
                line.zeroize();
                Err(disconnected(e))
            }
        }
    }
}

fn disconnected(err: io::Error) -> TransportError {
    TransportError::Disconnected {
        reason: err.to_string(),
    }
}

impl<R: BufRead, W: Write> Transport for TerminalTransport<R, W> {
    fn confirm(&mut self, dialog: ConfirmationDialog) -> TransportResult<bool> {
        self.write(format_args!("\n{}\n{}\n", dialog.title(), dialog.description()))?;
        for line in dialog.info_lines() {
            self.write(format_args!("  * {}\n", line))?;
        }
        self.write(format_args!("Confirm? [y/N]: "))?;

        let answer = self.read_line()?.ok_or(TransportError::Cancelled)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn request_secret(&mut self, prompt: &str) -> TransportResult<SecretValue> {
        loop {
            self.write(format_args!("{}: ", prompt))?;
            let mut line = self.read_line()?.ok_or(TransportError::Cancelled)?;

            if line.is_empty() {
                return Err(TransportError::Cancelled);
            }
            if line.len() > SecretValue::MAX_LENGTH {
                line.zeroize();
                self.write(format_args!(
                    "Too long, at most {} characters.\n",
                    SecretValue::MAX_LENGTH
                ))?;
                continue;
            }

            let secret = SecretValue::new(line.as_bytes().to_vec());
            line.zeroize();
            return Ok(secret);
        }
    }

    fn request_unlock_secret(&mut self, prompt: &str) -> TransportResult<(SecretValue, Salt)> {
        // No external salt source on a terminal.
        Ok((self.request_secret(prompt)?, Salt::empty()))
    }

    fn show_notice(&mut self, notice: Notice) -> TransportResult<()> {
        self.write(format_args!(
            "\n{}\n{}\nPress Enter to continue",
            notice.title(),
            notice.body()
        ))?;
        self.read_line()?.ok_or(TransportError::Cancelled)?;
        Ok(())
    }

    fn show_outcome(&mut self, screen: &OutcomeScreen) {
        if let Err(e) = self.write(format_args!("{}\n", screen.text())) {
            warn!(error = %e, "Failed to show outcome screen");
        }
    }
}
