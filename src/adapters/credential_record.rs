//! Credential record shared by the store adapters
//!
//! Holds salted digests of the PIN and the wipe code, never the secrets.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::model::{Salt, SecretValue};

pub(crate) const DIGEST_LEN: usize = 32;

type Digest = [u8; DIGEST_LEN];

const PIN_CONTEXT: &str = "wipeguard 2026-10 unlocking pin digest";
const WIPE_CODE_CONTEXT: &str = "wipeguard 2026-10 wipe code digest";

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct CredentialRecord {
    pub(crate) device_salt: Digest,
    pub(crate) pin_digest: Option<Digest>,
    pub(crate) wipe_code_digest: Option<Digest>,
    pub(crate) pin_failures: u32,
}

impl CredentialRecord {
    /// Record with no PIN and no wipe code.
    pub(crate) fn new(device_salt: Digest) -> Self {
        Self {
            device_salt,
            pin_digest: None,
            wipe_code_digest: None,
            pin_failures: 0,
        }
    }

    /// Record protected by `pin`. An empty PIN means no PIN.
    pub(crate) fn with_pin(device_salt: Digest, pin: &SecretValue, salt: &Salt) -> Self {
        let mut record = Self::new(device_salt);
        if !pin.is_empty() {
            record.pin_digest = Some(record.pin_digest_of(pin, salt));
        }
        record
    }

    /// Fresh random device salt
    pub(crate) fn random_device_salt() -> Digest {
        use rand::RngCore;

        let mut salt = [0u8; DIGEST_LEN];
        rand::rng().fill_bytes(&mut salt);
        salt
    }

    pub(crate) fn has_pin(&self) -> bool {
        self.pin_digest.is_some()
    }

    pub(crate) fn has_wipe_code(&self) -> bool {
        self.wipe_code_digest.is_some()
    }

    /// True only when a PIN is stored and `pin` matches it.
    pub(crate) fn pin_matches(&self, pin: &SecretValue, salt: &Salt) -> bool {
        match &self.pin_digest {
            Some(stored) => digests_equal(stored, &self.pin_digest_of(pin, salt)),
            None => false,
        }
    }

    /// Whether `pin` authorizes a change. Without a stored PIN only the
    /// empty PIN does.
    pub(crate) fn authorizes(&self, pin: &SecretValue, salt: &Salt) -> bool {
        if self.has_pin() {
            self.pin_matches(pin, salt)
        } else {
            pin.is_empty()
        }
    }

    pub(crate) fn wipe_code_matches(&self, code: &SecretValue) -> bool {
        match &self.wipe_code_digest {
            Some(stored) => digests_equal(stored, &self.wipe_code_digest_of(code)),
            None => false,
        }
    }

    /// Copy of this record with the wipe code replaced. Empty removes it.
    pub(crate) fn with_wipe_code(&self, code: &SecretValue) -> Self {
        let mut next = self.clone();
        next.wipe_code_digest = if code.is_empty() {
            None
        } else {
            Some(self.wipe_code_digest_of(code))
        };
        next
    }

    pub(crate) fn record_pin_attempt(&mut self, success: bool) {
        if success {
            self.pin_failures = 0;
        } else {
            self.pin_failures = self.pin_failures.saturating_add(1);
        }
    }

    fn pin_digest_of(&self, pin: &SecretValue, salt: &Salt) -> Digest {
        let mut hasher = blake3::Hasher::new_derive_key(PIN_CONTEXT);
        hasher.update(&self.device_salt);
        hasher.update(&(salt.as_bytes().len() as u64).to_le_bytes());
        hasher.update(salt.as_bytes());
        hasher.update(pin.as_bytes());
        *hasher.finalize().as_bytes()
    }

    fn wipe_code_digest_of(&self, code: &SecretValue) -> Digest {
        let mut hasher = blake3::Hasher::new_derive_key(WIPE_CODE_CONTEXT);
        hasher.update(&self.device_salt);
        hasher.update(code.as_bytes());
        *hasher.finalize().as_bytes()
    }
}

fn digests_equal(a: &Digest, b: &Digest) -> bool {
    a.ct_eq(b).into()
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("has_pin", &self.has_pin())
            .field("has_wipe_code", &self.has_wipe_code())
            .field("pin_failures", &self.pin_failures)
            .finish_non_exhaustive()
    }
}
