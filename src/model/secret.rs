use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A PIN or wipe code as typed by the user.
///
/// Opaque bytes. The buffer is zeroed on drop and equality runs in constant
/// time for equal-length inputs. The empty value means "no wipe code".
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue(Vec<u8>);

impl SecretValue {
    /// Longest secret a transport should accept.
    pub const MAX_LENGTH: usize = 50;

    pub fn new(secret: Vec<u8>) -> Self {
        Self(secret)
    }

    /// The empty secret, used as the new value when removing a wipe code.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_str(secret: &str) -> Self {
        Self(secret.as_bytes().to_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SecretValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for SecretValue {}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue([REDACTED])")
    }
}

/// Auxiliary bytes bound to the unlocking PIN (e.g. an SD card salt).
///
/// Passed through to the store untouched.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Salt(Vec<u8>);

impl Salt {
    pub fn new(salt: Vec<u8>) -> Self {
        Self(salt)
    }

    /// No external salt available.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt([REDACTED])")
    }
}
