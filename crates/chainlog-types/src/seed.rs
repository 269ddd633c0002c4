use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length in bytes of a freshly generated seed.
pub const SEED_LEN: usize = 32;

/// Random identifier of a ledger instance.
///
/// A ledger generates its seed once at creation and never changes it. Clients
/// send the seed they expect with each request; a ledger with a different seed
/// rejects the request, so data from two independent ledgers is never mixed.
///
/// The empty seed means "don't check". Seeds arriving over the wire may have
/// any length, so this is a byte string rather than a fixed array.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkSeed(Vec<u8>);

impl NetworkSeed {
    /// Generate a fresh random seed.
    pub fn random() -> Self {
        Self(rand::random::<[u8; SEED_LEN]>().to_vec())
    }

    /// The empty seed, which opts out of seed verification.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if a request carrying `self` may operate on a ledger
    /// whose seed is `actual`.
    pub fn accepts(&self, actual: &NetworkSeed) -> bool {
        self.is_empty() || self == actual
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }

    /// Parse from a hex string. The empty string parses to the empty seed.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidHex(e.to_string()))
    }
}

impl fmt::Debug for NetworkSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkSeed({})", self.short_hex())
    }
}

impl fmt::Display for NetworkSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for NetworkSeed {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for NetworkSeed {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
