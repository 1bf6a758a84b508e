//! Lookup keys.

use std::fmt;

use crate::constants::{ADDRESS_KEY_PREFIX, OWN_ADDRESS_KEY};

/// Canonical identifier of a cache entry.
///
/// Derived from the requested address: the literal address string, or the
/// [`LookupKey::OwnAddress`] sentinel when none was given. The sentinel can
/// never collide with an explicit address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKey {
    /// "Caller's own address" (no address supplied)
    OwnAddress,
    /// An explicit address, exactly as requested (trimmed)
    Address(String),
}

impl LookupKey {
    /// Derives the key for a requested address.
    ///
    /// Surrounding whitespace is ignored; a missing or blank address is
    /// the caller's own address.
    pub fn from_address(address: Option<&str>) -> Self {
        match address.map(str::trim) {
            Some(addr) if !addr.is_empty() => LookupKey::Address(addr.to_string()),
            _ => LookupKey::OwnAddress,
        }
    }

    /// Returns the explicit address, or `None` for the sentinel.
    pub fn address(&self) -> Option<&str> {
        match self {
            LookupKey::OwnAddress => None,
            LookupKey::Address(addr) => Some(addr),
        }
    }

    /// Returns true for the "caller's own address" sentinel.
    pub fn is_own_address(&self) -> bool {
        matches!(self, LookupKey::OwnAddress)
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::OwnAddress => f.write_str(OWN_ADDRESS_KEY),
            LookupKey::Address(addr) => write!(f, "{ADDRESS_KEY_PREFIX}{addr}"),
        }
    }
}

impl From<Option<&str>> for LookupKey {
    fn from(address: Option<&str>) -> Self {
        Self::from_address(address)
    }
}
