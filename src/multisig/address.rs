//! Account addresses
//!
//! Addresses are opaque identifiers, `0x`-prefixed hex in practice. The
//! vault never interprets them beyond equality, ordering, and the null check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical null address
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// An account address (guardian, destination, or the vault itself)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The null address
    pub fn zero() -> Self {
        Self(ZERO_ADDRESS.to_string())
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the null address
    ///
    /// An empty string, a bare `0x`, and any run of zero digits all count.
    pub fn is_null(&self) -> bool {
        let body = self.0.strip_prefix("0x").unwrap_or(&self.0);
        body.chars().all(|c| c == '0')
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_detection() {
        assert!(Address::zero().is_null());
        assert!(Address::from("").is_null());
        assert!(Address::from("0x").is_null());
        assert!(Address::from("0x0000").is_null());

        assert!(!Address::from("alice").is_null());
        assert!(!Address::from("0x0000000000000000000000000000000000000001").is_null());
    }

    #[test]
    fn test_serde_is_transparent() {
        let address = Address::from("0xabc");
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0xabc\"");

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
