//! Cryptographic utilities for the vault
//!
//! This module provides:
//! - SHA-256 hashing
//! - Vault address derivation from a guardian set

pub mod hash;

pub use hash::{derive_vault_address, sha256, sha256_hex};
