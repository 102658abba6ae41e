//! Hashing utilities for the vault
//!
//! Provides SHA-256 helpers and the deterministic derivation of a vault's
//! own address from its guardian set.

use crate::multisig::Address;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Derive the vault address for a guardian set
///
/// Address = "0x" || hex(SHA256(quorum || sorted guardians))[..40]
///
/// Guardians are sorted first so the same set always maps to the same
/// address regardless of registration order.
pub fn derive_vault_address(quorum: usize, guardians: &[Address]) -> Address {
    let mut sorted: Vec<&Address> = guardians.iter().collect();
    sorted.sort();

    let mut preimage = (quorum as u64).to_be_bytes().to_vec();
    for guardian in sorted {
        preimage.extend_from_slice(guardian.as_str().as_bytes());
        preimage.push(b':');
    }

    let digest = sha256_hex(&preimage);
    Address::new(format!("0x{}", &digest[..40]))
}
