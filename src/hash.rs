//! Hashing helpers for submission salts
//!
//! The salt is `keccak256(abi.encodePacked(address sender, uint256 timestamp))`,
//! i.e. 20 address bytes followed by the unix-seconds timestamp as a
//! big-endian 32-byte word.

use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Per-attempt salt for the bridge `send` call
pub fn compute_salt(sender: &[u8; 20], unix_secs: u64) -> [u8; 32] {
    // abi.encodePacked layout: 20 + 32 = 52 bytes
    let mut data = [0u8; 52];

    // sender (20 bytes)
    data[0..20].copy_from_slice(sender);

    // timestamp (uint256, big-endian; upper 24 bytes stay zero)
    data[44..52].copy_from_slice(&unix_secs.to_be_bytes());

    keccak256(&data)
}

/// Convert bytes32 to hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Ensure a transaction hash string carries the 0x prefix
pub fn normalize_tx_hash(hash: &str) -> String {
    let hash = hash.trim();
    if hash.starts_with("0x") {
        hash.to_string()
    } else {
        format!("0x{}", hash)
    }
}
