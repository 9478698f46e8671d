//! Wallet identity: signing key, derived EVM address, optional Babylon address

use std::fmt;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use bech32::FromBase32;

use crate::error::BridgeError;
use crate::redact::{mask_address, Redacted};

/// Bech32 prefix of Babylon accounts
pub const BABYLON_HRP: &str = "bbn";

/// Immutable once loaded. `Debug` never prints the key.
#[derive(Clone)]
pub struct WalletIdentity {
    name: String,
    signer: Redacted<PrivateKeySigner>,
    address: Address,
    babylon_address: Option<String>,
}

impl WalletIdentity {
    /// Parse the private key and validate the optional Babylon address.
    pub fn new(
        name: &str,
        private_key: &str,
        babylon_address: Option<&str>,
    ) -> Result<Self, BridgeError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|_| BridgeError::Configuration(format!("invalid private key for {}", name)))?;

        let babylon_address = match babylon_address.map(str::trim).filter(|s| !s.is_empty()) {
            Some(addr) => {
                validate_bech32(addr, BABYLON_HRP)?;
                Some(addr.to_string())
            }
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            address: signer.address(),
            signer: Redacted(signer),
            babylon_address,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Recipient string for the Babylon destination, if configured
    pub fn babylon_address(&self) -> Option<&str> {
        self.babylon_address.as_deref()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        self.signer.expose()
    }

    /// Short form safe for status lines
    pub fn masked_address(&self) -> String {
        mask_address(&self.address.to_string())
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("name", &self.name)
            .field("address", &self.masked_address())
            .field("signer", &self.signer)
            .field(
                "babylon_address",
                &self.babylon_address.as_deref().map(mask_address),
            )
            .finish()
    }
}

/// Check that `addr` is bech32 with the expected prefix and a 20 or 32 byte payload
pub fn validate_bech32(addr: &str, expected_hrp: &str) -> Result<(), BridgeError> {
    let (hrp, data, _variant) = bech32::decode(addr)
        .map_err(|e| BridgeError::Configuration(format!("invalid bech32 address: {}", e)))?;

    if hrp != expected_hrp {
        return Err(BridgeError::Configuration(format!(
            "expected '{}' prefix, got '{}'",
            expected_hrp, hrp
        )));
    }

    let bytes = Vec::<u8>::from_base32(&data)
        .map_err(|e| BridgeError::Configuration(format!("invalid base32 data: {}", e)))?;
    if bytes.len() != 20 && bytes.len() != 32 {
        return Err(BridgeError::Configuration(format!(
            "invalid address length: expected 20 or 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil account #0
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const BBN: &str = "bbn17w0adeg64ky0daxwd2ugyuneellmjgnx5r2r5e";

    #[test]
    fn test_address_derived_from_key() {
        let wallet = WalletIdentity::new("Wallet1", KEY, None).unwrap();
        assert_eq!(
            wallet.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(wallet.babylon_address().is_none());
    }

    #[test]
    fn test_invalid_key_is_configuration_error() {
        let err = WalletIdentity::new("Wallet1", "not-a-key", None).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));
    }

    #[test]
    fn test_babylon_address_kept() {
        let wallet = WalletIdentity::new("Wallet1", KEY, Some(BBN)).unwrap();
        assert_eq!(wallet.babylon_address(), Some(BBN));
    }

    #[test]
    fn test_blank_babylon_address_is_none() {
        let wallet = WalletIdentity::new("Wallet1", KEY, Some("  ")).unwrap();
        assert!(wallet.babylon_address().is_none());
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let err = WalletIdentity::new(
            "Wallet1",
            KEY,
            Some("cosmos17w0adeg64ky0daxwd2ugyuneellmjgnxramjtq"),
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        assert!(validate_bech32("bbn17w0adeg64ky0daxwd2ugyuneellmjgnx5r2r5q", BABYLON_HRP).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = WalletIdentity::new("Wallet1", KEY, Some(BBN)).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("ac0974bec39a17e3"));
        assert!(!debug.contains("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
    }
}
