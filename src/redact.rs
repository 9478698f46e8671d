//! Keeping wallet secrets out of logs and status messages.
//!
//! [`Redacted`] hides a value completely; [`mask_address`] keeps just enough
//! of an address to tell wallets apart in a status line.

use std::fmt::{self, Debug, Display};

/// Wrapper that redacts its inner value when formatted or serialized.
///
/// ```ignore
/// tracing::info!(key = %Redacted(&private_key), "Wallet loaded");
/// // Logs: key = <redacted>
/// ```
#[derive(Clone, Copy)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// Borrow the secret for the one place that actually needs it
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}

/// Shorten an address to `0x1234…abcd` (or `bbn1zs…h6n` for bech32).
pub fn mask_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 12 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_debug_and_display() {
        let secret = Redacted("0xdeadbeef");
        assert_eq!(format!("{:?}", secret), "<redacted>");
        assert_eq!(format!("{}", secret), "<redacted>");
        assert_eq!(*secret.expose(), "0xdeadbeef");
    }

    #[test]
    fn test_redacted_serialize() {
        let json = serde_json::to_string(&Redacted("hunter2")).unwrap();
        assert_eq!(json, "\"<redacted>\"");
    }

    #[test]
    fn test_mask_evm_address() {
        assert_eq!(
            mask_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39F…2266"
        );
    }

    #[test]
    fn test_mask_short_value_untouched() {
        assert_eq!(mask_address("Wallet1"), "Wallet1");
    }
}
