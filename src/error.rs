//! Error taxonomy for the transfer pipeline
//!
//! Only `Configuration` is fatal to a run. Everything else is caught at the
//! per-transfer boundary and folded into a [`crate::outcome::TransferOutcome`].

use thiserror::Error;

use crate::destination::Destination;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// Missing or malformed key, URL or address. Aborts before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Zero token balance. Skips the transfer.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Non-EVM destination without a configured recipient. Skips the transfer.
    #[error("missing recipient address for {0}")]
    MissingRecipient(Destination),

    /// Endpoint unreachable, timed out or returned something that is not JSON-RPC.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node executed the call and it reverted (or the receipt says failed).
    #[error("chain rejected: {0}")]
    ChainRejected(String),
}

impl BridgeError {
    /// Whether rotating to another endpoint and trying again can help
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_))
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
