//! Supported bridge destinations out of Sepolia
//!
//! Each destination fixes the UCS03 channel, how the recipient is derived and
//! which token the receiving chain mints for the transferred USDC.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{address, Address};
use rand::Rng;

use crate::error::BridgeError;

/// USDC cw20 contract on Babylon testnet
pub const BABYLON_QUOTE_TOKEN: &str =
    "bbn1zsrv23akkgxdnwul72sftgv2xjt5khsnt3wwjhp0ffh683hzp5aq5a0h6n";

/// Wrapped USDC on Holesky
pub const HOLESKY_QUOTE_TOKEN: Address = address!("57978Bfe465ad9B1c0bf80f6c1539d300705EA50");

/// Address family of the receiving chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// Recipient is a 20-byte EVM address; defaults to the sender
    Evm,
    /// Recipient is a bech32 string; must be configured
    Cosmos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Babylon,
    Holesky,
}

impl Destination {
    pub const ALL: [Destination; 2] = [Destination::Babylon, Destination::Holesky];

    pub fn kind(&self) -> DestinationKind {
        match self {
            Destination::Babylon => DestinationKind::Cosmos,
            Destination::Holesky => DestinationKind::Evm,
        }
    }

    /// UCS03 channel on the Sepolia side
    pub fn channel_id(&self) -> u32 {
        match self {
            Destination::Babylon => 7,
            Destination::Holesky => 8,
        }
    }

    /// Token identifier on the destination chain, as raw bytes for the order
    pub fn quote_token(&self) -> Vec<u8> {
        match self {
            Destination::Babylon => BABYLON_QUOTE_TOKEN.as_bytes().to_vec(),
            Destination::Holesky => HOLESKY_QUOTE_TOKEN.to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Destination::Babylon => "Babylon",
            Destination::Holesky => "Holesky",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Destination {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "babylon" => Ok(Destination::Babylon),
            "holesky" => Ok(Destination::Holesky),
            other => Err(BridgeError::Configuration(format!(
                "unknown destination '{}'",
                other
            ))),
        }
    }
}

/// How the runner picks the destination of each transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationChoice {
    Fixed(Destination),
    Random,
}

impl DestinationChoice {
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Destination {
        match self {
            DestinationChoice::Fixed(d) => *d,
            DestinationChoice::Random => Destination::ALL[rng.gen_range(0..Destination::ALL.len())],
        }
    }
}

impl FromStr for DestinationChoice {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(DestinationChoice::Random);
        }
        s.parse().map(DestinationChoice::Fixed)
    }
}
