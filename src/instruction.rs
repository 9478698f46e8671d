//! Instruction builder
//!
//! Turns (sender, destination, recipient) into the zkgm instruction passed to
//! `Ucs03Zkgm.send`. The payload is a batch (opcode 2) holding a single
//! fungible asset order (opcode 3). Only sender and recipient vary per call;
//! amounts, token and symbol come from [`OrderTemplate`].
//!
//! Building is pure: the same inputs always give byte-identical operands.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolType, SolValue};

use crate::contracts::{FungibleAssetOrder, Instruction, TOKEN_ADDRESS};
use crate::destination::{Destination, DestinationKind};
use crate::error::BridgeError;

/// Version of the outer batch instruction
pub const BATCH_VERSION: u8 = 0;
/// Opcode of the outer batch instruction
pub const OP_BATCH: u8 = 2;
/// Version of the inner fungible asset order
pub const FUNGIBLE_ASSET_ORDER_VERSION: u8 = 1;
/// Opcode of the inner fungible asset order
pub const OP_FUNGIBLE_ASSET_ORDER: u8 = 3;

/// Economic fields of an order that are fixed for the testnet route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTemplate {
    pub base_token: Address,
    pub base_amount: u128,
    pub base_token_symbol: &'static str,
    pub base_token_name: &'static str,
    pub base_token_decimals: u8,
    pub base_token_path: u128,
    /// Amount received on the destination; equal to `base_amount` means zero fee
    pub quote_amount: u128,
}

/// 0.01 USDC out of Sepolia, no fee
pub const SEPOLIA_USDC_ORDER: OrderTemplate = OrderTemplate {
    base_token: TOKEN_ADDRESS,
    base_amount: 10_000,
    base_token_symbol: "USDC",
    base_token_name: "USDC",
    base_token_decimals: 6,
    base_token_path: 0,
    quote_amount: 10_000,
};

impl OrderTemplate {
    /// Fill in the per-call fields and produce the order struct
    pub fn order(&self, sender: Address, receiver: Vec<u8>, quote_token: Vec<u8>) -> FungibleAssetOrder {
        FungibleAssetOrder {
            sender: Bytes::copy_from_slice(sender.as_slice()),
            receiver: Bytes::from(receiver),
            baseToken: Bytes::copy_from_slice(self.base_token.as_slice()),
            baseAmount: U256::from(self.base_amount),
            baseTokenSymbol: self.base_token_symbol.to_string(),
            baseTokenName: self.base_token_name.to_string(),
            baseTokenDecimals: self.base_token_decimals,
            baseTokenPath: U256::from(self.base_token_path),
            quoteToken: Bytes::from(quote_token),
            quoteAmount: U256::from(self.quote_amount),
        }
    }

    /// Fee taken by the route, in base token units
    pub fn fee(&self) -> u128 {
        self.base_amount.saturating_sub(self.quote_amount)
    }
}

/// A fully built instruction plus the routing data needed to submit it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub destination: Destination,
    pub channel_id: u32,
    pub version: u8,
    pub opcode: u8,
    pub operand: Bytes,
}

impl TransferInstruction {
    /// ABI struct for the `send` call
    pub fn to_call_arg(&self) -> Instruction {
        Instruction {
            version: self.version,
            opcode: self.opcode,
            operand: self.operand.clone(),
        }
    }
}

/// Resolve the recipient bytes for `destination`.
///
/// EVM targets default to the sender (self-transfer) and accept a hex address
/// override. Cosmos targets require a recipient; its UTF-8 bytes are used as is.
pub fn recipient_bytes(
    sender: Address,
    destination: Destination,
    recipient: Option<&str>,
) -> Result<Vec<u8>, BridgeError> {
    let recipient = recipient.map(str::trim).filter(|r| !r.is_empty());
    match destination.kind() {
        DestinationKind::Evm => match recipient {
            Some(r) => {
                let addr: Address = r.parse().map_err(|_| {
                    BridgeError::Configuration(format!("invalid EVM recipient '{}'", r))
                })?;
                Ok(addr.to_vec())
            }
            None => Ok(sender.to_vec()),
        },
        DestinationKind::Cosmos => recipient
            .map(|r| r.as_bytes().to_vec())
            .ok_or(BridgeError::MissingRecipient(destination)),
    }
}

/// Build the instruction for one transfer using the Sepolia USDC template.
pub fn build(
    sender: Address,
    destination: Destination,
    recipient: Option<&str>,
) -> Result<TransferInstruction, BridgeError> {
    build_with_template(&SEPOLIA_USDC_ORDER, sender, destination, recipient)
}

pub fn build_with_template(
    template: &OrderTemplate,
    sender: Address,
    destination: Destination,
    recipient: Option<&str>,
) -> Result<TransferInstruction, BridgeError> {
    let receiver = recipient_bytes(sender, destination, recipient)?;
    let order = template.order(sender, receiver, destination.quote_token());

    let inner = Instruction {
        version: FUNGIBLE_ASSET_ORDER_VERSION,
        opcode: OP_FUNGIBLE_ASSET_ORDER,
        operand: Bytes::from(<FungibleAssetOrder as SolType>::abi_encode_params(&order)),
    };
    let batch = <Vec<Instruction> as SolValue>::abi_encode(&vec![inner]);

    Ok(TransferInstruction {
        destination,
        channel_id: destination.channel_id(),
        version: BATCH_VERSION,
        opcode: OP_BATCH,
        operand: Bytes::from(batch),
    })
}
