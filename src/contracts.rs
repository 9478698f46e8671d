//! Contract ABI definitions for the Sepolia side of the bridge
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the UCS03
//! zkgm entry point, the USDC token it pulls from, and the instruction
//! payload structs encoded into `send`.

#![allow(clippy::too_many_arguments)]

use alloy::primitives::{address, Address};
use alloy::sol;

/// UCS03 zkgm bridge on Sepolia
pub const BRIDGE_ADDRESS: Address = address!("5FbE74A283f7954f10AA04C2eDf55578811aeb03");

/// USDC on Sepolia
pub const TOKEN_ADDRESS: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

sol! {
    /// A versioned zkgm instruction; `operand` is opcode-specific
    #[derive(Debug, PartialEq, Eq)]
    struct Instruction {
        uint8 version;
        uint8 opcode;
        bytes operand;
    }

    /// Operand of a fungible asset order (opcode 3, version 1)
    #[derive(Debug, PartialEq, Eq)]
    struct FungibleAssetOrder {
        bytes sender;
        bytes receiver;
        bytes baseToken;
        uint256 baseAmount;
        string baseTokenSymbol;
        string baseTokenName;
        uint8 baseTokenDecimals;
        uint256 baseTokenPath;
        bytes quoteToken;
        uint256 quoteAmount;
    }

    /// UCS03 zkgm entry point
    #[sol(rpc)]
    contract Ucs03Zkgm {
        /// Submit an instruction on `channelId`.
        /// `salt` must be unique per sender or the packet hash collides.
        function send(
            uint32 channelId,
            uint64 timeoutHeight,
            uint64 timeoutTimestamp,
            bytes32 salt,
            Instruction calldata instruction
        ) external;
    }

    /// Minimal ERC20 surface needed to fund a transfer
    #[sol(rpc)]
    contract ERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}
