//! Union Bridge Bot: repeated UCS03 token transfers out of Sepolia
//!
//! Sends small USDC transfers over the Union zkgm bridge to Babylon or
//! Holesky testnet and follows each one until its packet is indexed:
//!
//! - **Chain** - Sepolia RPC client with endpoint rotation (`chain`)
//! - **Instruction** - Typed zkgm batch/fungible-asset-order encoding (`instruction`)
//! - **Allowance** - One-time unlimited USDC approval for the bridge (`allowance`)
//! - **Submitter** - Salted, time-bounded `send` plus confirmation (`submitter`)
//! - **Observer** - Fixed-interval packet polling against the indexer (`observer`)
//! - **Pipeline / Runner** - One transfer end to end, and a run of them
//!
//! Status lines go out through a best-effort side channel (`reporter`).

pub mod allowance;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod destination;
pub mod error;
pub mod hash;
pub mod indexer;
pub mod instruction;
pub mod observer;
pub mod outcome;
pub mod pipeline;
pub mod redact;
pub mod reporter;
pub mod runner;
pub mod submitter;
pub mod wallet;

pub use allowance::{AllowanceCheck, AllowanceGuardian};
pub use chain::{ChainClient, Confirmation, EvmChainClient, RpcEndpoints};
pub use config::Config;
pub use destination::{Destination, DestinationChoice};
pub use error::{BridgeError, BridgeResult};
pub use indexer::{GraphqlIndexer, PacketIndexer};
pub use observer::PacketObserver;
pub use outcome::{ExplorerLinks, OutcomeStatus, RunSummary, SkipReason, TransferOutcome};
pub use pipeline::TransferPipeline;
pub use reporter::{LogReporter, ReportSink, StatusReporter, TelegramReporter};
pub use runner::Runner;
pub use submitter::{SubmissionEnvelope, TransferSubmitter};
pub use wallet::WalletIdentity;
