//! Transfer submitter
//!
//! Wraps an instruction in a time-bounded, salted envelope, broadcasts it to
//! the bridge and waits for one confirmation. The send itself is never
//! retried here; a new attempt is the runner's call and gets a fresh salt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::chain::{with_rotation, ChainClient, Confirmation};
use crate::error::{BridgeError, BridgeResult};
use crate::hash::{bytes32_to_hex, compute_salt};
use crate::instruction::TransferInstruction;
use crate::wallet::WalletIdentity;

/// Bridge-level timeout: 24h in nanoseconds
pub const TRANSFER_TIMEOUT_NANOS: u64 = 86_400_000_000_000;

/// Height-based timeouts are disabled
pub const TIMEOUT_HEIGHT: u64 = 0;

/// Everything `Ucs03Zkgm.send` takes. Lives for one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEnvelope {
    pub channel_id: u32,
    pub timeout_height: u64,
    pub timeout_timestamp: u64,
    pub salt: [u8; 32],
    pub instruction: TransferInstruction,
}

impl SubmissionEnvelope {
    /// Build an envelope at `now`, salting with `salt_secs` (unix seconds).
    pub fn new(
        sender: Address,
        instruction: TransferInstruction,
        now: DateTime<Utc>,
        salt_secs: u64,
    ) -> Self {
        let now_nanos = u64::try_from(now.timestamp_nanos_opt().unwrap_or_default()).unwrap_or(0);
        let sender: [u8; 20] = sender.into();

        Self {
            channel_id: instruction.channel_id,
            timeout_height: TIMEOUT_HEIGHT,
            timeout_timestamp: now_nanos.saturating_add(TRANSFER_TIMEOUT_NANOS),
            salt: compute_salt(&sender, salt_secs),
            instruction,
        }
    }
}

/// Hands out strictly increasing unix-second timestamps for salts.
///
/// Two submissions inside the same wall-clock second would otherwise share a
/// salt and the second one would be rejected as a duplicate packet.
#[derive(Debug, Default)]
pub struct SaltClock {
    last: AtomicU64,
}

impl SaltClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now_secs: u64) -> u64 {
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_secs.max(last.saturating_add(1)))
            })
            .unwrap_or_default();
        now_secs.max(prev.saturating_add(1))
    }
}

/// Result of a send that made it into the mempool
#[derive(Debug)]
pub struct Submitted {
    pub tx_hash: TxHash,
    /// `Err` when the transaction was broadcast but never confirmed
    pub confirmation: BridgeResult<Confirmation>,
}

impl Submitted {
    pub fn confirmed(&self) -> bool {
        self.confirmation.is_ok()
    }
}

pub struct TransferSubmitter {
    client: Arc<dyn ChainClient>,
    salts: SaltClock,
    confirmations: u64,
}

impl TransferSubmitter {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            client,
            salts: SaltClock::new(),
            confirmations: 1,
        }
    }

    /// Build the envelope for `instruction` as of now
    pub fn envelope(&self, wallet: &WalletIdentity, instruction: TransferInstruction) -> SubmissionEnvelope {
        let now = Utc::now();
        let salt_secs = self.salts.next(u64::try_from(now.timestamp()).unwrap_or(0));
        SubmissionEnvelope::new(wallet.address(), instruction, now, salt_secs)
    }

    /// Broadcast and wait for inclusion.
    ///
    /// `Err` means nothing was broadcast (or the node refused it). A revert
    /// reason from the node is passed through unmodified.
    pub async fn submit(
        &self,
        wallet: &WalletIdentity,
        instruction: TransferInstruction,
    ) -> BridgeResult<Submitted> {
        let envelope = self.envelope(wallet, instruction);
        info!(
            wallet = wallet.name(),
            destination = %envelope.instruction.destination,
            channel_id = envelope.channel_id,
            salt = %bytes32_to_hex(&envelope.salt),
            "Submitting bridge transfer"
        );

        let tx_hash = self.client.send(&envelope).await?;

        let client = self.client.as_ref();
        let confirmations = self.confirmations;
        let confirmation = with_rotation(client, "wait_for_confirmation", move || {
            client.wait_for_confirmation(tx_hash, confirmations)
        })
        .await;

        match &confirmation {
            Ok(c) => info!(tx_hash = %tx_hash, block = c.block_number, "Transfer confirmed"),
            Err(BridgeError::ChainRejected(reason)) => {
                warn!(tx_hash = %tx_hash, reason = %reason, "Transfer reverted on-chain")
            }
            Err(e) => warn!(tx_hash = %tx_hash, error = %e, "Transfer confirmation unavailable"),
        }

        Ok(Submitted {
            tx_hash,
            confirmation,
        })
    }
}
