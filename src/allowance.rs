//! Allowance guardian
//!
//! Makes sure the bridge may pull the wallet's USDC before a send. Approves
//! `U256::MAX` once and reuses it; a new approval is only sent when the
//! remaining allowance drops below the wallet balance.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use tracing::{debug, info, warn};

use crate::chain::{with_rotation, ChainClient};
use crate::error::{BridgeError, BridgeResult};

/// What the guardian found (and did) for one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowanceCheck {
    /// Existing allowance covers the balance; nothing sent
    Sufficient { allowance: U256 },
    /// Approval sent and confirmed
    Approved { tx_hash: TxHash },
    /// Zero balance; nothing sent
    InsufficientFunds,
    /// Approval broadcast failed, reverted or never confirmed
    ApprovalFailed(BridgeError),
}

impl AllowanceCheck {
    /// Whether the transfer may proceed
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            AllowanceCheck::Sufficient { .. } | AllowanceCheck::Approved { .. }
        )
    }
}

pub struct AllowanceGuardian {
    client: Arc<dyn ChainClient>,
    settle_delay: Duration,
}

impl AllowanceGuardian {
    /// `settle_delay` is slept after an approval confirms so lagging nodes
    /// see the new allowance before the send is estimated.
    pub fn new(client: Arc<dyn ChainClient>, settle_delay: Duration) -> Self {
        Self {
            client,
            settle_delay,
        }
    }

    /// Inspect balance and allowance for `owner`, approving if needed.
    ///
    /// `Err` only when a read failed on every endpoint.
    pub async fn check(&self, owner: Address) -> BridgeResult<AllowanceCheck> {
        let client = self.client.as_ref();
        let spender = client.bridge();

        let balance = with_rotation(client, "balanceOf", move || client.token_balance(owner)).await?;
        if balance.is_zero() {
            warn!(owner = %owner, "Wallet has no USDC, fund it first");
            return Ok(AllowanceCheck::InsufficientFunds);
        }

        let allowance = with_rotation(client, "allowance", move || {
            client.token_allowance(owner, spender)
        })
        .await?;

        if allowance >= balance {
            debug!(%balance, %allowance, "Allowance sufficient");
            return Ok(AllowanceCheck::Sufficient { allowance });
        }

        info!(%balance, %allowance, spender = %spender, "Allowance below balance, approving");

        let tx_hash = match client.approve(spender, U256::MAX).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "Approve failed");
                return Ok(AllowanceCheck::ApprovalFailed(e));
            }
        };

        let confirmed = with_rotation(client, "wait_for_confirmation", move || {
            client.wait_for_confirmation(tx_hash, 1)
        })
        .await;

        if let Err(e) = confirmed {
            warn!(tx_hash = %tx_hash, error = %e, "Approve not confirmed");
            return Ok(AllowanceCheck::ApprovalFailed(e));
        }

        info!(tx_hash = %tx_hash, "Approve confirmed");
        tokio::time::sleep(self.settle_delay).await;

        Ok(AllowanceCheck::Approved { tx_hash })
    }

    /// `true` when the transfer may proceed. Failures are logged, not raised.
    pub async fn ensure_allowance(&self, owner: Address) -> bool {
        match self.check(owner).await {
            Ok(check) => check.is_ready(),
            Err(e) => {
                warn!(owner = %owner, error = %e, "Allowance check failed");
                false
            }
        }
    }
}
