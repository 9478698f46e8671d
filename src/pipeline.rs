//! Transfer pipeline
//!
//! One transfer, strictly in order: resolve recipient, allowance, send,
//! confirm, observe packet. Every exit path yields exactly one
//! [`TransferOutcome`] and one status line; nothing here returns an error.
//!
//! Skips are reserved for transfers where nothing was written: zero balance
//! or no recipient. A refused or reverted approval already cost a
//! transaction, so it is reported as `Failed` and counts against the run.

use tracing::{info, warn};

use crate::allowance::{AllowanceCheck, AllowanceGuardian};
use crate::destination::{Destination, DestinationKind};
use crate::error::BridgeError;
use crate::instruction;
use crate::observer::PacketObserver;
use crate::outcome::{ExplorerLinks, SkipReason, TransferOutcome};
use crate::reporter::ReportSink;
use crate::submitter::TransferSubmitter;
use crate::wallet::WalletIdentity;

pub struct TransferPipeline {
    guardian: AllowanceGuardian,
    submitter: TransferSubmitter,
    observer: PacketObserver,
    reports: ReportSink,
    links: ExplorerLinks,
}

/// Text used for a failed step. Revert reasons are passed through as is.
fn failure_reason(err: &BridgeError) -> String {
    match err {
        BridgeError::ChainRejected(reason) => reason.clone(),
        other => other.to_string(),
    }
}

impl TransferPipeline {
    pub fn new(
        guardian: AllowanceGuardian,
        submitter: TransferSubmitter,
        observer: PacketObserver,
        reports: ReportSink,
        links: ExplorerLinks,
    ) -> Self {
        Self {
            guardian,
            submitter,
            observer,
            reports,
            links,
        }
    }

    /// Run one transfer from `wallet` to `destination`
    pub async fn submit_transfer(
        &self,
        wallet: &WalletIdentity,
        destination: Destination,
    ) -> TransferOutcome {
        let outcome = self.run_steps(wallet, destination).await;

        let line = outcome.status_line(&self.links);
        info!(
            wallet = wallet.name(),
            destination = %destination,
            status = ?outcome.status,
            "{}",
            line
        );
        self.reports.send(line);

        outcome
    }

    async fn run_steps(&self, wallet: &WalletIdentity, destination: Destination) -> TransferOutcome {
        let name = wallet.name();
        let recipient = match destination.kind() {
            DestinationKind::Cosmos => wallet.babylon_address(),
            DestinationKind::Evm => None,
        };

        let instruction = match instruction::build(wallet.address(), destination, recipient) {
            Ok(ix) => ix,
            Err(BridgeError::MissingRecipient(_)) => {
                warn!(wallet = name, destination = %destination, "No recipient configured");
                return TransferOutcome::skipped(name, destination, SkipReason::MissingRecipient);
            }
            Err(e) => return TransferOutcome::failed(name, destination, None, failure_reason(&e)),
        };

        match self.guardian.check(wallet.address()).await {
            Ok(AllowanceCheck::InsufficientFunds) => {
                return TransferOutcome::skipped(name, destination, SkipReason::InsufficientFunds);
            }
            Ok(AllowanceCheck::ApprovalFailed(e)) => {
                let reason = format!("approval failed: {}", failure_reason(&e));
                return TransferOutcome::failed(name, destination, None, reason);
            }
            Ok(AllowanceCheck::Sufficient { .. }) | Ok(AllowanceCheck::Approved { .. }) => {}
            Err(e) => {
                let reason = format!("allowance check failed: {}", failure_reason(&e));
                return TransferOutcome::failed(name, destination, None, reason);
            }
        }

        let submitted = match self.submitter.submit(wallet, instruction).await {
            Ok(s) => s,
            Err(e) => return TransferOutcome::failed(name, destination, None, failure_reason(&e)),
        };

        if let Err(e) = &submitted.confirmation {
            return TransferOutcome::failed(
                name,
                destination,
                Some(submitted.tx_hash),
                failure_reason(e),
            );
        }

        let packet_hash = self
            .observer
            .await_packet(&submitted.tx_hash.to_string())
            .await;

        TransferOutcome::confirmed(name, destination, submitted.tx_hash, packet_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_keeps_revert_text() {
        assert_eq!(
            failure_reason(&BridgeError::ChainRejected("execution reverted: ErrOnlyMaker".into())),
            "execution reverted: ErrOnlyMaker"
        );
        assert_eq!(
            failure_reason(&BridgeError::Transport("connection refused".into())),
            "transport error: connection refused"
        );
    }
}
