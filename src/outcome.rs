//! Per-transfer outcome records and the run summary

use std::fmt;

use alloy::primitives::TxHash;

use crate::destination::Destination;

pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";
pub const DEFAULT_UNION_EXPLORER_URL: &str = "https://app.union.build/explorer";

/// Base URLs for the links in status lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerLinks {
    pub explorer_url: String,
    pub union_explorer_url: String,
}

impl Default for ExplorerLinks {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLORER_URL, DEFAULT_UNION_EXPLORER_URL)
    }
}

impl ExplorerLinks {
    pub fn new(explorer_url: &str, union_explorer_url: &str) -> Self {
        Self {
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            union_explorer_url: union_explorer_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn tx(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }

    pub fn packet(&self, packet_hash: &str) -> String {
        format!("{}/transfers/{}", self.union_explorer_url, packet_hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientFunds,
    MissingRecipient,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientFunds => f.write_str("insufficient funds"),
            SkipReason::MissingRecipient => f.write_str("missing recipient"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Confirmed on Sepolia and the packet was indexed
    Delivered,
    /// Confirmed on Sepolia, packet not seen within the poll budget
    Unobserved,
    /// Nothing was sent
    Skipped(SkipReason),
    /// Approve or send failed, reverted or never confirmed
    Failed(String),
}

/// Terminal state of one transfer attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub wallet: String,
    pub destination: Destination,
    pub tx_hash: Option<TxHash>,
    pub confirmed: bool,
    pub packet_hash: Option<String>,
    pub status: OutcomeStatus,
}

impl TransferOutcome {
    pub fn skipped(wallet: &str, destination: Destination, reason: SkipReason) -> Self {
        Self {
            wallet: wallet.to_string(),
            destination,
            tx_hash: None,
            confirmed: false,
            packet_hash: None,
            status: OutcomeStatus::Skipped(reason),
        }
    }

    pub fn failed(
        wallet: &str,
        destination: Destination,
        tx_hash: Option<TxHash>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            wallet: wallet.to_string(),
            destination,
            tx_hash,
            confirmed: false,
            packet_hash: None,
            status: OutcomeStatus::Failed(reason.into()),
        }
    }

    /// Confirmed send; delivered when a packet hash is known
    pub fn confirmed(
        wallet: &str,
        destination: Destination,
        tx_hash: TxHash,
        packet_hash: Option<String>,
    ) -> Self {
        let status = if packet_hash.is_some() {
            OutcomeStatus::Delivered
        } else {
            OutcomeStatus::Unobserved
        };
        Self {
            wallet: wallet.to_string(),
            destination,
            tx_hash: Some(tx_hash),
            confirmed: true,
            packet_hash,
            status,
        }
    }

    /// The one human-readable line for this outcome
    pub fn status_line(&self, links: &ExplorerLinks) -> String {
        let prefix = format!("[{}] Sepolia → {}", self.wallet, self.destination);
        match &self.status {
            OutcomeStatus::Delivered => {
                let tx = self.tx_hash.map(|h| links.tx(&h)).unwrap_or_default();
                let packet = self
                    .packet_hash
                    .as_deref()
                    .map(|p| links.packet(p))
                    .unwrap_or_default();
                format!("✅ {}: delivered. Tx: {} Packet: {}", prefix, tx, packet)
            }
            OutcomeStatus::Unobserved => {
                let tx = self.tx_hash.map(|h| links.tx(&h)).unwrap_or_default();
                format!(
                    "⚠️ {}: confirmed, packet not indexed yet. Tx: {}",
                    prefix, tx
                )
            }
            OutcomeStatus::Skipped(reason) => format!("⏭️ {}: skipped, {}", prefix, reason),
            OutcomeStatus::Failed(reason) => match self.tx_hash {
                Some(h) => format!("❌ {}: failed, {}. Tx: {}", prefix, reason, links.tx(&h)),
                None => format!("❌ {}: failed, {}", prefix, reason),
            },
        }
    }
}

/// Tally of a run, used for the exit status
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: u32,
    pub unobserved: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &TransferOutcome) {
        match outcome.status {
            OutcomeStatus::Delivered => self.delivered += 1,
            OutcomeStatus::Unobserved => self.unobserved += 1,
            OutcomeStatus::Skipped(_) => self.skipped += 1,
            OutcomeStatus::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.delivered + self.unobserved + self.skipped + self.failed
    }

    /// At least one confirmed transfer and no failures
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.delivered + self.unobserved > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} transfers: {} delivered, {} unobserved, {} skipped, {} failed",
            self.total(),
            self.delivered,
            self.unobserved,
            self.skipped,
            self.failed
        )
    }
}
