//! Packet observer
//!
//! Polls the indexer at a fixed interval until the transfer's packet shows
//! up or the retry budget runs out. Running out is a soft failure: the send
//! is already confirmed on Sepolia, only relaying is unconfirmed.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::hash::normalize_tx_hash;
use crate::indexer::PacketIndexer;

pub const DEFAULT_POLL_RETRIES: u32 = 50;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, PartialEq, Eq)]
enum PollState {
    Polling { attempt: u32 },
    Found(String),
    Exhausted,
}

pub struct PacketObserver {
    indexer: Arc<dyn PacketIndexer>,
    retries: u32,
    interval: Duration,
}

impl PacketObserver {
    pub fn new(indexer: Arc<dyn PacketIndexer>, retries: u32, interval: Duration) -> Self {
        Self {
            indexer,
            retries,
            interval,
        }
    }

    pub fn with_defaults(indexer: Arc<dyn PacketIndexer>) -> Self {
        Self::new(indexer, DEFAULT_POLL_RETRIES, DEFAULT_POLL_INTERVAL)
    }

    /// Packet hash once indexed, `None` after `retries` misses.
    ///
    /// Query errors count as misses. The interval is slept between attempts
    /// only, never after the last one.
    pub async fn await_packet(&self, tx_hash: &str) -> Option<String> {
        let tx_hash = normalize_tx_hash(tx_hash);
        let mut state = if self.retries == 0 {
            PollState::Exhausted
        } else {
            PollState::Polling { attempt: 1 }
        };

        loop {
            match state {
                PollState::Polling { attempt } => {
                    state = match self.indexer.packet_hash(&tx_hash).await {
                        Ok(Some(packet)) => PollState::Found(packet),
                        Ok(None) => {
                            debug!(tx_hash = %tx_hash, attempt, max = self.retries, "Packet not indexed yet");
                            self.next_state(attempt).await
                        }
                        Err(e) => {
                            warn!(tx_hash = %tx_hash, attempt, error = %e, "Indexer query failed");
                            self.next_state(attempt).await
                        }
                    };
                }
                PollState::Found(packet) => {
                    info!(tx_hash = %tx_hash, packet_hash = %packet, "Packet observed");
                    return Some(packet);
                }
                PollState::Exhausted => {
                    warn!(
                        tx_hash = %tx_hash,
                        retries = self.retries,
                        "Packet not observed within retry budget"
                    );
                    return None;
                }
            }
        }
    }

    async fn next_state(&self, attempt: u32) -> PollState {
        if attempt >= self.retries {
            return PollState::Exhausted;
        }
        tokio::time::sleep(self.interval).await;
        PollState::Polling {
            attempt: attempt + 1,
        }
    }
}
