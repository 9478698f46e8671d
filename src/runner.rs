//! Run orchestration: `count` sequential transfers for one wallet

use std::time::Duration;

use tracing::info;

use crate::destination::{Destination, DestinationChoice};
use crate::outcome::RunSummary;
use crate::pipeline::TransferPipeline;
use crate::wallet::WalletIdentity;

pub struct Runner {
    pipeline: TransferPipeline,
    wallet: WalletIdentity,
    choice: DestinationChoice,
    delay: Duration,
}

impl Runner {
    pub fn new(
        pipeline: TransferPipeline,
        wallet: WalletIdentity,
        choice: DestinationChoice,
        delay: Duration,
    ) -> Self {
        Self {
            pipeline,
            wallet,
            choice,
            delay,
        }
    }

    fn next_destination(&self) -> Destination {
        // ThreadRng is !Send, keep it out of the await points
        let mut rng = rand::thread_rng();
        self.choice.pick(&mut rng)
    }

    pub async fn run(&self, count: u32) -> RunSummary {
        let mut summary = RunSummary::default();

        for i in 1..=count {
            let destination = self.next_destination();
            info!(
                wallet = self.wallet.name(),
                transfer = i,
                of = count,
                destination = %destination,
                "Starting transfer"
            );

            let outcome = self.pipeline.submit_transfer(&self.wallet, destination).await;
            summary.record(&outcome);

            if i < count {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(wallet = self.wallet.name(), %summary, "Run finished");
        summary
    }
}
