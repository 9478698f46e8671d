//! Union Bridge Bot
//!
//! Loads one wallet from the environment, runs `TX_COUNT` transfers out of
//! Sepolia and exits 0 only when at least one transfer was confirmed and none
//! failed. Ctrl+C / SIGTERM stop the run without touching anything already
//! broadcast.

use std::process::ExitCode;
use std::sync::Arc;

use bridge_bot::chain::{ChainClient, EvmChainClient, RpcEndpoints};
use bridge_bot::config::Config;
use bridge_bot::contracts::{BRIDGE_ADDRESS, TOKEN_ADDRESS};
use bridge_bot::indexer::{GraphqlIndexer, PacketIndexer};
use bridge_bot::outcome::ExplorerLinks;
use bridge_bot::reporter::{LogReporter, ReportSink, StatusReporter, TelegramReporter};
use bridge_bot::{
    AllowanceGuardian, PacketObserver, Runner, TransferPipeline, TransferSubmitter, WalletIdentity,
};
use eyre::WrapErr;
use tracing::{info, warn};

fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<ExitCode> {
    init_logging();

    info!("Starting Union Bridge Bot");

    let config = Config::load()?;
    info!(
        wallet = %config.wallet.name,
        endpoints = config.rpc_urls.len(),
        destination = ?config.destination,
        tx_count = config.tx_count,
        "Configuration loaded"
    );

    let wallet = WalletIdentity::new(
        &config.wallet.name,
        config.wallet.private_key.expose(),
        config.wallet.babylon_address.as_deref(),
    )
    .wrap_err("Failed to load wallet")?;

    let endpoints = RpcEndpoints::new(&config.rpc_urls)?;
    let client: Arc<dyn ChainClient> = Arc::new(EvmChainClient::new(
        endpoints,
        &wallet,
        TOKEN_ADDRESS,
        BRIDGE_ADDRESS,
        config.receipt_poll_interval,
    ));

    let indexer: Arc<dyn PacketIndexer> = Arc::new(GraphqlIndexer::new(&config.graphql_endpoint)?);

    let reporter: Arc<dyn StatusReporter> = match &config.telegram {
        Some(telegram) => {
            info!(chat_id = %telegram.chat_id, "Reporting to Telegram");
            Arc::new(TelegramReporter::new(
                telegram.bot_token.expose().clone(),
                telegram.chat_id.clone(),
            ))
        }
        None => Arc::new(LogReporter),
    };
    let (reports, report_task) = ReportSink::spawn(reporter);

    let pipeline = TransferPipeline::new(
        AllowanceGuardian::new(client.clone(), config.approve_settle),
        TransferSubmitter::new(client),
        PacketObserver::new(indexer, config.packet_poll_retries, config.packet_poll_interval),
        reports,
        ExplorerLinks::new(&config.explorer_url, &config.union_explorer_url),
    );
    let runner = Runner::new(pipeline, wallet, config.destination, config.tx_delay);

    let summary = tokio::select! {
        summary = runner.run(config.tx_count) => summary,
        _ = wait_for_shutdown_signal() => {
            warn!("Run interrupted, broadcast transactions stay pending on-chain");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Let queued status lines go out before exiting
    drop(runner);
    if let Err(e) = report_task.await {
        warn!(error = %e, "Report task ended abnormally");
    }

    info!(%summary, "Union Bridge Bot finished");
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bridge_bot=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
