//! Bot configuration
//!
//! Everything comes from the environment, optionally seeded from a `.env`
//! file. Missing signing key or RPC URL fails before any network call.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::chain::parse_rpc_urls;
use crate::destination::DestinationChoice;
use crate::error::BridgeError;
use crate::indexer::DEFAULT_GRAPHQL_ENDPOINT;
use crate::observer::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_RETRIES};
use crate::outcome::{DEFAULT_EXPLORER_URL, DEFAULT_UNION_EXPLORER_URL};
use crate::redact::{mask_address, Redacted};

/// Signing wallet settings
#[derive(Clone)]
pub struct WalletConfig {
    pub name: String,
    pub private_key: Redacted<String>,
    pub babylon_address: Option<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("name", &self.name)
            .field("private_key", &self.private_key)
            .field(
                "babylon_address",
                &self.babylon_address.as_deref().map(mask_address),
            )
            .finish()
    }
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: Redacted<String>,
    pub chat_id: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub wallet: WalletConfig,

    /// Sepolia RPC endpoints in rotation order
    pub rpc_urls: Vec<String>,

    pub destination: DestinationChoice,
    /// Number of transfers per run
    pub tx_count: u32,
    /// Pause between transfers
    pub tx_delay: Duration,

    pub packet_poll_retries: u32,
    pub packet_poll_interval: Duration,
    /// Pause after an approval confirms
    pub approve_settle: Duration,
    pub receipt_poll_interval: Duration,

    pub graphql_endpoint: String,
    pub explorer_url: String,
    pub union_explorer_url: String,

    /// Telegram reporting, when both token and chat id are set
    pub telegram: Option<TelegramConfig>,
}

fn required(key: &str) -> Result<String, BridgeError> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BridgeError::Configuration(format!("{} required", key)))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, BridgeError> {
    match optional(key) {
        Some(v) => v
            .parse()
            .map_err(|_| BridgeError::Configuration(format!("invalid {}: '{}'", key, v))),
        None => Ok(default),
    }
}

fn millis_or(key: &str, default: Duration) -> Result<Duration, BridgeError> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parsed_or(key, default_ms).map(Duration::from_millis)
}

impl Config {
    /// Load `.env` if present, then read the environment
    pub fn load() -> eyre::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }
        Ok(Self::load_from_env()?)
    }

    pub fn load_from_env() -> Result<Self, BridgeError> {
        let wallet = WalletConfig {
            name: optional("WALLET_NAME_1").unwrap_or_else(|| "Wallet1".to_string()),
            private_key: Redacted(required("PRIVATE_KEY_1")?),
            babylon_address: optional("BABYLON_ADDRESS_1"),
        };

        let rpc_urls = parse_rpc_urls(&required("RPC_URL_PRIV")?);
        if rpc_urls.is_empty() {
            return Err(BridgeError::Configuration("RPC_URL_PRIV has no URLs".into()));
        }

        let destination = match optional("DESTINATION") {
            Some(v) => v.parse()?,
            None => DestinationChoice::Random,
        };

        let telegram = match (optional("TELEGRAM_BOT_TOKEN"), optional("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                bot_token: Redacted(token),
                chat_id,
            }),
            _ => None,
        };

        Ok(Self {
            wallet,
            rpc_urls,
            destination,
            tx_count: parsed_or("TX_COUNT", 1)?,
            tx_delay: millis_or("TX_DELAY_MS", Duration::from_millis(1000))?,
            packet_poll_retries: parsed_or("PACKET_POLL_RETRIES", DEFAULT_POLL_RETRIES)?,
            packet_poll_interval: millis_or("PACKET_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL)?,
            approve_settle: millis_or("APPROVE_SETTLE_MS", Duration::from_millis(3000))?,
            receipt_poll_interval: millis_or("RECEIPT_POLL_INTERVAL_MS", Duration::from_millis(2000))?,
            graphql_endpoint: optional("GRAPHQL_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_GRAPHQL_ENDPOINT.to_string()),
            explorer_url: optional("EXPLORER_URL").unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string()),
            union_explorer_url: optional("UNION_EXPLORER_URL")
                .unwrap_or_else(|| DEFAULT_UNION_EXPLORER_URL.to_string()),
            telegram,
        })
    }
}
