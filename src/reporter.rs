//! Outcome reporting side channel
//!
//! Status lines are pushed onto an unbounded queue and delivered by a
//! background task. The pipeline never awaits delivery, and a failing
//! reporter only produces a warning.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::WrapErr;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::redact::Redacted;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn report(&self, message: &str) -> eyre::Result<()>;
}

/// Writes status lines to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

#[async_trait]
impl StatusReporter for LogReporter {
    async fn report(&self, message: &str) -> eyre::Result<()> {
        info!(target: "bridge_bot::status", "{}", message);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends status lines to a Telegram chat through the Bot API
pub struct TelegramReporter {
    api_base: String,
    token: Redacted<String>,
    chat_id: String,
    client: Client,
}

impl TelegramReporter {
    pub fn new(token: String, chat_id: String) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, token, chat_id)
    }

    pub fn with_api_base(api_base: &str, token: String, chat_id: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: Redacted(token),
            chat_id,
            client: Client::new(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token.expose())
    }
}

impl std::fmt::Debug for TelegramReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramReporter")
            .field("api_base", &self.api_base)
            .field("token", &self.token)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl StatusReporter for TelegramReporter {
    async fn report(&self, message: &str) -> eyre::Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .wrap_err("Telegram request failed")?;

        let status = response.status();
        if !status.is_success() {
            eyre::bail!("Telegram returned {}", status);
        }
        Ok(())
    }
}

/// Non-blocking handle onto the reporter task
#[derive(Debug, Clone)]
pub struct ReportSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ReportSink {
    /// Spawn the delivery task. It ends once every sink clone is dropped and
    /// the queue is drained.
    pub fn spawn(reporter: Arc<dyn StatusReporter>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = reporter.report(&message).await {
                    warn!(error = %e, "Status report delivery failed");
                }
            }
            debug!("Report queue closed");
        });

        (Self { tx }, handle)
    }

    /// Queue a status line; never waits
    pub fn send(&self, message: impl Into<String>) {
        if self.tx.send(message.into()).is_err() {
            warn!("Report task gone, dropping status line");
        }
    }
}
