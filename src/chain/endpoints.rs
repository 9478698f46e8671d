//! Ordered RPC endpoint set with a rotating cursor

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;
use url::Url;

use crate::error::BridgeError;

/// Parse a comma-separated RPC URL string into individual trimmed URLs.
pub fn parse_rpc_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The endpoints a [`super::ChainClient`] talks to.
///
/// The cursor only moves through [`RpcEndpoints::rotate`]; callers decide when
/// a failure warrants it.
#[derive(Debug)]
pub struct RpcEndpoints {
    urls: Vec<Url>,
    cursor: AtomicUsize,
}

impl RpcEndpoints {
    pub fn new(urls: &[String]) -> Result<Self, BridgeError> {
        if urls.is_empty() {
            return Err(BridgeError::Configuration(
                "at least one RPC URL is required".to_string(),
            ));
        }
        let urls = urls
            .iter()
            .map(|url| {
                Url::parse(url)
                    .map_err(|e| BridgeError::Configuration(format!("invalid RPC URL {}: {}", url, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            urls,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Endpoint currently in use
    pub fn current(&self) -> Url {
        self.urls[self.cursor.load(Ordering::SeqCst) % self.urls.len()].clone()
    }

    /// Advance to the next endpoint (wrapping) and return it
    pub fn rotate(&self) -> Url {
        let len = self.urls.len();
        let prev = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some((c + 1) % len))
            .unwrap_or_default();
        let next = &self.urls[(prev + 1) % len];
        if len > 1 {
            warn!(from = %self.urls[prev % len], to = %next, "Rotating RPC endpoint");
        }
        next.clone()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
