//! Chain client facade over the Sepolia RPC endpoints
//!
//! Exposes typed reads (balance, allowance) and writes (approve, send) against
//! the two known contracts, plus receipt waiting. Transport failures never
//! retry internally: callers use [`with_rotation`] for idempotent calls and
//! simply fail writes.

use std::future::Future;

use alloy::primitives::{Address, TxHash, U256};
use alloy::transports::TransportError;
use async_trait::async_trait;
use tracing::warn;

use crate::error::{BridgeError, BridgeResult};
use crate::submitter::SubmissionEnvelope;

pub mod endpoints;
pub mod evm;

pub use endpoints::{parse_rpc_urls, RpcEndpoints};
pub use evm::EvmChainClient;

/// Receipt data once a transaction is included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Bridge contract that must hold the allowance
    fn bridge(&self) -> Address;

    async fn token_balance(&self, owner: Address) -> BridgeResult<U256>;

    async fn token_allowance(&self, owner: Address, spender: Address) -> BridgeResult<U256>;

    /// Broadcast `approve(spender, amount)`; returns once the node accepted it
    async fn approve(&self, spender: Address, amount: U256) -> BridgeResult<TxHash>;

    /// Broadcast the bridge `send`; returns once the node accepted it
    async fn send(&self, envelope: &SubmissionEnvelope) -> BridgeResult<TxHash>;

    /// Block until `tx_hash` has `confirmations` blocks on top (1 = included)
    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> BridgeResult<Confirmation>;

    /// Endpoint currently in use
    fn current_endpoint(&self) -> String;

    /// Move to the next endpoint and return it
    fn rotate_endpoint(&self) -> String;

    fn endpoint_count(&self) -> usize;
}

/// Run an idempotent call, rotating to the next endpoint on transport errors.
///
/// Tries each configured endpoint at most once. Any non-transport result is
/// returned immediately.
pub async fn with_rotation<C, T, F, Fut>(client: &C, what: &str, mut op: F) -> BridgeResult<T>
where
    C: ChainClient + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = BridgeResult<T>>,
{
    let attempts = client.endpoint_count().max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match op().await {
            Err(e) if e.is_transport() => {
                warn!(
                    call = what,
                    attempt,
                    max = attempts,
                    endpoint = %client.current_endpoint(),
                    error = %e,
                    "RPC transport failure"
                );
                client.rotate_endpoint();
                last_error = Some(e);
            }
            other => return other,
        }
    }

    Err(last_error.unwrap_or_else(|| BridgeError::Transport(format!("{}: no endpoints", what))))
}

/// JSON-RPC error messages that mean "try another node" rather than "rejected"
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("timeout")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("503")
        || lower.contains("502")
        || lower.contains("temporarily unavailable")
        || lower.contains("header not found")
}

/// JSON-RPC code for "execution reverted"
pub const CODE_EXECUTION_REVERTED: i64 = 3;

/// Error codes providers use for throttling and overload
const TRANSIENT_CODES: &[i64] = &[429, 502, 503, -32005, -32098, -32099];

/// Whether a JSON-RPC error response is worth retrying on another endpoint.
///
/// Reverts are never transient, whatever their reason says. The message is
/// only consulted for generic server errors that carry no specific code.
pub fn is_transient_response(code: i64, message: &str) -> bool {
    if code == CODE_EXECUTION_REVERTED || message.trim_start().starts_with("execution reverted") {
        return false;
    }
    TRANSIENT_CODES.contains(&code) || is_transient_message(message)
}

/// Split an alloy transport error into `Transport` vs `ChainRejected`.
///
/// A JSON-RPC error response means the node processed the call; its message
/// (e.g. `execution reverted: ...`) is kept verbatim.
pub fn classify_transport_error(what: &str, err: &TransportError) -> BridgeError {
    match err.as_error_resp() {
        Some(payload) if !is_transient_response(payload.code, &payload.message) => {
            BridgeError::ChainRejected(payload.message.to_string())
        }
        _ => BridgeError::Transport(format!("{}: {}", what, err)),
    }
}

/// Same as [`classify_transport_error`] for contract call errors
pub fn classify_contract_error(what: &str, err: &alloy::contract::Error) -> BridgeError {
    match err {
        alloy::contract::Error::TransportError(inner) => classify_transport_error(what, inner),
        other => BridgeError::ChainRejected(format!("{}: {}", what, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn error_response(code: i64, message: &str) -> TransportError {
        let payload = serde_json::json!({ "code": code, "message": message });
        TransportError::ErrorResp(serde_json::from_value(payload).unwrap())
    }

    /// Endpoint cursor plus a scripted result per endpoint index
    struct ScriptedEndpoints {
        cursor: AtomicUsize,
        results: Vec<BridgeResult<u64>>,
        attempts: Mutex<Vec<usize>>,
    }

    impl ScriptedEndpoints {
        fn new(results: Vec<BridgeResult<u64>>) -> Self {
            Self {
                cursor: AtomicUsize::new(0),
                results,
                attempts: Mutex::new(Vec::new()),
            }
        }

        async fn read(&self) -> BridgeResult<u64> {
            let at = self.cursor.load(Ordering::SeqCst);
            self.attempts.lock().unwrap().push(at);
            self.results[at].clone()
        }

        fn attempts(&self) -> Vec<usize> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChainClient for ScriptedEndpoints {
        fn bridge(&self) -> Address {
            Address::ZERO
        }

        async fn token_balance(&self, _owner: Address) -> BridgeResult<U256> {
            self.read().await.map(U256::from)
        }

        async fn token_allowance(&self, _owner: Address, _spender: Address) -> BridgeResult<U256> {
            self.read().await.map(U256::from)
        }

        async fn approve(&self, _spender: Address, _amount: U256) -> BridgeResult<TxHash> {
            Err(BridgeError::ChainRejected("read-only".into()))
        }

        async fn send(&self, _envelope: &SubmissionEnvelope) -> BridgeResult<TxHash> {
            Err(BridgeError::ChainRejected("read-only".into()))
        }

        async fn wait_for_confirmation(
            &self,
            tx_hash: TxHash,
            _confirmations: u64,
        ) -> BridgeResult<Confirmation> {
            Ok(Confirmation {
                tx_hash,
                block_number: 1,
            })
        }

        fn current_endpoint(&self) -> String {
            format!("rpc-{}", self.cursor.load(Ordering::SeqCst))
        }

        fn rotate_endpoint(&self) -> String {
            let len = self.results.len();
            let next = (self.cursor.load(Ordering::SeqCst) + 1) % len;
            self.cursor.store(next, Ordering::SeqCst);
            format!("rpc-{}", next)
        }

        fn endpoint_count(&self) -> usize {
            self.results.len()
        }
    }

    #[tokio::test]
    async fn test_rotation_recovers_on_next_endpoint() {
        let client = ScriptedEndpoints::new(vec![
            Err(BridgeError::Transport("connection refused".into())),
            Ok(5),
            Ok(9),
        ]);

        let value = with_rotation(&client, "balanceOf", || client.read()).await;

        assert_eq!(value, Ok(5));
        assert_eq!(client.attempts(), vec![0, 1]);
        assert_eq!(client.current_endpoint(), "rpc-1");
    }

    #[tokio::test]
    async fn test_rotation_gives_up_after_every_endpoint() {
        let client = ScriptedEndpoints::new(vec![
            Err(BridgeError::Transport("a down".into())),
            Err(BridgeError::Transport("b down".into())),
            Err(BridgeError::Transport("c down".into())),
        ]);

        let err = with_rotation(&client, "balanceOf", || client.read())
            .await
            .unwrap_err();

        assert_eq!(err, BridgeError::Transport("c down".into()));
        assert_eq!(client.attempts(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_rejection_returns_without_rotating() {
        let client = ScriptedEndpoints::new(vec![
            Err(BridgeError::ChainRejected("execution reverted".into())),
            Ok(5),
        ]);

        let err = with_rotation(&client, "allowance", || client.read())
            .await
            .unwrap_err();

        assert_eq!(err, BridgeError::ChainRejected("execution reverted".into()));
        assert_eq!(client.attempts(), vec![0]);
        assert_eq!(client.current_endpoint(), "rpc-0");
    }

    #[test]
    fn test_revert_mentioning_timeout_is_rejected_verbatim() {
        let err = error_response(3, "execution reverted: ErrTimeoutMustBeSet");
        assert_eq!(
            classify_transport_error("send", &err),
            BridgeError::ChainRejected("execution reverted: ErrTimeoutMustBeSet".into())
        );

        // Some nodes report reverts under the generic server error code
        let err = error_response(-32000, "execution reverted: ErrTimeoutHeightUnsupported");
        assert!(matches!(
            classify_transport_error("send", &err),
            BridgeError::ChainRejected(_)
        ));
    }

    #[test]
    fn test_throttling_responses_are_transport() {
        assert!(classify_transport_error("send", &error_response(429, "Too Many Requests")).is_transport());
        assert!(classify_transport_error("send", &error_response(-32005, "limit exceeded")).is_transport());
        assert!(classify_transport_error("send", &error_response(-32000, "header not found")).is_transport());
    }

    #[test]
    fn test_other_error_responses_are_rejected() {
        assert_eq!(
            classify_transport_error("send", &error_response(-32000, "nonce too low")),
            BridgeError::ChainRejected("nonce too low".into())
        );
    }

    #[test]
    fn test_transient_messages() {
        assert!(is_transient_message("request timeout"));
        assert!(is_transient_message("Too Many Requests"));
        assert!(is_transient_message("503 Service Unavailable"));
        assert!(!is_transient_message("execution reverted"));
        assert!(!is_transient_message("nonce too low"));
    }

    #[test]
    fn test_transport_kind_is_transport() {
        let err = alloy::transports::TransportErrorKind::custom_str("connection refused");
        assert!(classify_transport_error("balanceOf", &err).is_transport());
    }
}
