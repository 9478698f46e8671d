//! Alloy-backed chain client for Sepolia
//!
//! # Transaction Building
//!
//! Writes use `ProviderBuilder::with_recommended_fillers()` so nonce, gas limit
//! and EIP-1559 fees are populated automatically. A provider is built per call
//! against the endpoint the cursor currently points at, so a rotation takes
//! effect on the very next call.

use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, FixedBytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{classify_contract_error, classify_transport_error, ChainClient, Confirmation, RpcEndpoints};
use crate::contracts::{Ucs03Zkgm, ERC20};
use crate::error::{BridgeError, BridgeResult};
use crate::hash::bytes32_to_hex;
use crate::submitter::SubmissionEnvelope;
use crate::wallet::WalletIdentity;

pub struct EvmChainClient {
    endpoints: RpcEndpoints,
    wallet: EthereumWallet,
    token: Address,
    bridge: Address,
    receipt_poll_interval: Duration,
}

impl EvmChainClient {
    pub fn new(
        endpoints: RpcEndpoints,
        identity: &WalletIdentity,
        token: Address,
        bridge: Address,
        receipt_poll_interval: Duration,
    ) -> Self {
        info!(
            sender = %identity.masked_address(),
            token = %token,
            bridge = %bridge,
            endpoints = endpoints.len(),
            "EVM chain client initialized"
        );

        Self {
            endpoints,
            wallet: EthereumWallet::from(identity.signer().clone()),
            token,
            bridge,
            receipt_poll_interval,
        }
    }

    /// Rotate after a failed write so the next attempt lands elsewhere
    fn write_failed(&self, err: BridgeError) -> BridgeError {
        if err.is_transport() {
            self.endpoints.rotate();
        }
        err
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn bridge(&self) -> Address {
        self.bridge
    }

    async fn token_balance(&self, owner: Address) -> BridgeResult<U256> {
        let provider = ProviderBuilder::new().on_http(self.endpoints.current());
        let contract = ERC20::new(self.token, &provider);
        let balance = contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| classify_contract_error("balanceOf", &e))?;
        Ok(balance._0)
    }

    async fn token_allowance(&self, owner: Address, spender: Address) -> BridgeResult<U256> {
        let provider = ProviderBuilder::new().on_http(self.endpoints.current());
        let contract = ERC20::new(self.token, &provider);
        let allowance = contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| classify_contract_error("allowance", &e))?;
        Ok(allowance._0)
    }

    async fn approve(&self, spender: Address, amount: U256) -> BridgeResult<TxHash> {
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet.clone())
            .on_http(self.endpoints.current());
        let contract = ERC20::new(self.token, &provider);

        let pending_tx = contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| self.write_failed(classify_contract_error("approve", &e)))?;

        let tx_hash = *pending_tx.tx_hash();
        info!(tx_hash = %tx_hash, spender = %spender, "Approve transaction sent");
        Ok(tx_hash)
    }

    async fn send(&self, envelope: &SubmissionEnvelope) -> BridgeResult<TxHash> {
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet.clone())
            .on_http(self.endpoints.current());
        let contract = Ucs03Zkgm::new(self.bridge, &provider);

        debug!(
            channel_id = envelope.channel_id,
            timeout_timestamp = envelope.timeout_timestamp,
            salt = %bytes32_to_hex(&envelope.salt),
            "Submitting send"
        );

        let pending_tx = contract
            .send(
                envelope.channel_id,
                envelope.timeout_height,
                envelope.timeout_timestamp,
                FixedBytes::from(envelope.salt),
                envelope.instruction.to_call_arg(),
            )
            .send()
            .await
            .map_err(|e| self.write_failed(classify_contract_error("send", &e)))?;

        let tx_hash = *pending_tx.tx_hash();
        info!(tx_hash = %tx_hash, "Bridge send transaction sent");
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> BridgeResult<Confirmation> {
        let confirmations = confirmations.max(1);

        loop {
            let provider = ProviderBuilder::new().on_http(self.endpoints.current());
            let receipt = provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| classify_transport_error("eth_getTransactionReceipt", &e))?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(BridgeError::ChainRejected(format!(
                        "transaction {} reverted",
                        tx_hash
                    )));
                }

                let block_number = receipt.block_number.unwrap_or_default();
                if confirmations == 1 {
                    return Ok(Confirmation {
                        tx_hash,
                        block_number,
                    });
                }

                let head = provider
                    .get_block_number()
                    .await
                    .map_err(|e| classify_transport_error("eth_blockNumber", &e))?;
                if head.saturating_sub(block_number) + 1 >= confirmations {
                    return Ok(Confirmation {
                        tx_hash,
                        block_number,
                    });
                }
                debug!(tx_hash = %tx_hash, head, block_number, "Waiting for more confirmations");
            }

            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    fn current_endpoint(&self) -> String {
        self.endpoints.current().to_string()
    }

    fn rotate_endpoint(&self) -> String {
        self.endpoints.rotate().to_string()
    }

    fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{BRIDGE_ADDRESS, TOKEN_ADDRESS};

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn identity() -> WalletIdentity {
        WalletIdentity::new("Wallet1", KEY, None).unwrap()
    }

    fn client(urls: &[&str]) -> EvmChainClient {
        let urls: Vec<String> = urls.iter().map(|u| u.to_string()).collect();
        let identity = identity();
        EvmChainClient::new(
            RpcEndpoints::new(&urls).unwrap(),
            &identity,
            TOKEN_ADDRESS,
            BRIDGE_ADDRESS,
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_client_exposes_contracts() {
        let client = client(&["http://localhost:8545"]);
        assert_eq!(client.bridge(), BRIDGE_ADDRESS);
        assert_eq!(client.endpoint_count(), 1);
    }

    #[test]
    fn test_rotate_endpoint() {
        let client = client(&["http://localhost:8545", "http://localhost:8546"]);
        assert_eq!(client.current_endpoint(), "http://localhost:8545/");
        assert_eq!(client.rotate_endpoint(), "http://localhost:8546/");
        assert_eq!(client.current_endpoint(), "http://localhost:8546/");
    }

    #[test]
    fn test_transport_write_failure_rotates() {
        let client = client(&["http://localhost:8545", "http://localhost:8546"]);
        let err = client.write_failed(BridgeError::Transport("connection refused".into()));
        assert!(err.is_transport());
        assert_eq!(client.current_endpoint(), "http://localhost:8546/");

        client.write_failed(BridgeError::ChainRejected("execution reverted".into()));
        assert_eq!(client.current_endpoint(), "http://localhost:8546/");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is closed on loopback
        let client = client(&["http://127.0.0.1:9"]);
        let err = client.token_balance(identity().address()).await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }
}
