//! Live testnet checks
//!
//! Run with: cargo test --test integration_test -- --ignored --nocapture
//!
//! Prerequisites:
//! - RPC_URL_PRIV pointing at Sepolia
//! - Outbound HTTPS to the Union GraphQL indexer
//! - PRIVATE_KEY_1 for the read-only wallet checks (no transactions are sent)

use std::time::Duration;

use bridge_bot::chain::{parse_rpc_urls, ChainClient, EvmChainClient, RpcEndpoints};
use bridge_bot::contracts::{BRIDGE_ADDRESS, TOKEN_ADDRESS};
use bridge_bot::indexer::{GraphqlIndexer, PacketIndexer, DEFAULT_GRAPHQL_ENDPOINT};
use bridge_bot::WalletIdentity;

mod helpers {
    use std::time::Duration;

    pub fn rpc_urls() -> Option<Vec<String>> {
        std::env::var("RPC_URL_PRIV")
            .ok()
            .map(|raw| super::parse_rpc_urls(&raw))
            .filter(|urls| !urls.is_empty())
    }

    /// Check EVM RPC connectivity
    pub async fn check_evm_connectivity(rpc_url: &str) -> bool {
        match reqwest::Client::new()
            .post(rpc_url)
            .header("content-type", "application/json")
            .body(r#"{"jsonrpc":"2.0","method":"eth_chainId","params":[],"id":1}"#)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_sepolia_connectivity() {
    let Some(urls) = helpers::rpc_urls() else {
        eprintln!("RPC_URL_PRIV not set, skipping");
        return;
    };
    for url in &urls {
        println!("{} reachable: {}", url, helpers::check_evm_connectivity(url).await);
    }
}

#[tokio::test]
#[ignore]
async fn test_wallet_balance_and_allowance() {
    let (Some(urls), Ok(key)) = (helpers::rpc_urls(), std::env::var("PRIVATE_KEY_1")) else {
        eprintln!("RPC_URL_PRIV / PRIVATE_KEY_1 not set, skipping");
        return;
    };

    let wallet = WalletIdentity::new("Wallet1", &key, None).unwrap();
    let client = EvmChainClient::new(
        RpcEndpoints::new(&urls).unwrap(),
        &wallet,
        TOKEN_ADDRESS,
        BRIDGE_ADDRESS,
        Duration::from_secs(2),
    );

    let balance = client.token_balance(wallet.address()).await.unwrap();
    let allowance = client
        .token_allowance(wallet.address(), BRIDGE_ADDRESS)
        .await
        .unwrap();
    println!("USDC balance: {}, bridge allowance: {}", balance, allowance);
}

#[tokio::test]
#[ignore]
async fn test_indexer_unknown_tx_is_not_indexed() {
    let indexer = GraphqlIndexer::new(DEFAULT_GRAPHQL_ENDPOINT).unwrap();
    let unknown = format!("0x{}", "00".repeat(32));

    let packet = indexer.packet_hash(&unknown).await.unwrap();
    assert_eq!(packet, None);
}
