//! Union GraphQL indexer client
//!
//! Looks up the packet created by a Sepolia transaction. "No rows yet" is a
//! normal answer while the relayer catches up, so it maps to `Ok(None)`;
//! HTTP failures and GraphQL `errors` map to `Transport`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::{BridgeError, BridgeResult};
use crate::hash::normalize_tx_hash;

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://graphql.union.build/v1/graphql";

const TRANSFERS_QUERY: &str = r#"
query ($submission_tx_hash: String!) {
  v2_transfers(args: {p_transaction_hash: $submission_tx_hash}) {
    packet_hash
  }
}
"#;

#[async_trait]
pub trait PacketIndexer: Send + Sync {
    /// Packet hash for `tx_hash`, or `None` if not indexed yet
    async fn packet_hash(&self, tx_hash: &str) -> BridgeResult<Option<String>>;
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<TransfersData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct TransfersData {
    #[serde(default)]
    v2_transfers: Vec<TransferRow>,
}

#[derive(Debug, Deserialize)]
struct TransferRow {
    packet_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Pull the first non-empty `packet_hash` out of a response body
fn extract_packet_hash(body: GraphqlResponse) -> BridgeResult<Option<String>> {
    if let Some(err) = body.errors.first() {
        return Err(BridgeError::Transport(format!("indexer query error: {}", err.message)));
    }
    Ok(body
        .data
        .and_then(|d| d.v2_transfers.into_iter().next())
        .and_then(|row| row.packet_hash)
        .filter(|hash| !hash.is_empty()))
}

pub struct GraphqlIndexer {
    endpoint: Url,
    client: Client,
}

impl GraphqlIndexer {
    pub fn new(endpoint: &str) -> BridgeResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            BridgeError::Configuration(format!("invalid GraphQL endpoint {}: {}", endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| BridgeError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl PacketIndexer for GraphqlIndexer {
    async fn packet_hash(&self, tx_hash: &str) -> BridgeResult<Option<String>> {
        let request = GraphqlRequest {
            query: TRANSFERS_QUERY,
            variables: json!({ "submission_tx_hash": normalize_tx_hash(tx_hash) }),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("accept", "application/graphql-response+json, application/json")
            .header("origin", "https://app.union.build")
            .header("referer", "https://app.union.build/")
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::Transport(format!("indexer request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BridgeError::Transport(format!(
                "indexer returned {}",
                response.status()
            )));
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Transport(format!("indexer response not JSON: {}", e)))?;

        extract_packet_hash(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use tokio_test::{assert_err, assert_ok};

    fn parse(value: serde_json::Value) -> BridgeResult<Option<String>> {
        extract_packet_hash(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_extract_found() {
        let hash = parse(json!({
            "data": { "v2_transfers": [ { "packet_hash": "0xabc" } ] }
        }))
        .unwrap();
        assert_eq!(hash.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_extract_empty_array_is_none() {
        assert_eq!(parse(json!({ "data": { "v2_transfers": [] } })).unwrap(), None);
    }

    #[test]
    fn test_extract_missing_data_is_none() {
        assert_eq!(parse(json!({})).unwrap(), None);
        assert_eq!(parse(json!({ "data": null })).unwrap(), None);
    }

    #[test]
    fn test_extract_null_or_empty_hash_is_none() {
        assert_eq!(
            parse(json!({ "data": { "v2_transfers": [ { "packet_hash": null } ] } })).unwrap(),
            None
        );
        assert_eq!(
            parse(json!({ "data": { "v2_transfers": [ { "packet_hash": "" } ] } })).unwrap(),
            None
        );
    }

    #[test]
    fn test_extract_graphql_errors_are_transport() {
        let err = parse(json!({ "errors": [ { "message": "field not found" } ] })).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            GraphqlIndexer::new("::nope"),
            Err(BridgeError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_query_sends_normalized_hash() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/graphql")
                    .json_body_partial(r#"{ "variables": { "submission_tx_hash": "0xdeadbeef" } }"#);
                then.status(200).json_body(json!({
                    "data": { "v2_transfers": [ { "packet_hash": "0xpacket" } ] }
                }));
            })
            .await;

        let indexer = GraphqlIndexer::new(&server.url("/v1/graphql")).unwrap();
        let hash = assert_ok!(indexer.packet_hash("deadbeef").await);

        mock.assert_async().await;
        assert_eq!(hash.as_deref(), Some("0xpacket"));
    }

    #[tokio::test]
    async fn test_http_error_is_transport() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/graphql");
                then.status(502);
            })
            .await;

        let indexer = GraphqlIndexer::new(&server.url("/v1/graphql")).unwrap();
        let err = assert_err!(indexer.packet_hash("0x01").await);
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_non_json_is_transport() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/graphql");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let indexer = GraphqlIndexer::new(&server.url("/v1/graphql")).unwrap();
        let err = indexer.packet_hash("0x01").await.unwrap_err();
        assert!(err.is_transport());
    }
}
