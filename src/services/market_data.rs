use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::{
    config::Config,
    constants::{COINGECKO_NATIVE_ID, COINGECKO_PLATFORM, EXPLORER_END_BLOCK, HTTP_REQUEST_TIMEOUT_SECS},
    error::{AppError, Result},
    models::{ExplorerTransaction, PriceQuote},
};

use super::http_retry::{fetch_with_retry, RetryPolicy};

/// Spot prices and transaction history from public REST APIs.
#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    async fn native_price(&self) -> Result<PriceQuote>;

    async fn token_price(&self, contract: &str) -> Result<PriceQuote>;

    /// Transactions touching `address` from `start_block`, oldest first.
    async fn transactions(&self, address: &str, start_block: u64) -> Result<Vec<ExplorerTransaction>>;
}

#[derive(Debug, Default, Deserialize)]
struct CoinGeckoQuote {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

impl From<&CoinGeckoQuote> for PriceQuote {
    fn from(quote: &CoinGeckoQuote) -> Self {
        PriceQuote {
            usd: quote.usd.filter(|v| v.is_finite()).unwrap_or(0.0),
            change_24h: quote.usd_24h_change.filter(|v| v.is_finite()).unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

pub struct HttpMarketData {
    client: reqwest::Client,
    retry: RetryPolicy,
    coingecko_api_url: String,
    etherscan_api_url: String,
    etherscan_api_key: String,
    chain_id: u64,
}

impl HttpMarketData {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            retry: RetryPolicy::from_config(config),
            coingecko_api_url: config.coingecko_api_url.trim_end_matches('/').to_string(),
            etherscan_api_url: config.etherscan_api_url.clone(),
            etherscan_api_key: config.etherscan_api_key.clone(),
            chain_id: config.chain_id(),
        })
    }

    fn native_price_url(&self) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.coingecko_api_url, COINGECKO_NATIVE_ID
        )
    }

    fn token_price_url(&self, contract: &str) -> String {
        format!(
            "{}/simple/token_price/{}?contract_addresses={}&vs_currencies=usd&include_24hr_change=true",
            self.coingecko_api_url, COINGECKO_PLATFORM, contract
        )
    }

    fn txlist_url(&self, address: &str, start_block: u64) -> String {
        format!(
            "{}?chainid={}&module=account&action=txlist&address={}&startblock={}&endblock={}&sort=asc&apikey={}",
            self.etherscan_api_url,
            self.chain_id,
            address,
            start_block,
            EXPLORER_END_BLOCK,
            self.etherscan_api_key
        )
    }

    async fn fetch_quotes(&self, url: &str) -> Result<HashMap<String, CoinGeckoQuote>> {
        let response = fetch_with_retry(&self.client, url, self.retry).await?;
        Ok(response.json::<HashMap<String, CoinGeckoQuote>>().await?)
    }
}

#[async_trait::async_trait]
impl MarketData for HttpMarketData {
    async fn native_price(&self) -> Result<PriceQuote> {
        let quotes = self.fetch_quotes(&self.native_price_url()).await?;
        Ok(quotes
            .get(COINGECKO_NATIVE_ID)
            .map(PriceQuote::from)
            .unwrap_or_default())
    }

    async fn token_price(&self, contract: &str) -> Result<PriceQuote> {
        let quotes = self.fetch_quotes(&self.token_price_url(contract)).await?;
        // CoinGecko keys token quotes by lowercased contract address.
        let key = contract.trim().to_ascii_lowercase();
        Ok(quotes.get(&key).map(PriceQuote::from).unwrap_or_default())
    }

    async fn transactions(&self, address: &str, start_block: u64) -> Result<Vec<ExplorerTransaction>> {
        let url = self.txlist_url(address, start_block);
        let response = fetch_with_retry(&self.client, &url, self.retry).await?;
        let envelope = response.json::<ExplorerEnvelope>().await?;
        parse_explorer_envelope(envelope)
    }
}

fn parse_explorer_envelope(envelope: ExplorerEnvelope) -> Result<Vec<ExplorerTransaction>> {
    if envelope.status != "1" {
        // "No transactions found" is reported as status 0 with an empty list.
        if envelope.result.as_array().is_some_and(|rows| rows.is_empty()) {
            return Ok(Vec::new());
        }
        return Err(AppError::ExternalAPI(format!(
            "Explorer returned status {}: {}",
            envelope.status, envelope.message
        )));
    }
    serde_json::from_value(envelope.result)
        .map_err(|e| AppError::ExternalAPI(format!("Malformed explorer result: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{base_vars, config_from};
    use crate::services::test_support::spawn_stub;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;

    fn client_for(base: &str) -> HttpMarketData {
        let mut vars = base_vars();
        vars.insert("COINGECKO_API_URL", base.to_string());
        vars.insert("ETHERSCAN_API_URL", format!("{}/v2/api", base));
        vars.insert("HTTP_RETRY_BASE_DELAY_MS", "5".to_string());
        HttpMarketData::new(&config_from(&vars)).unwrap()
    }

    #[test]
    fn txlist_url_carries_chain_and_block_range() {
        let client = client_for("http://stub");
        let url = client.txlist_url("0xabc", 123);
        assert!(url.starts_with("http://stub/v2/api?chainid=1&module=account&action=txlist"));
        assert!(url.contains("address=0xabc"));
        assert!(url.contains("startblock=123&endblock=99999999&sort=asc"));
        assert!(url.ends_with("apikey=abc123"));
    }

    #[test]
    fn envelope_with_error_status_is_rejected() {
        let envelope = ExplorerEnvelope {
            status: "0".into(),
            message: "NOTOK".into(),
            result: json!("Max rate limit reached"),
        };
        assert!(parse_explorer_envelope(envelope).is_err());
    }

    #[test]
    fn envelope_with_no_transactions_is_empty() {
        let envelope = ExplorerEnvelope {
            status: "0".into(),
            message: "No transactions found".into(),
            result: json!([]),
        };
        assert!(parse_explorer_envelope(envelope).unwrap().is_empty());
    }

    #[tokio::test]
    async fn reads_native_and_token_quotes() {
        let router = Router::new()
            .route(
                "/simple/price",
                get(|| async {
                    Json(json!({ "ethereum": { "usd": 3000.5, "usd_24h_change": -2.5 } }))
                }),
            )
            .route(
                "/simple/token_price/ethereum",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let mut body = serde_json::Map::new();
                    body.insert(
                        q["contract_addresses"].to_ascii_lowercase(),
                        json!({ "usd": 1.25 }),
                    );
                    Json(serde_json::Value::Object(body))
                }),
            );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let eth = client.native_price().await.unwrap();
        assert_eq!(eth.usd, 3000.5);
        assert_eq!(eth.change_24h, -2.5);

        let token = client
            .token_price("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984")
            .await
            .unwrap();
        assert_eq!(token.usd, 1.25);
        assert_eq!(token.change_24h, 0.0);
    }

    #[tokio::test]
    async fn reads_explorer_transactions() {
        let router = Router::new().route(
            "/v2/api",
            get(|| async {
                Json(json!({
                    "status": "1",
                    "message": "OK",
                    "result": [
                        { "hash": "0x1", "blockNumber": "10", "timeStamp": "1704067200",
                          "from": "0xaaa", "to": "0xbbb", "value": "1000" }
                    ]
                }))
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let rows = client.transactions("0xbbb", 0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to, "0xbbb");
        assert_eq!(rows[0].value, "1000");
    }
}
