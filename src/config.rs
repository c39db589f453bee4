use ethers::signers::{LocalWallet, Signer};
use serde::Deserialize;
use std::env;
use url::Url;

use crate::constants::{
    CHAIN_ID_MAINNET, CHAIN_ID_SEPOLIA, CHART_CACHE_TTL_SECS, DEFAULT_COINGECKO_API_URL,
    DEFAULT_ETHERSCAN_API_URL, DEFAULT_RPC_URL_MAINNET, DEFAULT_RPC_URL_SEPOLIA,
    HTTP_MAX_RETRIES, HTTP_RETRY_BASE_DELAY_MS, USDT_CONTRACT_ADDRESS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Wallet
    pub wallet_private_key: String,
    pub wallet_public_key: String,
    pub deposit_funding_private_key: Option<String>,

    // Tokens
    pub token_address: String,
    pub stable_token_address: String,

    // Blockchain
    pub network: String,
    pub rpc_url: String,

    // External APIs
    pub etherscan_api_key: String,
    pub etherscan_api_url: String,
    pub coingecko_api_url: String,

    // HTTP retry / cache
    pub http_max_retries: u32,
    pub http_retry_base_delay_ms: u64,
    pub chart_cache_ttl_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Missing required
    /// credentials are kept empty here and reported by [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let network = get("NETWORK")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "mainnet".to_string());
        let default_rpc = if network == "sepolia" {
            DEFAULT_RPC_URL_SEPOLIA
        } else {
            DEFAULT_RPC_URL_MAINNET
        };

        Ok(Config {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").unwrap_or_else(|| "3000".to_string()).parse()?,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),

            wallet_private_key: get("WALLET_PRIVATE_KEY").unwrap_or_default(),
            wallet_public_key: get("WALLET_PUBLIC_KEY").unwrap_or_default(),
            deposit_funding_private_key: get("DEPOSIT_FUNDING_PRIVATE_KEY")
                .filter(|v| !v.is_empty()),

            token_address: get("TOKEN_ADDRESS").unwrap_or_default(),
            stable_token_address: get("STABLE_TOKEN_ADDRESS")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| USDT_CONTRACT_ADDRESS.to_string()),

            rpc_url: get("RPC_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default_rpc.to_string()),
            network,

            etherscan_api_key: get("ETHERSCAN_API_KEY").unwrap_or_default(),
            etherscan_api_url: get("ETHERSCAN_API_URL")
                .unwrap_or_else(|| DEFAULT_ETHERSCAN_API_URL.to_string()),
            coingecko_api_url: get("COINGECKO_API_URL")
                .unwrap_or_else(|| DEFAULT_COINGECKO_API_URL.to_string()),

            http_max_retries: get("HTTP_MAX_RETRIES")
                .unwrap_or_else(|| HTTP_MAX_RETRIES.to_string())
                .parse()?,
            http_retry_base_delay_ms: get("HTTP_RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|| HTTP_RETRY_BASE_DELAY_MS.to_string())
                .parse()?,
            chart_cache_ttl_secs: get("CHART_CACHE_TTL_SECS")
                .unwrap_or_else(|| CHART_CACHE_TTL_SECS.to_string())
                .parse()?,

            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("ETHERSCAN_API_KEY", &self.etherscan_api_key),
            ("WALLET_PRIVATE_KEY", &self.wallet_private_key),
            ("WALLET_PUBLIC_KEY", &self.wallet_public_key),
            ("TOKEN_ADDRESS", &self.token_address),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}. Check your .env file.",
                missing.join(", ")
            );
        }

        if is_placeholder(&self.etherscan_api_key) || is_placeholder(&self.wallet_private_key) {
            anyhow::bail!("Placeholder values are not allowed for ETHERSCAN_API_KEY or WALLET_PRIVATE_KEY");
        }
        if !self.wallet_private_key.starts_with("0x") {
            anyhow::bail!("WALLET_PRIVATE_KEY must start with 0x");
        }
        if !self.wallet_public_key.starts_with("0x") {
            anyhow::bail!("WALLET_PUBLIC_KEY must start with 0x");
        }
        if !self.token_address.starts_with("0x") {
            anyhow::bail!("TOKEN_ADDRESS must be a valid Ethereum address starting with 0x");
        }
        if !self.stable_token_address.starts_with("0x") {
            anyhow::bail!("STABLE_TOKEN_ADDRESS must be a valid Ethereum address starting with 0x");
        }
        if let Some(key) = &self.deposit_funding_private_key {
            if !key.starts_with("0x") {
                anyhow::bail!("DEPOSIT_FUNDING_PRIVATE_KEY must start with 0x");
            }
        }
        if Url::parse(&self.rpc_url).is_err() {
            anyhow::bail!("RPC_URL is not a valid URL: {}", self.rpc_url);
        }
        if self.http_max_retries == 0 {
            anyhow::bail!("HTTP_MAX_RETRIES must be > 0");
        }

        if self.token_address.eq_ignore_ascii_case(&self.stable_token_address) {
            tracing::warn!("TOKEN_ADDRESS equals the stable coin contract; token value will be 0");
        }
        match self.wallet_private_key.parse::<LocalWallet>() {
            Ok(wallet) => {
                let derived = format!("{:#x}", wallet.address());
                if !derived.eq_ignore_ascii_case(&self.wallet_public_key) {
                    tracing::warn!(
                        "WALLET_PRIVATE_KEY derives {} which differs from WALLET_PUBLIC_KEY",
                        derived
                    );
                }
            }
            Err(_) => tracing::warn!("WALLET_PRIVATE_KEY is not a valid secp256k1 key"),
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn chain_id(&self) -> u64 {
        if self.network == "sepolia" {
            CHAIN_ID_SEPOLIA
        } else {
            CHAIN_ID_MAINNET
        }
    }

    /// Development run without a real explorer key.
    pub fn is_test_mode(&self) -> bool {
        self.environment == "development"
            && (self.etherscan_api_key.is_empty() || self.etherscan_api_key == "test_key")
    }
}

fn is_placeholder(value: &str) -> bool {
    value.contains("your_") || value.contains("here")
}
