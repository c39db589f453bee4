use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod models;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;
use services::{
    ChainClient, ChartCache, EthersChainClient, HttpMarketData, MarketData, PortfolioService,
    PriceChartService, SystemClock, TransferService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Wallet Dashboard Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Network: {} (chain id {})", config.network, config.chain_id());
    tracing::info!("API Version: {}", API_VERSION);
    if config.is_test_mode() {
        tracing::warn!("Running in test mode without a real explorer API key");
    }

    let app_state = build_state(&config)?;
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config) -> anyhow::Result<api::AppState> {
    let chain_id = config.chain_id();
    let wallet: Arc<dyn ChainClient> = Arc::new(EthersChainClient::new(
        &config.rpc_url,
        chain_id,
        Some(config.wallet_private_key.as_str()),
    )?);
    let funding: Option<Arc<dyn ChainClient>> = match &config.deposit_funding_private_key {
        Some(key) => {
            tracing::info!("Deposit funding wallet configured");
            Some(Arc::new(EthersChainClient::new(
                &config.rpc_url,
                chain_id,
                Some(key.as_str()),
            )?))
        }
        None => None,
    };
    let market: Arc<dyn MarketData> = Arc::new(HttpMarketData::new(config)?);

    let clock = Arc::new(SystemClock);
    let cache = Arc::new(ChartCache::new(
        Duration::from_secs(config.chart_cache_ttl_secs),
        clock.clone(),
    ));

    let charts = Arc::new(PriceChartService::new(
        config.clone(),
        wallet.clone(),
        market.clone(),
        cache.clone(),
        clock,
    ));
    let portfolio = Arc::new(PortfolioService::new(
        config.clone(),
        wallet.clone(),
        market,
        charts.clone(),
    ));
    let transfers = Arc::new(TransferService::new(config.clone(), wallet, funding, cache));

    Ok(api::AppState {
        config: config.clone(),
        portfolio,
        charts,
        transfers,
    })
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Balances & valuation
        .route("/api/v1/wallet/balance", get(api::wallet::get_balance))
        .route("/api/v1/wallet/portfolio", get(api::portfolio::get_portfolio))
        .route(
            "/api/v1/wallet/profit-loss",
            get(api::portfolio::get_profit_loss),
        )
        // Charts
        .route("/api/v1/wallet/chart", get(api::charts::get_chart))
        .route("/api/v1/wallet/timeframes", get(api::charts::get_timeframes))
        // Transfers
        .route(
            "/api/v1/wallet/deposit-address",
            get(api::deposit::get_deposit_address),
        )
        .route("/api/v1/wallet/deposit", post(api::deposit::deposit))
        .route("/api/v1/wallet/withdraw", post(api::deposit::withdraw))
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
