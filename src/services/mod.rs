// All service modules
pub mod cache;
pub mod http_retry;
pub mod market_data;
pub mod onchain;
pub mod portfolio_service;
pub mod price_chart_service;
pub mod transfer_service;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export for convenience
pub use cache::{ChartCache, SystemClock};
pub use market_data::{HttpMarketData, MarketData};
pub use onchain::{ChainClient, EthersChainClient};
pub use portfolio_service::PortfolioService;
pub use price_chart_service::PriceChartService;
pub use transfer_service::TransferService;
