// src/api/mod.rs

pub mod charts;
pub mod deposit;
pub mod health;
pub mod portfolio;
pub mod wallet;

use axum::http::Uri;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::models::Timeframe;
use crate::services::{PortfolioService, PriceChartService, TransferService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub portfolio: Arc<PortfolioService>,
    pub charts: Arc<PriceChartService>,
    pub transfers: Arc<TransferService>,
}

/// `?timeframe=` on chart endpoints. Missing or unknown values mean `1D`.
#[derive(Debug, Default, Deserialize)]
pub struct TimeframeQuery {
    pub timeframe: Option<String>,
}

impl TimeframeQuery {
    pub fn timeframe(&self) -> Timeframe {
        Timeframe::parse_or_default(self.timeframe.as_deref())
    }
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::services::cache::{tests::ManualClock, ChartCache};
    use crate::services::test_support::{FakeChain, FakeMarket};
    use crate::services::{ChainClient, MarketData};
    use axum::{http::StatusCode, response::IntoResponse};
    use std::time::Duration;

    /// State wired to fakes; the chain fake signs as the dashboard wallet.
    pub fn test_state(chain: FakeChain, market: FakeMarket) -> AppState {
        let config = test_config();
        let chain: Arc<dyn ChainClient> = Arc::new(chain);
        let market: Arc<dyn MarketData> = Arc::new(market);
        let clock = ManualClock::new(1_704_067_200_000);
        let cache = Arc::new(ChartCache::new(Duration::from_secs(60), clock.clone()));
        let charts = Arc::new(PriceChartService::new(
            config.clone(),
            chain.clone(),
            market.clone(),
            cache.clone(),
            clock,
        ));
        AppState {
            portfolio: Arc::new(PortfolioService::new(
                config.clone(),
                chain.clone(),
                market,
                charts.clone(),
            )),
            transfers: Arc::new(TransferService::new(config.clone(), chain, None, cache)),
            charts,
            config,
        }
    }

    #[test]
    fn timeframe_query_defaults_to_one_day() {
        assert_eq!(TimeframeQuery::default().timeframe(), Timeframe::OneDay);
        let query = TimeframeQuery {
            timeframe: Some("bogus".into()),
        };
        assert_eq!(query.timeframe(), Timeframe::OneDay);
        let query = TimeframeQuery {
            timeframe: Some("1w".into()),
        };
        assert_eq!(query.timeframe(), Timeframe::OneWeek);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = not_found(Uri::from_static("/api/v1/nope")).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
