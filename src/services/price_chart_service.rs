use chrono::{SecondsFormat, TimeZone, Utc};
use rand::Rng;
use std::sync::Arc;

use crate::{
    config::Config,
    constants::{CHART_CACHE_PREFIX, MOCK_CHART_POINTS, MOCK_VALUE_MIN, MOCK_VALUE_SPAN, SECONDS_PER_BLOCK},
    error::Result,
    models::{ChartDataPoint, ExplorerTransaction, Timeframe},
    utils::{addresses_equal, wei_str_to_eth},
};

use super::cache::{ChartCache, Clock};
use super::market_data::MarketData;
use super::onchain::ChainClient;

pub fn chart_cache_key(timeframe: Timeframe) -> String {
    format!("{}_{}", CHART_CACHE_PREFIX, timeframe.as_str())
}

/// Block the lookback window starts at, assuming a fixed block time.
pub fn start_block_for(current_block: u64, lookback_secs: u64) -> u64 {
    if lookback_secs == 0 {
        return 0;
    }
    current_block.saturating_sub(lookback_secs / SECONDS_PER_BLOCK)
}

fn iso_date_from_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Walks the wallet's history oldest-first and records the running ETH
/// balance after each transaction. Incoming adds, outgoing subtracts; the
/// series is not floored at zero.
pub fn build_balance_series(transactions: &[ExplorerTransaction], wallet: &str) -> Vec<ChartDataPoint> {
    let mut rows: Vec<(i64, &ExplorerTransaction)> = transactions
        .iter()
        .filter_map(|tx| {
            let ts = tx
                .time_stamp
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ts| ts.checked_mul(1000).is_some());
            if ts.is_none() {
                tracing::warn!("Skipping explorer row {} with bad timestamp", tx.hash);
            }
            ts.map(|ts| (ts, tx))
        })
        .collect();
    rows.sort_by_key(|(ts, _)| *ts);

    let mut running = 0.0;
    rows.into_iter()
        .map(|(timestamp, tx)| {
            let amount = wei_str_to_eth(&tx.value);
            if addresses_equal(&tx.to, wallet) {
                running += amount;
            } else if addresses_equal(&tx.from, wallet) {
                running -= amount;
            }
            ChartDataPoint {
                date: iso_date_from_millis(timestamp * 1000),
                value: running,
                timestamp,
                is_mock: false,
            }
        })
        .collect()
}

/// Synthetic points evenly spread over the timeframe's window ending now,
/// so the chart is never blank.
pub fn generate_mock_chart_data<R: Rng + ?Sized>(
    timeframe: Timeframe,
    now_millis: i64,
    rng: &mut R,
) -> Vec<ChartDataPoint> {
    let points = MOCK_CHART_POINTS as i64;
    let interval = timeframe.mock_window_millis() / points;

    (0..points)
        .map(|i| {
            let ts_millis = now_millis - (points - i) * interval;
            ChartDataPoint {
                date: iso_date_from_millis(ts_millis),
                value: MOCK_VALUE_MIN + rng.random::<f64>() * MOCK_VALUE_SPAN,
                timestamp: ts_millis.div_euclid(1000),
                is_mock: true,
            }
        })
        .collect()
}

pub struct PriceChartService {
    config: Config,
    chain: Arc<dyn ChainClient>,
    market: Arc<dyn MarketData>,
    cache: Arc<ChartCache>,
    clock: Arc<dyn Clock>,
}

impl PriceChartService {
    pub fn new(
        config: Config,
        chain: Arc<dyn ChainClient>,
        market: Arc<dyn MarketData>,
        cache: Arc<ChartCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            chain,
            market,
            cache,
            clock,
        }
    }

    /// Cached balance series for the configured wallet; falls back to mock
    /// data when history is empty or unavailable. Mock series are not cached.
    pub async fn get_chart_data(&self, timeframe: Timeframe) -> Vec<ChartDataPoint> {
        let key = chart_cache_key(timeframe);
        let wallet = self.config.wallet_public_key.as_str();

        if let Some(cached) = self.cache.get(&key, wallet).await {
            tracing::debug!("Chart cache hit for {}", key);
            return cached;
        }

        match self.fetch_balance_series(timeframe).await {
            Ok(series) if !series.is_empty() => {
                self.cache.set(&key, wallet, series.clone()).await;
                series
            }
            Ok(_) => {
                tracing::info!("No transactions in {} window; serving mock chart", timeframe);
                self.mock_series(timeframe)
            }
            Err(err) => {
                tracing::error!("Error getting chart data for {}: {}", timeframe, err);
                self.mock_series(timeframe)
            }
        }
    }

    async fn fetch_balance_series(&self, timeframe: Timeframe) -> Result<Vec<ChartDataPoint>> {
        let lookback = timeframe.lookback_secs();
        let start_block = if lookback > 0 {
            let current = self.chain.block_number().await?;
            start_block_for(current, lookback)
        } else {
            0
        };

        let wallet = self.config.wallet_public_key.as_str();
        let transactions = self.market.transactions(wallet, start_block).await?;
        Ok(build_balance_series(&transactions, wallet))
    }

    fn mock_series(&self, timeframe: Timeframe) -> Vec<ChartDataPoint> {
        generate_mock_chart_data(timeframe, self.clock.now_millis(), &mut rand::rng())
    }
}
