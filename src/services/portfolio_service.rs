use ethers::types::Address;
use std::sync::Arc;

use crate::{
    config::Config,
    constants::NATIVE_DECIMALS,
    error::{AppError, Result},
    models::{DailyChange, PortfolioValue, PriceQuote, ProfitLoss, Timeframe, WalletBalance},
    utils::{addresses_equal, format_fixed2, format_percent, format_units_trimmed, format_usd_change, units_to_f64},
};

use super::market_data::MarketData;
use super::onchain::ChainClient;
use super::price_chart_service::PriceChartService;

/// One priced holding: amount in whole units and its USD quote.
#[derive(Debug, Clone, Copy)]
struct Holding {
    amount: f64,
    quote: PriceQuote,
}

impl Holding {
    fn value(&self) -> f64 {
        self.amount * self.quote.usd
    }

    /// Value 24h ago implied by the quote's percentage change.
    fn previous_value(&self) -> f64 {
        let factor = 1.0 + self.quote.change_24h / 100.0;
        if factor <= 0.0 {
            return 0.0;
        }
        self.value() / factor
    }
}

fn daily_change(holdings: &[Holding]) -> DailyChange {
    let current: f64 = holdings.iter().map(Holding::value).sum();
    let previous: f64 = holdings.iter().map(Holding::previous_value).sum();
    let delta = current - previous;
    let percentage = if previous > 0.0 {
        delta / previous * 100.0
    } else {
        0.0
    };
    DailyChange {
        amount: format_usd_change(delta),
        percentage: format_percent(percentage),
    }
}

/// Read-side aggregation over balances, quotes and the chart series.
pub struct PortfolioService {
    config: Config,
    chain: Arc<dyn ChainClient>,
    market: Arc<dyn MarketData>,
    charts: Arc<PriceChartService>,
}

impl PortfolioService {
    pub fn new(
        config: Config,
        chain: Arc<dyn ChainClient>,
        market: Arc<dyn MarketData>,
        charts: Arc<PriceChartService>,
    ) -> Self {
        Self {
            config,
            chain,
            market,
            charts,
        }
    }

    pub async fn get_wallet_balance(&self) -> WalletBalance {
        match self.load_wallet_balance().await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::error!("Error getting wallet balance: {}", err);
                WalletBalance::default()
            }
        }
    }

    pub async fn get_portfolio_value(&self) -> PortfolioValue {
        match self.load_portfolio_value().await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("Error getting portfolio value: {}", err);
                PortfolioValue::default()
            }
        }
    }

    /// Latest running ETH balance of the chart series priced at spot. An
    /// unavailable price values it at zero; the series is kept either way.
    pub async fn get_profit_loss(&self, timeframe: Timeframe) -> ProfitLoss {
        let (chart_data, quote) =
            tokio::join!(self.charts.get_chart_data(timeframe), self.native_quote());
        let latest = chart_data.last().map(|point| point.value).unwrap_or(0.0);

        ProfitLoss {
            value: format_fixed2(latest * quote.usd),
            period: timeframe,
            chart_data,
        }
    }

    async fn load_wallet_balance(&self) -> Result<WalletBalance> {
        let owner = self.owner()?;
        let native = self.chain.native_balance(owner).await?;
        let stable = self
            .chain
            .token_balance(self.stable_address()?, owner)
            .await?;

        let (native_quote, token_quote, token_amount) =
            tokio::join!(self.native_quote(), self.token_quote(), self.token_amount(owner));

        let holdings = [
            Holding {
                amount: units_to_f64(native, NATIVE_DECIMALS),
                quote: native_quote,
            },
            Holding {
                amount: token_amount,
                quote: token_quote,
            },
        ];

        Ok(WalletBalance {
            balance: format_units_trimmed(native, NATIVE_DECIMALS),
            stable: format_units_trimmed(stable.raw, stable.decimals),
            daily_change: daily_change(&holdings),
        })
    }

    async fn load_portfolio_value(&self) -> Result<PortfolioValue> {
        let owner = self.owner()?;
        let stable_address = self.stable_address()?;

        let (native, stable, native_quote, token_quote, token_amount) = tokio::join!(
            self.chain.native_balance(owner),
            self.chain.token_balance(stable_address, owner),
            self.native_quote(),
            self.token_quote(),
            self.token_amount(owner),
        );

        let native_value = units_to_f64(native?, NATIVE_DECIMALS) * native_quote.usd;
        let token_value = token_amount * token_quote.usd;
        let stable = stable?;
        let stable_amount = units_to_f64(stable.raw, stable.decimals);

        let not_stable = native_value + token_value;
        Ok(PortfolioValue {
            not_stable: format_fixed2(not_stable),
            total: format_fixed2(not_stable + stable_amount),
        })
    }

    /// Whether the configured token is tracked separately from the stable coin.
    fn has_distinct_token(&self) -> bool {
        let token = self.config.token_address.trim();
        !token.is_empty() && !addresses_equal(token, &self.config.stable_token_address)
    }

    // Quote failures price the holding at zero instead of failing the read.
    async fn native_quote(&self) -> PriceQuote {
        self.market.native_price().await.unwrap_or_else(|err| {
            tracing::warn!("Error getting ETH price: {}", err);
            PriceQuote::default()
        })
    }

    async fn token_quote(&self) -> PriceQuote {
        if !self.has_distinct_token() {
            return PriceQuote::default();
        }
        self.market
            .token_price(&self.config.token_address)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("Error getting token price: {}", err);
                PriceQuote::default()
            })
    }

    /// Configured token balance in whole units; failures count as zero.
    async fn token_amount(&self, owner: Address) -> f64 {
        if !self.has_distinct_token() {
            return 0.0;
        }
        let token = match parse_address(&self.config.token_address, "TOKEN_ADDRESS") {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!("{}", err);
                return 0.0;
            }
        };
        match self.chain.token_balance(token, owner).await {
            Ok(amount) => units_to_f64(amount.raw, amount.decimals),
            Err(err) => {
                tracing::warn!("Error getting token balance: {}", err);
                0.0
            }
        }
    }

    fn owner(&self) -> Result<Address> {
        parse_address(&self.config.wallet_public_key, "WALLET_PUBLIC_KEY")
    }

    fn stable_address(&self) -> Result<Address> {
        parse_address(&self.config.stable_token_address, "STABLE_TOKEN_ADDRESS")
    }
}

fn parse_address(value: &str, name: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| AppError::Config(format!("{} is not a valid address", name)))
}
