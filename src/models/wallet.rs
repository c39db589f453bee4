use serde::{Deserialize, Serialize};

use super::Timeframe;

// ==================== CHART ====================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    pub date: String,
    pub value: f64,
    pub timestamp: i64,
    pub is_mock: bool,
}

// ==================== BALANCE ====================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChange {
    pub amount: String,
    pub percentage: String,
}

impl Default for DailyChange {
    fn default() -> Self {
        Self {
            amount: "$0.00".to_string(),
            percentage: "0.0%".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub balance: String,
    pub stable: String,
    pub daily_change: DailyChange,
}

impl Default for WalletBalance {
    fn default() -> Self {
        Self {
            balance: "0".to_string(),
            stable: "0".to_string(),
            daily_change: DailyChange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValue {
    pub not_stable: String,
    pub total: String,
}

impl Default for PortfolioValue {
    fn default() -> Self {
        Self {
            not_stable: "0.00".to_string(),
            total: "0.00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLoss {
    pub value: String,
    pub period: Timeframe,
    pub chart_data: Vec<ChartDataPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeframeOption {
    pub value: Timeframe,
    pub label: &'static str,
}

// ==================== MARKET ====================
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceQuote {
    pub usd: f64,
    pub change_24h: f64,
}

/// Row of the explorer `txlist` response. Numbers arrive as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub block_number: String,
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
}

// ==================== TRANSFERS ====================
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub success: bool,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionResult {
    pub fn confirmed(tx_hash: String) -> Self {
        Self {
            success: true,
            tx_hash,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: String::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddress {
    pub success: bool,
    pub deposit_address: String,
    pub error: String,
}

// ==================== API ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
