// src/models/mod.rs
pub mod timeframe;
pub mod wallet;

pub use timeframe::Timeframe;
pub use wallet::{
    ApiResponse,
    ChartDataPoint,
    DailyChange,
    DepositAddress,
    DepositRequest,
    ExplorerTransaction,
    PortfolioValue,
    PriceQuote,
    ProfitLoss,
    TimeframeOption,
    TransactionResult,
    WalletBalance,
    WithdrawRequest,
};
