use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::Result,
    models::{ApiResponse, PortfolioValue, ProfitLoss},
};

use super::{AppState, TimeframeQuery};

/// GET /api/v1/wallet/portfolio
pub async fn get_portfolio(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PortfolioValue>>> {
    let value = state.portfolio.get_portfolio_value().await;
    Ok(Json(ApiResponse::success(value)))
}

/// GET /api/v1/wallet/profit-loss?timeframe=1D
pub async fn get_profit_loss(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> Result<Json<ApiResponse<ProfitLoss>>> {
    let timeframe = query.timeframe();
    tracing::debug!("Profit/loss requested for {}", timeframe);
    let pl = state.portfolio.get_profit_loss(timeframe).await;
    Ok(Json(ApiResponse::success(pl)))
}
