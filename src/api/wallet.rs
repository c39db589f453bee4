use axum::{extract::State, Json};

use crate::{
    error::Result,
    models::{ApiResponse, WalletBalance},
};

use super::AppState;

/// GET /api/v1/wallet/balance
pub async fn get_balance(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WalletBalance>>> {
    let balance = state.portfolio.get_wallet_balance().await;
    Ok(Json(ApiResponse::success(balance)))
}
