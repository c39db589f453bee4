use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::{
    error::{AppError, Result},
    models::{DepositAddress, DepositRequest, TransactionResult, WithdrawRequest},
};

use super::AppState;

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// GET /api/v1/wallet/deposit-address
pub async fn get_deposit_address(State(state): State<AppState>) -> Json<DepositAddress> {
    Json(state.transfers.deposit_address())
}

/// POST /api/v1/wallet/deposit
pub async fn deposit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<TransactionResult>> {
    let req = body(payload)?;
    Ok(Json(state.transfers.deposit(&req.amount).await))
}

/// POST /api/v1/wallet/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<TransactionResult>> {
    let req = body(payload)?;
    Ok(Json(state.transfers.withdraw(&req.amount, &req.recipient).await))
}
