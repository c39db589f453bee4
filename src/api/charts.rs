use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::Result,
    models::{ApiResponse, ChartDataPoint, Timeframe, TimeframeOption},
};

use super::{AppState, TimeframeQuery};

fn timeframe_options() -> Vec<TimeframeOption> {
    Timeframe::ALL
        .into_iter()
        .map(|value| TimeframeOption {
            value,
            label: value.label(),
        })
        .collect()
}

/// GET /api/v1/wallet/chart?timeframe=1D
pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> Result<Json<ApiResponse<Vec<ChartDataPoint>>>> {
    let data = state.charts.get_chart_data(query.timeframe()).await;
    Ok(Json(ApiResponse::success(data)))
}

/// GET /api/v1/wallet/timeframes
pub async fn get_timeframes() -> Json<ApiResponse<Vec<TimeframeOption>>> {
    Json(ApiResponse::success(timeframe_options()))
}
