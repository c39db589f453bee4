use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub network: String,
    pub chain_id: u64,
    pub test_mode: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: state.config.network.clone(),
        chain_id: state.config.chain_id(),
        test_mode: state.config.is_test_mode(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::test_state;
    use crate::services::test_support::{FakeChain, FakeMarket};

    #[tokio::test]
    async fn reports_network() {
        let state = test_state(FakeChain::new(None), FakeMarket::new());
        let Json(health) = health_check(State(state)).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.network, "mainnet");
        assert_eq!(health.chain_id, 1);
        assert!(!health.test_mode);
    }
}
