//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::collections::BTreeMap;

use crate::{
    health::GridHealth,
    model::{Transformer, WeatherObservation},
    ForecastSummary,
};

#[cfg(feature = "rest-api")]
pub use rest::{router, ForecastApiState};

#[cfg(feature = "rest-api")]
mod rest {
    use std::sync::Arc;

    use axum::{
        extract::State,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use tower_http::trace::TraceLayer;
    use tracing::warn;

    use crate::{
        alert::AlertPolicy,
        baseline::{DiurnalPattern, HourlyBaseline},
        errors::ForecastEngineError,
        evaluate_transformer,
        forecaster::LoadForecaster,
        health::{grid_health, predictive_insights},
        model::{ForecastPoint, Transformer},
        EvaluationRequest, ForecastSummary,
    };

    use super::{BaselineRequest, FleetAssessRequest, FleetAssessResponse};

    #[derive(Debug, Clone)]
    pub struct ForecastApiState {
        pub forecaster: Arc<LoadForecaster>,
        pub policy: AlertPolicy,
        pub fleet: Vec<Transformer>,
    }

    pub fn router(state: Arc<ForecastApiState>) -> Router {
        Router::new()
            .route("/api/baseline", post(install_baseline))
            .route("/api/baseline/pattern", post(install_pattern_baseline))
            .route("/api/forecast", post(forecast))
            .route("/api/forecast/assess", post(assess))
            .route("/api/fleet", get(fleet))
            .route("/api/fleet/assess", post(assess_fleet_transformer))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    async fn install_baseline(
        State(state): State<Arc<ForecastApiState>>,
        Json(payload): Json<BaselineRequest>,
    ) -> Result<StatusCode, StatusCode> {
        let baseline =
            HourlyBaseline::from_hourly_averages(&payload.hourly_averages).map_err(map_err)?;
        state.forecaster.set_baseline(baseline);
        Ok(StatusCode::NO_CONTENT)
    }

    async fn install_pattern_baseline(
        State(state): State<Arc<ForecastApiState>>,
        Json(pattern): Json<DiurnalPattern>,
    ) -> Json<std::collections::BTreeMap<u32, f64>> {
        let baseline = HourlyBaseline::from_pattern(&pattern);
        let curve = baseline.to_map();
        state.forecaster.set_baseline(baseline);
        Json(curve)
    }

    async fn forecast(
        State(state): State<Arc<ForecastApiState>>,
        Json(request): Json<EvaluationRequest>,
    ) -> Result<Json<Vec<ForecastPoint>>, StatusCode> {
        state
            .forecaster
            .forecast_24h(
                request.current_hour,
                request.recent_mean_kw,
                request.capacity_kw,
            )
            .map(Json)
            .map_err(map_err)
    }

    async fn assess(
        State(state): State<Arc<ForecastApiState>>,
        Json(request): Json<EvaluationRequest>,
    ) -> Result<Json<ForecastSummary>, StatusCode> {
        evaluate_transformer(&state.forecaster, &request, &state.policy)
            .map(Json)
            .map_err(map_err)
    }

    async fn fleet(State(state): State<Arc<ForecastApiState>>) -> Json<Vec<Transformer>> {
        Json(state.fleet.clone())
    }

    async fn assess_fleet_transformer(
        State(state): State<Arc<ForecastApiState>>,
        Json(request): Json<FleetAssessRequest>,
    ) -> Result<Json<FleetAssessResponse>, StatusCode> {
        let transformer = state
            .fleet
            .iter()
            .find(|transformer| transformer.id == request.transformer_id)
            .cloned()
            .ok_or(StatusCode::NOT_FOUND)?;

        let evaluation = EvaluationRequest {
            transformer_id: Some(transformer.id.clone()),
            current_hour: request.current_hour,
            recent_mean_kw: request.recent_mean_kw,
            capacity_kw: transformer.capacity_kw,
        };
        let summary =
            evaluate_transformer(&state.forecaster, &evaluation, &state.policy).map_err(map_err)?;

        let load_kw = request.current_load_kw.unwrap_or(request.recent_mean_kw);
        let (health, insights) = match &request.weather {
            Some(weather) => (
                Some(grid_health(load_kw, transformer.capacity_kw, weather)),
                predictive_insights(&transformer, load_kw, weather),
            ),
            None => (None, Vec::new()),
        };

        Ok(Json(FleetAssessResponse {
            transformer,
            summary,
            health,
            insights,
        }))
    }

    fn map_err(err: ForecastEngineError) -> StatusCode {
        warn!(error = %err, "forecast API request failed");
        match err {
            ForecastEngineError::BaselineNotConfigured
            | ForecastEngineError::IncompleteBaseline(_)
            | ForecastEngineError::InvalidHour(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineRequest {
    pub hourly_averages: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetAssessRequest {
    pub transformer_id: String,
    pub recent_mean_kw: f64,
    pub current_hour: u32,
    #[serde(default)]
    pub current_load_kw: Option<f64>,
    #[serde(default)]
    pub weather: Option<WeatherObservation>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetAssessResponse {
    pub transformer: Transformer,
    pub summary: ForecastSummary,
    #[serde(default)]
    pub health: Option<GridHealth>,
    #[serde(default)]
    pub insights: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_request_uses_product_field_names() {
        let payload = r#"{"hourlyAverages": {"0": 80.0, "1": 82.5}}"#;
        let request: BaselineRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.hourly_averages.get(&1), Some(&82.5));
    }

    #[test]
    fn fleet_assess_request_tolerates_missing_optionals() {
        let payload = r#"{"transformerId": "T-1", "recentMeanKw": 170.0, "currentHour": 19}"#;
        let request: FleetAssessRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.transformer_id, "T-1");
        assert_eq!(request.current_load_kw, None);
        assert!(request.weather.is_none());
    }
}
