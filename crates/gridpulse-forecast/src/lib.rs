//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
pub mod alert;
pub mod api;
pub mod baseline;
pub mod errors;
pub mod forecaster;
pub mod health;
pub mod io;
pub mod model;
pub mod reports;
pub mod risk;
pub mod telemetry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    alert::{assess_overload_risk, find_peak_risk, AlertPolicy},
    forecaster::LoadForecaster,
    model::{ForecastPoint, OverloadAlert, PeakRiskInfo},
    reports::ReportExporter,
};

pub use errors::{ForecastEngineError, Result};

/// One full assessment: the forward series plus its derived risk artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub transformer_id: Option<String>,
    pub points: Vec<ForecastPoint>,
    pub peak_risk: Option<PeakRiskInfo>,
    pub overload_alert: Option<OverloadAlert>,
}

impl ForecastSummary {
    pub fn exporter(&self) -> ReportExporter<'_> {
        ReportExporter::new(self)
    }
}

/// Inputs for one transformer assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(default)]
    pub transformer_id: Option<String>,
    pub current_hour: u32,
    pub recent_mean_kw: f64,
    pub capacity_kw: f64,
}

/// Runs the forecast, peak scan and overload assessment in one call.
pub fn evaluate_transformer(
    forecaster: &LoadForecaster,
    request: &EvaluationRequest,
    policy: &AlertPolicy,
) -> Result<ForecastSummary> {
    info!(
        transformer_id = request.transformer_id.as_deref().unwrap_or("-"),
        current_hour = request.current_hour,
        recent_mean_kw = request.recent_mean_kw,
        capacity_kw = request.capacity_kw,
        "evaluating transformer"
    );

    let points = forecaster.forecast_24h(
        request.current_hour,
        request.recent_mean_kw,
        request.capacity_kw,
    )?;
    let peak_risk = find_peak_risk(&points);
    let overload_alert = assess_overload_risk(&points, policy);

    if let Some(alert) = &overload_alert {
        warn!(
            hours_ahead = alert.hours_ahead,
            risk_ratio = alert.risk_ratio,
            confidence = alert.confidence,
            "predictive overload alert raised"
        );
    }

    let generated_at = points
        .first()
        .map(|point| point.timestamp)
        .unwrap_or_else(|| forecaster.now());

    Ok(ForecastSummary {
        generated_at,
        transformer_id: request.transformer_id.clone(),
        points,
        peak_risk,
        overload_alert,
    })
}

/// Same as [`evaluate_transformer`], then writes the report set.
/// When `output_dir` is `None`, the default `reports/` directory at the workspace root is used.
pub fn evaluate_transformer_with_options(
    forecaster: &LoadForecaster,
    request: &EvaluationRequest,
    policy: &AlertPolicy,
    output_dir: Option<&std::path::Path>,
) -> Result<ForecastSummary> {
    let summary = evaluate_transformer(forecaster, request, policy)?;

    let default_dir = std::path::Path::new("reports");
    let output_dir = output_dir.unwrap_or(default_dir);
    summary.exporter().export_all(output_dir)?;

    Ok(summary)
}
