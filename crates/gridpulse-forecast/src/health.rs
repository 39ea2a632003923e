//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::model::{Transformer, WeatherCondition, WeatherObservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Critical,
    Warning,
    Healthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHealth {
    pub score: f64,
    pub status: HealthStatus,
}

/// Composite health score in [0, 100] for one transformer.
///
/// Starts from 100 and subtracts penalties for load above 50% of capacity,
/// ambient temperature above 30C and humidity above 80%. Barometric pressure
/// rides along in the observation but carries no weight. The clamp is the
/// whole normalization; the score is otherwise unrounded.
pub fn grid_health_score(
    current_load_kw: f64,
    capacity_kw: f64,
    weather: &WeatherObservation,
) -> f64 {
    // Same guard as the forecast risk ratio: no capacity, no load penalty.
    let load_pct = if capacity_kw > 0.0 {
        current_load_kw / capacity_kw * 100.0
    } else {
        0.0
    };
    let temp_factor = if weather.temperature_c > 30.0 {
        (weather.temperature_c - 30.0) * 2.0
    } else {
        0.0
    };
    let humidity_factor = if weather.humidity_pct > 80.0 {
        (weather.humidity_pct - 80.0) * 0.5
    } else {
        0.0
    };

    let score = 100.0 - (load_pct - 50.0) * 0.5 - temp_factor - humidity_factor;
    score.clamp(0.0, 100.0)
}

pub fn health_status(score: f64) -> HealthStatus {
    if score >= 70.0 {
        HealthStatus::Healthy
    } else if score >= 40.0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

pub fn grid_health(
    current_load_kw: f64,
    capacity_kw: f64,
    weather: &WeatherObservation,
) -> GridHealth {
    let score = grid_health_score(current_load_kw, capacity_kw, weather);
    GridHealth {
        score,
        status: health_status(score),
    }
}

/// Dashboard insight lines for one transformer, emitted in a fixed order so
/// repeated assessments render stably.
pub fn predictive_insights(
    transformer: &Transformer,
    current_load_kw: f64,
    weather: &WeatherObservation,
) -> Vec<String> {
    let mut insights = Vec::new();
    let load_pct = if transformer.capacity_kw > 0.0 {
        current_load_kw / transformer.capacity_kw * 100.0
    } else {
        0.0
    };

    if load_pct > 75.0 {
        insights.push(format!(
            "Transformer {} load nearing 80% capacity",
            transformer.id
        ));
    }
    if matches!(
        weather.condition,
        WeatherCondition::Rainy | WeatherCondition::Cloudy
    ) {
        insights.push("Lighting usage expected to increase by 5% this evening".to_string());
    }
    if current_load_kw > transformer.capacity_kw * 0.7 {
        insights.push("Potential overload risk detected".to_string());
    }
    if load_pct < 30.0 {
        insights.push("Suggested maintenance window: Low load period available".to_string());
    }

    insights
}
