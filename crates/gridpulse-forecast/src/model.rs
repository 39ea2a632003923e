//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discrete risk tiers, ordered by severity: LOW < MODERATE < HIGH < CRITICAL.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub hour: u32,
    pub offset_hours: u32,
    pub timestamp: DateTime<Utc>,
    pub predicted_load_kw: f64,
    pub baseline_load_kw: f64,
    pub adjustment_kw: f64,
    pub risk_ratio: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakRiskInfo {
    pub hour: u32,
    pub offset_hours: u32,
    pub timestamp: DateTime<Utc>,
    pub predicted_load_kw: f64,
    pub risk_ratio: f64,
    pub risk_level: RiskLevel,
}

impl PeakRiskInfo {
    pub fn from_point(point: &ForecastPoint) -> Self {
        Self {
            hour: point.hour,
            offset_hours: point.offset_hours,
            timestamp: point.timestamp,
            predicted_load_kw: point.predicted_load_kw,
            risk_ratio: point.risk_ratio,
            risk_level: point.risk_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverloadAlert {
    pub first_critical_hour: u32,
    pub hours_ahead: u32,
    pub predicted_load_kw: f64,
    pub risk_ratio: f64,
    pub confidence: f64,
    pub critical_hours_count: usize,
    pub recommended_action: String,
}

/// Fleet asset record. Field names mirror the transformer inventory CSV
/// columns, which the dashboard also uses verbatim in its JSON payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transformer {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "EntityType")]
    pub kind: TransformerKind,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "CapacityKw")]
    pub capacity_kw: f64,
    #[serde(rename = "ParentID", default)]
    pub parent_id: Option<String>,
    #[serde(rename = "NumDownstreamBuildings", default)]
    pub downstream_buildings: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransformerKind {
    SubstationTransformer,
    PolePadTransformer,
    SubTransmission,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherObservation {
    #[serde(rename = "temperature")]
    pub temperature_c: f64,
    #[serde(rename = "humidity")]
    pub humidity_pct: f64,
    #[serde(rename = "pressure")]
    pub pressure_hpa: f64,
    #[serde(rename = "windSpeed")]
    pub wind_speed_mps: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    Rainy,
}

// Stored kW values carry two decimals, ratios three. Classification and
// alert math happen before/on these respectively; see the forecaster.
pub(crate) fn round_kw(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round_ratio(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
