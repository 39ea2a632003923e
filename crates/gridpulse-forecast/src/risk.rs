//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use crate::model::RiskLevel;

/// Map a load-to-capacity ratio onto the operational risk ladder.
///
/// Classification happens on the raw ratio, before any display rounding, so
/// a ratio of 0.9495 lands in HIGH even though it prints as 0.950.
pub fn classify_risk(risk_ratio: f64) -> RiskLevel {
    if risk_ratio >= 0.95 {
        RiskLevel::Critical
    } else if risk_ratio >= 0.85 {
        RiskLevel::High
    } else if risk_ratio >= 0.75 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}
