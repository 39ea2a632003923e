//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "integration-tests"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "End-to-end checks for the forecast evaluation pipeline."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use gridpulse_common::FixedClock;
use gridpulse_forecast::{
    alert::AlertPolicy, baseline::DiurnalPattern, evaluate_transformer_with_options,
    forecaster::LoadForecaster, io::load_baseline_from_file, model::RiskLevel, EvaluationRequest,
};
use tempfile::tempdir;

fn evening_forecaster() -> LoadForecaster {
    let clock = Arc::new(FixedClock::at(
        Utc.with_ymd_and_hms(2024, 6, 3, 19, 0, 0).unwrap(),
    ));
    let forecaster = LoadForecaster::with_clock(0.5, clock);
    forecaster.generate_baseline_from_pattern(&DiurnalPattern::default());
    forecaster
}

#[test]
fn run_full_forecast_pipeline() {
    let forecaster = evening_forecaster();
    let temp = tempdir().expect("temp dir");

    let request = EvaluationRequest {
        transformer_id: Some("T-MNL-001".to_string()),
        current_hour: 19,
        recent_mean_kw: 170.0,
        capacity_kw: 150.0,
    };
    let summary = evaluate_transformer_with_options(
        &forecaster,
        &request,
        &AlertPolicy::default(),
        Some(temp.path()),
    )
    .expect("evaluation");

    assert_eq!(summary.points.len(), 24);
    assert_eq!(summary.points[0].predicted_load_kw, 160.0);
    assert_eq!(summary.points[0].risk_level, RiskLevel::Critical);
    assert_eq!(summary.points[2].predicted_load_kw, 153.78);
    assert_eq!(summary.points[2].risk_ratio, 1.025);

    let alert = summary.overload_alert.as_ref().expect("alert");
    assert_eq!(alert.first_critical_hour, 21);
    assert_eq!(alert.hours_ahead, 2);
    assert_eq!(alert.confidence, 0.95);
    assert_eq!(
        alert.recommended_action,
        "URGENT: Pre-stage crew for immediate intervention. \
         Expected in 2 hours - immediate action required."
    );

    let forecast_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("forecast.json")).unwrap())
            .unwrap();
    assert_eq!(forecast_json["transformer_id"], "T-MNL-001");
    assert_eq!(forecast_json["data"].as_array().unwrap().len(), 24);
    assert_eq!(
        forecast_json["data"][0]["predictedLoadKw"].as_f64().unwrap(),
        160.0
    );
    assert_eq!(forecast_json["data"][0]["riskLevel"], "CRITICAL");

    let peak_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("peak_risk.json")).unwrap())
            .unwrap();
    assert_eq!(peak_json["data"]["offsetHours"], 0);
    assert_eq!(peak_json["data"]["riskRatio"].as_f64().unwrap(), 1.067);

    let alert_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("overload_alert.json")).unwrap())
            .unwrap();
    assert_eq!(alert_json["data"]["hoursAhead"], 2);
    assert_eq!(alert_json["data"]["criticalHoursCount"], 6);
    assert_eq!(alert_json["data"]["confidence"].as_f64().unwrap(), 0.95);
}

#[test]
fn quiet_day_writes_a_null_alert_record() {
    let forecaster = evening_forecaster();
    let temp = tempdir().expect("temp dir");

    let request = EvaluationRequest {
        transformer_id: None,
        current_hour: 19,
        recent_mean_kw: 150.0,
        capacity_kw: 400.0,
    };
    let summary = evaluate_transformer_with_options(
        &forecaster,
        &request,
        &AlertPolicy::default(),
        Some(temp.path()),
    )
    .expect("evaluation");

    assert!(summary.overload_alert.is_none());

    let alert_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("overload_alert.json")).unwrap())
            .unwrap();
    assert!(alert_json["data"].is_null());
    assert!(alert_json["transformer_id"].is_null());

    let peak_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("peak_risk.json")).unwrap())
            .unwrap();
    assert_eq!(peak_json["data"]["riskRatio"].as_f64().unwrap(), 0.375);
    assert_eq!(peak_json["data"]["riskLevel"], "LOW");
}

#[test]
fn baseline_files_feed_the_forecaster() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("baseline.yaml");

    let mut hourly: BTreeMap<u32, f64> = (0..24u32).map(|h| (h, 100.0)).collect();
    hourly.insert(19, 150.0);
    fs::write(&path, serde_yaml::to_string(&hourly).unwrap()).unwrap();

    let forecaster = evening_forecaster();
    forecaster.set_baseline(load_baseline_from_file(&path).expect("baseline"));

    let points = forecaster.forecast_24h(19, 150.0, 160.0).expect("forecast");
    assert_eq!(points[0].predicted_load_kw, 150.0);
    assert_eq!(points[0].risk_ratio, 0.938);
    assert_eq!(points[0].risk_level, RiskLevel::High);
    assert_eq!(points[1].predicted_load_kw, 100.0);
    assert_eq!(points[1].risk_level, RiskLevel::Low);
}
