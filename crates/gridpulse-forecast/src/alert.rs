//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use gridpulse_common::AlertingConfig;
use serde::{Deserialize, Serialize};

use crate::model::{round_ratio, ForecastPoint, OverloadAlert, PeakRiskInfo};

/// Thresholds governing when a forward series raises a predictive alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub critical_threshold: f64,
    pub min_lead_time_hours: u32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            critical_threshold: 0.9,
            min_lead_time_hours: 2,
        }
    }
}

impl From<AlertingConfig> for AlertPolicy {
    fn from(config: AlertingConfig) -> Self {
        Self {
            critical_threshold: config.critical_threshold,
            min_lead_time_hours: config.min_lead_time_hours,
        }
    }
}

/// Find the point with the highest risk ratio. The earliest occurrence wins
/// ties, matching operator expectations that the first flagged hour is the
/// one to act on.
pub fn find_peak_risk(points: &[ForecastPoint]) -> Option<PeakRiskInfo> {
    let (first, rest) = points.split_first()?;
    let peak = rest.iter().fold(first, |max, point| {
        if point.risk_ratio > max.risk_ratio {
            point
        } else {
            max
        }
    });
    Some(PeakRiskInfo::from_point(peak))
}

/// Raise a predictive overload alert when any actionable point crosses the
/// critical threshold.
///
/// Points closer than `min_lead_time_hours` are excluded: crews cannot
/// respond to them in time, so they never gate the alert. The alert pins the
/// earliest qualifying point and counts every qualifying hour in the series.
pub fn assess_overload_risk(
    points: &[ForecastPoint],
    policy: &AlertPolicy,
) -> Option<OverloadAlert> {
    let critical: Vec<&ForecastPoint> = points
        .iter()
        .filter(|point| {
            point.risk_ratio >= policy.critical_threshold
                && point.offset_hours >= policy.min_lead_time_hours
        })
        .collect();

    let first_critical = critical
        .iter()
        .copied()
        .min_by_key(|point| point.offset_hours)?;

    let excess = first_critical.risk_ratio - policy.critical_threshold;
    let confidence = round_ratio((0.6 + excess / 0.2).min(0.95));

    Some(OverloadAlert {
        first_critical_hour: first_critical.hour,
        hours_ahead: first_critical.offset_hours,
        predicted_load_kw: first_critical.predicted_load_kw,
        risk_ratio: first_critical.risk_ratio,
        confidence,
        critical_hours_count: critical.len(),
        recommended_action: recommended_action(
            first_critical.risk_ratio,
            first_critical.offset_hours,
        ),
    })
}

fn recommended_action(risk_ratio: f64, hours_ahead: u32) -> String {
    let severity = if risk_ratio >= 0.98 {
        "URGENT: Pre-stage crew for immediate intervention. "
    } else if risk_ratio >= 0.92 {
        "WARNING: Monitor closely and prepare load management. "
    } else {
        "ADVISORY: Voluntary load reduction recommended. "
    };

    let timing = if hours_ahead >= 6 {
        format!("Expected in {hours_ahead} hours - plan scheduled response.")
    } else if hours_ahead >= 3 {
        format!("Expected in {hours_ahead} hours - coordinate with barangay officials.")
    } else {
        format!("Expected in {hours_ahead} hours - immediate action required.")
    };

    format!("{severity}{timing}")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::model::RiskLevel;
    use crate::risk::classify_risk;

    fn point(hour: u32, offset_hours: u32, risk_ratio: f64) -> ForecastPoint {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 19, 0, 0).unwrap();
        ForecastPoint {
            hour,
            offset_hours,
            timestamp: start + Duration::hours(i64::from(offset_hours)),
            predicted_load_kw: risk_ratio * 150.0,
            baseline_load_kw: 100.0,
            adjustment_kw: 0.0,
            risk_ratio,
            risk_level: classify_risk(risk_ratio),
        }
    }

    #[test]
    fn peak_risk_picks_the_maximum_ratio() {
        let points = vec![point(19, 0, 0.8), point(20, 1, 1.1), point(21, 2, 0.9)];
        let peak = find_peak_risk(&points).unwrap();
        assert_eq!(peak.hour, 20);
        assert_eq!(peak.offset_hours, 1);
        assert_eq!(peak.risk_ratio, 1.1);
        assert_eq!(peak.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn peak_risk_ties_resolve_to_the_earliest_point() {
        let points = vec![point(19, 0, 0.95), point(20, 1, 0.95), point(21, 2, 0.7)];
        let peak = find_peak_risk(&points).unwrap();
        assert_eq!(peak.offset_hours, 0);
    }

    #[test]
    fn peak_risk_of_an_empty_series_is_none() {
        assert!(find_peak_risk(&[]).is_none());
    }

    #[test]
    fn imminent_overload_raises_an_urgent_alert() {
        let points = vec![
            point(19, 0, 1.067),
            point(20, 1, 1.046),
            point(21, 2, 1.025),
            point(22, 3, 0.98),
            point(23, 4, 0.85),
        ];
        let alert = assess_overload_risk(&points, &AlertPolicy::default()).unwrap();
        assert_eq!(alert.first_critical_hour, 21);
        assert_eq!(alert.hours_ahead, 2);
        assert_eq!(alert.risk_ratio, 1.025);
        assert_eq!(alert.confidence, 0.95);
        assert_eq!(alert.critical_hours_count, 2);
        assert_eq!(
            alert.recommended_action,
            "URGENT: Pre-stage crew for immediate intervention. \
             Expected in 2 hours - immediate action required."
        );
    }

    #[test]
    fn quiet_series_raises_no_alert() {
        let points: Vec<ForecastPoint> = (0..24u32)
            .map(|offset| point((19 + offset) % 24, offset, 0.4))
            .collect();
        assert!(assess_overload_risk(&points, &AlertPolicy::default()).is_none());
    }

    #[test]
    fn empty_series_raises_no_alert() {
        assert!(assess_overload_risk(&[], &AlertPolicy::default()).is_none());
    }

    #[test]
    fn critical_points_inside_the_lead_time_are_ignored() {
        let points = vec![point(19, 0, 1.2), point(20, 1, 1.1), point(21, 2, 0.5)];
        assert!(assess_overload_risk(&points, &AlertPolicy::default()).is_none());
    }

    #[test]
    fn confidence_scales_with_threshold_excess_and_caps() {
        let policy = AlertPolicy::default();

        let at_threshold = assess_overload_risk(&[point(21, 2, 0.9)], &policy).unwrap();
        assert_eq!(at_threshold.confidence, 0.6);

        let mid = assess_overload_risk(&[point(21, 2, 0.92)], &policy).unwrap();
        assert_eq!(mid.confidence, 0.7);

        let capped = assess_overload_risk(&[point(21, 2, 1.5)], &policy).unwrap();
        assert_eq!(capped.confidence, 0.95);
    }

    #[test]
    fn recommendation_severity_tracks_the_ratio() {
        let policy = AlertPolicy::default();

        let advisory = assess_overload_risk(&[point(21, 2, 0.91)], &policy).unwrap();
        assert!(advisory.recommended_action.starts_with("ADVISORY:"));

        let warning = assess_overload_risk(&[point(21, 2, 0.92)], &policy).unwrap();
        assert!(warning.recommended_action.starts_with("WARNING:"));

        let urgent = assess_overload_risk(&[point(21, 2, 0.98)], &policy).unwrap();
        assert!(urgent.recommended_action.starts_with("URGENT:"));
    }

    #[test]
    fn recommendation_timing_tracks_the_lead_time() {
        let policy = AlertPolicy::default();

        let immediate = assess_overload_risk(&[point(21, 2, 0.95)], &policy).unwrap();
        assert!(immediate
            .recommended_action
            .ends_with("immediate action required."));

        let coordinate = assess_overload_risk(&[point(22, 3, 0.95)], &policy).unwrap();
        assert!(coordinate
            .recommended_action
            .ends_with("coordinate with barangay officials."));

        let scheduled = assess_overload_risk(&[point(1, 6, 0.95)], &policy).unwrap();
        assert!(scheduled
            .recommended_action
            .ends_with("plan scheduled response."));
    }

    #[test]
    fn policy_derives_from_alerting_config() {
        let policy = AlertPolicy::from(AlertingConfig {
            critical_threshold: 0.8,
            min_lead_time_hours: 4,
        });
        let points = vec![point(21, 2, 0.85), point(23, 4, 0.85)];
        let alert = assess_overload_risk(&points, &policy).unwrap();
        assert_eq!(alert.hours_ahead, 4);
        assert_eq!(alert.critical_hours_count, 1);
    }
}
