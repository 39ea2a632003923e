//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gridpulse_common::{Clock, ForecastConfig, SystemClock};
use parking_lot::RwLock;
use tracing::debug;

use crate::baseline::{DiurnalPattern, HourlyBaseline};
use crate::errors::{ForecastEngineError, Result};
use crate::model::{round_kw, round_ratio, ForecastPoint};
use crate::risk::classify_risk;

/// Hours for the adjustment to decay to 1/e of its initial weight.
const DECAY_TIME_CONSTANT_HOURS: f64 = 12.0;

/// EWMA-style short-term load forecaster.
///
/// Holds a shared hourly baseline behind a lock so a running daemon can swap
/// in a fresh curve while request handlers keep forecasting against a
/// consistent snapshot. All forecasting is a pure function of the inputs and
/// the snapshot taken at call time.
#[derive(Debug)]
pub struct LoadForecaster {
    alpha: f64,
    baseline: RwLock<Option<Arc<HourlyBaseline>>>,
    clock: Arc<dyn Clock>,
}

impl LoadForecaster {
    pub fn new(alpha: f64) -> Self {
        Self::with_clock(alpha, Arc::new(SystemClock))
    }

    /// Inject an explicit clock. Used by tests and by replay tooling that
    /// needs deterministic timestamps.
    pub fn with_clock(alpha: f64, clock: Arc<dyn Clock>) -> Self {
        Self {
            alpha,
            baseline: RwLock::new(None),
            clock,
        }
    }

    /// Build a forecaster from configuration, seeding the baseline from the
    /// configured diurnal pattern. A baseline file, if configured, is loaded
    /// separately and installed over this seed.
    pub fn from_config(config: &ForecastConfig) -> Self {
        let forecaster = Self::new(config.alpha);
        forecaster.generate_baseline_from_pattern(&DiurnalPattern::from(config.pattern));
        forecaster
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn current_hour(&self) -> u32 {
        self.clock.current_hour()
    }

    /// Install a baseline, replacing any previous curve. In-flight forecasts
    /// keep the snapshot they already took.
    pub fn set_baseline(&self, baseline: HourlyBaseline) {
        *self.baseline.write() = Some(Arc::new(baseline));
    }

    pub fn generate_baseline_from_pattern(&self, pattern: &DiurnalPattern) {
        self.set_baseline(HourlyBaseline::from_pattern(pattern));
    }

    pub fn baseline_snapshot(&self) -> Option<Arc<HourlyBaseline>> {
        self.baseline.read().clone()
    }

    /// Produce the 24-point forward series starting at `current_hour`.
    ///
    /// The deviation of `recent_mean_kw` from the baseline at the current
    /// hour, weighted by alpha, is carried forward with exponential decay.
    /// Predicted loads floor at zero; the risk ratio is zero whenever
    /// `capacity_kw` is not positive.
    pub fn forecast_24h(
        &self,
        current_hour: u32,
        recent_mean_kw: f64,
        capacity_kw: f64,
    ) -> Result<Vec<ForecastPoint>> {
        if current_hour >= 24 {
            return Err(ForecastEngineError::InvalidHour(current_hour));
        }
        let baseline = self
            .baseline_snapshot()
            .ok_or(ForecastEngineError::BaselineNotConfigured)?;

        let adjustment = self.alpha * (recent_mean_kw - baseline.load_at(current_hour));
        let now = self.now();
        debug!(
            current_hour,
            recent_mean_kw, capacity_kw, adjustment, "computing 24h forecast"
        );

        let mut points = Vec::with_capacity(24);
        for offset in 0..24u32 {
            let future_hour = (current_hour + offset) % 24;
            let baseline_load = baseline.load_at(future_hour);
            let decay = (-f64::from(offset) / DECAY_TIME_CONSTANT_HOURS).exp();
            let predicted = (baseline_load + adjustment * decay).max(0.0);
            let risk_ratio = if capacity_kw > 0.0 {
                predicted / capacity_kw
            } else {
                0.0
            };

            points.push(ForecastPoint {
                hour: future_hour,
                offset_hours: offset,
                timestamp: now + Duration::hours(i64::from(offset)),
                predicted_load_kw: round_kw(predicted),
                baseline_load_kw: round_kw(baseline_load),
                adjustment_kw: round_kw(adjustment * decay),
                risk_ratio: round_ratio(risk_ratio),
                // Tiering keys off the unrounded ratio.
                risk_level: classify_risk(risk_ratio),
            });
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use gridpulse_common::FixedClock;

    use super::*;
    use crate::model::RiskLevel;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2024, 6, 3, 19, 0, 0).unwrap(),
        ))
    }

    fn pattern_forecaster() -> LoadForecaster {
        let forecaster = LoadForecaster::with_clock(0.5, fixed_clock());
        forecaster.generate_baseline_from_pattern(&DiurnalPattern::default());
        forecaster
    }

    #[test]
    fn evening_surge_forecast_matches_expected_numbers() {
        let forecaster = pattern_forecaster();
        let points = forecaster.forecast_24h(19, 170.0, 150.0).unwrap();
        assert_eq!(points.len(), 24);

        let first = &points[0];
        assert_eq!(first.hour, 19);
        assert_eq!(first.offset_hours, 0);
        assert_eq!(first.predicted_load_kw, 160.0);
        assert_eq!(first.adjustment_kw, 10.0);
        assert_eq!(first.risk_ratio, 1.067);
        assert_eq!(first.risk_level, RiskLevel::Critical);

        let third = &points[2];
        assert_eq!(third.hour, 21);
        assert_eq!(third.offset_hours, 2);
        assert_eq!(third.baseline_load_kw, 145.31);
        assert_eq!(third.adjustment_kw, 8.46);
        assert_eq!(third.predicted_load_kw, 153.78);
        assert_eq!(third.risk_ratio, 1.025);
        assert_eq!(third.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn series_covers_a_full_day_in_order() {
        let forecaster = pattern_forecaster();
        let now = forecaster.now();
        let points = forecaster.forecast_24h(19, 120.0, 200.0).unwrap();
        for (index, point) in points.iter().enumerate() {
            let offset = index as u32;
            assert_eq!(point.offset_hours, offset);
            assert_eq!(point.hour, (19 + offset) % 24);
            assert_eq!(point.timestamp, now + Duration::hours(i64::from(offset)));
        }
    }

    #[test]
    fn adjustment_decays_exponentially_across_the_horizon() {
        let forecaster = pattern_forecaster();
        let low = forecaster.forecast_24h(19, 170.0, 150.0).unwrap();
        let high = forecaster.forecast_24h(19, 270.0, 150.0).unwrap();

        let spread_at_start = high[0].predicted_load_kw - low[0].predicted_load_kw;
        let spread_at_end = high[23].predicted_load_kw - low[23].predicted_load_kw;
        assert_eq!(spread_at_start, 50.0);

        let expected_decay = (-23.0_f64 / 12.0).exp();
        let observed_decay = spread_at_end / spread_at_start;
        assert!(
            (observed_decay - expected_decay).abs() < 1e-3,
            "decay at offset 23 was {observed_decay}, expected about {expected_decay}"
        );
    }

    #[test]
    fn repeated_calls_with_a_fixed_clock_are_identical() {
        let forecaster = pattern_forecaster();
        let first = forecaster.forecast_24h(19, 170.0, 150.0).unwrap();
        let second = forecaster.forecast_24h(19, 170.0, 150.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_positive_capacity_yields_zero_ratio() {
        let forecaster = pattern_forecaster();
        for capacity in [0.0, -50.0] {
            let points = forecaster.forecast_24h(19, 170.0, capacity).unwrap();
            for point in &points {
                assert_eq!(point.risk_ratio, 0.0);
                assert_eq!(point.risk_level, RiskLevel::Low);
            }
        }
    }

    #[test]
    fn predicted_load_floors_at_zero() {
        // A steep drop from a high-baseline hour drags the low hours negative
        // before the floor kicks in.
        let mut hourly: BTreeMap<u32, f64> = (0..24u32).map(|h| (h, 1.0)).collect();
        hourly.insert(0, 100.0);
        let forecaster = LoadForecaster::with_clock(0.5, fixed_clock());
        forecaster.set_baseline(HourlyBaseline::from_hourly_averages(&hourly).unwrap());

        let points = forecaster.forecast_24h(0, 0.0, 200.0).unwrap();
        assert_eq!(points[1].predicted_load_kw, 0.0);
        assert_eq!(points[1].risk_ratio, 0.0);
    }

    #[test]
    fn forecasting_without_a_baseline_is_an_error() {
        let forecaster = LoadForecaster::with_clock(0.5, fixed_clock());
        let err = forecaster.forecast_24h(19, 170.0, 150.0).unwrap_err();
        assert!(matches!(err, ForecastEngineError::BaselineNotConfigured));
    }

    #[test]
    fn out_of_range_hours_are_rejected() {
        let forecaster = pattern_forecaster();
        let err = forecaster.forecast_24h(24, 170.0, 150.0).unwrap_err();
        assert!(matches!(err, ForecastEngineError::InvalidHour(24)));
    }

    #[test]
    fn from_config_seeds_a_pattern_baseline() {
        let config = ForecastConfig {
            alpha: 0.5,
            pattern: gridpulse_common::PatternConfig {
                peak_hour: 19,
                peak_load_kw: 150.0,
                base_load_kw: 80.0,
            },
            baseline_file: None,
        };
        let forecaster = LoadForecaster::from_config(&config);
        let baseline = forecaster.baseline_snapshot().expect("baseline seeded");
        assert_eq!(baseline.load_at(19), 150.0);
        assert_eq!(forecaster.alpha(), 0.5);
    }
}
