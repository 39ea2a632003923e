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
use std::f64::consts::PI;

use gridpulse_common::PatternConfig;
use serde::{Deserialize, Serialize};

use crate::errors::{ForecastEngineError, Result};

pub const HOURS_PER_DAY: usize = 24;

/// Expected load per hour of day. Construction guarantees all 24 hours are
/// present, so look-ups are total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBaseline {
    loads_kw: [f64; HOURS_PER_DAY],
}

impl HourlyBaseline {
    /// Build a baseline from explicit historical hourly averages.
    ///
    /// Rejects maps with hours outside 0..=23 and reports every missing hour,
    /// since a partial curve would leave forecast look-ups undefined.
    pub fn from_hourly_averages(hourly_averages: &BTreeMap<u32, f64>) -> Result<Self> {
        if let Some((&hour, _)) = hourly_averages.iter().find(|(&hour, _)| hour >= 24) {
            return Err(ForecastEngineError::InvalidHour(hour));
        }

        let mut loads_kw = [0.0; HOURS_PER_DAY];
        let mut missing = Vec::new();
        for hour in 0..HOURS_PER_DAY as u32 {
            match hourly_averages.get(&hour) {
                Some(load) => loads_kw[hour as usize] = *load,
                None => missing.push(hour),
            }
        }
        if !missing.is_empty() {
            return Err(ForecastEngineError::IncompleteBaseline(missing));
        }
        Ok(Self { loads_kw })
    }

    /// Synthesize a smooth diurnal curve: a raised cosine centred on the
    /// pattern's peak hour, reaching `base_load_kw` twelve hours away.
    pub fn from_pattern(pattern: &DiurnalPattern) -> Self {
        let variation = (pattern.peak_load_kw - pattern.base_load_kw) / 2.0;
        let mut loads_kw = [0.0; HOURS_PER_DAY];
        for (hour, slot) in loads_kw.iter_mut().enumerate() {
            let phase = (hour as f64 - pattern.peak_hour as f64) * 2.0 * PI / 24.0;
            *slot = pattern.base_load_kw + variation * (1.0 + phase.cos());
        }
        Self { loads_kw }
    }

    pub fn load_at(&self, hour: u32) -> f64 {
        self.loads_kw[(hour % HOURS_PER_DAY as u32) as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.loads_kw
    }

    pub fn to_map(&self) -> BTreeMap<u32, f64> {
        self.loads_kw
            .iter()
            .enumerate()
            .map(|(hour, load)| (hour as u32, *load))
            .collect()
    }
}

/// Tunable parameters for the synthesized diurnal curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiurnalPattern {
    pub peak_hour: u32,
    pub peak_load_kw: f64,
    pub base_load_kw: f64,
}

impl Default for DiurnalPattern {
    fn default() -> Self {
        Self {
            peak_hour: 19,
            peak_load_kw: 150.0,
            base_load_kw: 80.0,
        }
    }
}

impl From<PatternConfig> for DiurnalPattern {
    fn from(config: PatternConfig) -> Self {
        Self {
            peak_hour: config.peak_hour,
            peak_load_kw: config.peak_load_kw,
            base_load_kw: config.base_load_kw,
        }
    }
}
