//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One telemetry reading for a transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSample {
    pub timestamp: DateTime<Utc>,
    pub transformer_id: String,
    pub load_kw: f64,
}

fn mean_within<'a, I>(samples: I, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Option<f64>
where
    I: Iterator<Item = &'a LoadSample>,
{
    let mut total = 0.0;
    let mut count = 0u32;
    for sample in samples {
        if sample.timestamp >= cutoff && sample.timestamp <= now {
            total += sample.load_kw;
            count += 1;
        }
    }
    (count > 0).then(|| total / f64::from(count))
}

/// Arithmetic mean of loads observed in the trailing window, bounds
/// inclusive. Samples stamped after `now` are ignored; `None` when nothing
/// falls in the window.
pub fn rolling_mean_kw(
    samples: &[LoadSample],
    window: Duration,
    now: DateTime<Utc>,
) -> Option<f64> {
    let cutoff = now - chrono::Duration::from_std(window).ok()?;
    mean_within(samples.iter(), cutoff, now)
}

/// Same as [`rolling_mean_kw`], restricted to one transformer's samples.
pub fn rolling_mean_for(
    samples: &[LoadSample],
    transformer_id: &str,
    window: Duration,
    now: DateTime<Utc>,
) -> Option<f64> {
    let cutoff = now - chrono::Duration::from_std(window).ok()?;
    mean_within(
        samples
            .iter()
            .filter(|sample| sample.transformer_id == transformer_id),
        cutoff,
        now,
    )
}
