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
use std::{fs, io::BufRead, path::Path};

use crate::{
    baseline::HourlyBaseline,
    errors::{ForecastEngineError, Result},
    model::Transformer,
    telemetry::LoadSample,
};

/// Load an hourly baseline from a JSON or YAML map of hour to kW. JSON is
/// sniffed by a leading brace; anything else parses as YAML.
pub fn load_baseline_from_file(path: impl AsRef<Path>) -> Result<HourlyBaseline> {
    let data = fs::read_to_string(path)?;
    let hourly: BTreeMap<u32, f64> = if data.trim_start().starts_with('{') {
        serde_json::from_str(&data)?
    } else {
        serde_yaml::from_str(&data).map_err(ForecastEngineError::YamlSerializationFailed)?
    };
    HourlyBaseline::from_hourly_averages(&hourly)
}

pub fn load_samples_from_jsonl(path: impl AsRef<Path>) -> Result<Vec<LoadSample>> {
    let file = fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut samples = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        samples.push(serde_json::from_str(&line)?);
    }
    Ok(samples)
}

/// Load the transformer fleet from a headered CSV inventory export.
pub fn load_fleet_from_csv(path: impl AsRef<Path>) -> Result<Vec<Transformer>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut fleet = Vec::new();
    for row in reader.deserialize::<Transformer>() {
        fleet.push(row?);
    }
    Ok(fleet)
}
