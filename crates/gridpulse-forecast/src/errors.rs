//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastEngineError>;

#[derive(Debug, Error)]
pub enum ForecastEngineError {
    #[error("baseline not set; supply hourly averages or generate one from a pattern")]
    BaselineNotConfigured,
    #[error("baseline incomplete; missing hours {0:?}")]
    IncompleteBaseline(Vec<u32>),
    #[error("hour {0} is outside the 0-23 range")]
    InvalidHour(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("yaml serialization error: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),
    #[error("csv error: {0}")]
    CsvFailed(#[from] csv::Error),
}
