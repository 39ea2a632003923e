//! ---
//! gp_section: "01-core-functionality"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Shared primitives and utilities for the core runtime."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::logging::LogFormat;

fn default_alpha() -> f64 {
    0.5
}

fn default_peak_hour() -> u32 {
    19
}

fn default_peak_load_kw() -> f64 {
    150.0
}

fn default_base_load_kw() -> f64 {
    80.0
}

fn default_critical_threshold() -> f64 {
    0.9
}

fn default_min_lead_time_hours() -> u32 {
    2
}

fn default_rolling_window() -> Duration {
    Duration::from_secs(1800)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_listen() -> SocketAddr {
    "0.0.0.0:9187"
        .parse()
        .expect("valid default metrics address")
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_listen() -> SocketAddr {
    "0.0.0.0:8087".parse().expect("valid default api address")
}

fn default_report_directory() -> PathBuf {
    PathBuf::from("reports")
}

/// Primary configuration object for the GridPulse runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub reports: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "GRIDPULSE_CONFIG";

    /// Load configuration from disk, respecting the `GRIDPULSE_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.forecast.validate()?;
        self.alerting.validate()?;
        self.fleet.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Forecast engine tuning: EWMA weight and the default diurnal pattern used
/// when no explicit baseline file is supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub pattern: PatternConfig,
    #[serde(default)]
    pub baseline_file: Option<PathBuf>,
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(anyhow!(
                "forecast alpha must be within (0, 1], got {}",
                self.alpha
            ));
        }
        self.pattern.validate()
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            pattern: PatternConfig::default(),
            baseline_file: None,
        }
    }
}

/// Raised-cosine diurnal curve parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_peak_hour")]
    pub peak_hour: u32,
    #[serde(default = "default_peak_load_kw")]
    pub peak_load_kw: f64,
    #[serde(default = "default_base_load_kw")]
    pub base_load_kw: f64,
}

impl PatternConfig {
    pub fn validate(&self) -> Result<()> {
        if self.peak_hour >= 24 {
            return Err(anyhow!(
                "pattern peak_hour must be within 0..=23, got {}",
                self.peak_hour
            ));
        }
        if self.base_load_kw < 0.0 {
            return Err(anyhow!(
                "pattern base_load_kw must be non-negative, got {}",
                self.base_load_kw
            ));
        }
        if self.peak_load_kw < self.base_load_kw {
            return Err(anyhow!(
                "pattern peak_load_kw ({}) must not be below base_load_kw ({})",
                self.peak_load_kw,
                self.base_load_kw
            ));
        }
        Ok(())
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            peak_hour: default_peak_hour(),
            peak_load_kw: default_peak_load_kw(),
            base_load_kw: default_base_load_kw(),
        }
    }
}

/// Overload alerting thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertingConfig {
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
    #[serde(default = "default_min_lead_time_hours")]
    pub min_lead_time_hours: u32,
}

impl AlertingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.critical_threshold <= 0.0 {
            return Err(anyhow!(
                "alerting critical_threshold must be positive, got {}",
                self.critical_threshold
            ));
        }
        Ok(())
    }
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            critical_threshold: default_critical_threshold(),
            min_lead_time_hours: default_min_lead_time_hours(),
        }
    }
}

/// Rolling-window settings for deriving the recent mean load.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_rolling_window")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub rolling_window: Duration,
    #[serde(default)]
    pub samples_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            rolling_window: default_rolling_window(),
            samples_file: None,
        }
    }
}

/// Fleet asset sources: an optional CSV inventory plus inline overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FleetConfig {
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub transformers: IndexMap<String, TransformerConfig>,
}

impl FleetConfig {
    pub fn validate(&self) -> Result<()> {
        for (id, transformer) in &self.transformers {
            if transformer.capacity_kw <= 0.0 {
                return Err(anyhow!(
                    "fleet transformer '{}' must declare a positive capacity_kw",
                    id
                ));
            }
        }
        Ok(())
    }
}

/// Inline transformer entry, merged over the CSV inventory by id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransformerConfig {
    pub capacity_kw: f64,
}

/// Report export destination for one-shot evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_directory")]
    pub directory: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            listen: default_metrics_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            listen: default_api_listen(),
        }
    }
}

/// Compute the SHA-256 hash of a validated [`AppConfig`].
///
/// The hash is taken over the canonical TOML rendering so that semantically
/// identical files with different key ordering or comments agree.
pub fn hash_config(config: &AppConfig) -> Result<String> {
    let serialised = toml::to_string(config)
        .with_context(|| "failed to serialise configuration for hashing")?;
    let mut hasher = Sha256::new();
    hasher.update(serialised.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_config_passes_validation() {
        let config = AppConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.forecast.alpha, 0.5);
        assert_eq!(config.forecast.pattern.peak_hour, 19);
        assert_eq!(config.alerting.critical_threshold, 0.9);
        assert_eq!(config.alerting.min_lead_time_hours, 2);
        assert_eq!(config.telemetry.rolling_window, Duration::from_secs(1800));
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_str("").expect("empty config parses");
        assert_eq!(config.forecast.pattern.peak_load_kw, 150.0);
        assert!(config.metrics.enabled);
        assert!(config.fleet.transformers.is_empty());
    }

    #[test]
    fn parses_partial_sections() {
        let config = AppConfig::from_str(
            r#"
            [forecast]
            alpha = 0.3

            [alerting]
            critical_threshold = 0.85

            [fleet.transformers.TR-001]
            capacity_kw = 250.0
            "#,
        )
        .expect("partial config parses");
        assert_eq!(config.forecast.alpha, 0.3);
        assert_eq!(config.alerting.critical_threshold, 0.85);
        assert_eq!(
            config.fleet.transformers.get("TR-001").map(|t| t.capacity_kw),
            Some(250.0)
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.forecast.pattern.base_load_kw, 80.0);
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        let err = AppConfig::from_str("[forecast]\nalpha = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn rejects_peak_hour_out_of_range() {
        let err = AppConfig::from_str("[forecast.pattern]\npeak_hour = 24\n").unwrap_err();
        assert!(err.to_string().contains("peak_hour"));
    }

    #[test]
    fn rejects_inverted_pattern_loads() {
        let err = AppConfig::from_str(
            "[forecast.pattern]\npeak_load_kw = 50.0\nbase_load_kw = 80.0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("peak_load_kw"));
    }

    #[test]
    fn rejects_non_positive_fleet_capacity() {
        let err = AppConfig::from_str("[fleet.transformers.TR-9]\ncapacity_kw = 0.0\n")
            .unwrap_err();
        assert!(err.to_string().contains("TR-9"));
    }

    #[test]
    fn hash_is_stable_for_identical_configs() {
        let a = AppConfig::default();
        let b = AppConfig::default();
        assert_eq!(hash_config(&a).unwrap(), hash_config(&b).unwrap());
    }

    #[test]
    fn hash_changes_with_content() {
        let a = AppConfig::default();
        let mut b = AppConfig::default();
        b.forecast.alpha = 0.7;
        assert_ne!(hash_config(&a).unwrap(), hash_config(&b).unwrap());
    }
}
