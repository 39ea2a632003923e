//! ---
//! gp_section: "01-core-functionality"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Shared primitives and utilities for the core runtime."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
//! Core shared primitives for the GridPulse workspace.
//! This crate exposes configuration loading, logging setup, and the clock
//! abstraction consumed across the workspace.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    hash_config, AlertingConfig, ApiConfig, AppConfig, FleetConfig, ForecastConfig,
    LoadedAppConfig, LoggingConfig, MetricsConfig, PatternConfig, ReportConfig, TelemetryConfig,
    TransformerConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use time::{Clock, FixedClock, SystemClock};
