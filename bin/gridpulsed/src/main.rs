//! ---
//! gp_section: "01-core-functionality"
//! gp_subsection: "binary"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Binary entrypoint for the GridPulse daemon."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use gridpulse_common::{hash_config, init_tracing, AppConfig};
use gridpulse_forecast::{
    alert::AlertPolicy,
    api::{router, ForecastApiState},
    evaluate_transformer, evaluate_transformer_with_options,
    forecaster::LoadForecaster,
    io::{load_baseline_from_file, load_fleet_from_csv, load_samples_from_jsonl},
    model::{Transformer, TransformerKind},
    telemetry::{rolling_mean_for, rolling_mean_kw},
    EvaluationRequest,
};
use gridpulse_metrics::{new_registry, spawn_http_server, DaemonMetrics};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    version = concat!("GridPulse ", env!("CARGO_PKG_VERSION")),
    about = "GridPulse load forecasting daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the forecast service")]
    Run,
    #[command(about = "Evaluate one transformer and print the summary")]
    Forecast(ForecastArgs),
}

#[derive(Debug, Args)]
struct ForecastArgs {
    #[arg(long, help = "Hour of day 0-23; defaults to the current UTC hour")]
    current_hour: Option<u32>,

    #[arg(
        long,
        help = "Recent mean load in kW; derived from telemetry.samples_file when omitted"
    )]
    recent_mean_kw: Option<f64>,

    #[arg(long, help = "Rated capacity in kW; overrides any fleet lookup")]
    capacity_kw: Option<f64>,

    #[arg(
        long,
        value_name = "ID",
        help = "Resolve capacity from this fleet transformer"
    )]
    transformer: Option<String>,

    #[arg(long, value_name = "FILE", help = "Hourly baseline file (JSON or YAML)")]
    baseline_file: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Report output directory")]
    output_dir: Option<PathBuf>,

    #[arg(long, help = "Skip report export")]
    no_export: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("GridPulse {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/gridpulse.toml"));
    candidates.push(PathBuf::from("configs/example.dev.toml"));

    let load_started = Instant::now();
    let loaded = AppConfig::load_with_source(&candidates)?;
    let config = loaded.config;
    let config_path = loaded.source;
    let load_duration = load_started.elapsed();
    let config_hash = hash_config(&config)?;

    let metrics_registry = new_registry();
    let daemon_metrics = DaemonMetrics::new(metrics_registry.clone())?;
    daemon_metrics.observe_config_load(load_duration.as_secs_f64());
    daemon_metrics.inc_start();
    daemon_metrics.set_build_info(env!("CARGO_PKG_VERSION"), build_profile());

    init_tracing("gridpulsed", &config.logging)?;
    info!(
        config_path = %config_path.display(),
        config_hash = %config_hash,
        "configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_daemon(config, daemon_metrics).await?,
        Commands::Forecast(args) => run_forecast(config, args)?,
    }

    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn build_forecaster(config: &AppConfig) -> Result<LoadForecaster> {
    let forecaster = LoadForecaster::from_config(&config.forecast);
    if let Some(path) = &config.forecast.baseline_file {
        let baseline = load_baseline_from_file(path)
            .with_context(|| format!("failed to load baseline file {}", path.display()))?;
        forecaster.set_baseline(baseline);
        info!(baseline_file = %path.display(), "baseline loaded from file");
    }
    Ok(forecaster)
}

fn load_fleet(config: &AppConfig) -> Result<Vec<Transformer>> {
    let mut fleet = match &config.fleet.source {
        Some(path) => load_fleet_from_csv(path)
            .with_context(|| format!("failed to load fleet inventory {}", path.display()))?,
        None => Vec::new(),
    };

    for (id, entry) in &config.fleet.transformers {
        match fleet.iter_mut().find(|transformer| &transformer.id == id) {
            Some(existing) => existing.capacity_kw = entry.capacity_kw,
            // Inline-only entries carry no survey data; they exist for
            // capacity lookups.
            None => fleet.push(Transformer {
                id: id.clone(),
                kind: TransformerKind::PolePadTransformer,
                latitude: 0.0,
                longitude: 0.0,
                capacity_kw: entry.capacity_kw,
                parent_id: None,
                downstream_buildings: 0,
            }),
        }
    }
    Ok(fleet)
}

async fn run_daemon(config: AppConfig, metrics: DaemonMetrics) -> Result<()> {
    let forecaster = Arc::new(build_forecaster(&config)?);
    let fleet = load_fleet(&config)?;
    metrics.set_fleet_size(fleet.len());
    info!(transformers = fleet.len(), "fleet loaded");

    let metrics_server = if config.metrics.enabled {
        info!(address = %config.metrics.listen, "metrics exporter enabled");
        Some(spawn_http_server(metrics.registry(), config.metrics.listen)?)
    } else {
        info!("metrics exporter disabled by configuration");
        None
    };

    let mut api_handle = None;
    if config.api.enabled {
        let state = Arc::new(ForecastApiState {
            forecaster: forecaster.clone(),
            policy: AlertPolicy::from(config.alerting),
            fleet,
        });
        let listener = tokio::net::TcpListener::bind(config.api.listen)
            .await
            .with_context(|| format!("failed to bind api listener {}", config.api.listen))?;
        info!(address = %config.api.listen, "forecast api listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(state);
        let task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                warn!(error = %err, "forecast api server stopped unexpectedly");
            }
        });
        api_handle = Some((shutdown_tx, task));
    } else {
        info!("forecast api disabled by configuration");
    }

    info!("daemon running; waiting for termination signal");
    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");

    if let Some((shutdown_tx, task)) = api_handle {
        let _ = shutdown_tx.send(());
        let _ = task.await;
    }
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }

    Ok(())
}

fn run_forecast(config: AppConfig, args: ForecastArgs) -> Result<()> {
    let forecaster = build_forecaster(&config)?;
    if let Some(path) = &args.baseline_file {
        let baseline = load_baseline_from_file(path)
            .with_context(|| format!("failed to load baseline file {}", path.display()))?;
        forecaster.set_baseline(baseline);
    }

    let fleet = load_fleet(&config)?;
    let capacity_kw = match (args.capacity_kw, &args.transformer) {
        (Some(capacity), _) => capacity,
        (None, Some(id)) => fleet
            .iter()
            .find(|transformer| &transformer.id == id)
            .map(|transformer| transformer.capacity_kw)
            .ok_or_else(|| anyhow!("transformer '{}' not present in the configured fleet", id))?,
        (None, None) => {
            return Err(anyhow!(
                "either --capacity-kw or --transformer is required to size the forecast"
            ))
        }
    };

    let recent_mean_kw = match args.recent_mean_kw {
        Some(value) => value,
        None => derive_recent_mean(&config, &forecaster, args.transformer.as_deref())?,
    };

    let current_hour = args
        .current_hour
        .unwrap_or_else(|| forecaster.current_hour());
    let request = EvaluationRequest {
        transformer_id: args.transformer.clone(),
        current_hour,
        recent_mean_kw,
        capacity_kw,
    };
    let policy = AlertPolicy::from(config.alerting);

    let summary = if args.no_export {
        evaluate_transformer(&forecaster, &request, &policy)?
    } else {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.reports.directory.clone());
        evaluate_transformer_with_options(&forecaster, &request, &policy, Some(output_dir.as_path()))?
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn derive_recent_mean(
    config: &AppConfig,
    forecaster: &LoadForecaster,
    transformer_id: Option<&str>,
) -> Result<f64> {
    let samples_file = config.telemetry.samples_file.as_ref().ok_or_else(|| {
        anyhow!("--recent-mean-kw not given and no telemetry.samples_file configured")
    })?;
    let samples = load_samples_from_jsonl(samples_file)
        .with_context(|| format!("failed to load telemetry samples {}", samples_file.display()))?;

    let now = forecaster.now();
    let mean = match transformer_id {
        Some(id) => rolling_mean_for(&samples, id, config.telemetry.rolling_window, now),
        None => rolling_mean_kw(&samples, config.telemetry.rolling_window, now),
    };
    mean.ok_or_else(|| {
        anyhow!(
            "no telemetry samples inside the {}s rolling window",
            config.telemetry.rolling_window.as_secs()
        )
    })
}
