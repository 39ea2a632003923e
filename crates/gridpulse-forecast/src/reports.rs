//! ---
//! gp_section: "08-load-forecasting"
//! gp_subsection: "module"
//! gp_type: "source"
//! gp_scope: "code"
//! gp_description: "Load forecasting and overload-risk assessment routines."
//! gp_version: "v0.0.0-prealpha"
//! gp_owner: "tbd"
//! ---
use std::{fs, path::Path};

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{errors::Result, ForecastSummary};

#[derive(Debug)]
pub struct ReportExporter<'a> {
    summary: &'a ForecastSummary,
}

impl<'a> ReportExporter<'a> {
    pub fn new(summary: &'a ForecastSummary) -> Self {
        Self { summary }
    }

    /// Write the full report set. `overload_alert.json` is written even when
    /// no alert fired; a null `data` is part of the record.
    pub fn export_all(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let generated_at = self.summary.generated_at.to_rfc3339();
        let transformer_id = self.summary.transformer_id.clone();

        let forecast_report = ReportEnvelope::new(
            &generated_at,
            transformer_id.clone(),
            forecast_schema(),
            &self.summary.points,
        );
        let peak_report = ReportEnvelope::new(
            &generated_at,
            transformer_id.clone(),
            peak_risk_schema(),
            &self.summary.peak_risk,
        );
        let alert_report = ReportEnvelope::new(
            &generated_at,
            transformer_id,
            overload_alert_schema(),
            &self.summary.overload_alert,
        );

        write_json(output_dir.join("forecast.json"), &forecast_report)?;
        write_json(output_dir.join("peak_risk.json"), &peak_report)?;
        write_json(output_dir.join("overload_alert.json"), &alert_report)?;

        info!("Reports exported to {}", output_dir.display());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    generated_at: &'a str,
    transformer_id: Option<String>,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        generated_at: &'a str,
        transformer_id: Option<String>,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            generated_at,
            transformer_id,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn forecast_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ForecastReport",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "hour": {"type": "integer", "minimum": 0, "maximum": 23},
                "offsetHours": {"type": "integer", "minimum": 0, "maximum": 23},
                "timestamp": {"type": "string", "format": "date-time"},
                "predictedLoadKw": {"type": "number"},
                "baselineLoadKw": {"type": "number"},
                "adjustmentKw": {"type": "number"},
                "riskRatio": {"type": "number"},
                "riskLevel": {"enum": ["LOW", "MODERATE", "HIGH", "CRITICAL"]}
            },
            "required": [
                "hour",
                "offsetHours",
                "timestamp",
                "predictedLoadKw",
                "baselineLoadKw",
                "adjustmentKw",
                "riskRatio",
                "riskLevel"
            ]
        }
    })
}

fn peak_risk_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "PeakRiskReport",
        "type": ["object", "null"],
        "properties": {
            "hour": {"type": "integer", "minimum": 0, "maximum": 23},
            "offsetHours": {"type": "integer", "minimum": 0, "maximum": 23},
            "timestamp": {"type": "string", "format": "date-time"},
            "predictedLoadKw": {"type": "number"},
            "riskRatio": {"type": "number"},
            "riskLevel": {"enum": ["LOW", "MODERATE", "HIGH", "CRITICAL"]}
        },
        "required": ["hour", "offsetHours", "timestamp", "predictedLoadKw", "riskRatio", "riskLevel"]
    })
}

fn overload_alert_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "OverloadAlertReport",
        "type": ["object", "null"],
        "properties": {
            "firstCriticalHour": {"type": "integer", "minimum": 0, "maximum": 23},
            "hoursAhead": {"type": "integer", "minimum": 0, "maximum": 23},
            "predictedLoadKw": {"type": "number"},
            "riskRatio": {"type": "number"},
            "confidence": {"type": "number", "minimum": 0.6, "maximum": 0.95},
            "criticalHoursCount": {"type": "integer", "minimum": 1},
            "recommendedAction": {"type": "string"}
        },
        "required": [
            "firstCriticalHour",
            "hoursAhead",
            "predictedLoadKw",
            "riskRatio",
            "confidence",
            "criticalHoursCount",
            "recommendedAction"
        ]
    })
}
