//! Predict and profile commands

use anyhow::{Context, Result};
use console::style;
use serde_json::json;
use std::path::Path;

use chargecast::features::{PredictionRequest, WEEKDAY_NAMES};
use chargecast::journal::{JsonlSink, PredictionEntry, PredictionSink};
use chargecast::model::Predictor;

/// Run the predict command
pub fn run(record_json: &str, model: &Path, log: Option<&Path>, json: bool) -> Result<()> {
    let request = PredictionRequest::from_json(record_json)?;

    // No model beats a bad record
    let predictor = Predictor::new(model);
    predictor.artifact()?;
    let record = request.to_record()?;
    let kw = predictor.predict_record(&record)?;

    if let Some(log_path) = log {
        let mut sink = JsonlSink::new(log_path);
        sink.record(&PredictionEntry::new(record, kw))
            .with_context(|| format!("Failed to append to {}", sink.path().display()))?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "features": record,
                "predicted_kw": kw,
            }))?
        );
        return Ok(());
    }

    println!(
        "{} {} {:.2} kW",
        style("⚡").cyan(),
        style("Predicted Charging Power:").bold(),
        kw
    );
    println!(
        "  {}",
        style(format!(
            "hour={} weekday={} ({}) duration={}h battery={}kWh type={}",
            record.hour,
            record.weekday,
            WEEKDAY_NAMES[record.weekday as usize],
            record.connection_duration,
            record.battery_capacity,
            record.charging_type.as_num()
        ))
        .dim()
    );
    Ok(())
}

/// Run the profile command
pub fn run_profile(record_json: &str, model: &Path, json: bool) -> Result<()> {
    let request = PredictionRequest::from_json(record_json)?;
    let profile = Predictor::new(model).predict_hourly(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile.to_vec())?);
        return Ok(());
    }

    println!("\n{}\n", style("Predicted charging power by hour").bold());
    let peak = profile.iter().cloned().fold(f64::MIN, f64::max);
    for (hour, kw) in profile.iter().enumerate() {
        let marker = if *kw == peak {
            style("◀ peak").yellow().to_string()
        } else {
            String::new()
        };
        println!("  {:02}:00  {:>8.2} kW  {}", hour, kw, marker);
    }
    Ok(())
}
