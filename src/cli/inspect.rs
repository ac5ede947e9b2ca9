//! Inspect command - preview preprocessing of a session log

use anyhow::{Context, Result};
use console::style;
use serde_json::json;
use std::path::Path;

use chargecast::features::ChargingType;
use chargecast::ingest::load_session_log;

/// Run the inspect command
pub fn run(data: &Path, json: bool) -> Result<()> {
    let prepared = load_session_log(data)
        .with_context(|| format!("Failed to preprocess {}", data.display()))?;
    let report = &prepared.report;
    let targets = prepared.frame.targets();

    let fast = prepared
        .frame
        .records()
        .iter()
        .filter(|r| r.charging_type == ChargingType::Fast)
        .count();
    let (min, max) = targets
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| {
            (lo.min(y), hi.max(y))
        });
    let mean = if targets.is_empty() {
        None
    } else {
        Some(targets.iter().sum::<f64>() / targets.len() as f64)
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "report": report,
                "fast_sessions": fast,
                "charging_power": {
                    "min": mean.map(|_| min),
                    "mean": mean,
                    "max": mean.map(|_| max),
                },
            }))?
        );
        return Ok(());
    }

    println!("\n{} {}\n", style("Session log").bold(), style(data.display()).cyan());
    println!(
        "  Rows: {} read, {} usable, {} dropped without charging_power",
        report.rows_read,
        report.rows_kept(),
        report.rows_dropped
    );

    if let Some(mean) = mean {
        println!(
            "  charging_power: min {:.2} / mean {:.2} / max {:.2} kW",
            min, mean, max
        );
        println!("  Fast sessions: {} of {}", fast, targets.len());
    }

    let defaulted = report.defaulted.names();
    if defaulted.is_empty() {
        println!("  {} All optional columns present", style("[OK]").green());
    } else {
        println!(
            "  {} Defaulted columns: {}",
            style("[!!]").yellow(),
            defaulted.join(", ")
        );
    }

    if report.fallbacks.total() > 0 {
        println!(
            "  {} Unparseable cells: timestamp={}, charging_time={}, battery_capacity={}",
            style("[!!]").yellow(),
            report.fallbacks.timestamp,
            report.fallbacks.charging_time,
            report.fallbacks.battery_capacity
        );
    }
    Ok(())
}
