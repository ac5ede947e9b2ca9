//! History command - show journaled predictions

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use chargecast::features::WEEKDAY_NAMES;
use chargecast::journal::JsonlSink;

/// Run the history command
pub fn run(journal: &Path, limit: usize, json: bool) -> Result<()> {
    let sink = JsonlSink::new(journal);
    let entries = sink
        .recent(limit)
        .with_context(|| format!("Failed to read {}", journal.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "No predictions recorded in {} (use `chargecast predict --log`)",
            style(journal.display()).cyan()
        );
        return Ok(());
    }

    println!(
        "\n{} {}\n",
        style("Recent predictions").bold(),
        style(format!("({})", journal.display())).dim()
    );
    for entry in &entries {
        let f = &entry.features;
        println!(
            "  {}  {:>8.2} kW  {}",
            entry.submitted_at.format("%Y-%m-%d %H:%M:%S"),
            entry.predicted_kw,
            style(format!(
                "hour={} {} duration={}h battery={}kWh type={}",
                f.hour,
                WEEKDAY_NAMES.get(f.weekday as usize).unwrap_or(&"?"),
                f.connection_duration,
                f.battery_capacity,
                f.charging_type.as_num()
            ))
            .dim()
        );
    }
    Ok(())
}
