//! Train command - fit the model and report hold-out metrics

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use chargecast::model::{train, TrainConfig};

/// Run the train command
pub fn run(data: &Path, config: &TrainConfig, json: bool) -> Result<()> {
    let report = train(data, config)
        .with_context(|| format!("Training on {} failed", data.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{} Model trained successfully!\n", style("✓").green());
    println!("  {} {:.3}", style("RMSE:").bold(), report.rmse);
    println!("  {} {:.3}", style("R² Score:").bold(), report.r2);
    println!(
        "  {} {} train / {} test ({} dropped without target)",
        style("Rows:").bold(),
        report.train_rows,
        report.test_rows,
        report.preprocess.rows_dropped
    );

    let defaulted = report.preprocess.defaulted.names();
    if !defaulted.is_empty() {
        println!(
            "  {} {}",
            style("Defaulted columns:").yellow(),
            defaulted.join(", ")
        );
    }

    println!(
        "\n  Saved to {}",
        style(report.model_path.display()).cyan()
    );
    Ok(())
}
