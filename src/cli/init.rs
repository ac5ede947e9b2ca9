//! Init command - write an example configuration file

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use chargecast::config::PipelineConfig;

/// Run the init command
pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(config_path, PipelineConfig::example_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}
