//! CLI command definitions and handlers

mod history;
mod init;
mod inspect;
mod predict;
mod train;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chargecast::config::{load_pipeline_config, CONFIG_FILE_NAME};

/// chargecast - EV charging power prediction
#[derive(Parser, Debug)]
#[command(name = "chargecast")]
#[command(
    version,
    about = "Train a GBDT model on EV charging sessions and predict charging power (kW)",
    after_help = "\
Examples:
  chargecast train --data data/ev_data.csv        Train and save models/model.pkl
  chargecast predict '{\"hour\": 18, \"charging_type\": \"fast\"}'
  chargecast profile '{\"weekday\": \"Sat\", \"battery_capacity\": 75}'
  chargecast inspect --data data/ev_data.csv      Check how a log will be preprocessed
  chargecast history --limit 5                    Last journaled predictions"
)]
pub struct Cli {
    /// Config file (missing file = defaults)
    #[arg(long, global = true, env = "CHARGECAST_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example chargecast.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Train the model on a session log and report RMSE / R²
    #[command(after_help = "\
The log needs a `charging_power` column. Optional columns: timestamp,
charging_time, battery_capacity, charging_type (missing ones get defaults).")]
    Train {
        /// Session log CSV (default: paths.data from config)
        #[arg(long, value_name = "CSV")]
        data: Option<PathBuf>,

        /// Artifact path (default: paths.model from config)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Print the training report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict charging power for one session
    Predict {
        /// JSON record with any of: hour, weekday, connectionduration,
        /// battery_capacity, charging_type_num, charging_type
        #[arg(value_name = "JSON", default_value = "{}")]
        record: String,

        /// Artifact path (default: paths.model from config)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Append the prediction to a JSON-lines journal
        /// (default: paths.journal from config)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        log: Option<Option<PathBuf>>,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict charging power for every hour of the day
    Profile {
        /// JSON record; its `hour` is ignored
        #[arg(value_name = "JSON", default_value = "{}")]
        record: String,

        /// Artifact path (default: paths.model from config)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preprocess a session log without training and show what happened
    Inspect {
        /// Session log CSV (default: paths.data from config)
        #[arg(long, value_name = "CSV")]
        data: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show journaled predictions, newest first
    History {
        /// Journal file (default: paths.journal from config)
        #[arg(long, value_name = "PATH")]
        log: Option<PathBuf>,

        /// Maximum number of entries
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = load_pipeline_config(&cli.config);

    match cli.command {
        Commands::Init { force } => init::run(&cli.config, force),

        Commands::Train { data, model, json } => {
            let data = data.unwrap_or_else(|| config.paths.data.clone());
            let mut train_config = config.train_config();
            if let Some(model) = model {
                train_config.model_path = model;
            }
            train::run(&data, &train_config, json)
        }

        Commands::Predict {
            record,
            model,
            log,
            json,
        } => {
            let model = model.unwrap_or_else(|| config.paths.model.clone());
            let log = log.map(|path| path.unwrap_or_else(|| config.paths.journal.clone()));
            predict::run(&record, &model, log.as_deref(), json)
        }

        Commands::Profile {
            record,
            model,
            json,
        } => {
            let model = model.unwrap_or_else(|| config.paths.model.clone());
            predict::run_profile(&record, &model, json)
        }

        Commands::Inspect { data, json } => {
            let data = data.unwrap_or_else(|| config.paths.data.clone());
            inspect::run(&data, json)
        }

        Commands::History { log, limit, json } => {
            let journal = log.unwrap_or_else(|| config.paths.journal.clone());
            history::run(&journal, limit, json)
        }
    }
}
