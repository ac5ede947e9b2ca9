//! CLI contract tests
//!
//! Runs the `chargecast` binary inside a temp working directory so the
//! default `data/` and `models/` paths resolve there.

use std::path::Path;
use std::process::{Command, Output};

fn chargecast_bin() -> &'static str {
    env!("CARGO_BIN_EXE_chargecast")
}

fn run(dir: &Path, args: &[&str]) -> Output {
    command(dir, args)
        .output()
        .expect("failed to run chargecast")
}

fn command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(chargecast_bin());
    cmd.args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("CHARGECAST_CONFIG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn setup_workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();

    let mut csv = String::from("Timestamp,Charging_Time,Battery_Capacity,Charging_Type,Charging_Power\n");
    for i in 0..240 {
        let hour = i % 24;
        let fast = i % 2 == 0;
        let power = if fast { 48.0 + (hour % 5) as f64 } else { 7.4 };
        csv.push_str(&format!(
            "2024-03-{:02} {hour:02}:00:00,{},{},{},{power}\n",
            1 + i / 24,
            1 + i % 6,
            if i % 4 < 2 { 60 } else { 80 },
            if fast { "fast" } else { "slow" },
        ));
    }
    std::fs::write(dir.path().join("data").join("ev_data.csv"), csv).unwrap();

    // Keep the binary quick under test
    std::fs::write(
        dir.path().join("chargecast.toml"),
        "[training]\niterations = 30\nmin_leaf_size = 5\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_train_then_predict_json() {
    let dir = setup_workspace();

    let train = run(dir.path(), &["train", "--json"]);
    assert!(train.status.success(), "stderr: {}", stderr(&train));
    let report: serde_json::Value = serde_json::from_str(&stdout(&train)).unwrap();
    assert!(report["rmse"].as_f64().unwrap() >= 0.0);
    assert_eq!(report["train_rows"], 192);
    assert_eq!(report["test_rows"], 48);
    assert!(dir.path().join("models").join("model.pkl").exists());

    let predict = run(
        dir.path(),
        &["predict", r#"{"hour": 18, "charging_type": "fast"}"#, "--json"],
    );
    assert!(predict.status.success(), "stderr: {}", stderr(&predict));
    let value: serde_json::Value = serde_json::from_str(&stdout(&predict)).unwrap();
    let kw = value["predicted_kw"].as_f64().unwrap();
    assert!(kw.is_finite());
    assert_eq!(value["features"]["hour"], 18);
    assert_eq!(value["features"]["charging_type_num"], 1);
}

#[test]
fn test_predict_without_model_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["predict", "{}"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("chargecast train"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_train_without_target_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bad.csv");
    std::fs::write(&csv, "timestamp,charging_time\n2024-01-01 10:00:00,2\n").unwrap();

    let output = run(dir.path(), &["train", "--data", "bad.csv"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("charging_power"));
    assert!(!dir.path().join("models").join("model.pkl").exists());
}

#[test]
fn test_predict_log_appends_journal() {
    let dir = setup_workspace();
    assert!(run(dir.path(), &["train", "--log-level", "error"]).status.success());

    for hour in ["3", "15"] {
        let record = format!(r#"{{"hour": {hour}}}"#);
        let output = run(dir.path(), &["predict", &record, "--log", "predictions.jsonl"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("kW"));
    }

    let journal = std::fs::read_to_string(dir.path().join("predictions.jsonl")).unwrap();
    let lines: Vec<&str> = journal.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["features"]["hour"], 3);
    assert!(first["predicted_kw"].as_f64().is_some());
}

#[test]
fn test_profile_json_has_24_hours() {
    let dir = setup_workspace();
    assert!(run(dir.path(), &["train"]).status.success());

    let output = run(dir.path(), &["profile", r#"{"charging_type": "fast"}"#, "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let profile: Vec<f64> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(profile.len(), 24);
    assert!(profile.iter().all(|kw| kw.is_finite()));
}

#[test]
fn test_config_model_path_is_honoured() {
    let dir = setup_workspace();
    std::fs::write(
        dir.path().join("custom.toml"),
        "[paths]\nmodel = \"out/power.pkl\"\n\n[training]\niterations = 10\nmin_leaf_size = 5\n",
    )
    .unwrap();

    let output = run(dir.path(), &["--config", "custom.toml", "train"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("out").join("power.pkl").exists());
    assert!(!dir.path().join("models").join("model.pkl").exists());

    let predict = run(dir.path(), &["--config", "custom.toml", "predict"]);
    assert!(predict.status.success(), "stderr: {}", stderr(&predict));
}

#[test]
fn test_inspect_reports_defaulted_columns() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("partial.csv"),
        "charging_power,charging_type\n7.2,slow\n50,fast\n,fast\n",
    )
    .unwrap();

    let output = run(dir.path(), &["inspect", "--data", "partial.csv", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["report"]["rows_read"], 3);
    assert_eq!(value["report"]["rows_dropped"], 1);
    assert_eq!(value["report"]["defaulted"]["timestamp"], true);
    assert_eq!(value["report"]["defaulted"]["charging_type"], false);
    assert_eq!(value["fast_sessions"], 1);
}

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("chargecast.toml");

    assert!(run(dir.path(), &["init"]).status.success());
    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("[paths]"));

    std::fs::write(&config, "# edited\n").unwrap();
    assert!(run(dir.path(), &["init"]).status.success());
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "# edited\n");

    assert!(run(dir.path(), &["init", "--force"]).status.success());
    assert!(std::fs::read_to_string(&config).unwrap().contains("[paths]"));
}

#[test]
fn test_history_lists_newest_first() {
    let dir = setup_workspace();
    assert!(run(dir.path(), &["train", "--log-level", "error"]).status.success());

    // Bare --log writes to paths.journal
    for hour in ["2", "20"] {
        let record = format!(r#"{{"hour": {hour}}}"#);
        let output = run(dir.path(), &["predict", &record, "--log"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }
    assert!(dir.path().join("logs").join("predictions.jsonl").exists());

    let output = run(dir.path(), &["history", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["features"]["hour"], 20);
    assert_eq!(entries[1]["features"]["hour"], 2);

    let output = run(dir.path(), &["history", "--limit", "1", "--json"]);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(entries.len(), 1);

    let output = run(dir.path(), &["history"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("kW"));
}

#[test]
fn test_history_without_journal_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["history", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_config_path_from_environment() {
    let dir = setup_workspace();
    std::fs::write(
        dir.path().join("env.toml"),
        "[paths]\nmodel = \"env/model.pkl\"\n\n[training]\niterations = 10\nmin_leaf_size = 5\n",
    )
    .unwrap();

    let output = command(dir.path(), &["train"])
        .env("CHARGECAST_CONFIG", "env.toml")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("env").join("model.pkl").exists());
    assert!(!dir.path().join("models").join("model.pkl").exists());
}

#[test]
fn test_missing_model_reported_before_bad_record() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["predict", r#"{"hour": 99}"#]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("chargecast train"),
        "stderr: {}",
        stderr(&output)
    );
}
