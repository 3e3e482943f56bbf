//! End-to-end tests for the command-line adapters
//!
//! Each test runs a binary against a results log in a scratch directory. The
//! scratch directory is also the working directory so no stray `.env` from
//! the checkout leaks into the run.

use assert_cmd::prelude::*;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const CONFIG_VARS: &[&str] = &[
    "SPEEDTEST_RESULTS_FILE",
    "SPEEDTEST_DATA_DIR",
    "SPEEDTEST_SEARCH_DIRS",
    "SPEEDTEST_TIMEOUT_SECONDS",
    "SPEEDTEST_SERVER_LIST_URL",
    "SPEEDTEST_CANDIDATE_SERVERS",
    "SPEEDTEST_LATENCY_SAMPLES",
    "SPEEDTEST_TEST_DURATION",
    "SPEEDTEST_CONCURRENCY",
    "SPEEDTEST_LOG_LEVEL",
    "SPEEDTEST_LOG_FORMAT",
    "ENABLE_COLOR",
    "NO_COLOR",
    "FORCE_COLOR",
];

/// Helper function to create a test command isolated from the caller's environment
fn create_test_cmd(bin: &str, workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(bin).unwrap();
    cmd.current_dir(workdir.path());
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn record(hours_ago: i64, download: f64, upload: f64, ping: f64) -> Value {
    json!({
        "timestamp": (Utc::now() - Duration::hours(hours_ago)).to_rfc3339(),
        "download_mbps": download,
        "upload_mbps": upload,
        "ping_ms": ping,
        "server": {"name": "Example ISP", "location": "Springfield", "country": "US"}
    })
}

/// Write `records` as the results log and return its absolute path
fn write_log(workdir: &TempDir, records: &[Value]) -> String {
    let path = workdir.path().join("speedtest_results.json");
    fs::write(&path, serde_json::to_string_pretty(records).unwrap()).unwrap();
    path.to_str().unwrap().to_string()
}

fn sample_log(workdir: &TempDir) -> String {
    write_log(
        workdir,
        &[
            record(30, 10.0, 1.0, 90.0),
            record(3, 100.0, 20.0, 12.0),
            record(1, 80.0, 10.0, 18.0),
        ],
    )
}

#[test]
fn test_zabbix_server_name() {
    let workdir = TempDir::new().unwrap();
    let log = sample_log(&workdir);

    create_test_cmd("zbx-speedtest", &workdir)
        .arg("speedtest.server_name")
        .arg("--results-file")
        .arg(&log)
        .assert()
        .success()
        .stdout("Example ISP\n");
}

#[test]
fn test_zabbix_latest_and_window_values() {
    let workdir = TempDir::new().unwrap();
    let log = sample_log(&workdir);

    create_test_cmd("zbx-speedtest", &workdir)
        .args(["speedtest.download", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("80\n");

    create_test_cmd("zbx-speedtest", &workdir)
        .args(["speedtest.upload_avg_24h", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("15\n");

    create_test_cmd("zbx-speedtest", &workdir)
        .args(["speedtest.test_count_24h", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_zabbix_last_test_time_is_epoch_seconds() {
    let workdir = TempDir::new().unwrap();
    let log = sample_log(&workdir);

    create_test_cmd("zbx-speedtest", &workdir)
        .args(["speedtest.last_test_time", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d{10}\n$").unwrap());
}

#[test]
fn test_zabbix_missing_log_reports_defaults() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("zbx-speedtest", &workdir)
        .arg("speedtest.ping")
        .arg("--data-dir")
        .arg(workdir.path())
        .assert()
        .success()
        .stdout("0\n");

    create_test_cmd("zbx-speedtest", &workdir)
        .arg("speedtest.server_country")
        .arg("--data-dir")
        .arg(workdir.path())
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn test_zabbix_unknown_key() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("zbx-speedtest", &workdir)
        .arg("speedtest.jitter")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("speedtest.jitter"))
        .stderr(predicate::str::contains("Available metrics"))
        .stderr(predicate::str::contains("speedtest.server_name"));
}

#[test]
fn test_zabbix_missing_key() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("zbx-speedtest", &workdir)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: zbx-speedtest <metric_name>"));
}

#[test]
fn test_zabbix_reads_dotenv() {
    let workdir = TempDir::new().unwrap();
    write_log(&workdir, &[record(0, 50.0, 5.0, 20.0)]);
    fs::create_dir(workdir.path().join("elsewhere")).unwrap();
    let moved = workdir.path().join("elsewhere").join("moved.json");
    fs::rename(workdir.path().join("speedtest_results.json"), &moved).unwrap();
    fs::write(
        workdir.path().join(".env"),
        format!("SPEEDTEST_RESULTS_FILE={}\n", moved.display()),
    )
    .unwrap();

    create_test_cmd("zbx-speedtest", &workdir)
        .arg("speedtest.download")
        .assert()
        .success()
        .stdout("50\n");
}

#[test]
fn test_mrtg_missing_log() {
    let workdir = TempDir::new().unwrap();
    let missing = workdir.path().join("nothing-here.json");

    create_test_cmd("mrtg-speedtest", &workdir)
        .args(["--metric", "download", "--results-file"])
        .arg(&missing)
        .assert()
        .success()
        .stdout("0\n0\n\nAverage Download\n");
}

#[test]
fn test_mrtg_average() {
    let workdir = TempDir::new().unwrap();
    let log = sample_log(&workdir);

    create_test_cmd("mrtg-speedtest", &workdir)
        .args(["-m", "download", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("90\n0\n\nAverage Download\n");

    create_test_cmd("mrtg-speedtest", &workdir)
        .args(["-m", "ping", "--hours", "48", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("40\n0\n\nAverage Ping\n");
}

#[test]
fn test_mrtg_corrupt_log_prints_zero() {
    let workdir = TempDir::new().unwrap();
    let path = workdir.path().join("speedtest_results.json");
    fs::write(&path, "{ not json").unwrap();

    create_test_cmd("mrtg-speedtest", &workdir)
        .args(["-m", "upload", "--results-file"])
        .arg(&path)
        .assert()
        .success()
        .stdout("0\n0\n\nAverage Upload\n");
}

#[test]
fn test_corrupt_log_keeps_stderr_quiet() {
    let workdir = TempDir::new().unwrap();
    let path = workdir.path().join("speedtest_results.json");
    fs::write(&path, "[{\"timestamp\": ").unwrap();

    create_test_cmd("zbx-speedtest", &workdir)
        .arg("speedtest.download")
        .arg("--results-file")
        .arg(&path)
        .assert()
        .success()
        .stdout("0\n")
        .stderr(predicate::str::is_empty());

    create_test_cmd("mrtg-speedtest", &workdir)
        .args(["-m", "download", "--results-file"])
        .arg(&path)
        .assert()
        .success()
        .stdout("0\n0\n\nAverage Download\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_readers_ignore_runner_settings() {
    let workdir = TempDir::new().unwrap();
    let log = write_log(&workdir, &[record(1, 80.0, 10.0, 18.0)]);

    create_test_cmd("zbx-speedtest", &workdir)
        .env("SPEEDTEST_CONCURRENCY", "64")
        .args(["speedtest.download", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("80\n");

    create_test_cmd("mrtg-speedtest", &workdir)
        .env("SPEEDTEST_TIMEOUT_SECONDS", "600")
        .args(["-m", "download", "--results-file", log.as_str()])
        .assert()
        .success()
        .stdout("80\n0\n\nAverage Download\n");

    create_test_cmd("speedtest-runner", &workdir)
        .env("SPEEDTEST_CONCURRENCY", "64")
        .args(["--results-file", log.as_str()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Concurrency must be between 1 and 32"));
}

#[test]
fn test_mrtg_rejects_unknown_metric() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("mrtg-speedtest", &workdir)
        .args(["-m", "jitter"])
        .assert()
        .failure();
}

#[test]
fn test_runner_help() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("speedtest-runner", &workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--results-file"));
}

#[test]
fn test_runner_show_env() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("speedtest-runner", &workdir)
        .arg("--show-env")
        .assert()
        .success()
        .stdout(predicate::str::contains("SPEEDTEST_RESULTS_FILE"))
        .stdout(predicate::str::contains("# SPEEDTEST_TIMEOUT_SECONDS=30"));

    assert!(!workdir.path().join("speedtest_results.json").exists());
}

#[test]
fn test_runner_rejects_out_of_range_timeout() {
    let workdir = TempDir::new().unwrap();

    create_test_cmd("speedtest-runner", &workdir)
        .args(["--timeout", "0"])
        .assert()
        .failure();
}

#[test]
fn test_runner_unreachable_server_list() {
    let workdir = TempDir::new().unwrap();
    let log = workdir.path().join("speedtest_results.json");

    create_test_cmd("speedtest-runner", &workdir)
        .args(["--timeout", "2", "--server-list-url", "http://127.0.0.1:9/servers"])
        .arg("--results-file")
        .arg(&log)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error running speed test"));

    assert!(!log.exists());
}
