use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn secuscan_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_secuscan"));
    cmd.env("HOME", home);
    cmd.env_remove("SECUSCAN_CONFIG");
    cmd.env_remove("SECUSCAN_SERVER_BASE_URL");
    cmd.env_remove("SECUSCAN_SERVER_TIMEOUT_SECS");
    cmd.env_remove("SECUSCAN_SCAN_DEFAULT_MODE");
    cmd.env_remove("SECUSCAN_UI_COLOR");
    cmd.env_remove("SECUSCAN_EXPORT_OUTPUT_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    secuscan_cmd(home).args(args).output().expect("run secuscan")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home =
        std::env::temp_dir().join(format!("secuscan-exit-test-{}-{seq}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[test]
fn completion_unknown_shell_exits_2() {
    let home = make_temp_home();
    let out = run(&home, &["completion", "nope"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn ui_requires_tty_exits_2() {
    let home = make_temp_home();
    let out = run(&home, &["ui"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn scan_without_url_exits_2_and_reports_once() {
    let home = make_temp_home();
    let out = run(&home, &["scan", "--url", "   "]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("URL is required").count(), 1, "{stderr}");
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn scan_unknown_mode_exits_2() {
    let home = make_temp_home();
    let out = run(
        &home,
        &["scan", "--url", "http://example.com", "--mode", "aggressive"],
    );
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn non_http_server_flag_exits_2() {
    let home = make_temp_home();
    let out = run(
        &home,
        &["--server", "ftp://example.com", "scan", "--url", "http://example.com"],
    );
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn unreachable_server_exits_10() {
    let home = make_temp_home();
    let server = closed_port_url();
    let out = run(
        &home,
        &["--server", &server, "scan", "--url", "http://example.com"],
    );
    assert_eq!(out.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error during scan:"), "{stderr}");
    let _ = std::fs::remove_dir_all(&home);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn service_error_exits_20() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "Scan failed: nope"})),
        )
        .mount(&server)
        .await;

    let home = make_temp_home();
    let out = run(
        &home,
        &["--server", &server.uri(), "scan", "--url", "http://example.com"],
    );
    assert_eq!(out.status.code(), Some(20));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error during scan: Scan failed: nope"), "{stderr}");
    let _ = std::fs::remove_dir_all(&home);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_json_prints_merged_result_and_text_report_is_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": {"total": 1, "low_risk": 1},
            "vulnerabilities": {"low": [{"name": "Server banner"}]}
        })))
        .mount(&server)
        .await;

    let home = make_temp_home();
    let reports = home.join("reports");
    std::fs::create_dir_all(&reports).expect("create reports dir");
    let out = run(
        &home,
        &[
            "--json",
            "--server",
            &server.uri(),
            "--output-dir",
            reports.to_str().expect("utf-8 path"),
            "scan",
            "--url",
            "http://example.com",
            "--text-report",
        ],
    );
    assert_eq!(
        out.status.code(),
        Some(0),
        "{}",
        String::from_utf8_lossy(&out.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(v["summary"]["total"], 1);
    assert_eq!(v["summary"]["high_risk"], 0);
    assert_eq!(
        v["vulnerabilities"]["low"][0]["fix_recommendation"],
        "No fix recommendation available"
    );

    let saved: Vec<_> = std::fs::read_dir(&reports)
        .expect("read reports dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(saved.len(), 1, "{saved:?}");
    assert!(saved[0].starts_with("security_scan_report_"), "{saved:?}");
    assert!(saved[0].ends_with(".txt"), "{saved:?}");
    let _ = std::fs::remove_dir_all(&home);
}
