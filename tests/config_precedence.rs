use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn secuscan_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_secuscan"));
    cmd.env("HOME", home);
    cmd.env_remove("SECUSCAN_CONFIG");
    cmd.env_remove("SECUSCAN_SERVER_BASE_URL");
    cmd.env_remove("SECUSCAN_SERVER_TIMEOUT_SECS");
    cmd.env_remove("SECUSCAN_SCAN_DEFAULT_MODE");
    cmd.env_remove("SECUSCAN_UI_COLOR");
    cmd.env_remove("SECUSCAN_EXPORT_OUTPUT_DIR");
    cmd
}

fn show_config(cmd: &mut Command) -> (Output, serde_json::Value) {
    let out = cmd
        .args(["--json", "config", "--show"])
        .output()
        .expect("run secuscan");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v = serde_json::from_slice(&out.stdout).expect("json");
    (out, v)
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home =
        std::env::temp_dir().join(format!("secuscan-config-test-{}-{seq}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn write_config(home: &Path, body: &str) -> PathBuf {
    let dir = home.join(".config/secuscan");
    std::fs::create_dir_all(&dir).expect("create config dir");
    let path = dir.join("config.toml");
    std::fs::write(&path, body).expect("write config");
    path
}

#[test]
fn defaults_apply_without_config_file() {
    let home = make_temp_home();
    let (_, v) = show_config(&mut secuscan_cmd(&home));
    assert_eq!(v["server"]["base_url"], "http://127.0.0.1:8080");
    assert_eq!(v["server"]["timeout_secs"], 120);
    assert_eq!(v["scan"]["default_mode"], "passive");
    assert!(v.get("config_path").is_none());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn file_then_env_then_flags() {
    let home = make_temp_home();
    write_config(
        &home,
        r#"
[server]
base_url = "http://scanner.internal:9000"
timeout_secs = 30

[scan]
default_mode = "quick"
"#,
    );

    let (_, v) = show_config(&mut secuscan_cmd(&home));
    assert_eq!(v["server"]["base_url"], "http://scanner.internal:9000");
    assert_eq!(v["server"]["timeout_secs"], 30);
    assert_eq!(v["scan"]["default_mode"], "quick");
    assert!(
        v["config_path"]
            .as_str()
            .is_some_and(|p| p.ends_with("config.toml"))
    );

    let mut cmd = secuscan_cmd(&home);
    cmd.env("SECUSCAN_SERVER_TIMEOUT_SECS", "45");
    cmd.env("SECUSCAN_SCAN_DEFAULT_MODE", "active");
    let (_, v) = show_config(&mut cmd);
    assert_eq!(v["server"]["timeout_secs"], 45);
    assert_eq!(v["scan"]["default_mode"], "active");
    assert_eq!(v["server"]["base_url"], "http://scanner.internal:9000");

    let mut cmd = secuscan_cmd(&home);
    cmd.env("SECUSCAN_SERVER_TIMEOUT_SECS", "45");
    cmd.args(["--timeout", "5", "--server", "https://override.example"]);
    let (_, v) = show_config(&mut cmd);
    assert_eq!(v["server"]["timeout_secs"], 5);
    assert_eq!(v["server"]["base_url"], "https://override.example");

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn explicit_config_path_via_env() {
    let home = make_temp_home();
    let path = home.join("custom.toml");
    std::fs::write(&path, "[export]\noutput_dir = \"/tmp/secuscan-reports\"\n")
        .expect("write config");

    let mut cmd = secuscan_cmd(&home);
    cmd.env("SECUSCAN_CONFIG", &path);
    let (_, v) = show_config(&mut cmd);
    assert_eq!(v["export"]["output_dir"], "/tmp/secuscan-reports");
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn invalid_env_value_exits_2() {
    let home = make_temp_home();
    let out = secuscan_cmd(&home)
        .env("SECUSCAN_UI_COLOR", "sometimes")
        .args(["config", "--show"])
        .output()
        .expect("run secuscan");
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn zero_timeout_flag_exits_2() {
    let home = make_temp_home();
    let out = secuscan_cmd(&home)
        .args(["--timeout", "0", "config", "--show"])
        .output()
        .expect("run secuscan");
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn oversized_timeout_exits_2() {
    let home = make_temp_home();
    let out = secuscan_cmd(&home)
        .env("SECUSCAN_SERVER_TIMEOUT_SECS", "18446744073709551615")
        .args(["config", "--show"])
        .output()
        .expect("run secuscan");
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}
