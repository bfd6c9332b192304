use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::ScanMode;

/// One day.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub server: ServerConfig,
    pub scan: ScanConfig,
    pub ui: UiConfig,
    pub export: ExportConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    pub default_mode: ScanMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://127.0.0.1:8080".to_string(),
                timeout_secs: 120,
            },
            scan: ScanConfig {
                default_mode: ScanMode::Passive,
            },
            ui: UiConfig { color: true },
            export: ExportConfig {
                output_dir: ".".to_string(),
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    server: Option<RawServerConfig>,
    scan: Option<RawScanConfig>,
    ui: Option<RawUiConfig>,
    export: Option<RawExportConfig>,
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawScanConfig {
    default_mode: Option<ScanMode>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawExportConfig {
    output_dir: Option<String>,
}

pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("HOME is not set"))
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/secuscan/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s).context("failed to parse config file (TOML)")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;
    validate(&cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(server) = raw.server {
        if let Some(base_url) = server.base_url {
            cfg.server.base_url = base_url;
        }
        if let Some(timeout_secs) = server.timeout_secs {
            cfg.server.timeout_secs = timeout_secs;
        }
    }

    if let Some(scan) = raw.scan {
        if let Some(default_mode) = scan.default_mode {
            cfg.scan.default_mode = default_mode;
        }
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
    }

    if let Some(export) = raw.export {
        if let Some(output_dir) = export.output_dir {
            cfg.export.output_dir = output_dir;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("SECUSCAN_SERVER_BASE_URL") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.server.base_url = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("SECUSCAN_SERVER_TIMEOUT_SECS") {
        cfg.server.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "SECUSCAN_SERVER_TIMEOUT_SECS")?;
    }
    if let Ok(v) = std::env::var("SECUSCAN_SCAN_DEFAULT_MODE") {
        cfg.scan.default_mode = v
            .parse::<ScanMode>()
            .map_err(anyhow::Error::msg)
            .with_context(|| "SECUSCAN_SCAN_DEFAULT_MODE")?;
    }
    if let Ok(v) = std::env::var("SECUSCAN_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "SECUSCAN_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("SECUSCAN_EXPORT_OUTPUT_DIR") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.export.output_dir = v.to_string();
        }
    }

    Ok(())
}

pub fn validate(cfg: &EffectiveConfig) -> Result<()> {
    let base = cfg.server.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(anyhow!(
            "server.base_url must start with http:// or https://: {base}"
        ));
    }
    if cfg.server.timeout_secs == 0 {
        return Err(anyhow!("server.timeout_secs must be greater than 0"));
    }
    if cfg.server.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(anyhow!(
            "server.timeout_secs must be at most {MAX_TIMEOUT_SECS}: {}",
            cfg.server.timeout_secs
        ));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
