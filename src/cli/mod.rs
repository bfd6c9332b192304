use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::runtime::Runtime;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::backend::{HttpBackend, ScanBackend};
use crate::config::EffectiveConfig;
use crate::controller::{Controller, SubmitTrigger};
use crate::ui::{ConsoleView, UiConfig};

#[derive(Debug, Parser)]
#[command(
    name = "secuscan",
    version,
    about = "Drive a web security scan service: submit targets, view grouped findings, export reports"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Scan service base URL (overrides config).
    #[arg(long, global = true)]
    pub server: Option<String>,
    /// Request timeout in seconds (overrides config).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    /// Directory that exported reports are written to.
    #[arg(long = "output-dir", global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit one scan and print the grouped findings.
    Scan(ScanArgs),
    /// Interactive three-step wizard.
    Ui(UiArgs),
    /// Check that the scan service is reachable.
    Health,
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[arg(long)]
    pub url: Option<String>,
    /// passive | active | quick
    #[arg(long)]
    pub mode: Option<String>,
    /// Save a text report after a successful scan.
    #[arg(long)]
    pub text_report: bool,
    /// Request a PDF report from the service after a successful scan.
    #[arg(long)]
    pub pdf_report: bool,
}

#[derive(Debug, Args)]
pub struct UiArgs {}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let is_ui_mode = matches!(&cli.command, Commands::Ui(_));
    init_tracing(cli.verbose, cli.quiet, is_ui_mode);

    let home_dir = crate::config::home_dir().map_err(crate::exit::invalid_args_err)?;
    let env_config_path = std::env::var_os("SECUSCAN_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;
    apply_cli_overrides(&mut cfg, &cli);
    crate::config::validate(&cfg).map_err(crate::exit::invalid_args_err)?;
    debug!(base_url = %cfg.server.base_url, timeout_secs = cfg.server.timeout_secs, "effective config");

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let timeout = Duration::from_secs(cfg.server.timeout_secs);
    let output_dir = PathBuf::from(&cfg.export.output_dir);

    match cli.command {
        Commands::Scan(args) => {
            let runtime = build_runtime()?;
            let backend = HttpBackend::new(&cfg.server.base_url, timeout)
                .map_err(|e| crate::exit::invalid_args_err(e.into()))?;

            let url = args.url.unwrap_or_default();
            let mode = args
                .mode
                .unwrap_or_else(|| cfg.scan.default_mode.as_str().to_string());
            let mut view = ConsoleView::new(ui_cfg.clone(), url, mode, output_dir);
            if cli.json {
                view = view.without_results();
            }

            let mut controller = Controller::new(backend, view);
            runtime
                .block_on(controller.submit(SubmitTrigger::Generic))
                .map_err(crate::exit::reported)?;

            if args.text_report {
                controller
                    .export_text(OffsetDateTime::now_utc())
                    .map_err(crate::exit::reported)?;
            }
            if args.pdf_report {
                runtime
                    .block_on(controller.export_pdf(OffsetDateTime::now_utc()))
                    .map_err(crate::exit::reported)?;
            }

            if cli.json {
                write_json(&controller.state().retained())?;
            }
        }
        Commands::Ui(_args) => {
            if cli.json {
                return Err(crate::exit::invalid_args("ui cannot be combined with --json"));
            }
            if !(ui_cfg.stdin_is_tty && ui_cfg.stdout_is_tty) {
                return Err(crate::exit::invalid_args(
                    "ui requires a TTY (stdin + stdout)",
                ));
            }
            let runtime = build_runtime()?;
            let backend = HttpBackend::new(&cfg.server.base_url, timeout)
                .map_err(|e| crate::exit::invalid_args_err(e.into()))?;
            crate::tui::run(
                backend,
                &runtime,
                crate::tui::TuiOptions {
                    color: ui_cfg.color,
                    default_mode: cfg.scan.default_mode,
                    output_dir,
                    timeout,
                },
            )?;
        }
        Commands::Health => {
            let runtime = build_runtime()?;
            let backend = HttpBackend::new(&cfg.server.base_url, timeout)
                .map_err(|e| crate::exit::invalid_args_err(e.into()))?;
            let health = runtime
                .block_on(backend.health())
                .map_err(|e| {
                    crate::exit::service_err(
                        anyhow::Error::new(e).context("health check failed"),
                    )
                })?;
            if cli.json {
                write_json(&health)?;
            } else {
                crate::ui::print_health(backend.base_url(), &health, &ui_cfg);
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "secuscan", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `secuscan config --show`");
            }
        }
    }

    Ok(())
}

fn apply_cli_overrides(cfg: &mut EffectiveConfig, cli: &Cli) {
    if let Some(server) = &cli.server {
        cfg.server.base_url = server.trim().to_string();
    }
    if let Some(timeout) = cli.timeout {
        cfg.server.timeout_secs = timeout;
    }
    if let Some(dir) = &cli.output_dir {
        cfg.export.output_dir = dir.display().to_string();
    }
}

fn init_tracing(verbose: bool, quiet: bool, ui_mode: bool) {
    let default_directive = if quiet {
        "secuscan=error"
    } else if verbose {
        "secuscan=debug"
    } else {
        "secuscan=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    // The alternate screen owns the terminal while the wizard runs.
    let _ = if ui_mode {
        builder.with_writer(io::sink).try_init()
    } else {
        builder.with_writer(io::stderr).try_init()
    };
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .thread_name("secuscan")
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}
