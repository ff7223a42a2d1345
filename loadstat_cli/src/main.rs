use clap::Parser;
use eyre::WrapErr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

mod cli;
mod error_fmt;
mod run;

use cli::{Cli, Commands, JSON_MODE};
use loadstat_config::Config;

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    match path {
        Some(p) => loadstat_config::load_file(p),
        None => Ok(Config::default()),
    }
}

/// Console logs go to stderr so stdout stays clean for reports. The
/// returned guard must outlive every event meant for the log file.
fn init_tracing(cli: &Cli, cfg: &Config) -> eyre::Result<Option<WorkerGuard>> {
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let console = if cli.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let mut guard = None;
    let file = match cfg.logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
            let appender = match cfg.logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))?;
    Ok(guard)
}

fn install_ctrlc(shutdown: &Arc<AtomicBool>) {
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler; run cannot be interrupted");
    }
}

fn real_main(cli: &Cli, guard: &mut Option<WorkerGuard>) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    *guard = init_tracing(cli, &cfg)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match &cli.cmd {
        Commands::Run {
            duration_ms,
            arrival_per_sec,
            service_ms,
            background,
            seed,
            set,
            no_drain,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            install_ctrlc(&shutdown);
            let overrides = run::SimOverrides {
                duration_ms: *duration_ms,
                arrival_per_sec: *arrival_per_sec,
                service_ms: *service_ms,
                background: *background,
                seed: *seed,
            };
            run::run_sim(&cfg, &overrides, set, *no_drain, cli.json, shutdown)?;
        }
        Commands::Params { set } => run::show_params(&cfg, set, cli.json)?,
        Commands::Check => run::check(&cfg, cli.json),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }

    let mut guard = None;
    let result = real_main(&cli, &mut guard);
    if let Err(err) = result {
        tracing::error!(error = %err, "command failed");
        // process::exit skips destructors; flush the log file first.
        drop(guard);
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}
