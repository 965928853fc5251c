mod cli;
mod commands;
mod error_fmt;

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Console logs go to stderr; stdout carries results and, for `upload`, the command script.
fn init_tracing(json: bool, level: &str, logging: &flow_config::Logging) -> Option<WorkerGuard> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().with_filter(env_filter(level)).boxed());
    } else {
        layers.push(console.with_filter(env_filter(level)).boxed());
    }

    let mut guard = None;
    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let rotation = match logging.rotation.as_deref() {
            Some("daily") => Rotation::DAILY,
            Some("hourly") => Rotation::HOURLY,
            _ => Rotation::NEVER,
        };
        let built = path.file_name().map(|name| {
            RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(name.to_string_lossy().into_owned())
                .build(dir)
        });
        match built {
            Some(Ok(appender)) => {
                let (writer, g) = tracing_appender::non_blocking(appender);
                guard = Some(g);
                layers.push(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(env_filter(level))
                        .boxed(),
                );
            }
            Some(Err(e)) => eprintln!("log file {file:?} disabled: {e}"),
            None => eprintln!("log file {file:?} disabled: not a file path"),
        }
    }

    let _ = tracing_subscriber::registry().with(layers).try_init();
    guard
}

fn report_error(err: &eyre::Report) -> i32 {
    if JSON_MODE.get().copied().unwrap_or(false) {
        eprintln!("{}", format_error_json(err));
    } else {
        eprintln!("{}", humanize(err));
    }
    exit_code_for_error(err)
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let cfg = match flow_config::load_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => std::process::exit(report_error(&e)),
    };

    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let guard = init_tracing(cli.json, level, &cfg.logging);
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let code = match commands::run(&cli.cmd, &cfg) {
        Ok(outcome) => {
            let line = if cli.json {
                outcome.json.to_string()
            } else {
                outcome.text
            };
            if outcome.to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            report_error(&e)
        }
    };

    // Flush the file log before exiting.
    drop(guard);
    std::process::exit(code);
}
