//! Subcommand execution: config mapping, CLI overrides and result rendering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use flow_core::pipeline;
use flow_core::{
    ChannelUploader, DecimateCfg, EdgeCfg, FlowError, ReduceCfg, UploadCfg, UploadReport,
};
use flow_sinks::CommandScriptSink;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::cli::Commands;

/// What a command prints on success.
pub struct Outcome {
    pub text: String,
    pub json: serde_json::Value,
    /// Stdout is already carrying the command script.
    pub to_stderr: bool,
}

impl Outcome {
    fn stdout(text: String, json: serde_json::Value) -> Self {
        Self {
            text,
            json,
            to_stderr: false,
        }
    }
}

fn config_error(msg: String) -> eyre::Report {
    FlowError::Config(msg).into()
}

fn positive_finite(flag: &str, v: f64) -> eyre::Result<f64> {
    if !v.is_finite() || v <= 0.0 {
        return Err(config_error(format!("{flag} must be a finite value > 0, got {v}")));
    }
    Ok(v)
}

fn reduce_cfg(
    cfg: &flow_config::Config,
    cal_factor: Option<f64>,
    zero_threshold_ms: Option<f64>,
) -> eyre::Result<ReduceCfg> {
    let mut rc: ReduceCfg = cfg.into();
    if let Some(f) = cal_factor {
        rc.cal_factor = positive_finite("--cal-factor", f)?;
    }
    if let Some(ms) = zero_threshold_ms {
        if !ms.is_finite() || ms < 0.0 {
            return Err(config_error(format!(
                "--zero-threshold-ms must be a finite value >= 0, got {ms}"
            )));
        }
        rc.zero_threshold_ms = ms;
    }
    Ok(rc)
}

fn edge_cfg(cfg: &flow_config::Config, keep_all_rows: bool) -> EdgeCfg {
    let mut ec: EdgeCfg = (&cfg.edges).into();
    ec.keep_all_rows |= keep_all_rows;
    ec
}

pub fn run(cmd: &Commands, cfg: &flow_config::Config) -> eyre::Result<Outcome> {
    match cmd {
        Commands::Edges {
            input,
            output,
            keep_all_rows,
        } => {
            let report = pipeline::extract_pulses(input, output, &edge_cfg(cfg, *keep_all_rows))?;
            Ok(Outcome::stdout(
                format!(
                    "Found {} rising edges in {} rows; wrote {} events to {}",
                    report.rising_edges,
                    report.rows,
                    report.events,
                    output.display()
                ),
                json!({ "command": "edges", "report": report }),
            ))
        }
        Commands::Reduce {
            input,
            output,
            cal_factor,
            zero_threshold_ms,
        } => {
            let rc = reduce_cfg(cfg, *cal_factor, *zero_threshold_ms)?;
            let report = pipeline::reduce_file(input, output, &rc)?;
            Ok(Outcome::stdout(
                format!(
                    "Reduced {} pulses to {} points in {}",
                    report.pulses,
                    report.points,
                    output.display()
                ),
                json!({ "command": "reduce", "report": report }),
            ))
        }
        Commands::Process {
            input,
            output,
            pulses,
            keep_all_rows,
            cal_factor,
        } => {
            let rc = reduce_cfg(cfg, *cal_factor, None)?;
            let report = pipeline::process_file(
                input,
                pulses.as_deref(),
                output,
                &edge_cfg(cfg, *keep_all_rows),
                &rc,
            )?;
            Ok(Outcome::stdout(
                format!(
                    "Found {} rising edges; reduced to {} points in {}",
                    report.edges.rising_edges,
                    report.reduce.points,
                    output.display()
                ),
                json!({ "command": "process", "report": report }),
            ))
        }
        Commands::Upload {
            input,
            script,
            bulk,
            keep_every_nth,
        } => run_upload(
            cfg,
            input,
            script.as_deref(),
            bulk.as_deref(),
            *keep_every_nth,
        ),
        Commands::CheckConfig => Ok(check_config(cfg)),
    }
}

fn install_cancel_handler() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, AtomicOrdering::SeqCst)) {
        tracing::warn!(error = %e, "Ctrl-C handler not installed; upload cannot be cancelled");
    }
    cancel
}

fn stage_script(path: &Path) -> eyre::Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir)
        .map_err(|e| FlowError::Io(format!("create temp file in {dir:?}: {e}")))?;
    Ok(tmp)
}

fn run_upload(
    cfg: &flow_config::Config,
    input: &Path,
    script: Option<&Path>,
    bulk: Option<&Path>,
    keep_every_nth: Option<u32>,
) -> eyre::Result<Outcome> {
    let parsed = flow_core::io::read_reduced(input)?;
    let (points, skipped_rows) = (parsed.rows.len(), parsed.skipped_rows);
    let mut dc: DecimateCfg = (&cfg.decimate).into();
    if let Some(n) = keep_every_nth {
        if n == 0 {
            return Err(config_error("--keep-every-nth must be >= 1".to_string()));
        }
        dc.keep_every_nth = n;
    }
    let upload_cfg: UploadCfg = cfg.into();

    // The script file appears only after a complete upload.
    let staged = script.map(stage_script).transpose()?;
    let out: Box<dyn Write> = match &staged {
        Some(tmp) => {
            let file = tmp
                .reopen()
                .map_err(|e| FlowError::Io(format!("open staged script {:?}: {e}", tmp.path())))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut uploader = ChannelUploader::new(CommandScriptSink::new(out), upload_cfg);

    let result: eyre::Result<UploadReport> = match bulk {
        Some(bulk_path) => pipeline::bulk_upload_points(&mut uploader, parsed.rows, &dc, bulk_path),
        None => {
            let cancel = install_cancel_handler();
            pipeline::upload_points(&mut uploader, parsed.rows, &dc, Some(cancel.as_ref()))
        }
    };
    let sink = uploader.into_inner();
    let lines = sink.lines();
    sink.finish()
        .map_err(|e| FlowError::Io(format!("flush command script: {e}")))?;
    let report = result?;
    if let (Some(tmp), Some(path)) = (staged, script) {
        tmp.persist(path)
            .map_err(|e| FlowError::Io(format!("rename into {path:?}: {}", e.error)))?;
    }

    let target = script.map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    Ok(Outcome {
        text: format!(
            "Uploaded {} of {} points ({} commands to {}, {} failures)",
            report.kept,
            points,
            lines,
            target,
            report.failures
        ),
        json: json!({
            "command": "upload",
            "points": points,
            "commands": lines,
            "skipped_rows": skipped_rows,
            "report": report,
        }),
        to_stderr: script.is_none(),
    })
}

fn check_config(cfg: &flow_config::Config) -> Outcome {
    let ordering = match cfg.reduce.ordering {
        flow_config::Ordering::Clamp => "clamp",
        flow_config::Ordering::Reject => "reject",
    };
    let on_error = match cfg.upload.on_error {
        flow_config::OnError::Abort => "abort",
        flow_config::OnError::Continue => "continue",
    };
    let ch = &cfg.channels;
    let text = format!(
        "Config OK\n\
         input.time_divisor = {}\n\
         edges.keep_all_rows = {}\n\
         reduce.cal_factor = {}\n\
         reduce.zero_threshold_ms = {}\n\
         reduce.closing_offset = {}\n\
         reduce.ordering = {ordering}\n\
         decimate.keep_every_nth = {}\n\
         channels = {} / {} in {} [{}]\n\
         upload.on_error = {on_error}",
        cfg.input.time_divisor,
        cfg.edges.keep_all_rows,
        cfg.reduce.cal_factor,
        cfg.reduce.zero_threshold_ms,
        cfg.reduce.closing_offset,
        cfg.decimate.keep_every_nth,
        ch.rate,
        ch.total,
        ch.group,
        ch.unit,
    );
    let json = json!({
        "command": "check-config",
        "ok": true,
        "input": { "time_divisor": cfg.input.time_divisor },
        "edges": { "keep_all_rows": cfg.edges.keep_all_rows },
        "reduce": {
            "cal_factor": cfg.reduce.cal_factor,
            "zero_threshold_ms": cfg.reduce.zero_threshold_ms,
            "closing_offset": cfg.reduce.closing_offset,
            "ordering": ordering,
        },
        "decimate": { "keep_every_nth": cfg.decimate.keep_every_nth },
        "channels": {
            "group": ch.group,
            "rate": ch.rate,
            "total": ch.total,
            "unit": ch.unit,
            "use_prefix_scaling": ch.use_prefix_scaling,
            "rate_multiplier": ch.rate_multiplier,
            "time_format": ch.time_format,
        },
        "upload": { "on_error": on_error },
    });
    Outcome::stdout(text, json)
}
