//! File-to-file orchestration of the stages, with per-stage reports.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use flow_traits::ChannelSink;
use serde::Serialize;

use crate::config::{DecimateCfg, EdgeCfg, ReduceCfg};
use crate::decimate::decimate;
use crate::edge::detect_edges;
use crate::error::Result;
use crate::io;
use crate::reduce::reduce;
use crate::types::{PulseEvent, ReducedPoint};
use crate::upload::{ChannelUploader, UploadReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EdgeReport {
    /// Data rows parsed from the raw file (header and skipped rows excluded).
    pub rows: usize,
    pub skipped_rows: usize,
    pub rising_edges: u64,
    /// Rows written to the pulses file.
    pub events: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReduceReport {
    pub pulses: usize,
    pub points: usize,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub edges: EdgeReport,
    pub reduce: ReduceReport,
}

fn reduce_with_report(
    events: Vec<PulseEvent>,
    skipped_rows: usize,
    cfg: &ReduceCfg,
) -> Result<(Vec<ReducedPoint>, ReduceReport)> {
    let pulses = events.iter().filter(|e| e.is_pulse()).count();
    let points = reduce(events, cfg)?;
    let report = ReduceReport {
        pulses,
        points: points.len(),
        skipped_rows,
    };
    Ok((points, report))
}

/// Raw export to pulses file.
pub fn extract_pulses(input: &Path, output: &Path, cfg: &EdgeCfg) -> Result<EdgeReport> {
    let raw = io::read_raw_samples(input).wrap_err_with(|| format!("read raw export {input:?}"))?;
    let rows = raw.rows.len();
    let scan = detect_edges(raw.rows, cfg.keep_all_rows);
    io::write_pulses(output, &raw.headers, &scan.events)?;
    let report = EdgeReport {
        rows,
        skipped_rows: raw.skipped_rows,
        rising_edges: scan.rising_edges,
        events: scan.events.len(),
    };
    tracing::info!(
        rows,
        skipped = report.skipped_rows,
        rising_edges = report.rising_edges,
        "edges located"
    );
    Ok(report)
}

/// Pulses file to reduced file.
pub fn reduce_file(input: &Path, output: &Path, cfg: &ReduceCfg) -> Result<ReduceReport> {
    let parsed = io::read_pulses(input).wrap_err_with(|| format!("read pulses {input:?}"))?;
    let (points, report) = reduce_with_report(parsed.rows, parsed.skipped_rows, cfg)
        .wrap_err_with(|| format!("reduce {input:?}"))?;
    io::write_reduced(output, &points)?;
    tracing::info!(
        pulses = report.pulses,
        points = report.points,
        "data reduced to timestamped events"
    );
    Ok(report)
}

/// Raw export straight to the reduced file; the pulses file is optional.
pub fn process_file(
    input: &Path,
    pulses_out: Option<&Path>,
    output: &Path,
    edges: &EdgeCfg,
    reduce_cfg: &ReduceCfg,
) -> Result<ProcessReport> {
    let raw = io::read_raw_samples(input).wrap_err_with(|| format!("read raw export {input:?}"))?;
    let rows = raw.rows.len();
    let scan = detect_edges(raw.rows, edges.keep_all_rows);
    if let Some(path) = pulses_out {
        io::write_pulses(path, &raw.headers, &scan.events)?;
    }
    let edge_report = EdgeReport {
        rows,
        skipped_rows: raw.skipped_rows,
        rising_edges: scan.rising_edges,
        events: scan.events.len(),
    };
    tracing::info!(rows, rising_edges = scan.rising_edges, "edges located");

    let (points, reduce_report) = reduce_with_report(scan.events, 0, reduce_cfg)
        .wrap_err_with(|| format!("reduce {input:?}"))?;
    io::write_reduced(output, &points)?;
    tracing::info!(points = reduce_report.points, "data reduced to timestamped events");

    Ok(ProcessReport {
        edges: edge_report,
        reduce: reduce_report,
    })
}

/// Create channels, decimate and append each kept point.
pub fn upload_points<S: ChannelSink>(
    uploader: &mut ChannelUploader<S>,
    points: Vec<ReducedPoint>,
    cfg: &DecimateCfg,
    cancel: Option<&AtomicBool>,
) -> Result<UploadReport> {
    let failures = uploader.create_channels()?;
    let total = points.len();
    let kept = decimate(points, cfg.keep_every_nth);
    tracing::info!(total, kept = kept.len(), every_nth = cfg.keep_every_nth, "decimated");
    let mut report = uploader.append_points(&kept, cancel)?;
    report.failures += failures;
    Ok(report)
}

/// Create channels, decimate, write the bulk-import CSV and import it in one call.
pub fn bulk_upload_points<S: ChannelSink>(
    uploader: &mut ChannelUploader<S>,
    points: Vec<ReducedPoint>,
    cfg: &DecimateCfg,
    bulk_path: &Path,
) -> Result<UploadReport> {
    let failures = uploader.create_channels()?;
    let kept = decimate(points, cfg.keep_every_nth);
    io::write_bulk_import(bulk_path, &kept, &uploader.cfg().channels)?;
    let mut report = uploader.bulk_import(bulk_path)?;
    report.kept = kept.len();
    report.failures += failures;
    Ok(report)
}
