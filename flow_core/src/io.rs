//! CSV files at the pipeline boundaries.
//!
//! - Readers consume a header row as schema and skip rows that are too short or
//!   whose fields do not parse; skipped rows are counted, never fatal.
//! - Writers go through a temporary file in the destination directory that is
//!   renamed over the target only after a successful flush, so an aborted run
//!   never leaves a partial file behind.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use tempfile::NamedTempFile;

use crate::config::ChannelCfg;
use crate::error::{FlowError, Result};
use crate::types::{PulseEvent, RawSample, ReducedPoint};

/// Header of the reduced output file.
pub const REDUCED_HEADERS: [&str; 3] = ["Time mS", "Rate", "Total"];
/// Time column header of the bulk-import file.
pub const BULK_TIME_HEADER: &str = "Time mS";
const FALLBACK_PULSE_HEADERS: [&str; 2] = ["Time", "Digital"];

/// Rows parsed from one CSV file.
#[derive(Debug, Clone, Default)]
pub struct Parsed<T> {
    pub headers: Vec<String>,
    pub rows: Vec<T>,
    pub skipped_rows: usize,
}

fn io_err(action: &str, path: &Path, e: impl std::fmt::Display) -> FlowError {
    FlowError::Io(format!("{action} {path:?}: {e}"))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| io_err("open", path, e).into())
}

fn read_rows<R, T, F>(source: R, min_cols: usize, what: &str, mut parse: F) -> Result<Parsed<T>>
where
    R: Read,
    F: FnMut(&ByteRecord) -> Option<T>,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    let headers = rdr
        .byte_headers()
        .map_err(|e| FlowError::Io(format!("read {what} headers: {e}")))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut rows = Vec::new();
    let mut skipped_rows = 0;
    // Byte records: a row with invalid UTF-8 is a malformed row, not a read failure.
    for rec in rdr.byte_records() {
        let rec = rec.map_err(|e| FlowError::Io(format!("read {what} row: {e}")))?;
        let parsed = if rec.len() >= min_cols { parse(&rec) } else { None };
        match parsed {
            Some(row) => rows.push(row),
            None => {
                skipped_rows += 1;
                tracing::debug!(
                    what,
                    line = ?rec.position().map(csv::Position::line),
                    "skipping malformed row"
                );
            }
        }
    }
    Ok(Parsed {
        headers,
        rows,
        skipped_rows,
    })
}

fn field(rec: &ByteRecord, i: usize) -> Option<&str> {
    std::str::from_utf8(rec.get(i)?).ok()
}

fn parse_timestamp_and_flag(rec: &ByteRecord) -> Option<(i64, bool)> {
    let timestamp = field(rec, 0)?.parse::<i64>().ok()?;
    let flag = field(rec, 1)?.parse::<i64>().ok()?;
    Some((timestamp, flag == 1))
}

// Older reduced files carry a fractional closing time; floor it.
fn parse_time_ms(field: &str) -> Option<i64> {
    field.parse::<i64>().ok().or_else(|| {
        let v = field.parse::<f64>().ok()?;
        v.is_finite().then(|| v.floor() as i64)
    })
}

fn parse_reduced(rec: &ByteRecord) -> Option<ReducedPoint> {
    let time_ms = parse_time_ms(field(rec, 0)?)?;
    let rate = field(rec, 1)?.parse::<f64>().ok()?;
    let total = field(rec, 2)?.parse::<f64>().ok()?;
    Some(ReducedPoint::new(time_ms, rate, total))
}

/// Parse a raw export: `timestamp,digital,...` with a header row.
pub fn parse_raw_samples<R: Read>(source: R) -> Result<Parsed<RawSample>> {
    read_rows(source, 2, "raw", |rec| {
        parse_timestamp_and_flag(rec).map(|(t, high)| RawSample::new(t, high))
    })
}

pub fn read_raw_samples(path: &Path) -> Result<Parsed<RawSample>> {
    parse_raw_samples(open(path)?)
}

/// Parse a pulses file written by [`write_pulses`].
pub fn parse_pulses<R: Read>(source: R) -> Result<Parsed<PulseEvent>> {
    read_rows(source, 2, "pulses", |rec| {
        parse_timestamp_and_flag(rec).map(|(timestamp, flag)| PulseEvent { timestamp, flag })
    })
}

pub fn read_pulses(path: &Path) -> Result<Parsed<PulseEvent>> {
    parse_pulses(open(path)?)
}

/// Parse a reduced file: `Time mS,Rate,Total`.
pub fn parse_reduced_points<R: Read>(source: R) -> Result<Parsed<ReducedPoint>> {
    read_rows(source, 3, "reduced", parse_reduced)
}

pub fn read_reduced(path: &Path) -> Result<Parsed<ReducedPoint>> {
    parse_reduced_points(open(path)?)
}

fn write_atomically<F>(path: &Path, quote: QuoteStyle, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> csv::Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_err("create temp file in", dir, e))?;
    {
        let mut w = WriterBuilder::new()
            .quote_style(quote)
            .from_writer(&mut tmp);
        fill(&mut w).map_err(|e| io_err("write", path, e))?;
        w.flush().map_err(|e| io_err("flush", path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| io_err("sync", path, e))?;
    tmp.persist(path)
        .map_err(|e| io_err("rename into", path, e.error))?;
    Ok(())
}

/// Write detected events; `headers` are the raw file's headers (first two are kept).
pub fn write_pulses(path: &Path, headers: &[String], events: &[PulseEvent]) -> Result<()> {
    let header: Vec<&str> = if headers.len() >= 2 {
        headers[..2].iter().map(String::as_str).collect()
    } else {
        FALLBACK_PULSE_HEADERS.to_vec()
    };
    write_atomically(path, QuoteStyle::Necessary, |w| {
        w.write_record(&header)?;
        for e in events {
            w.write_record([e.timestamp.to_string(), u8::from(e.flag).to_string()])?;
        }
        Ok(())
    })
}

pub fn write_reduced(path: &Path, points: &[ReducedPoint]) -> Result<()> {
    write_atomically(path, QuoteStyle::Necessary, |w| {
        w.write_record(REDUCED_HEADERS)?;
        for p in points {
            w.write_record([p.time_ms.to_string(), p.rate.to_string(), p.total.to_string()])?;
        }
        Ok(())
    })
}

/// Column headers of the bulk-import file for a channel layout.
pub fn bulk_headers(channels: &ChannelCfg) -> [String; 3] {
    [
        BULK_TIME_HEADER.to_string(),
        format!("{} {} {}", channels.rate, channels.group, channels.unit),
        format!("{} {} {}", channels.total, channels.group, channels.unit),
    ]
}

/// Write points for the tool's bulk import; rates get `rate_multiplier` as on append.
pub fn write_bulk_import(path: &Path, points: &[ReducedPoint], channels: &ChannelCfg) -> Result<()> {
    write_atomically(path, QuoteStyle::NonNumeric, |w| {
        w.write_record(bulk_headers(channels))?;
        for p in points {
            w.write_record([
                p.time_ms.to_string(),
                (p.rate * channels.rate_multiplier).to_string(),
                p.total.to_string(),
            ])?;
        }
        Ok(())
    })
}
