//! Hands reduced points to the recording tool through `ChannelSink`.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use flow_traits::{BoxError, ChannelSink, ChannelSpec, CommandStatus, SampleAppend};
use serde::Serialize;

use crate::config::{CollaboratorErrorPolicy, UploadCfg};
use crate::error::{FlowError, Result};
use crate::types::ReducedPoint;
use crate::util::elapsed_stamp;

/// Counts for one upload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Points handed to the sink.
    pub kept: usize,
    /// Successful append/import commands.
    pub appended: usize,
    /// Commands that failed but were tolerated (`CollaboratorErrorPolicy::Continue`).
    pub failures: usize,
}

pub struct ChannelUploader<S> {
    sink: S,
    cfg: UploadCfg,
}

impl<S: ChannelSink> ChannelUploader<S> {
    pub fn new(sink: S, cfg: UploadCfg) -> Self {
        Self { sink, cfg }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    pub fn cfg(&self) -> &UploadCfg {
        &self.cfg
    }

    /// Create the rate and total channels. Returns the number of tolerated failures.
    ///
    /// The tool does not promise idempotent creation; a duplicate may report a failure.
    pub fn create_channels(&mut self) -> Result<usize> {
        let ch = &self.cfg.channels;
        let specs = [ch.rate.clone(), ch.total.clone()].map(|name| ChannelSpec {
            name,
            group: ch.group.clone(),
            unit: ch.unit.clone(),
            use_prefix_scaling: ch.use_prefix_scaling,
        });
        let mut failures = 0;
        for spec in &specs {
            let res = self.sink.create_channel(spec);
            if !self.check("create channel", res)? {
                failures += 1;
            }
        }
        Ok(failures)
    }

    /// Append every point: scaled rate to the rate channel, raw total to the total channel.
    ///
    /// `cancel` is polled between points; a set flag stops with `FlowError::Cancelled`.
    pub fn append_points(
        &mut self,
        points: &[ReducedPoint],
        cancel: Option<&AtomicBool>,
    ) -> Result<UploadReport> {
        let mut report = UploadReport::default();
        for p in points {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                tracing::warn!(sent = report.kept, "upload cancelled");
                return Err(FlowError::Cancelled.into());
            }
            report.kept += 1;
            let timestamp = elapsed_stamp(p.time_ms);
            let ch = &self.cfg.channels;
            let rate = self.sample(&ch.rate, &timestamp, p.rate * ch.rate_multiplier);
            let total = self.sample(&ch.total, &timestamp, p.total);
            for sample in [rate, total] {
                let res = self.sink.append_sample(&sample);
                if self.check("append sample", res)? {
                    report.appended += 1;
                } else {
                    report.failures += 1;
                }
            }
        }
        tracing::info!(
            kept = report.kept,
            appended = report.appended,
            failures = report.failures,
            "upload finished"
        );
        Ok(report)
    }

    /// Ask the tool to load a prepared bulk-import CSV.
    pub fn bulk_import(&mut self, path: &Path) -> Result<UploadReport> {
        let mut report = UploadReport::default();
        let res = self.sink.bulk_import(path);
        if self.check("bulk import", res)? {
            report.appended += 1;
        } else {
            report.failures += 1;
        }
        Ok(report)
    }

    fn sample(&self, channel: &str, timestamp: &str, value: f64) -> SampleAppend {
        SampleAppend {
            channel: channel.to_string(),
            group: self.cfg.channels.group.clone(),
            timestamp: timestamp.to_string(),
            value,
            time_format: self.cfg.channels.time_format.clone(),
        }
    }

    /// Ok(true) on success, Ok(false) on a tolerated failure, Err when aborting.
    fn check(
        &self,
        operation: &'static str,
        res: std::result::Result<CommandStatus, BoxError>,
    ) -> Result<bool> {
        let status = match res {
            Ok(s) if !s.is_failure() => {
                tracing::trace!(operation, status = s.as_str(), "collaborator ok");
                return Ok(true);
            }
            Ok(s) => s.as_str().trim().to_string(),
            Err(e) => e.to_string(),
        };
        match self.cfg.on_error {
            CollaboratorErrorPolicy::Abort => {
                tracing::error!(operation, %status, "collaborator failed");
                Err(FlowError::Collaborator { operation, status }.into())
            }
            CollaboratorErrorPolicy::Continue => {
                tracing::warn!(operation, %status, "collaborator failed; continuing");
                Ok(false)
            }
        }
    }
}
