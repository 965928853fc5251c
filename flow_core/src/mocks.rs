//! Test and helper mocks for flow_core

use std::path::{Path, PathBuf};

use flow_traits::{BoxError, ChannelSink, ChannelSpec, CommandStatus, SampleAppend};

/// One call observed by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Create(ChannelSpec),
    Append(SampleAppend),
    Import(PathBuf),
}

/// A sink that records every call in memory.
///
/// Failure injection: from call index `fail_from` on, every call answers with a
/// `FAIL` status, or with a transport error when `transport_error` is set.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    fail_from: Option<usize>,
    transport_error: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_from(call_index: usize) -> Self {
        Self {
            fail_from: Some(call_index),
            ..Self::default()
        }
    }

    pub fn erroring_from(call_index: usize) -> Self {
        Self {
            fail_from: Some(call_index),
            transport_error: true,
            ..Self::default()
        }
    }

    /// Appended samples only, in call order.
    pub fn appends(&self) -> Vec<&SampleAppend> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Append(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn answer(&mut self, call: SinkCall) -> Result<CommandStatus, BoxError> {
        let idx = self.calls.len();
        self.calls.push(call);
        match self.fail_from {
            Some(from) if idx >= from && self.transport_error => {
                Err(Box::new(std::io::Error::other("connection reset")))
            }
            Some(from) if idx >= from => Ok(CommandStatus::new("FAIL: rejected")),
            _ => Ok(CommandStatus::ok()),
        }
    }
}

impl ChannelSink for RecordingSink {
    fn create_channel(&mut self, spec: &ChannelSpec) -> Result<CommandStatus, BoxError> {
        self.answer(SinkCall::Create(spec.clone()))
    }

    fn append_sample(&mut self, sample: &SampleAppend) -> Result<CommandStatus, BoxError> {
        self.answer(SinkCall::Append(sample.clone()))
    }

    fn bulk_import(&mut self, path: &Path) -> Result<CommandStatus, BoxError> {
        self.answer(SinkCall::Import(path.to_path_buf()))
    }
}
