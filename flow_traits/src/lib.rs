//! Collaborator interface for the external recording/visualization tool.
//!
//! The processing core never builds wire commands itself; it talks to the tool
//! through [`ChannelSink`] using the typed parameter structs below.

pub mod status;

pub use status::CommandStatus;

use std::path::Path;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A named data channel inside a group, plotted against a unit axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub name: String,
    pub group: String,
    pub unit: String,
    /// Let the tool auto-scale with SI prefixes (milli/micro).
    pub use_prefix_scaling: bool,
}

/// One timestamped value appended to an existing channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleAppend {
    pub channel: String,
    pub group: String,
    /// Timestamp with unit suffix, e.g. `"1500ms"`.
    pub timestamp: String,
    pub value: f64,
    /// Time base understood by the tool, e.g. `"elapsed"`.
    pub time_format: String,
}

pub trait ChannelSink {
    fn create_channel(&mut self, spec: &ChannelSpec) -> Result<CommandStatus, BoxError>;

    fn append_sample(&mut self, sample: &SampleAppend) -> Result<CommandStatus, BoxError>;

    /// Load a prepared CSV directly, bypassing per-sample appends.
    fn bulk_import(&mut self, path: &Path) -> Result<CommandStatus, BoxError>;
}

impl<S: ChannelSink + ?Sized> ChannelSink for Box<S> {
    fn create_channel(&mut self, spec: &ChannelSpec) -> Result<CommandStatus, BoxError> {
        (**self).create_channel(spec)
    }

    fn append_sample(&mut self, sample: &SampleAppend) -> Result<CommandStatus, BoxError> {
        (**self).append_sample(sample)
    }

    fn bulk_import(&mut self, path: &Path) -> Result<CommandStatus, BoxError> {
        (**self).bulk_import(path)
    }
}
