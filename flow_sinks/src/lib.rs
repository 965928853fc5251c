//! Concrete `ChannelSink` implementations.
//!
//! `CommandScriptSink` renders each typed call as one line of the recording
//! tool's text command syntax. Getting those lines to the tool (socket, pipe,
//! pasted script) is left to the caller.

pub mod error;

use std::io::Write;
use std::path::Path;

use flow_traits::{BoxError, ChannelSink, ChannelSpec, CommandStatus, SampleAppend};

use crate::error::{Result, SinkError};

fn token<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(SinkError::InvalidToken {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Writes `$create channel`, `$stream data add` and `$stream import` commands.
pub struct CommandScriptSink<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> CommandScriptSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Commands written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, command: &str) -> Result<CommandStatus> {
        tracing::debug!(command, "send");
        writeln!(self.out, "{command}")?;
        self.lines += 1;
        Ok(CommandStatus::ok())
    }

    pub fn render_create(spec: &ChannelSpec) -> Result<String> {
        Ok(format!(
            "$create channel {} {} {} {}",
            token("channel", &spec.name)?,
            token("group", &spec.group)?,
            token("unit", &spec.unit)?,
            if spec.use_prefix_scaling { "yes" } else { "no" }
        ))
    }

    pub fn render_append(sample: &SampleAppend) -> Result<String> {
        if !sample.value.is_finite() {
            return Err(SinkError::NonFinite(sample.value));
        }
        Ok(format!(
            "$stream data add {} {} {} {} {}",
            token("channel", &sample.channel)?,
            token("group", &sample.group)?,
            token("timestamp", &sample.timestamp)?,
            sample.value,
            token("time format", &sample.time_format)?
        ))
    }

    pub fn render_import(path: &Path) -> String {
        format!("$stream import file=\"{}\"", path.display())
    }
}

impl<W: Write> ChannelSink for CommandScriptSink<W> {
    fn create_channel(&mut self, spec: &ChannelSpec) -> std::result::Result<CommandStatus, BoxError> {
        let cmd = Self::render_create(spec)?;
        Ok(self.emit(&cmd)?)
    }

    fn append_sample(
        &mut self,
        sample: &SampleAppend,
    ) -> std::result::Result<CommandStatus, BoxError> {
        let cmd = Self::render_append(sample)?;
        Ok(self.emit(&cmd)?)
    }

    fn bulk_import(&mut self, path: &Path) -> std::result::Result<CommandStatus, BoxError> {
        let cmd = Self::render_import(path);
        Ok(self.emit(&cmd)?)
    }
}
