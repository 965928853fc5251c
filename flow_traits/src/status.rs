use std::fmt;

/// Status string returned by the external tool for each command.
///
/// The tool answers `OK` on success and a line starting with `FAIL` otherwise;
/// anything else is passed through as informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStatus(String);

impl CommandStatus {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[inline]
    pub fn ok() -> Self {
        Self("OK".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the tool reported a failure (`FAIL...`, case-insensitive).
    pub fn is_failure(&self) -> bool {
        let head = self.0.trim_start();
        head.get(..4)
            .is_some_and(|p| p.eq_ignore_ascii_case("fail"))
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
