#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the flow-meter processing pipeline.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - `reduce.cal_factor` has no default: a config without it is rejected at parse time.
use serde::Deserialize;
use serde::de::Deserializer;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    /// Source timestamp units per working millisecond (1_000_000 for ns exports).
    pub time_divisor: i64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            time_divisor: 1_000_000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct EdgesCfg {
    /// Keep every row (flag flattened to 0 except at rising edges) for debugging.
    pub keep_all_rows: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Ordering {
    /// Coincident or backwards timestamps are counted without moving the clock.
    #[default]
    Clamp,
    /// Fail the run on the first backwards timestamp.
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct ReduceCfg {
    /// Volume per pulse (e.g. litres). Required.
    pub cal_factor: f64,
    /// Gaps longer than this (working ms) are drawn as zero flow.
    #[serde(default = "default_zero_threshold_ms")]
    pub zero_threshold_ms: f64,
    /// Source units added to the last pulse time for the closing zero-rate point.
    #[serde(default = "default_closing_offset")]
    pub closing_offset: i64,
    #[serde(default)]
    pub ordering: Ordering,
}

fn default_zero_threshold_ms() -> f64 {
    1000.0
}

fn default_closing_offset() -> i64 {
    1000
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DecimateCfg {
    pub keep_every_nth: u32,
}

impl Default for DecimateCfg {
    fn default() -> Self {
        Self {
            keep_every_nth: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChannelsCfg {
    pub group: String,
    pub rate: String,
    pub total: String,
    pub unit: String,
    pub use_prefix_scaling: bool,
    /// Multiplier applied to rate values on upload (1000 => milli-units).
    pub rate_multiplier: f64,
    pub time_format: String,
}

impl Default for ChannelsCfg {
    fn default() -> Self {
        Self {
            group: "Water".to_string(),
            rate: "Rate".to_string(),
            total: "Total".to_string(),
            unit: "L".to_string(),
            use_prefix_scaling: true,
            rate_multiplier: 1000.0,
            time_format: "elapsed".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    #[default]
    Abort,
    Continue,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UploadCfg {
    /// What to do when the external tool reports a failure: "abort" | "continue".
    pub on_error: OnError,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub edges: EdgesCfg,
    pub reduce: ReduceCfg,
    #[serde(default)]
    pub decimate: DecimateCfg,
    #[serde(default, deserialize_with = "de_channels")]
    pub channels: ChannelsCfg,
    #[serde(default)]
    pub upload: UploadCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

// Channel names are trimmed on load; the tool splits commands on whitespace.
fn de_channels<'de, D>(deserializer: D) -> Result<ChannelsCfg, D::Error>
where
    D: Deserializer<'de>,
{
    let mut c = ChannelsCfg::deserialize(deserializer)?;
    for s in [&mut c.group, &mut c.rate, &mut c.total, &mut c.unit, &mut c.time_format] {
        let trimmed = s.trim();
        if trimmed.len() != s.len() {
            *s = trimmed.to_string();
        }
    }
    Ok(c)
}

fn check_name(field: &str, value: &str) -> eyre::Result<()> {
    if value.is_empty() {
        eyre::bail!("{field} must not be empty");
    }
    if value.chars().any(char::is_whitespace) {
        eyre::bail!("{field} must not contain whitespace, got {value:?}");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Input
        if self.input.time_divisor < 1 {
            eyre::bail!("input.time_divisor must be >= 1");
        }

        // Reduce
        let cal = self.reduce.cal_factor;
        if !cal.is_finite() || cal <= 0.0 {
            eyre::bail!("reduce.cal_factor must be a finite value > 0");
        }
        let thr = self.reduce.zero_threshold_ms;
        if !thr.is_finite() || thr < 0.0 {
            eyre::bail!("reduce.zero_threshold_ms must be a finite value >= 0");
        }
        if self.reduce.closing_offset < 0 {
            eyre::bail!("reduce.closing_offset must be >= 0");
        }

        // Decimate
        if self.decimate.keep_every_nth == 0 {
            eyre::bail!("decimate.keep_every_nth must be >= 1");
        }

        // Channels
        check_name("channels.group", &self.channels.group)?;
        check_name("channels.rate", &self.channels.rate)?;
        check_name("channels.total", &self.channels.total)?;
        check_name("channels.unit", &self.channels.unit)?;
        check_name("channels.time_format", &self.channels.time_format)?;
        if self.channels.rate == self.channels.total {
            eyre::bail!("channels.rate and channels.total must differ");
        }
        let mul = self.channels.rate_multiplier;
        if !mul.is_finite() || mul == 0.0 {
            eyre::bail!("channels.rate_multiplier must be finite and non-zero");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}
