//! Configuration types for the processing stages.
//!
//! These are the runtime configuration structs passed into each stage.
//! They are separate from the TOML-deserialized config in `flow_config`.

use crate::util::NANOS_PER_MS;

/// Edge detector configuration.
#[derive(Debug, Clone, Default)]
pub struct EdgeCfg {
    /// Emit every row after warm-up, with the flag zeroed except at rising edges.
    pub keep_all_rows: bool,
}

/// How the reducer treats a pulse whose timestamp is not after the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Count the pulse, keep the clock and the previous rate.
    #[default]
    Clamp,
    /// Fail with `FlowError::DataOrdering` when time goes backwards.
    Reject,
}

/// Rate/total reducer configuration.
#[derive(Debug, Clone)]
pub struct ReduceCfg {
    /// Volume per pulse; multiplies both rate and total.
    pub cal_factor: f64,
    /// Gaps longer than this (working ms) are drawn as zero flow.
    pub zero_threshold_ms: f64,
    /// Source units per working millisecond.
    pub time_divisor: i64,
    /// Source units added to the last pulse time for the closing zero-rate point.
    pub closing_offset: i64,
    pub ordering: OrderingPolicy,
}

impl ReduceCfg {
    /// Defaults for nanosecond exports with the given calibration.
    pub fn new(cal_factor: f64) -> Self {
        Self {
            cal_factor,
            zero_threshold_ms: 1000.0,
            time_divisor: NANOS_PER_MS,
            closing_offset: 1000,
            ordering: OrderingPolicy::Clamp,
        }
    }
}

/// Decimation configuration.
#[derive(Debug, Clone)]
pub struct DecimateCfg {
    /// Keep roughly one point in N (besides the first and zero-rate points).
    pub keep_every_nth: u32,
}

impl Default for DecimateCfg {
    fn default() -> Self {
        Self {
            keep_every_nth: 100,
        }
    }
}

/// Channel layout in the recording tool.
#[derive(Debug, Clone)]
pub struct ChannelCfg {
    pub group: String,
    pub rate: String,
    pub total: String,
    pub unit: String,
    pub use_prefix_scaling: bool,
    /// Applied to rate values only; totals are uploaded unscaled.
    pub rate_multiplier: f64,
    pub time_format: String,
}

impl Default for ChannelCfg {
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

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollaboratorErrorPolicy {
    /// Stop at the first failed command.
    #[default]
    Abort,
    /// Log the status and keep going.
    Continue,
}

/// Uploader configuration.
#[derive(Debug, Clone, Default)]
pub struct UploadCfg {
    pub channels: ChannelCfg,
    pub on_error: CollaboratorErrorPolicy,
}
