//! `From` implementations bridging `flow_config` types to `flow_core` types.

use crate::config::{
    ChannelCfg, CollaboratorErrorPolicy, DecimateCfg, EdgeCfg, OrderingPolicy, ReduceCfg,
    UploadCfg,
};

// ── EdgeCfg ──────────────────────────────────────────────────────────────────

impl From<&flow_config::EdgesCfg> for EdgeCfg {
    fn from(c: &flow_config::EdgesCfg) -> Self {
        Self {
            keep_all_rows: c.keep_all_rows,
        }
    }
}

// ── ReduceCfg ────────────────────────────────────────────────────────────────

impl From<flow_config::Ordering> for OrderingPolicy {
    fn from(o: flow_config::Ordering) -> Self {
        match o {
            flow_config::Ordering::Clamp => Self::Clamp,
            flow_config::Ordering::Reject => Self::Reject,
        }
    }
}

// The divisor lives under [input], so the reducer maps from the whole config.
impl From<&flow_config::Config> for ReduceCfg {
    fn from(c: &flow_config::Config) -> Self {
        Self {
            cal_factor: c.reduce.cal_factor,
            zero_threshold_ms: c.reduce.zero_threshold_ms,
            time_divisor: c.input.time_divisor,
            closing_offset: c.reduce.closing_offset,
            ordering: c.reduce.ordering.into(),
        }
    }
}

// ── DecimateCfg ──────────────────────────────────────────────────────────────

impl From<&flow_config::DecimateCfg> for DecimateCfg {
    fn from(c: &flow_config::DecimateCfg) -> Self {
        Self {
            keep_every_nth: c.keep_every_nth,
        }
    }
}

// ── UploadCfg ────────────────────────────────────────────────────────────────

impl From<&flow_config::ChannelsCfg> for ChannelCfg {
    fn from(c: &flow_config::ChannelsCfg) -> Self {
        Self {
            group: c.group.clone(),
            rate: c.rate.clone(),
            total: c.total.clone(),
            unit: c.unit.clone(),
            use_prefix_scaling: c.use_prefix_scaling,
            rate_multiplier: c.rate_multiplier,
            time_format: c.time_format.clone(),
        }
    }
}

impl From<flow_config::OnError> for CollaboratorErrorPolicy {
    fn from(o: flow_config::OnError) -> Self {
        match o {
            flow_config::OnError::Abort => Self::Abort,
            flow_config::OnError::Continue => Self::Continue,
        }
    }
}

impl From<&flow_config::Config> for UploadCfg {
    fn from(c: &flow_config::Config) -> Self {
        Self {
            channels: (&c.channels).into(),
            on_error: c.upload.on_error.into(),
        }
    }
}
