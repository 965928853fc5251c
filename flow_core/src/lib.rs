#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Pulse-to-rate/total reconstruction for digital water-meter captures.
//!
//! All interaction with the recording tool goes through `flow_traits::ChannelSink`.
//!
//! ## Architecture
//!
//! - **Edge detection**: raw digital samples to rising-edge pulse events (`edge`)
//! - **Reduction**: pulse events to `(time_ms, rate, total)` points (`reduce`)
//! - **Decimation**: keep first, zero-rate and every Nth point (`decimate`)
//! - **Upload**: per-sample appends or a bulk import through the sink (`upload`)
//! - **Files**: CSV boundary formats with atomic writes (`io`, `pipeline`)
//!
//! Each stage owns its input and emits a new sequence; stage state is private.

pub mod config;
pub mod conversions;
pub mod decimate;
pub mod edge;
pub mod error;
pub mod io;
pub mod mocks;
pub mod pipeline;
pub mod reduce;
pub mod types;
pub mod upload;
pub mod util;

pub use config::{
    ChannelCfg, CollaboratorErrorPolicy, DecimateCfg, EdgeCfg, OrderingPolicy, ReduceCfg,
    UploadCfg,
};
pub use decimate::{Decimator, decimate};
pub use edge::{EdgeDetector, EdgeScan, detect_edges};
pub use error::FlowError;
pub use reduce::{Emitted, Reducer, reduce};
pub use types::{PulseEvent, RawSample, ReducedPoint};
pub use upload::{ChannelUploader, UploadReport};
