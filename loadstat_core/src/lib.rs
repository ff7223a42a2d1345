#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Adaptive load sampling and scale-request engine.
//!
//! This crate measures how much of each sampling window a resource spent
//! busy and turns that into a discrete request for an external governor.
//! The resource is reached only through `loadstat_traits::WorkSource`.
//!
//! ## Architecture
//!
//! - **Configuration**: tunables and alert policy (`config` module)
//! - **Window**: rolling busy-time accumulator (`window` module)
//! - **Engine**: busy edges, per-tick decision, congestion override (`engine` module)
//! - **Alerting**: streak gate plus rate limiter (`alert`, `ratelimit` modules)
//! - **Sampling loop**: edge-armed, self-quiescing worker thread (`sampler` module)
//! - **Control surface**: named integer parameters (`param` module)
//!
//! ## Duty cycle
//!
//! The loop is dormant until the first busy edge, ticks every `delay_ms`
//! while there is activity, and stops itself after `IDLE_MAX` idle windows.

// Module declarations
pub mod alert;
pub mod config;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod mocks;
pub mod monitor;
pub mod param;
pub mod ratelimit;
pub mod sampler;
pub mod signal;
pub mod util;
pub mod window;

pub use config::{AlertPolicy, IDLE_MAX, StatConfig, StatSettings};
pub use engine::{Continuation, DormantReason, LoadStat, TickReport, decide};
pub use error::StatError;
pub use monitor::{Monitor, MonitorBuilder};
pub use param::Param;
pub use sampler::LoopState;
pub use signal::ScaleSignal;
pub use window::StatWindow;
