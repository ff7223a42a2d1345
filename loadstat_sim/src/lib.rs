//! Simulated host for the load sampling engine: an admission queue that
//! implements `WorkSource` and a seeded workload that drives the busy hooks.

pub mod error;
pub mod queue;
pub mod util;
pub mod workload;

pub use error::SimError;
pub use queue::SimQueue;
pub use workload::{BusyHooks, SimWorkload, WorkloadCfg, WorkloadSummary};
