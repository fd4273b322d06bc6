//! Hourglass - a trace-driven autoscaling scheduler for a three-queue
//! batch compute service.
//!
//! Input is a time-ordered stream of job records; output is an interleaved
//! stream of VM lifecycle commands (`launch`, `terminate`) and echoed job
//! records. Each queue runs an independent pool of simulated VMs; a
//! feedback controller keeps the idle fraction of every pool between two
//! thresholds while respecting a per-queue floor, and a retirement policy
//! stops VMs only near the end of their billing hour (VMs are billed in
//! whole hours from launch).
//!
//! # Example
//!
//! ```rust
//! use hourglass::{Driver, LineEmitter, Scheduler, SchedulerConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> hourglass::Result<()> {
//! let scheduler = Scheduler::new(SchedulerConfig::default())?;
//! let emitter = LineEmitter::new(Vec::new());
//! let mut driver = Driver::new(scheduler, emitter);
//!
//! let trace = b"2013-03-01 00:00:27 uid1 export 10.999\n" as &[u8];
//! driver.run(trace, std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod driver;
mod emit;
mod pool;
mod scheduler;
mod util_log;
mod vm;

pub use config::SchedulerConfig;
pub use driver::{Driver, RunOutcome};
pub use emit::{Emitter, LineEmitter};
pub use hourglass_core::{Command, CommandKind, Error, Job, QueueId, Result, Timestamp};
pub use pool::Pool;
pub use scheduler::{Scheduler, UtilizationSample};
pub use util_log::UtilizationLog;
pub use vm::Vm;
