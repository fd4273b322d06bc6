//! The driver loop.
//!
//! Pulls job records off the input stream, feeds them to the scheduler,
//! echoes each record after the commands it provoked, and drains the pools
//! at clean end-of-stream. Logical time advances only here, carried by the
//! input timestamps.

use crate::emit::Emitter;
use crate::scheduler::Scheduler;
use crate::util_log::UtilizationLog;
use hourglass_core::{Job, Result, Timestamp};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Input exhausted; the shutdown terminations were emitted.
    Eof,
    /// Interrupted by the shutdown future; no terminations were emitted.
    Interrupted,
}

/// Owns the scheduler and the output sink for one run.
pub struct Driver<E: Emitter> {
    scheduler: Scheduler,
    emitter: E,
    util_log: Option<UtilizationLog>,
}

impl<E: Emitter> Driver<E> {
    pub fn new(scheduler: Scheduler, emitter: E) -> Self {
        Driver {
            scheduler,
            emitter,
            util_log: None,
        }
    }

    /// Enables the per-job utilization counter log.
    pub fn with_util_log(mut self, log: UtilizationLog) -> Self {
        self.util_log = Some(log);
        self
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    /// Tears the driver apart, handing back its pieces for inspection.
    pub fn into_parts(self) -> (Scheduler, E, Option<UtilizationLog>) {
        (self.scheduler, self.emitter, self.util_log)
    }

    /// Processes `input` to end-of-stream, or until `shutdown` resolves.
    ///
    /// A resolved `shutdown` wins over a ready input line; the run stops
    /// without the final terminate burst either way it is interrupted. Any
    /// parse, placement, or I/O error aborts the run.
    pub async fn run<R>(
        &mut self,
        input: R,
        shutdown: impl Future<Output = ()>,
    ) -> Result<RunOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut shutdown = std::pin::pin!(shutdown);
        let mut last_seen: Option<Timestamp> = None;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => return Ok(RunOutcome::Interrupted),
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let job: Job = line.parse()?;
                    last_seen = Some(job.arrival());
                    let sample = self.scheduler.schedule(job, &mut self.emitter)?;
                    self.emitter.job_line(&line)?;
                    if let Some(log) = &mut self.util_log {
                        log.record(&sample)?;
                    }
                }
            }
        }

        // Only a clean end-of-stream drains the pools. An empty input never
        // observed a timestamp, so there is nothing to drain.
        if let Some(at) = last_seen {
            self.scheduler.shutdown(at, &mut self.emitter)?;
        }
        Ok(RunOutcome::Eof)
    }
}
