//! Job placement and the autoscaling feedback controller.
//!
//! The [`Scheduler`] owns the three per-queue pools and is the only thing
//! that mutates them. Logical time never advances on its own; it is carried
//! in by each job's arrival timestamp and by the explicit shutdown call.
//!
//! Per scheduled job, in order:
//!
//! 1. warm-up initialization of all pools on the very first call,
//! 2. one counting walk over the job's pool (idle counts + first
//!    placement-eligible VM),
//! 3. assignment, or a tolerated drop inside the warm-up grace window,
//! 4. surplus retirement when the idle fraction exceeds the upper
//!    threshold,
//! 5. launches up to the pool floor,
//! 6. launches up to the lower idle-fraction threshold.
//!
//! Retirement is considered before the launch steps so that cost relief is
//! not undone by the growth that follows it.

use crate::config::SchedulerConfig;
use crate::emit::Emitter;
use crate::pool::Pool;
use hourglass_core::{Error, Job, QueueId, Result, Timestamp};

/// Utilization counters captured by one `schedule` call, after the
/// controller has run. The driver forwards these to the optional
/// utilization log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilizationSample {
    pub at: Timestamp,
    pub queue: QueueId,
    /// Pool size after any controller launches and retirements.
    pub pool_size: usize,
    /// VMs that were boot-complete and idle when the job arrived.
    pub free: usize,
    /// `⌊pool_size · min_idle_fraction⌋`, the controller's lower target.
    pub min_idle: usize,
}

impl std::fmt::Display for UtilizationSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.at, self.queue, self.pool_size, self.free, self.min_idle
        )
    }
}

/// The three independent pools, in fixed `export, url, general` order.
#[derive(Debug)]
struct Pools {
    export: Pool,
    url: Pool,
    general: Pool,
}

impl Pools {
    fn new() -> Self {
        Pools {
            export: Pool::new(QueueId::Export),
            url: Pool::new(QueueId::Url),
            general: Pool::new(QueueId::General),
        }
    }

    fn get(&self, queue: QueueId) -> &Pool {
        match queue {
            QueueId::Export => &self.export,
            QueueId::Url => &self.url,
            QueueId::General => &self.general,
        }
    }

    fn get_mut(&mut self, queue: QueueId) -> &mut Pool {
        match queue {
            QueueId::Export => &mut self.export,
            QueueId::Url => &mut self.url,
            QueueId::General => &mut self.general,
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pool> {
        [&mut self.export, &mut self.url, &mut self.general].into_iter()
    }
}

/// The scheduling engine: placement plus the launch and retirement
/// controllers, one instance per run.
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    pools: Pools,
    run_start: Option<Timestamp>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Scheduler {
            config,
            pools: Pools::new(),
            run_start: None,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn pool(&self, queue: QueueId) -> &Pool {
        self.pools.get(queue)
    }

    /// Places `job` on a VM in its queue's pool and runs the feedback
    /// controller, emitting any lifecycle commands to `emitter`.
    ///
    /// Inside the warm-up grace window a job that no VM can take is dropped
    /// with a warning (the caller still echoes it); past the window the
    /// same condition is a fatal [`Error::PlacementFailed`].
    pub fn schedule(&mut self, job: Job, emitter: &mut dyn Emitter) -> Result<UtilizationSample> {
        let now = job.arrival();
        let queue = job.queue();
        let SchedulerConfig {
            floor,
            min_idle_fraction,
            max_idle_fraction,
            boot_seconds,
            placement_slack_seconds,
            warmup_grace_seconds,
            retire_deadline_minutes,
        } = self.config;

        // First arrival: bring every pool up to the floor.
        let first_call = self.run_start.is_none();
        let run_start = *self.run_start.get_or_insert(now);
        if first_call {
            tracing::info!(floor, at = %now, "first arrival, warming up pools");
            for q in QueueId::ALL {
                let pool = self.pools.get_mut(q);
                for _ in 0..floor {
                    pool.launch(now, boot_seconds, emitter)?;
                }
            }
        }

        // One walk: idle counts and the first VM free within the slack.
        let pool = self.pools.get_mut(queue);
        let eligible_before = now + placement_slack_seconds;
        let mut free_ignoring_boot = 0usize;
        let mut free_real = 0usize;
        let mut target: Option<usize> = None;
        for (i, vm) in pool.vms_mut().iter_mut().enumerate() {
            let free_from = vm.free_at(now);
            if vm.free_now(now, true) {
                free_ignoring_boot += 1;
                if vm.free_now(now, false) {
                    free_real += 1;
                }
            }
            if target.is_none() && free_from < eligible_before {
                target = Some(i);
            }
        }

        match target {
            Some(i) => {
                let vm = &mut pool.vms_mut()[i];
                let start = vm.free_at(now);
                tracing::debug!(
                    queue = %queue,
                    vm = %vm.id(),
                    uid = %job.uid(),
                    start = %start,
                    "placing job"
                );
                vm.assign(job, start)?;
            }
            None if now - run_start <= warmup_grace_seconds => {
                tracing::warn!(
                    queue = %queue,
                    uid = %job.uid(),
                    at = %now,
                    "no VM free within slack, dropping placement during warm-up"
                );
            }
            None => {
                return Err(Error::PlacementFailed {
                    uid: job.uid().to_string(),
                    at: now,
                });
            }
        }

        // Controller, on the pre-assignment counters. Surplus retirement
        // first, then the two launch conditions.
        let pool_size = pool.len();
        if free_ignoring_boot as f64 > max_idle_fraction * pool_size as f64 {
            let surplus =
                (free_ignoring_boot as f64 - max_idle_fraction * pool_size as f64).ceil() as usize;
            if free_ignoring_boot.saturating_sub(surplus) > floor {
                let retired =
                    pool.retire(now, surplus, floor, retire_deadline_minutes, emitter)?;
                if retired > 0 {
                    tracing::debug!(queue = %queue, retired, "retired surplus VMs");
                }
            }
        }

        let mut free = free_ignoring_boot;
        if free < floor {
            for _ in free..floor {
                pool.launch(now, boot_seconds, emitter)?;
            }
            free = floor;
        }

        let pool_size = pool.len();
        if (free as f64) < min_idle_fraction * pool_size as f64 {
            let need = (min_idle_fraction * pool_size as f64 - free as f64).ceil() as usize;
            for _ in 0..need {
                pool.launch(now, boot_seconds, emitter)?;
            }
        }

        let pool_size = pool.len();
        Ok(UtilizationSample {
            at: now,
            queue,
            pool_size,
            free: free_real,
            min_idle: (pool_size as f64 * min_idle_fraction).floor() as usize,
        })
    }

    /// Retires every remaining VM in every pool at `at`. Used at clean
    /// end-of-stream only.
    pub fn shutdown(&mut self, at: Timestamp, emitter: &mut dyn Emitter) -> Result<()> {
        tracing::info!(at = %at, "end of stream, draining all pools");
        for pool in self.pools.iter_mut() {
            pool.drain(at, emitter)?;
        }
        Ok(())
    }
}
