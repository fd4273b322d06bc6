//! The per-worker state machine.
//!
//! A [`Vm`] moves through Booting → Idle → Running → Idle without any event
//! queue: a finished job is discovered the next time the VM is queried at a
//! later instant. That keeps every placement attempt O(1) per VM and avoids
//! a priority queue of completion events.

use hourglass_core::{Error, Job, QueueId, Result, Timestamp};
use uuid::Uuid;

/// One simulated worker. Billing runs in whole hours from `created_at`;
/// the VM accepts work only once its boot delay has elapsed.
#[derive(Debug)]
pub struct Vm {
    id: Uuid,
    queue: QueueId,
    created_at: Timestamp,
    boot_complete_at: Timestamp,
    job: Option<Job>,
}

impl Vm {
    pub(crate) fn new(queue: QueueId, created_at: Timestamp, boot_seconds: i64) -> Self {
        Vm {
            id: Uuid::new_v4(),
            queue,
            created_at,
            boot_complete_at: created_at + boot_seconds,
            job: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn queue(&self) -> QueueId {
        self.queue
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn boot_complete_at(&self) -> Timestamp {
        self.boot_complete_at
    }

    pub fn current_job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// The instant the current job stops occupying this VM, in fractional
    /// epoch seconds. `None` when idle.
    fn busy_until(&self) -> Option<f64> {
        self.job.as_ref().and_then(Job::finish_secs)
    }

    /// Resolves the lazy Running → Idle transition as of `t`.
    fn settle(&mut self, t: Timestamp) {
        if let Some(end) = self.busy_until() {
            if t.as_secs() as f64 >= end {
                self.job = None;
            }
        }
    }

    /// The earliest time `>= t` at which this VM can start a new job.
    ///
    /// While a job runs the answer is its completion instant, rounded up to
    /// the next whole second; otherwise it is `t` held back by any
    /// unfinished boot.
    pub fn free_at(&mut self, t: Timestamp) -> Timestamp {
        self.settle(t);
        match self.busy_until() {
            Some(end) => Timestamp::from_secs(end.ceil() as i64),
            None => t.max(self.boot_complete_at),
        }
    }

    /// Whether this VM could take a job at `t`. With `ignore_boot` the boot
    /// delay is disregarded and only job occupancy counts.
    pub fn free_now(&mut self, t: Timestamp, ignore_boot: bool) -> bool {
        self.settle(t);
        self.job.is_none() && (ignore_boot || t >= self.boot_complete_at)
    }

    /// Whole minutes remaining in the current billing hour, in `1..=60`.
    pub fn minutes_left_in_hour(&self, t: Timestamp) -> i64 {
        60 - (t - self.created_at).rem_euclid(3600) / 60
    }

    /// Attaches `job`, recording `start` as its start time.
    ///
    /// A VM whose current job finishes by `start` hands over directly (the
    /// placement slack allows a job to wait out a near-done predecessor);
    /// anything earlier would overlap two jobs and fails.
    pub(crate) fn assign(&mut self, mut job: Job, start: Timestamp) -> Result<()> {
        if let Some(end) = self.busy_until() {
            if (start.as_secs() as f64) < end {
                return Err(Error::VmBusy);
            }
        }
        job.place(start)?;
        self.job = Some(job);
        Ok(())
    }
}
