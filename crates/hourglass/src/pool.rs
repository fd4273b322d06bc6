//! Per-queue collections of live VMs.
//!
//! A pool keeps its VMs in launch order; the scheduler relies on stable
//! iteration to pick the first placement-eligible VM.

use crate::emit::Emitter;
use crate::vm::Vm;
use hourglass_core::{Command, QueueId, Result, Timestamp};
use std::collections::HashSet;

/// The ordered collection of live VMs for one queue.
#[derive(Debug)]
pub struct Pool {
    queue: QueueId,
    vms: Vec<Vm>,
}

impl Pool {
    pub(crate) fn new(queue: QueueId) -> Self {
        Pool {
            queue,
            vms: Vec::new(),
        }
    }

    pub fn queue(&self) -> QueueId {
        self.queue
    }

    pub fn len(&self) -> usize {
        self.vms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }

    pub fn vms(&self) -> &[Vm] {
        &self.vms
    }

    pub(crate) fn vms_mut(&mut self) -> &mut [Vm] {
        &mut self.vms
    }

    /// Launches one VM at `at` and emits its `launch` command.
    pub(crate) fn launch(
        &mut self,
        at: Timestamp,
        boot_seconds: i64,
        emitter: &mut dyn Emitter,
    ) -> Result<()> {
        let vm = Vm::new(self.queue, at, boot_seconds);
        tracing::debug!(queue = %self.queue, vm = %vm.id(), at = %at, "launching vm");
        emitter.command(&Command::launch(at, self.queue))?;
        self.vms.push(vm);
        Ok(())
    }

    /// Retires up to `n` VMs, never shrinking below `floor`.
    ///
    /// Only VMs with fewer than `deadline_minutes` whole minutes left in
    /// their current billing hour are candidates; among those, the fewest
    /// minutes left go first, insertion order breaking ties. Returns how
    /// many were retired.
    pub(crate) fn retire(
        &mut self,
        at: Timestamp,
        n: usize,
        floor: usize,
        deadline_minutes: i64,
        emitter: &mut dyn Emitter,
    ) -> Result<usize> {
        let stoppable = self.vms.len().saturating_sub(floor);
        let n = n.min(stoppable);
        if n == 0 {
            return Ok(0);
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); deadline_minutes as usize];
        for (i, vm) in self.vms.iter().enumerate() {
            let left = vm.minutes_left_in_hour(at);
            if left < deadline_minutes {
                buckets[left as usize].push(i);
            }
        }

        let doomed: Vec<usize> = buckets.into_iter().flatten().take(n).collect();
        for &i in &doomed {
            let vm = &self.vms[i];
            tracing::debug!(
                queue = %self.queue,
                vm = %vm.id(),
                minutes_left = vm.minutes_left_in_hour(at),
                at = %at,
                "retiring vm"
            );
            emitter.command(&Command::terminate(at, self.queue))?;
        }

        let retired = doomed.len();
        let doomed: HashSet<usize> = doomed.into_iter().collect();
        let mut index = 0;
        self.vms.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        Ok(retired)
    }

    /// Retires every VM in the pool, one `terminate` each. Used at clean
    /// end-of-stream.
    pub(crate) fn drain(&mut self, at: Timestamp, emitter: &mut dyn Emitter) -> Result<()> {
        for vm in self.vms.drain(..) {
            tracing::debug!(queue = %vm.queue(), vm = %vm.id(), at = %at, "terminating vm at shutdown");
            emitter.command(&Command::terminate(at, vm.queue()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::LineEmitter;
    use hourglass_core::Timestamp;

    const BOOT: i64 = 120;
    const DEADLINE: i64 = 10;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn emitter() -> LineEmitter<Vec<u8>> {
        LineEmitter::new(Vec::new())
    }

    fn lines(emitter: LineEmitter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(emitter.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn launch_appends_in_order_and_emits() {
        let mut pool = Pool::new(QueueId::Url);
        let mut out = emitter();
        pool.launch(ts(0), BOOT, &mut out).unwrap();
        pool.launch(ts(1), BOOT, &mut out).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.vms()[0].created_at(), ts(0));
        assert_eq!(pool.vms()[1].created_at(), ts(1));
        assert_eq!(
            lines(out),
            vec![
                "1970-01-01 00:00:00 launch url",
                "1970-01-01 00:00:01 launch url",
            ]
        );
    }

    #[test]
    fn retire_never_drops_below_floor() {
        let mut pool = Pool::new(QueueId::Export);
        let mut out = emitter();
        for _ in 0..5 {
            pool.launch(ts(0), BOOT, &mut out).unwrap();
        }
        // all candidates: 1 minute left in the hour
        let retired = pool.retire(ts(3599), 10, 3, DEADLINE, &mut out).unwrap();
        assert_eq!(retired, 2);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn retire_skips_vms_far_from_the_hour_boundary() {
        let mut pool = Pool::new(QueueId::Export);
        let mut out = emitter();
        pool.launch(ts(0), BOOT, &mut out).unwrap();
        // 30 whole minutes left at t=1800; above the deadline, so untouchable
        let retired = pool.retire(ts(1800), 1, 0, DEADLINE, &mut out).unwrap();
        assert_eq!(retired, 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn retire_prefers_fewest_minutes_left() {
        let mut pool = Pool::new(QueueId::Export);
        let mut out = emitter();
        pool.launch(ts(0), BOOT, &mut out).unwrap(); // at t=3400: 4 min left
        pool.launch(ts(300), BOOT, &mut out).unwrap(); // at t=3400: 9 min left
        pool.launch(ts(60), BOOT, &mut out).unwrap(); // at t=3400: 5 min left
        let retired = pool.retire(ts(3400), 2, 0, DEADLINE, &mut out).unwrap();
        assert_eq!(retired, 2);
        // the 9-minutes-left VM survives
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.vms()[0].created_at(), ts(300));
    }

    #[test]
    fn retire_breaks_ties_in_insertion_order() {
        let mut pool = Pool::new(QueueId::Export);
        let mut out = emitter();
        pool.launch(ts(0), BOOT, &mut out).unwrap();
        pool.launch(ts(0), BOOT, &mut out).unwrap();
        pool.launch(ts(0), BOOT, &mut out).unwrap();
        let first_id = pool.vms()[0].id();
        let last_id = pool.vms()[2].id();
        let retired = pool.retire(ts(3599), 2, 0, DEADLINE, &mut out).unwrap();
        assert_eq!(retired, 2);
        assert_eq!(pool.len(), 1);
        assert_ne!(pool.vms()[0].id(), first_id);
        assert_eq!(pool.vms()[0].id(), last_id);
    }

    #[test]
    fn retire_with_nothing_stoppable_is_a_noop() {
        let mut pool = Pool::new(QueueId::Export);
        let mut out = emitter();
        pool.launch(ts(0), BOOT, &mut out).unwrap();
        let retired = pool.retire(ts(3599), 5, 1, DEADLINE, &mut out).unwrap();
        assert_eq!(retired, 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn drain_terminates_everything() {
        let mut pool = Pool::new(QueueId::General);
        let mut out = emitter();
        for _ in 0..3 {
            pool.launch(ts(0), BOOT, &mut out).unwrap();
        }
        pool.drain(ts(500), &mut out).unwrap();
        assert!(pool.is_empty());
        let out = lines(out);
        assert_eq!(out.len(), 6);
        assert!(
            out[3..]
                .iter()
                .all(|l| l == "1970-01-01 00:08:20 terminate general")
        );
    }
}
