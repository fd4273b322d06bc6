//! Scheduler tuning.

use hourglass_core::{Error, Result};
use serde::Deserialize;

/// The tunables the scheduler is parameterised by, all fixed for a run.
///
/// Every field has the contest default; deployments override individual
/// fields from a TOML file (unnamed fields keep their defaults).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Minimum pool size per queue, enforced at all times.
    pub floor: usize,
    /// Launch more VMs when the idle fraction falls below this.
    pub min_idle_fraction: f64,
    /// Retire VMs when the idle fraction rises above this.
    pub max_idle_fraction: f64,
    /// Delay between a VM's launch command and it accepting work.
    pub boot_seconds: i64,
    /// A VM is placement-eligible if it frees up within this many seconds
    /// of a job's arrival.
    pub placement_slack_seconds: i64,
    /// Within this window from the first arrival, a failed placement is a
    /// warning rather than an error. Set to zero outside contest replays.
    pub warmup_grace_seconds: i64,
    /// Only VMs with fewer whole minutes than this left in their billing
    /// hour may be retired.
    pub retire_deadline_minutes: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            floor: 40,
            min_idle_fraction: 0.4,
            max_idle_fraction: 0.7,
            boot_seconds: 120,
            placement_slack_seconds: 5,
            warmup_grace_seconds: 86_400,
            retire_deadline_minutes: 10,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.floor < 1 {
            return Err(Error::InvalidConfig("floor must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.min_idle_fraction) || self.min_idle_fraction == 0.0 {
            return Err(Error::InvalidConfig(
                "min_idle_fraction must be in (0, 1)".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.max_idle_fraction) || self.max_idle_fraction == 0.0 {
            return Err(Error::InvalidConfig(
                "max_idle_fraction must be in (0, 1)".into(),
            ));
        }
        if self.min_idle_fraction >= self.max_idle_fraction {
            return Err(Error::InvalidConfig(
                "min_idle_fraction must be below max_idle_fraction".into(),
            ));
        }
        if self.boot_seconds < 0 {
            return Err(Error::InvalidConfig("boot_seconds cannot be negative".into()));
        }
        if self.placement_slack_seconds < 0 {
            return Err(Error::InvalidConfig(
                "placement_slack_seconds cannot be negative".into(),
            ));
        }
        if self.warmup_grace_seconds < 0 {
            return Err(Error::InvalidConfig(
                "warmup_grace_seconds cannot be negative".into(),
            ));
        }
        if !(1..=60).contains(&self.retire_deadline_minutes) {
            return Err(Error::InvalidConfig(
                "retire_deadline_minutes must be in 1..=60".into(),
            ));
        }
        Ok(())
    }
}
