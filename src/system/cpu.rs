use std::sync::{Mutex, MutexGuard, PoisonError};

use super::platform::{CpuTimes, CpuTimesSource};
use super::snapshot::{CpuSample, CpuSnapshot};

// Sums wrap like the kernel's unsigned counters.
impl From<CpuTimes> for CpuSample {
    fn from(t: CpuTimes) -> Self {
        let idle = t.idle.wrapping_add(t.iowait);
        let total = [t.user, t.nice, t.system, idle, t.irq, t.softirq, t.steal]
            .into_iter()
            .fold(0u64, u64::wrapping_add);
        CpuSample {
            idle_ticks: idle,
            total_ticks: total,
        }
    }
}

/// Percent busy between two cumulative samples.
///
/// A zero `previous` is "no baseline yet" and reports 0, as do an
/// unavailable (zero) `current` and an empty interval. The idle delta is
/// clamped to the total delta so inconsistent counters still land in
/// `[0, 100]`.
pub fn utilization(previous: CpuSample, current: CpuSample) -> u64 {
    if previous.is_zero() || current.is_zero() {
        return 0;
    }
    let delta_total = current.total_ticks.wrapping_sub(previous.total_ticks);
    if delta_total == 0 {
        return 0;
    }
    let delta_idle = current
        .idle_ticks
        .wrapping_sub(previous.idle_ticks)
        .min(delta_total);
    let idle_share = (100 * delta_idle as u128 / delta_total as u128) as u64;
    100 - idle_share
}

/// Utilization since the previous call. The stored sample is only reachable
/// through [`CpuProbe::sample`], which holds the lock across read, compute
/// and store.
pub struct CpuProbe<S> {
    source: S,
    previous: Mutex<CpuSample>,
}

impl<S: CpuTimesSource> CpuProbe<S> {
    pub fn new(source: S) -> Self {
        CpuProbe {
            source,
            previous: Mutex::new(CpuSample::default()),
        }
    }

    fn previous(&self) -> MutexGuard<'_, CpuSample> {
        // The guarded value is plain data, always valid even after a panic.
        self.previous.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sample(&self) -> CpuSnapshot {
        let mut previous = self.previous();

        let current = match self.source.read_cpu_times() {
            Some(times) => CpuSample::from(times),
            None => {
                tracing::warn!("cpu accounting source unavailable, reporting 0%");
                CpuSample::default()
            }
        };
        let utilization_percent = utilization(*previous, current);
        *previous = current;

        tracing::debug!(
            idle = current.idle_ticks,
            total = current.total_ticks,
            utilization_percent,
            "cpu sample"
        );
        CpuSnapshot {
            utilization_percent,
        }
    }

    /// Clears the stored sample; the next call reports 0%.
    pub fn init(&self) {
        *self.previous() = CpuSample::default();
    }

    pub fn teardown(&self) {
        self.init();
    }
}

impl<S: CpuTimesSource + Default> Default for CpuProbe<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    struct Scripted(RefCell<VecDeque<Option<CpuTimes>>>);

    impl Scripted {
        fn new(reads: Vec<Option<CpuTimes>>) -> Self {
            Scripted(RefCell::new(reads.into()))
        }
    }

    impl CpuTimesSource for Scripted {
        fn read_cpu_times(&self) -> Option<CpuTimes> {
            self.0.borrow_mut().pop_front().flatten()
        }
    }

    fn ticks(idle: u64, total: u64) -> Option<CpuTimes> {
        Some(CpuTimes {
            user: total - idle,
            idle,
            ..CpuTimes::default()
        })
    }

    #[test]
    fn sample_folds_iowait_into_idle() {
        let times = CpuTimes {
            user: 10,
            nice: 1,
            system: 5,
            idle: 70,
            iowait: 4,
            irq: 2,
            softirq: 3,
            steal: 5,
        };
        let sample = CpuSample::from(times);
        assert_eq!(sample.idle_ticks, 74);
        assert_eq!(sample.total_ticks, 100);
    }

    #[test]
    fn huge_buckets_wrap_instead_of_overflowing() {
        let half = u64::MAX / 2 + 1;
        let times = CpuTimes {
            user: half,
            idle: half,
            iowait: half,
            ..CpuTimes::default()
        };
        let sample = CpuSample::from(times);
        assert_eq!(sample.idle_ticks, 0);
        assert_eq!(sample.total_ticks, half);

        let probe = CpuProbe::new(Scripted::new(vec![Some(times), Some(times)]));
        assert_eq!(probe.sample().utilization_percent, 0);
        assert!(probe.sample().utilization_percent <= 100);
    }

    #[test]
    fn first_call_reports_zero_then_delta() {
        let probe = CpuProbe::new(Scripted::new(vec![ticks(100, 1000), ticks(150, 1200)]));
        assert_eq!(probe.sample().utilization_percent, 0);
        assert_eq!(probe.sample().utilization_percent, 75);
    }

    #[test]
    fn identical_counters_report_zero() {
        let probe = CpuProbe::new(Scripted::new(vec![
            ticks(100, 1000),
            ticks(150, 1200),
            ticks(150, 1200),
        ]));
        probe.sample();
        probe.sample();
        assert_eq!(probe.sample().utilization_percent, 0);
    }

    #[test]
    fn unavailable_source_reports_zero_and_resets_baseline() {
        let probe = CpuProbe::new(Scripted::new(vec![
            ticks(100, 1000),
            None,
            ticks(150, 1200),
            ticks(160, 1300),
        ]));
        probe.sample();
        assert_eq!(probe.sample().utilization_percent, 0);
        assert_eq!(probe.sample().utilization_percent, 0);
        assert_eq!(probe.sample().utilization_percent, 90);
    }

    #[test]
    fn init_forgets_previous_sample() {
        let probe = CpuProbe::new(Scripted::new(vec![ticks(100, 1000), ticks(150, 1200)]));
        probe.sample();
        probe.init();
        assert_eq!(probe.sample().utilization_percent, 0);
    }

    #[test]
    fn idle_exceeding_total_clamps_to_zero_busy() {
        let prev = CpuSample {
            idle_ticks: 10,
            total_ticks: 100,
        };
        let cur = CpuSample {
            idle_ticks: 500,
            total_ticks: 200,
        };
        assert_eq!(utilization(prev, cur), 0);
    }

    #[test]
    fn fully_busy_interval() {
        let prev = CpuSample {
            idle_ticks: 10,
            total_ticks: 100,
        };
        let cur = CpuSample {
            idle_ticks: 10,
            total_ticks: 300,
        };
        assert_eq!(utilization(prev, cur), 100);
    }
}
