//! Counter sources the probes read from.
//!
//! Each probe is generic over one of the traits below, so the arithmetic can
//! be driven by synthetic counters. The host implementations live in the
//! per-OS modules and are re-exported under OS-neutral names.

mod tasks;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod fallback;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;

pub use platform_impl::{HostCpuSource, HostMemorySource};
pub use tasks::{DEFAULT_MAX_TASKS, SysinfoTaskSource};

/// Used when the platform reports no unit size for its memory counters.
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Cumulative ticks per scheduler class from the aggregate CPU line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryPages {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    /// Size in bytes of one counted unit.
    pub page_size: u64,
}

impl MemoryPages {
    pub fn to_kb(&self, pages: u64) -> u64 {
        let page_size = if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        };
        ((pages as u128 * page_size as u128) / 1024) as u64
    }
}

/// Raw scheduling state of a live task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedState {
    Runnable,
    InterruptibleSleep,
    UninterruptibleSleep,
    Stopped,
    Traced,
    /// Idle, parked, waking and anything the host reports that has no
    /// dedicated variant.
    Other,
}

/// Exit state of a task; anything but `Alive` means it has exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitState {
    Alive,
    Zombie,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskState {
    pub sched: SchedState,
    pub exit: ExitState,
}

impl TaskState {
    pub const fn alive(sched: SchedState) -> Self {
        Self {
            sched,
            exit: ExitState::Alive,
        }
    }

    pub const fn exited(exit: ExitState) -> Self {
        Self {
            sched: SchedState::Other,
            exit,
        }
    }
}

pub trait CpuTimesSource {
    /// `None` when the accounting source is unavailable or unparsable.
    fn read_cpu_times(&self) -> Option<CpuTimes>;
}

pub trait MemorySource {
    fn read_memory_pages(&self) -> Option<MemoryPages>;
    /// Page cache size from the extended statistics text, in kilobytes.
    fn read_cached_kb(&self) -> Option<u64>;
}

pub trait TaskSource {
    /// Point-in-time copy of the process table, each process exactly once.
    fn tasks(&self) -> Vec<TaskState>;
}

impl<T: CpuTimesSource + ?Sized> CpuTimesSource for &T {
    fn read_cpu_times(&self) -> Option<CpuTimes> {
        (**self).read_cpu_times()
    }
}

impl<T: MemorySource + ?Sized> MemorySource for &T {
    fn read_memory_pages(&self) -> Option<MemoryPages> {
        (**self).read_memory_pages()
    }

    fn read_cached_kb(&self) -> Option<u64> {
        (**self).read_cached_kb()
    }
}

impl<T: TaskSource + ?Sized> TaskSource for &T {
    fn tasks(&self) -> Vec<TaskState> {
        (**self).tasks()
    }
}
