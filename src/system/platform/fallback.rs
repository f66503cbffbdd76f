use std::path::PathBuf;

use sysinfo::System;

use super::{CpuTimes, CpuTimesSource, MemoryPages, MemorySource};

/// No per-class tick accounting outside procfs; every read is unavailable.
#[derive(Clone, Debug, Default)]
pub struct HostCpuSource;

impl HostCpuSource {
    pub fn new(_stat_path: impl Into<PathBuf>) -> Self {
        Self
    }
}

impl CpuTimesSource for HostCpuSource {
    fn read_cpu_times(&self) -> Option<CpuTimes> {
        None
    }
}

/// Byte totals from `sysinfo`; buffers and page cache are not reported here.
#[derive(Clone, Debug, Default)]
pub struct HostMemorySource;

impl HostMemorySource {
    pub fn new(_meminfo_path: impl Into<PathBuf>, _page_size: Option<u64>) -> Self {
        Self
    }
}

impl MemorySource for HostMemorySource {
    fn read_memory_pages(&self) -> Option<MemoryPages> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return None;
        }
        Some(MemoryPages {
            total,
            free: sys.free_memory(),
            buffers: 0,
            page_size: 1,
        })
    }

    fn read_cached_kb(&self) -> Option<u64> {
        None
    }
}
