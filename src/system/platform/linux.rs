use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{CpuTimes, CpuTimesSource, DEFAULT_PAGE_SIZE, MemoryPages, MemorySource};

// The aggregate line is always first; per-cpu lines follow.
const STAT_READ_LIMIT: u64 = 4096;
// `Cached:` sits within the first handful of lines of meminfo.
const MEMINFO_READ_LIMIT: u64 = 8192;

/// Reads at most `limit` bytes. The handle is dropped before returning on every path.
fn read_bounded(path: &Path, limit: u64) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut buf = Vec::with_capacity(limit as usize);
    file.take(limit).read_to_end(&mut buf).ok()?;
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// Parses the aggregate `cpu` line of `/proc/stat`. Columns absent on older
/// kernels read as 0.
pub(crate) fn parse_cpu_line(contents: &str) -> Option<CpuTimes> {
    let line = contents.lines().find(|l| l.starts_with("cpu "))?;
    let mut fields = line.split_whitespace().skip(1);
    let mut next = || -> Option<u64> {
        match fields.next() {
            Some(v) => v.parse().ok(),
            None => Some(0),
        }
    };
    let times = CpuTimes {
        user: next()?,
        nice: next()?,
        system: next()?,
        idle: next()?,
        iowait: next()?,
        irq: next()?,
        softirq: next()?,
        steal: next()?,
    };
    Some(times)
}

/// Value in kB of a `Key:   1234 kB` line of `/proc/meminfo`.
pub(crate) fn parse_meminfo_kb(contents: &str, key: &str) -> Option<u64> {
    contents.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

#[derive(Clone, Debug)]
pub struct HostCpuSource {
    stat_path: PathBuf,
}

impl HostCpuSource {
    pub fn new(stat_path: impl Into<PathBuf>) -> Self {
        Self {
            stat_path: stat_path.into(),
        }
    }
}

impl Default for HostCpuSource {
    fn default() -> Self {
        Self::new("/proc/stat")
    }
}

impl CpuTimesSource for HostCpuSource {
    fn read_cpu_times(&self) -> Option<CpuTimes> {
        let contents = read_bounded(&self.stat_path, STAT_READ_LIMIT)?;
        parse_cpu_line(&contents)
    }
}

#[derive(Clone, Debug)]
pub struct HostMemorySource {
    meminfo_path: PathBuf,
    page_size: Option<u64>,
}

impl HostMemorySource {
    pub fn new(meminfo_path: impl Into<PathBuf>, page_size: Option<u64>) -> Self {
        Self {
            meminfo_path: meminfo_path.into(),
            page_size,
        }
    }
}

impl Default for HostMemorySource {
    fn default() -> Self {
        Self::new("/proc/meminfo", None)
    }
}

impl MemorySource for HostMemorySource {
    fn read_memory_pages(&self) -> Option<MemoryPages> {
        // SAFETY: sysinfo(2) only writes into the struct we hand it.
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::sysinfo(&mut info) } != 0 {
            return None;
        }
        let reported = u64::from(info.mem_unit);
        let page_size = self.page_size.unwrap_or(if reported == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            reported
        });
        Some(MemoryPages {
            total: info.totalram as u64,
            free: info.freeram as u64,
            buffers: info.bufferram as u64,
            page_size,
        })
    }

    fn read_cached_kb(&self) -> Option<u64> {
        let contents = read_bounded(&self.meminfo_path, MEMINFO_READ_LIMIT)?;
        parse_meminfo_kb(&contents, "Cached")
    }
}
