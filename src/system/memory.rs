use super::platform::{MemoryPages, MemorySource};
use super::snapshot::MemorySnapshot;

/// Folds raw totals and the page cache figure into a snapshot.
///
/// Buffers and page cache count as available. Used memory clamps at zero
/// when the sources momentarily disagree, and a zero total reports 0%.
pub fn reconcile(pages: MemoryPages, cached_kb: u64) -> MemorySnapshot {
    let total = pages.to_kb(pages.total);
    let available = pages.to_kb(pages.free) + pages.to_kb(pages.buffers) + cached_kb;
    let used = total.saturating_sub(available);
    let usage_percent = if total != 0 {
        (used as u128 * 100 / total as u128) as u64
    } else {
        0
    };
    MemorySnapshot {
        total_kb: total,
        free_kb: available,
        used_kb: used,
        usage_percent,
    }
}

/// Stateless: every call reads both sources afresh.
pub struct MemoryProbe<S> {
    source: S,
}

impl<S: MemorySource> MemoryProbe<S> {
    pub fn new(source: S) -> Self {
        MemoryProbe { source }
    }

    pub fn sample(&self) -> MemorySnapshot {
        let pages = self.source.read_memory_pages().unwrap_or_else(|| {
            tracing::warn!("memory accounting source unavailable");
            MemoryPages::default()
        });
        let cached_kb = self.source.read_cached_kb().unwrap_or_else(|| {
            tracing::warn!("page cache figure unavailable, counting it as 0");
            0
        });
        let snapshot = reconcile(pages, cached_kb);
        tracing::debug!(
            total_kb = snapshot.total_kb,
            available_kb = snapshot.free_kb,
            used_kb = snapshot.used_kb,
            usage_percent = snapshot.usage_percent,
            "memory sample"
        );
        snapshot
    }
}

impl<S: MemorySource + Default> Default for MemoryProbe<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
