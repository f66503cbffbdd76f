use serde::{Deserialize, Serialize};

/// Cumulative idle/total tick pair derived from one CPU accounting read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuSample {
    pub idle_ticks: u64,
    pub total_ticks: u64,
}

impl CpuSample {
    pub fn is_zero(&self) -> bool {
        self.idle_ticks == 0 && self.total_ticks == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    #[serde(rename = "porcentajeUso")]
    pub utilization_percent: u64,
}

/// `free_kb` carries *available* memory (free + buffers + page cache), not raw free pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(rename = "total")]
    pub total_kb: u64,
    #[serde(rename = "libre")]
    pub free_kb: u64,
    #[serde(rename = "uso")]
    pub used_kb: u64,
    #[serde(rename = "porcentajeUso")]
    pub usage_percent: u64,
}

// Field order matches the wire order consumers expect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCensus {
    #[serde(rename = "procesos_corriendo")]
    pub running: u64,
    #[serde(rename = "total_processos")]
    pub total: u64,
    #[serde(rename = "procesos_durmiendo")]
    pub sleeping: u64,
    #[serde(rename = "procesos_zombie")]
    pub zombie: u64,
    #[serde(rename = "procesos_parados")]
    pub stopped: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessClass {
    Running,
    Sleeping,
    Zombie,
    Stopped,
}
