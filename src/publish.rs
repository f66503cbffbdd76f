//! Reference publisher: one named endpoint per probe, rendered as the flat
//! JSON objects existing consumers read, plus the combined payload the
//! polling agent ships.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::eyre::{Result, eyre};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::system::platform::{
    CpuTimesSource, HostCpuSource, HostMemorySource, MemorySource, SysinfoTaskSource, TaskSource,
};
use crate::system::snapshot::{CpuSnapshot, MemorySnapshot, ProcessCensus};
use crate::system::{CensusProbe, CpuProbe, MemoryProbe};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Cpu,
    Memory,
    Processes,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Cpu, Endpoint::Memory, Endpoint::Processes];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Cpu => "cpu",
            Endpoint::Memory => "ram",
            Endpoint::Processes => "procesos",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsPayload {
    pub timestamp: u64,
    pub cpu: CpuSnapshot,
    pub ram: MemorySnapshot,
    pub procesos: ProcessCensus,
}

pub struct Publisher<C, M, T> {
    cpu: CpuProbe<C>,
    memory: MemoryProbe<M>,
    census: CensusProbe<T>,
}

pub type HostPublisher = Publisher<HostCpuSource, HostMemorySource, SysinfoTaskSource>;

impl HostPublisher {
    pub fn from_config(config: &Config) -> Self {
        Publisher::new(
            HostCpuSource::new(&config.cpu.stat_path),
            HostMemorySource::new(&config.memory.meminfo_path, config.memory.page_size),
            SysinfoTaskSource::new(config.census.max_tasks),
        )
    }
}

impl<C, M, T> Publisher<C, M, T>
where
    C: CpuTimesSource,
    M: MemorySource,
    T: TaskSource,
{
    pub fn new(cpu: C, memory: M, tasks: T) -> Self {
        let publisher = Publisher {
            cpu: CpuProbe::new(cpu),
            memory: MemoryProbe::new(memory),
            census: CensusProbe::new(tasks),
        };
        publisher.init();
        publisher
    }

    pub fn init(&self) {
        tracing::debug!("publisher init, cpu baseline cleared");
        self.cpu.init();
    }

    pub fn teardown(&self) {
        tracing::debug!("publisher teardown");
        self.cpu.teardown();
    }

    pub fn cpu(&self) -> CpuSnapshot {
        self.cpu.sample()
    }

    pub fn memory(&self) -> MemorySnapshot {
        self.memory.sample()
    }

    pub fn processes(&self) -> ProcessCensus {
        self.census.sample()
    }

    /// Samples the endpoint's probe and serialises the snapshot.
    pub fn render(&self, endpoint: Endpoint) -> Result<String> {
        let json = match endpoint {
            Endpoint::Cpu => serde_json::to_string(&self.cpu())?,
            Endpoint::Memory => serde_json::to_string(&self.memory())?,
            Endpoint::Processes => serde_json::to_string(&self.processes())?,
        };
        tracing::trace!(%endpoint, %json, "rendered endpoint");
        Ok(json)
    }

    pub fn payload(&self) -> Result<MetricsPayload> {
        Ok(MetricsPayload {
            timestamp: unix_now()?,
            cpu: self.cpu(),
            ram: self.memory(),
            procesos: self.processes(),
        })
    }

    pub fn render_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.payload()?)?)
    }
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| eyre!("system clock is before UNIX_EPOCH: {e}"))?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::platform::{CpuTimes, MemoryPages, SchedState, TaskState};

    struct NoCpu;
    impl CpuTimesSource for NoCpu {
        fn read_cpu_times(&self) -> Option<CpuTimes> {
            None
        }
    }

    struct NoMem;
    impl MemorySource for NoMem {
        fn read_memory_pages(&self) -> Option<MemoryPages> {
            None
        }
        fn read_cached_kb(&self) -> Option<u64> {
            None
        }
    }

    struct OneTask;
    impl TaskSource for OneTask {
        fn tasks(&self) -> Vec<TaskState> {
            vec![TaskState::alive(SchedState::Runnable)]
        }
    }

    #[test]
    fn endpoint_names_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_name(endpoint.name()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_name("disk"), None);
    }

    #[test]
    fn unavailable_sources_still_render() {
        let publisher = Publisher::new(NoCpu, NoMem, OneTask);
        assert_eq!(
            publisher.render(Endpoint::Cpu).unwrap(),
            r#"{"porcentajeUso":0}"#
        );
        assert_eq!(
            publisher.render(Endpoint::Memory).unwrap(),
            r#"{"total":0,"libre":0,"uso":0,"porcentajeUso":0}"#
        );
    }

    #[test]
    fn payload_carries_all_three_snapshots() {
        let publisher = Publisher::new(NoCpu, NoMem, OneTask);
        let payload = publisher.payload().unwrap();
        assert!(payload.timestamp > 0);
        assert_eq!(payload.procesos.total, 1);
        assert_eq!(payload.procesos.running, 1);
    }
}
