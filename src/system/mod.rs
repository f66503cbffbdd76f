pub mod census;
pub mod cpu;
pub mod memory;
pub mod platform;
pub mod snapshot;

pub use census::CensusProbe;
pub use cpu::CpuProbe;
pub use memory::MemoryProbe;
