pub mod config;
pub mod logging;
pub mod publish;
pub mod system;
