pub mod collector;
pub mod cpu;
pub mod disk;
pub mod host;
pub mod memory;
pub mod network;
pub mod platform;
pub mod probe;
pub mod process;
pub mod snapshot;
