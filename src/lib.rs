pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod server;
pub mod system;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
