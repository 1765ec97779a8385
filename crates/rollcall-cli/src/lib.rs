//! Runtime pieces of the `rollcall` binary.
//!
//! - [`config`]: TOML configuration with built-in defaults
//! - [`logging`]: `tracing` subscriber on stderr
//! - [`console`]: output devices that report through the log
//! - [`runtime`]: the live scheduler loop over stdin/stdout
//! - [`scenario`]: scripted runs on a synthetic clock

pub mod config;
pub mod console;
pub mod logging;
pub mod runtime;
pub mod scenario;

pub use config::Config;
