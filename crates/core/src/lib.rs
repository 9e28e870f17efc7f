//! Host-agnostic workflow logic for the Prisma bridge
//!
//! Everything environment-specific (prompting, subprocess execution, file
//! access) flows through the [`adapter::HostAdapter`] seam, so a host
//! integration reduces to supplying an adapter. Logging goes through
//! `tracing` directly.

pub mod adapter;
pub mod config;
pub mod context;
pub mod error;
pub mod generate;
pub mod migrate;
pub mod scaffold;
pub mod schema;
pub mod suggest;

pub use adapter::{HostAdapter, RunResult, ShellAdapter};
pub use config::BridgeConfig;
pub use error::BridgeError;
