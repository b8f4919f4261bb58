//! ethdeploy tools library
//!
//! Assembles the build/deploy configuration consumed by the host contract
//! toolchain: network endpoint and signer, pinned compiler, verification key.

pub mod config;
pub mod env;
pub mod logging;
pub mod plugins;
pub mod secret;

pub use config::{Config, ConfigError, ExportFormat, Task};
pub use env::{EnvMap, EnvSource, ProcessEnv};
pub use plugins::{Plugin, PLUGINS};
pub use secret::Secret;
