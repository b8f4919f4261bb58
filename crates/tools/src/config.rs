//! Build/deploy toolchain configuration
//!
//! This module assembles the configuration record handed to the host build
//! tool: one `mainnet` network profile, one pinned compiler with optimizer
//! settings, and the contract-verification API key.
//!
//! Loading never fails on missing credentials. Absent variables resolve to
//! empty values and are only reported by the explicit validation step:
//!
//! 1. Load `.env` into the process environment (existing variables win)
//! 2. Read NODE_URL, PRIVATE_KEY and ETHERSCAN_API_KEY
//! 3. Attach the hard-coded compiler and network declarations
//! 4. Optionally, `validate()` / `validate_for(task)`
//!
//! # Examples
//!
//! ```rust,no_run
//! use ethdeploy_tools::config::{Config, Task};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load();
//! config.validate_for(Task::Deploy)?;
//! println!("{}", config.to_json()?);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::fmt::{self, Write as _};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::env::{self, EnvSource, ProcessEnv};
use crate::plugins::{Plugin, PLUGINS};
use crate::secret::Secret;

/// Compiler version every build target is pinned to.
pub const COMPILER_VERSION: &str = "0.6.12";
/// Optimizer "expected call count".
pub const OPTIMIZER_RUNS: u32 = 200;
/// Name of the only network profile.
pub const MAINNET: &str = "mainnet";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Env file error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// What the host tool is about to do with the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Compile contracts; needs only the compiler declaration
    Compile,
    /// Sign and send transactions; needs the RPC URL and signer keys
    Deploy,
    /// Submit sources to the verification service; needs the API key
    Verify,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Compile, Task::Deploy, Task::Verify];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Compile => "compile",
            Task::Deploy => "deploy",
            Task::Verify => "verify",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialization format for the exported record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Toml,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Toml => write!(f, "toml"),
        }
    }
}

/// A named network the host tool can send transactions to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Signer keys, in the order the host tool uses them
    pub accounts: Vec<Secret>,
}

/// Declared networks. `mainnet` is the only one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Networks {
    pub mainnet: NetworkProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub runs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompilerSettings {
    pub optimizer: OptimizerSettings,
}

/// One compiler build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerConfig {
    pub version: String,
    pub settings: CompilerSettings,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            version: COMPILER_VERSION.to_string(),
            settings: CompilerSettings {
                optimizer: OptimizerSettings {
                    enabled: true,
                    runs: OPTIMIZER_RUNS,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolidityConfig {
    pub compilers: Vec<CompilerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Secret>,
}

/// The record handed to the host build tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub networks: Networks,
    pub solidity: SolidityConfig,
    pub etherscan: EtherscanConfig,
}

impl Config {
    /// Load `.env` (if present) and assemble the configuration from the
    /// process environment.
    ///
    /// Never fails: unparseable `.env` lines are skipped, an unreadable `.env`
    /// is logged and ignored, and missing variables leave their fields empty.
    pub fn load() -> Self {
        if let Err(err) = env::load_dotenv(None) {
            warn!(error = %err, "ignoring unreadable .env file");
        }
        Self::from_env(&ProcessEnv)
    }

    /// Like [`Config::load`], but from an explicitly named env file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn load_with_env_file(path: &Path) -> Result<Self, ConfigError> {
        env::load_dotenv(Some(path))?;
        Ok(Self::from_env(&ProcessEnv))
    }

    /// Assemble the configuration from an explicit variable source.
    pub fn from_env<E: EnvSource + ?Sized>(source: &E) -> Self {
        let url = source.var(env::NODE_URL);
        let private_key = source.var(env::PRIVATE_KEY);
        let api_key = source.var(env::ETHERSCAN_API_KEY);

        for (name, value) in [
            (env::NODE_URL, &url),
            (env::PRIVATE_KEY, &private_key),
            (env::ETHERSCAN_API_KEY, &api_key),
        ] {
            if value.is_none() {
                debug!(var = name, "environment variable not set");
            }
        }

        Config {
            networks: Networks {
                mainnet: NetworkProfile {
                    url,
                    accounts: vec![private_key.map(Secret::from).unwrap_or_default()],
                },
            },
            solidity: SolidityConfig {
                compilers: vec![CompilerConfig::default()],
            },
            etherscan: EtherscanConfig {
                api_key: api_key.map(Secret::from),
            },
        }
    }

    /// Plugins the host tool registers alongside this configuration.
    pub fn plugins(&self) -> &'static [Plugin] {
        &PLUGINS
    }

    /// Check everything every task needs.
    ///
    /// Tasks are checked in `Task::ALL` order and the first problem is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Task::ALL
            .iter()
            .try_for_each(|task| self.validate_for(*task))
    }

    /// Check what a single task needs.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if a variable the task depends on is unset or empty
    /// - `InvalidValue` if a value is present but malformed
    pub fn validate_for(&self, task: Task) -> Result<(), ConfigError> {
        match task {
            Task::Compile => self.validate_compilers(),
            Task::Deploy => {
                let mainnet = &self.networks.mainnet;
                Self::validate_rpc_url(mainnet.url.as_deref())?;
                mainnet
                    .accounts
                    .iter()
                    .try_for_each(Self::validate_private_key)
            }
            Task::Verify => match &self.etherscan.api_key {
                Some(key) if !key.is_empty() => Ok(()),
                _ => Err(ConfigError::MissingCredential(env::ETHERSCAN_API_KEY)),
            },
        }
    }

    fn validate_compilers(&self) -> Result<(), ConfigError> {
        if self.solidity.compilers.len() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "solidity.compilers",
                reason: format!(
                    "expected exactly one compiler, found {}",
                    self.solidity.compilers.len()
                ),
            });
        }

        for compiler in &self.solidity.compilers {
            let parts: Vec<&str> = compiler.version.split('.').collect();
            let well_formed = parts.len() == 3
                && parts
                    .iter()
                    .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
            if !well_formed {
                return Err(ConfigError::InvalidValue {
                    field: "solidity.compilers.version",
                    reason: format!("expected MAJOR.MINOR.PATCH, got {:?}", compiler.version),
                });
            }
        }

        Ok(())
    }

    fn validate_rpc_url(url: Option<&str>) -> Result<(), ConfigError> {
        let url = match url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ConfigError::MissingCredential(env::NODE_URL)),
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: env::NODE_URL,
                reason: format!("RPC URL must start with http:// or https://: {}", url),
            });
        }

        Ok(())
    }

    fn validate_private_key(key: &Secret) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::MissingCredential(env::PRIVATE_KEY));
        }

        let raw = key.expose();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);

        // Never echo the key itself in the error.
        match hex::decode(digits) {
            Ok(bytes) if bytes.len() == 32 => Ok(()),
            Ok(bytes) => Err(ConfigError::InvalidValue {
                field: env::PRIVATE_KEY,
                reason: format!("expected 32 bytes, got {}", bytes.len()),
            }),
            Err(hex::FromHexError::OddLength) => Err(ConfigError::InvalidValue {
                field: env::PRIVATE_KEY,
                reason: format!("odd number of hex digits ({})", digits.len()),
            }),
            Err(_) => Err(ConfigError::InvalidValue {
                field: env::PRIVATE_KEY,
                reason: "not a hex string".to_string(),
            }),
        }
    }

    /// Human-readable summary with every secret redacted
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let mainnet = &self.networks.mainnet;

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Network:             {}", MAINNET);
        let _ = writeln!(
            out,
            "  RPC URL:           {}",
            mainnet.url.as_deref().unwrap_or("(not configured)")
        );
        for (i, account) in mainnet.accounts.iter().enumerate() {
            let shown = if account.is_empty() {
                "(not configured)".to_string()
            } else {
                account.redacted()
            };
            let _ = writeln!(out, "  Account #{}:        {}", i, shown);
        }

        for compiler in &self.solidity.compilers {
            let optimizer = compiler.settings.optimizer;
            let _ = writeln!(out, "Compiler:            {}", compiler.version);
            if optimizer.enabled {
                let _ = writeln!(out, "  Optimizer:         enabled ({} runs)", optimizer.runs);
            } else {
                let _ = writeln!(out, "  Optimizer:         disabled");
            }
        }

        let api_key = match &self.etherscan.api_key {
            Some(key) if !key.is_empty() => key.redacted(),
            _ => "(not configured)".to_string(),
        };
        let _ = writeln!(out, "Etherscan API key:   {}", api_key);

        let _ = writeln!(out, "Plugins:");
        for plugin in self.plugins() {
            let _ = writeln!(out, "  {}", plugin);
        }

        out
    }

    /// Print the resolved configuration
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════════╗");
        println!("║            TOOLCHAIN CONFIGURATION RESOLVED                    ║");
        println!("╚════════════════════════════════════════════════════════════════╝");
        print!("{}", self.summary());
        println!("╚════════════════════════════════════════════════════════════════╝");
    }

    /// Host-tool record as JSON. Secrets are included verbatim.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Host-tool record as TOML. Secrets are included verbatim.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Host-tool record in the requested format.
    pub fn render(&self, format: ExportFormat) -> Result<String, ConfigError> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Toml => self.to_toml(),
        }
    }

    /// Write the host-tool record to `path`, replacing any existing file.
    pub fn export_to(&self, path: &Path, format: ExportFormat) -> Result<(), ConfigError> {
        std::fs::write(path, self.render(format)?)?;
        debug!(path = %path.display(), %format, "configuration exported");
        Ok(())
    }
}
