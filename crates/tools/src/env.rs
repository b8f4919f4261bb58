//! Environment sources for the configuration loader.
//!
//! The loader never reads `std::env` directly. It asks an [`EnvSource`],
//! which is either the live process environment ([`ProcessEnv`]) or an
//! explicit map ([`EnvMap`]) handed in by the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ConfigError;

/// RPC endpoint of the target network.
pub const NODE_URL: &str = "NODE_URL";
/// Hex-encoded signer private key.
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
/// Credential for the contract-verification service.
pub const ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";

/// Something the loader can look variables up in.
pub trait EnvSource {
    /// Value of `key`, or `None` when it is not set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                warn!(var = key, "environment variable is not valid UTF-8, treating as unset");
                None
            }
        }
    }
}

/// Fixed set of variables, for callers that want to bypass the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: BTreeMap<String, String>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for EnvMap {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Load a dotenv file into the process environment.
///
/// Variables that are already set are left untouched.
///
/// With `path = None` the default `.env` lookup applies (current directory,
/// then its ancestors) and a missing file yields `Ok(None)`. Lines of that
/// file that do not parse are skipped with a warning, the rest still load.
///
/// With an explicit path the file is loaded strictly: a missing or malformed
/// file is an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)?;
            debug!(path = %path.display(), "loaded env file");
            Ok(Some(path.to_path_buf()))
        }
        None => match find_dotenv()? {
            Some(found) => {
                load_lenient(&found)?;
                debug!(path = %found.display(), "loaded env file");
                Ok(Some(found))
            }
            None => {
                debug!("no .env file found");
                Ok(None)
            }
        },
    }
}

/// First `.env` in the current directory or one of its ancestors.
fn find_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    let cwd = std::env::current_dir()?;
    Ok(cwd
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file()))
}

fn load_lenient(path: &Path) -> Result<(), ConfigError> {
    for item in dotenvy::from_path_iter(path)? {
        match item {
            Ok((key, value)) => {
                if std::env::var_os(&key).is_none() {
                    std::env::set_var(&key, value);
                }
            }
            // The offending line may hold a secret, so only its position is logged.
            Err(dotenvy::Error::LineParse(_, index)) => {
                warn!(path = %path.display(), index, "skipping unparseable line in env file");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_map_lookup() {
        let env = EnvMap::new().with(NODE_URL, "https://rpc.example/v1");
        assert_eq!(env.var(NODE_URL).as_deref(), Some("https://rpc.example/v1"));
        assert_eq!(env.var(PRIVATE_KEY), None);
    }

    #[test]
    fn test_env_map_keeps_empty_values() {
        let env = EnvMap::new().with(ETHERSCAN_API_KEY, "");
        assert_eq!(env.var(ETHERSCAN_API_KEY).as_deref(), Some(""));
    }

    #[test]
    fn test_env_map_later_value_wins() {
        let env = EnvMap::new().with(PRIVATE_KEY, "0x01").with(PRIVATE_KEY, "0x02");
        assert_eq!(env.var(PRIVATE_KEY).as_deref(), Some("0x02"));
    }

    #[test]
    fn test_process_env_missing_var() {
        assert_eq!(ProcessEnv.var("ETHDEPLOY_TEST_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn test_explicit_missing_env_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_dotenv(Some(&dir.path().join("absent.env")));
        assert!(matches!(result, Err(ConfigError::Dotenv(_))));
    }
}
