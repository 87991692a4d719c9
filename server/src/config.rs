use std::path::PathBuf;
use std::time::Duration;

use edb_github::DEFAULT_API_URL;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:13000";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("data path required (set EDB_DATA_PATH)")]
    DataPathRequired,
    #[error("access token required (set GITHUB_ACCESS_TOKEN)")]
    AccessTokenRequired,
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Daemon configuration, read from `EDB_*` and `GITHUB_*` environment variables.
#[derive(Clone)]
pub struct Config {
    /// sled database directory
    pub data_path: PathBuf,
    pub access_token: String,
    /// Users to poll; may be empty
    pub usernames: Vec<String>,
    pub bind_address: String,
    pub poll_interval: Duration,
    /// Serve assets from `./assets` instead of the copies built into the binary
    pub local_assets: bool,
    pub github_api_url: String,
}

impl Config {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // blank values count as unset
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let data_path = var("EDB_DATA_PATH").map(PathBuf::from).ok_or(ConfigError::DataPathRequired)?;
        let access_token = var("GITHUB_ACCESS_TOKEN").ok_or(ConfigError::AccessTokenRequired)?;

        let usernames = var("EDB_USERNAMES")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let poll_interval = match var("EDB_POLL_INTERVAL_SECS") {
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid { key: "EDB_POLL_INTERVAL_SECS", value }),
            },
        };

        let local_assets = match var("EDB_LOCAL_ASSETS").as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(value) => return Err(ConfigError::Invalid { key: "EDB_LOCAL_ASSETS", value: value.to_owned() }),
        };

        Ok(Self {
            data_path,
            access_token,
            usernames,
            bind_address: var("EDB_BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            poll_interval,
            local_assets,
            github_api_url: var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }
}
