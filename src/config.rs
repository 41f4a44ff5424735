use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use time::UtcOffset;
use url::Url;

use crate::errors::ConfigError;
use crate::timestamp;

/// Where submissions are kept.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageMode {
    /// One JSON file per slot in the storage directory.
    File,
    /// In process memory; lost on restart.
    Memory,
    /// No storage at all: reads are empty and writes are dropped.
    None,
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(StorageMode::File),
            "memory" => Ok(StorageMode::Memory),
            "none" => Ok(StorageMode::None),
            other => Err(format!("unknown storage mode {:?}", other)),
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageMode::File => "file",
            StorageMode::Memory => "memory",
            StorageMode::None => "none",
        })
    }
}

/// Everything the server reads from its environment.
#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub admin_port: u16,
    pub storage: StorageMode,
    pub storage_dir: PathBuf,
    pub sync_url: Url,
    pub sync_timeout: Duration,
    pub display_offset: UtcOffset,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for
    /// anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse(&lookup, "SANGRAH_PORT", "3030", str::parse::<u16>)?;
        let admin_port: u16 = parse(&lookup, "SANGRAH_ADMIN_PORT", "3031", str::parse::<u16>)?;
        let storage = parse(&lookup, "SANGRAH_STORAGE", "file", str::parse::<StorageMode>)?;
        let storage_dir = PathBuf::from(lookup("SANGRAH_STORAGE_DIR").unwrap_or_else(|| "data".to_owned()));

        let default_sync_url = format!("http://127.0.0.1:{}/api/submit", port);
        let sync_url = parse(&lookup, "SANGRAH_SYNC_URL", &default_sync_url, Url::parse)?;

        let sync_timeout = parse(&lookup, "SANGRAH_SYNC_TIMEOUT_MS", "5000", str::parse::<u64>)?;
        let display_offset = parse(
            &lookup,
            "SANGRAH_DISPLAY_UTC_OFFSET",
            "+05:30",
            timestamp::parse_offset,
        )?;

        Ok(Self {
            port,
            admin_port,
            storage,
            storage_dir,
            sync_url,
            sync_timeout: Duration::from_millis(sync_timeout),
            display_offset,
        })
    }
}

fn parse<T, E: fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
    parser: impl Fn(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_owned());

    parser(&value).map_err(|e| ConfigError::InvalidVariable {
        name,
        value: value.clone(),
        reason: e.to_string(),
    })
}
