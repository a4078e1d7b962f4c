use std::{
    env::var,
    fs::{create_dir_all, File},
    io,
    path::PathBuf,
};

use alloy::signers::local::PrivateKeySigner;
use biblio_config::BiblioConfig;
use config::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var overriding the config file location.
pub const CONFIG_ENV: &str = "BIBLIO_CONFIG";

/// Env var holding the hex private key that signs transactions.
pub const PRIVATE_KEY_ENV: &str = "BIBLIO_PRIVATE_KEY";

/// Settings deserialized from the config file.
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsFromFile {
    /// Directory for rotating log files. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
    /// Write logs as JSON.
    pub json_logs: Option<bool>,
    #[serde(flatten)]
    pub ledger: BiblioConfig,
}

/// Settings struct filled with either config values or
/// opinionated defaults
#[derive(Debug)]
pub struct Settings {
    pub ledger: BiblioConfig,
    pub config_file: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub json_logs: bool,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no home directory to place the config file in")]
    NoProjectDirs,

    #[error("failed to prepare config directory: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read config file: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(#[from] biblio_config::ConfigError),
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "biblio", "biblio")
}

/// Returns the config file path, honouring [`CONFIG_ENV`].
pub fn config_file() -> Result<PathBuf, SettingsError> {
    match var(CONFIG_ENV).ok() {
        Some(path) => Ok(PathBuf::from(path)),
        None => project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(SettingsError::NoProjectDirs),
    }
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        let config_file = config_file()?;
        if let Some(dir) = config_file.parent() {
            create_dir_all(dir)?;
        }

        // create config file if not exists
        let _ = File::create_new(&config_file);
        let from_file: SettingsFromFile = Config::builder()
            .add_source(config::File::from(config_file.as_path()))
            .build()?
            .try_deserialize()?;

        from_file.ledger.validate()?;

        Ok(Settings {
            ledger: from_file.ledger,
            config_file,
            log_dir: from_file.log_dir,
            json_logs: from_file.json_logs.unwrap_or(false),
        })
    }

    /// Reads the signing key from [`PRIVATE_KEY_ENV`].
    pub fn signer(&self) -> Result<PrivateKeySigner, SignerError> {
        let key = var(PRIVATE_KEY_ENV).map_err(|_| SignerError::Missing)?;
        key.trim().parse().map_err(|_| SignerError::Malformed)
    }
}

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("{PRIVATE_KEY_ENV} is not set")]
    Missing,

    #[error("{PRIVATE_KEY_ENV} is not a valid hex private key")]
    Malformed,
}

#[cfg(test)]
mod tests {
    use toml;

    use super::*;

    const CONFIG: &str = r#"
        rpc_url = "http://127.0.0.1:8545"
        event_poll_ms = 500
        log_dir = "/var/log/biblio"

        [contracts]
        library_address = "0x1111111111111111111111111111111111111111"
        token_address = "0x2222222222222222222222222222222222222222"
        wrapper_address = "0x3333333333333333333333333333333333333333"
    "#;

    #[test]
    fn test_settings_from_file_serde_roundtrip() {
        let parsed: SettingsFromFile =
            toml::from_str(CONFIG).expect("failed to parse SettingsFromFile from TOML");

        let serialized =
            toml::to_string(&parsed).expect("failed to serialize SettingsFromFile to TOML");

        let reparsed: SettingsFromFile =
            toml::from_str(&serialized).expect("failed to deserialize serialized SettingsFromFile");

        assert_eq!(parsed.ledger.rpc_url, reparsed.ledger.rpc_url);
        assert_eq!(parsed.ledger.contracts, reparsed.ledger.contracts);
        assert_eq!(parsed.ledger.event_poll_ms, 500);
        assert_eq!(parsed.log_dir, reparsed.log_dir);
        assert!(parsed.ledger.validate().is_ok());
    }
}
