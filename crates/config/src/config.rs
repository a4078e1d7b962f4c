use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{defaults::DEFAULT_EVENT_POLL_MS, ContractParams};

/// Runtime configuration of a biblio client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiblioConfig {
    /// JSON-RPC endpoint of the ledger node.
    pub rpc_url: String,

    /// Ms to wait between ledger log polls.
    #[serde(default = "default_event_poll_ms")]
    pub event_poll_ms: u64,

    /// Block to start watching events from. Defaults to the current head.
    #[serde(default)]
    pub event_start_block: Option<u64>,

    /// Deployed contract addresses and prices.
    ///
    /// Kept last so it serializes as a trailing table.
    pub contracts: ContractParams,
}

fn default_event_poll_ms() -> u64 {
    DEFAULT_EVENT_POLL_MS
}

/// Errors found while validating a [`BiblioConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rpc url is empty")]
    EmptyRpcUrl,

    #[error("{0} address is the zero address")]
    ZeroAddress(&'static str),

    #[error("library and token addresses must differ")]
    LibraryIsToken,

    #[error("borrow price must be non-zero")]
    ZeroBorrowPrice,

    #[error("event poll interval must be non-zero")]
    ZeroPollInterval,
}

impl BiblioConfig {
    pub fn new(rpc_url: String, contracts: ContractParams) -> Self {
        Self {
            rpc_url,
            contracts,
            event_poll_ms: DEFAULT_EVENT_POLL_MS,
            event_start_block: None,
        }
    }

    /// Checks the values a gateway cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::EmptyRpcUrl);
        }

        let contracts = &self.contracts;
        for (name, address) in [
            ("library", contracts.library_address()),
            ("token", contracts.token_address()),
            ("wrapper", contracts.wrapper_address()),
        ] {
            if address.is_zero() {
                return Err(ConfigError::ZeroAddress(name));
            }
        }
        if contracts.library_address() == contracts.token_address() {
            return Err(ConfigError::LibraryIsToken);
        }
        if contracts.borrow_price().is_zero() {
            return Err(ConfigError::ZeroBorrowPrice);
        }
        if self.event_poll_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};

    use super::*;
    use crate::defaults::DEFAULT_BORROW_PRICE;

    fn contracts() -> ContractParams {
        ContractParams::new(
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            Address::with_last_byte(3),
            DEFAULT_BORROW_PRICE,
        )
    }

    #[test]
    fn test_parse_with_defaults() {
        let raw = r#"
            rpc_url = "http://127.0.0.1:8545"

            [contracts]
            library_address = "0x0000000000000000000000000000000000000001"
            token_address = "0x0000000000000000000000000000000000000002"
            wrapper_address = "0x0000000000000000000000000000000000000003"
        "#;

        let config: BiblioConfig = toml::from_str(raw).expect("valid config");
        assert_eq!(config.event_poll_ms, DEFAULT_EVENT_POLL_MS);
        assert_eq!(config.event_start_block, None);
        assert_eq!(config.contracts, contracts());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_borrow_price_is_one_token() {
        assert_eq!(
            DEFAULT_BORROW_PRICE,
            U256::from(10u64).pow(U256::from(18u64))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BiblioConfig::new(" ".to_string(), contracts());
        assert_eq!(config.validate(), Err(ConfigError::EmptyRpcUrl));

        config.rpc_url = "http://127.0.0.1:8545".to_string();
        config.event_poll_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));

        config.event_poll_ms = 10;
        config.contracts = ContractParams::new(
            Address::with_last_byte(1),
            Address::with_last_byte(1),
            Address::with_last_byte(3),
            DEFAULT_BORROW_PRICE,
        );
        assert_eq!(config.validate(), Err(ConfigError::LibraryIsToken));

        config.contracts = ContractParams::new(
            Address::ZERO,
            Address::with_last_byte(2),
            Address::with_last_byte(3),
            DEFAULT_BORROW_PRICE,
        );
        assert_eq!(config.validate(), Err(ConfigError::ZeroAddress("library")));

        config.contracts = ContractParams::new(
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            Address::with_last_byte(3),
            U256::ZERO,
        );
        assert_eq!(config.validate(), Err(ConfigError::ZeroBorrowPrice));
    }
}
