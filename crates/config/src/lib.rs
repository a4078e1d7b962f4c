//! Configuration for the ledger sync core and its front ends.

mod config;
pub mod defaults;
mod params;

pub use config::{BiblioConfig, ConfigError};
pub use params::ContractParams;
