//! Utilities shared by the biblio binaries.

pub mod logging;
