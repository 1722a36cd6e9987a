//! Core types and shared functionality for sheetsweep.
//!
//! This crate provides:
//! - Unified error types
//! - Configuration structures
//! - The `Key` type and key-space enumeration strategies
//! - The filesystem-backed `ResourceStore`

pub mod config;
pub mod error;
pub mod key;
pub mod keyspace;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use key::Key;
pub use keyspace::{Alphabet, KeySource, KeyStrategy};
pub use store::ResourceStore;
