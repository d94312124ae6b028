//! Command-line experiments against Azure Blob Storage
//!
//! Three binaries (`upload`, `download`, `delete`) share this library: each
//! loads its configuration from the environment, builds a blob client behind
//! the default Azure credential chain and performs exactly one storage call.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
