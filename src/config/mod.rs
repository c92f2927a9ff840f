//! Configuration module for CES Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so an empty file harvests all four categories
//! of the public registry.
//!
//! # Example
//!
//! ```no_run
//! use ces_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Detail concurrency: {}", config.detail.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DetailConfig, FetchConfig, HarvestConfig, OutputConfig, DEFAULT_BASE_URL};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
