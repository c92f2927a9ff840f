//! CES Harvest: a listing harvester for the CES certification registry
//!
//! This crate walks the paginated category listings of the registry, extracts a
//! summary record per listed project, fetches every project's own page for a
//! detail record, and consolidates all categories into one deduplicated table.

pub mod config;
pub mod harvest;
pub mod output;
pub mod records;
pub mod state;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] harvest::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Errors raised while turning a page body into records
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("{names} project names but {links} project links on listing page")]
    MisalignedEntries { names: usize, links: usize },

    #[error("expected {expected} contact fields for {entries} projects, found {found}")]
    MisalignedContacts {
        entries: usize,
        expected: usize,
        found: usize,
    },

    #[error("listing entry {index} ({name:?}) has {found} contact fields, expected 2")]
    EntryContacts {
        index: usize,
        name: String,
        found: usize,
    },

    #[error("listing entry {index} ({name:?}) has no detail URL")]
    MissingDetailUrl { index: usize, name: String },
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{Attribute, DetailRecord, SummaryRecord};
pub use state::{Category, HarvestPhase, HarvestState};
