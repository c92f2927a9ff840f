use crate::state::Category;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.certificacionsustentable.cl/";

/// Main configuration structure for CES Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub detail: DetailConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which site and which listing sections to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Site root; category path segments are joined onto it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Categories to process, in order
    #[serde(default = "Category::all")]
    pub categories: Vec<Category>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            categories: Category::all(),
        }
    }
}

/// HTTP fetch and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of attempts per URL
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-sleep-ms", default = "default_retry_sleep_ms")]
    pub retry_sleep_ms: u64,

    /// Timeout of a single attempt (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn retry_sleep(&self) -> Duration {
        Duration::from_millis(self.retry_sleep_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_sleep_ms: default_retry_sleep_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Detail phase behavior
#[derive(Debug, Clone, Deserialize)]
pub struct DetailConfig {
    /// Maximum number of project pages fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Log a progress line every this many completed pages
    #[serde(rename = "progress-every", default = "default_progress_every")]
    pub progress_every: usize,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            progress_every: default_progress_every(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving intermediate and consolidated tables
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_retries() -> u32 {
    10
}

fn default_retry_sleep_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("ces-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_concurrency() -> usize {
    5
}

fn default_progress_every() -> usize {
    10
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("./data/raw/")
}
