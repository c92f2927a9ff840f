use crate::config::types::{Config, DetailConfig, FetchConfig, HarvestConfig, OutputConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_fetch_config(&config.fetch)?;
    validate_detail_config(&config.detail)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site URL and category list
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot carry a query or fragment",
            config.base_url
        )));
    }

    if config.categories.is_empty() {
        return Err(ConfigError::Validation(
            "categories cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in &config.categories {
        if !seen.insert(category) {
            return Err(ConfigError::Validation(format!(
                "category '{}' is listed more than once",
                category
            )));
        }
    }

    Ok(())
}

/// Validates retry and timeout settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 || config.max_retries > 100 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be between 1 and 100, got {}",
            config.max_retries
        )));
    }

    if config.retry_sleep_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "retry-sleep-ms must be <= 60000ms, got {}ms",
            config.retry_sleep_ms
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates detail phase settings
fn validate_detail_config(config: &DetailConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.progress_every < 1 {
        return Err(ConfigError::Validation(
            "progress-every must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Category;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = HarvestConfig::default();
        assert!(validate_harvest_config(&config).is_ok());

        config.base_url = "http://127.0.0.1:8080".to_string();
        assert!(validate_harvest_config(&config).is_ok());

        config.base_url = "ftp://example.com/".to_string();
        assert!(matches!(
            validate_harvest_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.base_url = "not a url".to_string();
        assert!(validate_harvest_config(&config).is_err());

        config.base_url = "https://example.com/?page=2".to_string();
        assert!(validate_harvest_config(&config).is_err());
    }

    #[test]
    fn test_validate_categories() {
        let mut config = HarvestConfig::default();

        config.categories = vec![];
        assert!(validate_harvest_config(&config).is_err());

        config.categories = vec![Category::Certificacion, Category::Certificacion];
        assert!(validate_harvest_config(&config).is_err());
    }

    #[test]
    fn test_validate_fetch_bounds() {
        let mut config = FetchConfig::default();
        assert!(validate_fetch_config(&config).is_ok());

        config.max_retries = 0;
        assert!(validate_fetch_config(&config).is_err());

        config.max_retries = 3;
        config.request_timeout_secs = 0;
        assert!(validate_fetch_config(&config).is_err());
    }

    #[test]
    fn test_validate_concurrency() {
        let mut config = DetailConfig::default();
        config.concurrency = 0;
        assert!(validate_detail_config(&config).is_err());

        config.concurrency = 101;
        assert!(validate_detail_config(&config).is_err());

        config.concurrency = 5;
        config.progress_every = 0;
        assert!(validate_detail_config(&config).is_err());
    }
}
