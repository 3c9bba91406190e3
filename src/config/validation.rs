//! Configuration validation.
//!
//! Serde covers syntax; these are the semantic checks that run before a
//! config is accepted into the system. All errors are collected, not just
//! the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BadBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    BadMetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("{0} store URL is empty")]
    EmptyStoreUrl(&'static str),

    #[error("model artifact path is empty")]
    EmptyArtifactPath,
}

/// Semantic validation of a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.stores.feature_db_url.is_empty() {
        errors.push(ValidationError::EmptyStoreUrl("feature"));
    }
    if config.stores.audit_db_url.is_empty() {
        errors.push(ValidationError::EmptyStoreUrl("audit"));
    }
    if !config.model.use_stub && config.model.artifact_path.is_empty() {
        errors.push(ValidationError::EmptyArtifactPath);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-address".to_string();
        config.server.request_timeout_secs = 0;
        config.stores.feature_db_url.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_stub_model_needs_no_artifact() {
        let mut config = AppConfig::default();
        config.model.use_stub = true;
        config.model.artifact_path.clear();
        assert!(validate_config(&config).is_ok());
    }
}
