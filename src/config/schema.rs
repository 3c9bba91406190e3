//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! service. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the attrition API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings (bind address, timeouts).
    pub server: ServerConfig,

    /// Store connection settings for both roles.
    pub stores: StoreConfig,

    /// Model artifact selection.
    pub model: ModelConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Deployment environment label reported by `/health`.
    pub environment: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Store connection configuration.
///
/// The feature store is always read-only to this service; the audit store
/// is read-write unless the deployment runs in read-only ("demo") mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Feature store connection URL (`sqlite:` or `postgres:`).
    pub feature_db_url: String,

    /// Audit store connection URL (`sqlite:` or `postgres:`).
    pub audit_db_url: String,

    /// Read-only mode: audit writes become no-ops returning the sentinel.
    pub read_only: bool,

    /// User identifier recorded in api_log rows.
    pub user_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            feature_db_url: "sqlite:attrition.db".to_string(),
            audit_db_url: "sqlite:audit.db?mode=rwc".to_string(),
            read_only: false,
            user_id: "demo".to_string(),
        }
    }
}

/// Model selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the fitted pipeline artifact (JSON).
    pub artifact_path: String,

    /// Substitute the stub model (degraded/test operation).
    pub use_stub: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "assets/model_artifact.json".to_string(),
            use_stub: false,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

impl AppConfig {
    /// Apply `ATTRITION_*` environment overrides on top of the file
    /// values. URLs and deployment flags are the things operators set per
    /// environment without touching the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ATTRITION_BIND") {
            self.server.bind_address = v;
        }
        if let Ok(v) = std::env::var("ATTRITION_FEATURE_DB_URL") {
            self.stores.feature_db_url = v;
        }
        if let Ok(v) = std::env::var("ATTRITION_AUDIT_DB_URL") {
            self.stores.audit_db_url = v;
        }
        if let Ok(v) = std::env::var("ATTRITION_READ_ONLY") {
            self.stores.read_only = flag(&v);
        }
        if let Ok(v) = std::env::var("ATTRITION_MODEL_STUB") {
            self.model.use_stub = flag(&v);
        }
        if let Ok(v) = std::env::var("ATTRITION_MODEL_ARTIFACT") {
            self.model.artifact_path = v;
        }
        if let Ok(v) = std::env::var("ATTRITION_ENV") {
            self.environment = v;
        }
    }
}

fn flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "on")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            stores: StoreConfig::default(),
            model: ModelConfig::default(),
            observability: ObservabilityConfig::default(),
            environment: "dev".to_string(),
        }
    }
}
