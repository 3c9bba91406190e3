//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (ATTRITION_* variables)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → injected into state at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so a missing or empty file still runs
//! - Connection URLs and deployment flags come from the environment in
//!   production; the file covers everything else

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, ModelConfig, ObservabilityConfig, ServerConfig, StoreConfig};
