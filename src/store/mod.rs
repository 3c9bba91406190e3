//! Store access subsystem.
//!
//! # Data Flow
//! ```text
//! Feature store (read-only):
//!     /predict, /employee_list
//!     → features.rs (fetch one wide row / enumerate ids)
//!     → EmployeeRow
//!
//! Audit store (append-only):
//!     orchestrator
//!     → audit.rs (model_input, model_output, api_log writes)
//!     → db.rs insert_and_return_id (dialect-aware id strategy)
//!
//!     /log_sample
//!     → audit.rs sample (most recent rows, newest first)
//! ```
//!
//! # Design Decisions
//! - The two stores are independent pools; a failure in one never blocks
//!   the other
//! - Absence of a row (`NotFound`) is distinct from a storage failure
//! - Dialect branching is confined to `Db::insert_and_return_id`; callers
//!   never inspect the backend kind
//! - Read-only mode turns audit writes into no-ops returning a sentinel id

pub mod audit;
pub mod db;
pub mod features;

pub use audit::{AuditLogger, AuditTable, ApiEvent, READ_ONLY_SENTINEL};
pub use db::Db;
pub use features::{EmployeeRow, FeatureValue};

use thiserror::Error;

/// Errors surfaced by either store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matches the requested employee identifier.
    #[error("employee {0} not found")]
    NotFound(i64),

    /// The connection or query failed for any other reason.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// The configured connection URL names an unsupported backend.
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),

    /// The audit store was never connected (startup failure or disabled).
    #[error("audit store is not available")]
    Unconfigured,
}
