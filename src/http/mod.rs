//! HTTP transport binding.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, state injection)
//!     → handlers.rs (thin endpoint handlers over the orchestrator)
//!     → error.rs (domain error → sanitized HTTP response)
//! ```
//!
//! # Endpoints
//! - `GET /health` — liveness triple (status, version, environment)
//! - `GET /employee_list` — distinct known employee identifiers
//! - `GET|POST /predict` — run one prediction
//! - `GET /log_sample` — most recent audit rows of one table

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
