//! Prediction orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! /predict request
//!     → service.rs
//!         log model_input          (best-effort)
//!         fetch feature row        (404 on unknown id)
//!         score                    (500 on malformed row)
//!         explain                  (best-effort)
//!         log model_output         (best-effort)
//!         log api_log event        (best-effort)
//!     → PredictionResult
//! ```
//!
//! # Design Decisions
//! - Audit writes are isolated: a storage failure on any of them is
//!   logged and swallowed, never surfaced into the response path
//! - Only the unknown-id failure carries a specific message across the
//!   HTTP boundary; everything else is sanitized to a generic 500

pub mod service;

pub use service::{PredictError, PredictionResult, PredictionService};
