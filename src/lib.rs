//! Employee Attrition Prediction API
//!
//! An HTTP service exposing a pre-trained attrition classifier: per-employee
//! probability score, binary decision, additive per-feature attribution and
//! a rendered waterfall chart, with every inference audited to a secondary
//! store.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                  ATTRITION API                      │
//!                    │                                                     │
//!   HTTP Request     │  ┌─────────┐     ┌───────────────┐                 │
//!   ─────────────────┼─▶│  http   │────▶│   predict     │                 │
//!                    │  │ server  │     │ orchestrator  │                 │
//!                    │  └─────────┘     └──────┬────────┘                 │
//!                    │                         │                           │
//!                    │      ┌──────────────────┼──────────────────┐       │
//!                    │      ▼                  ▼                  ▼       │
//!                    │  ┌────────┐       ┌──────────┐      ┌──────────┐  │
//!                    │  │ store/ │       │  model   │      │  store/  │  │
//!                    │  │features│       │ pipeline │      │  audit   │  │
//!                    │  └───┬────┘       │ + chart  │      └────┬─────┘  │
//!                    │      │            └──────────┘           │        │
//!                    │      ▼                                   ▼        │
//!                    │  feature store                      audit store   │
//!                    │  (read-only)                        (append-only, │
//!                    │                                      degradable)  │
//!                    │                                                     │
//!                    │  ┌───────────────────────────────────────────────┐ │
//!                    │  │            Cross-Cutting Concerns              │ │
//!                    │  │  ┌────────┐ ┌─────────────┐ ┌──────────────┐  │ │
//!                    │  │  │ config │ │observability│ │  lifecycle   │  │ │
//!                    │  │  └────────┘ └─────────────┘ └──────────────┘  │ │
//!                    │  └───────────────────────────────────────────────┘ │
//!                    └────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod http;
pub mod model;
pub mod predict;
pub mod store;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use model::{AttritionModel, RealModel, StubModel, DECISION_THRESHOLD};
pub use predict::PredictionService;
pub use store::{AuditLogger, Db};
