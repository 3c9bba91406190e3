//! Inference and attribution subsystem.
//!
//! # Data Flow
//! ```text
//! artifact file (JSON)
//!     → artifact.rs (parse & validate fitted parameters)
//!     → pipeline.rs (preprocessor: standardize + one-hot; estimator:
//!       logistic regression over the transformed vector)
//!     → scorer.rs (AttritionModel trait: RealModel | StubModel)
//!     → chart.rs (waterfall PNG of the per-column contributions)
//! ```
//!
//! # Design Decisions
//! - The model variant is chosen once at startup from configuration,
//!   never by inspecting types at call time
//! - Contributions are reported in the transformed feature space; mapping
//!   derived names back to raw features is the dashboard's contract
//! - The chart is best-effort visual sugar; a render failure degrades to
//!   an absent image, never a failed request

pub mod artifact;
pub mod chart;
pub mod pipeline;
pub mod scorer;

pub use artifact::{ArtifactError, ModelArtifact};
pub use scorer::{
    decision_label, AttritionModel, Explanation, RealModel, StubModel, DECISION_THRESHOLD,
};

use thiserror::Error;

/// Failures while turning a raw feature row into a score.
///
/// These are the "malformed feature shape" cases: the store row and the
/// fitted artifact disagree. All of them surface as a generic 500.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("feature '{0}' missing from input row")]
    MissingFeature(String),

    #[error("feature '{feature}' has the wrong type for this model")]
    WrongType { feature: String },

    #[error("unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },

    #[error("feature vector width {actual} does not match model width {expected}")]
    Shape { expected: usize, actual: usize },
}
