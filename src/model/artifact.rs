//! The serialized pipeline artifact.
//!
//! Training happens offline; what ships with the service is a JSON file
//! holding the fitted preprocessor (standardization parameters and
//! category vocabularies) and the fitted estimator (weights, intercept,
//! and the training-set baseline in transformed space). Loading validates
//! that the three parts agree on the transformed width before the model
//! is allowed to serve.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors while loading or validating an artifact file.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse artifact file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(
        "artifact width mismatch: preprocessor emits {transformed} columns, \
         estimator has {weights} weights and {baseline} baseline entries"
    )]
    WidthMismatch {
        transformed: usize,
        weights: usize,
        baseline: usize,
    },

    #[error("numeric feature '{0}' has a non-positive scale")]
    BadScale(String),

    #[error("categorical feature '{0}' has an empty vocabulary")]
    EmptyVocabulary(String),
}

/// One fitted input feature.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    /// Standardized numeric column: `z = (x - mean) / std`.
    Numeric { name: String, mean: f64, std: f64 },

    /// One-hot encoded categorical column, one output per category.
    Categorical { name: String, categories: Vec<String> },
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name, .. } => name,
            FeatureSpec::Categorical { name, .. } => name,
        }
    }

    /// How many transformed columns this feature expands into.
    pub fn width(&self) -> usize {
        match self {
            FeatureSpec::Numeric { .. } => 1,
            FeatureSpec::Categorical { categories, .. } => categories.len(),
        }
    }
}

/// Fitted preprocessor parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessorParams {
    pub features: Vec<FeatureSpec>,

    /// When false the preprocessor cannot name its outputs and positional
    /// `feat_i` placeholders are synthesized instead.
    #[serde(default = "default_named_outputs")]
    pub named_outputs: bool,
}

fn default_named_outputs() -> bool {
    true
}

/// Fitted logistic-regression parameters over the transformed space.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorParams {
    pub weights: Vec<f64>,
    pub intercept: f64,

    /// Training-set mean of the transformed vector; the reference point
    /// the additive attribution measures against.
    pub baseline: Vec<f64>,
}

/// A fully parsed and validated artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub preprocessor: PreprocessorParams,
    pub estimator: EstimatorParams,
}

impl ModelArtifact {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Parse from a JSON string (tests, embedded artifacts).
    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Number of transformed columns the preprocessor emits.
    pub fn transformed_width(&self) -> usize {
        self.preprocessor.features.iter().map(FeatureSpec::width).sum()
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        for feature in &self.preprocessor.features {
            match feature {
                FeatureSpec::Numeric { name, std, .. } => {
                    if *std <= 0.0 {
                        return Err(ArtifactError::BadScale(name.clone()));
                    }
                }
                FeatureSpec::Categorical { name, categories } => {
                    if categories.is_empty() {
                        return Err(ArtifactError::EmptyVocabulary(name.clone()));
                    }
                }
            }
        }

        let transformed = self.transformed_width();
        let weights = self.estimator.weights.len();
        let baseline = self.estimator.baseline.len();
        if transformed != weights || transformed != baseline {
            return Err(ArtifactError::WidthMismatch {
                transformed,
                weights,
                baseline,
            });
        }
        Ok(())
    }
}
