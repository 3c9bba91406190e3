//! The fitted preprocessor and estimator.
//!
//! The preprocessor turns a raw name → value map into the transformed
//! vector the estimator was fitted on: numerics standardized, categoricals
//! one-hot encoded in vocabulary order. Transformed column names follow
//! the `num__<feature>` / `cat__<feature>_<category>` convention, so one
//! raw categorical expands into several derived names.

use std::collections::BTreeMap;

use crate::model::artifact::{FeatureSpec, PreprocessorParams};
use crate::model::InferenceError;
use crate::store::FeatureValue;

/// Fitted feature transformer.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    params: PreprocessorParams,
}

impl Preprocessor {
    pub fn new(params: PreprocessorParams) -> Self {
        Self { params }
    }

    /// Number of transformed columns.
    pub fn output_width(&self) -> usize {
        self.params.features.iter().map(FeatureSpec::width).sum()
    }

    /// Names of the transformed columns, in column order.
    ///
    /// Falls back to positional `feat_i` placeholders when the fitted
    /// preprocessor carries no output names.
    pub fn output_names(&self) -> Vec<String> {
        if !self.params.named_outputs {
            return (0..self.output_width()).map(|i| format!("feat_{i}")).collect();
        }

        let mut names = Vec::with_capacity(self.output_width());
        for feature in &self.params.features {
            match feature {
                FeatureSpec::Numeric { name, .. } => names.push(format!("num__{name}")),
                FeatureSpec::Categorical { name, categories } => {
                    for category in categories {
                        names.push(format!("cat__{name}_{category}"));
                    }
                }
            }
        }
        names
    }

    /// Transform one raw row into the estimator's feature space.
    pub fn transform(
        &self,
        row: &BTreeMap<String, FeatureValue>,
    ) -> Result<Vec<f64>, InferenceError> {
        let mut out = Vec::with_capacity(self.output_width());
        for feature in &self.params.features {
            let value = row
                .get(feature.name())
                .ok_or_else(|| InferenceError::MissingFeature(feature.name().to_string()))?;
            match feature {
                FeatureSpec::Numeric { name, mean, std } => {
                    let x = value.as_f64().ok_or_else(|| InferenceError::WrongType {
                        feature: name.clone(),
                    })?;
                    out.push((x - mean) / std);
                }
                FeatureSpec::Categorical { name, categories } => {
                    let text = value.as_text().ok_or_else(|| InferenceError::WrongType {
                        feature: name.clone(),
                    })?;
                    let hit = categories.iter().position(|c| c == text).ok_or_else(|| {
                        InferenceError::UnknownCategory {
                            feature: name.clone(),
                            value: text.to_string(),
                        }
                    })?;
                    for i in 0..categories.len() {
                        out.push(if i == hit { 1.0 } else { 0.0 });
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Fitted logistic-regression head.
#[derive(Debug, Clone)]
pub struct Estimator {
    weights: Vec<f64>,
    intercept: f64,
}

impl Estimator {
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Linear term in logit space.
    pub fn decision_function(&self, transformed: &[f64]) -> Result<f64, InferenceError> {
        if transformed.len() != self.weights.len() {
            return Err(InferenceError::Shape {
                expected: self.weights.len(),
                actual: transformed.len(),
            });
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(transformed)
            .map(|(w, z)| w * z)
            .sum();
        Ok(dot + self.intercept)
    }

    /// Probability of the positive (attrition) class.
    pub fn predict_proba(&self, transformed: &[f64]) -> Result<f64, InferenceError> {
        Ok(sigmoid(self.decision_function(transformed)?))
    }
}

fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}
