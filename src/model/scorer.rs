//! The Scorer + Explainer capability and its two implementations.

use std::collections::BTreeMap;
use std::path::Path;

use crate::model::artifact::{ArtifactError, ModelArtifact};
use crate::model::pipeline::{Estimator, Preprocessor};
use crate::model::{chart, InferenceError};
use crate::store::FeatureValue;

/// Probability at or above which the decision label is "OUI".
///
/// Policy constant fixed by the business, not derived from calibration.
pub const DECISION_THRESHOLD: f64 = 0.55;

/// Map a probability to the binary decision label.
pub fn decision_label(score: f64) -> &'static str {
    if score >= DECISION_THRESHOLD {
        "OUI"
    } else {
        "NON"
    }
}

/// Per-column contributions plus the optional rendered chart.
#[derive(Debug, Clone, Default)]
pub struct Explanation {
    /// Signed contribution per transformed column, in column order.
    pub contributions: Vec<(String, f64)>,

    /// Waterfall chart as PNG bytes; absent when rendering is unavailable.
    pub chart_png: Option<Vec<u8>>,
}

/// A pre-trained attrition classifier: scores one feature row and explains
/// the score. Selected once at startup; handlers only see the trait.
pub trait AttritionModel: Send + Sync {
    /// Version string recorded against every model_output row.
    fn version(&self) -> &str;

    /// Probability of the positive (attrition) class, in [0, 1].
    fn score(&self, features: &BTreeMap<String, FeatureValue>) -> Result<f64, InferenceError>;

    /// Additive attribution of the score, in transformed feature space.
    fn explain(
        &self,
        features: &BTreeMap<String, FeatureValue>,
    ) -> Result<Explanation, InferenceError>;
}

/// The artifact-backed pipeline model.
pub struct RealModel {
    version: String,
    preprocessor: Preprocessor,
    estimator: Estimator,
    baseline: Vec<f64>,
}

impl RealModel {
    /// Load the artifact file and build the pipeline from it.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Ok(Self::from_artifact(ModelArtifact::load(path)?))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            version: artifact.version,
            preprocessor: Preprocessor::new(artifact.preprocessor),
            estimator: Estimator::new(artifact.estimator.weights, artifact.estimator.intercept),
            baseline: artifact.estimator.baseline,
        }
    }
}

impl AttritionModel for RealModel {
    fn version(&self) -> &str {
        &self.version
    }

    fn score(&self, features: &BTreeMap<String, FeatureValue>) -> Result<f64, InferenceError> {
        let transformed = self.preprocessor.transform(features)?;
        self.estimator.predict_proba(&transformed)
    }

    fn explain(
        &self,
        features: &BTreeMap<String, FeatureValue>,
    ) -> Result<Explanation, InferenceError> {
        let transformed = self.preprocessor.transform(features)?;
        let names = self.preprocessor.output_names();

        // Exact additive attribution for a linear estimator: each column
        // contributes w_j * (z_j - baseline_j) of logit, and the
        // contributions sum to logit(x) - logit(baseline).
        let contributions: Vec<(String, f64)> = names
            .into_iter()
            .zip(
                self.estimator
                    .weights()
                    .iter()
                    .zip(transformed.iter().zip(self.baseline.iter()))
                    .map(|(w, (z, b))| w * (z - b)),
            )
            .collect();

        let chart_png = match chart::render_waterfall(&contributions) {
            Ok(png) => Some(png),
            Err(error) => {
                tracing::warn!(%error, "Waterfall rendering failed, omitting chart");
                None
            }
        };

        Ok(Explanation {
            contributions,
            chart_png,
        })
    }
}

/// Substitute model for degraded or test operation.
///
/// Returns a constant mid-range score and a fixed placeholder attribution,
/// and never renders a chart.
pub struct StubModel;

/// Contribution mapping the stub reports instead of real attributions.
pub const STUB_CONTRIBUTION_KEY: &str = "explication_indisponible";

impl AttritionModel for StubModel {
    fn version(&self) -> &str {
        "stub"
    }

    fn score(&self, _features: &BTreeMap<String, FeatureValue>) -> Result<f64, InferenceError> {
        Ok(0.5)
    }

    fn explain(
        &self,
        _features: &BTreeMap<String, FeatureValue>,
    ) -> Result<Explanation, InferenceError> {
        Ok(Explanation {
            contributions: vec![(STUB_CONTRIBUTION_KEY.to_string(), 0.0)],
            chart_png: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "version": "2.1.0",
        "preprocessor": {
            "features": [
                {"kind": "numeric", "name": "age", "mean": 35.0, "std": 10.0},
                {"kind": "categorical", "name": "genre", "categories": ["F", "H"]}
            ]
        },
        "estimator": {
            "weights": [0.8, -0.5, 0.5],
            "intercept": -0.2,
            "baseline": [0.0, 0.45, 0.55]
        }
    }"#;

    fn model() -> RealModel {
        RealModel::from_artifact(ModelArtifact::from_json(ARTIFACT).unwrap())
    }

    fn row(age: i64, genre: &str) -> BTreeMap<String, FeatureValue> {
        let mut row = BTreeMap::new();
        row.insert("age".to_string(), FeatureValue::Int(age));
        row.insert("genre".to_string(), FeatureValue::Text(genre.to_string()));
        row
    }

    #[test]
    fn test_decision_label_threshold() {
        assert_eq!(decision_label(0.55), "OUI");
        assert_eq!(decision_label(0.9), "OUI");
        assert_eq!(decision_label(0.549), "NON");
        assert_eq!(decision_label(0.0), "NON");
    }

    #[test]
    fn test_real_model_score_bounds() {
        let model = model();
        let score = model.score(&row(45, "H")).unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_explain_keys_and_order() {
        let model = model();
        let explanation = model.explain(&row(45, "H")).unwrap();
        let keys: Vec<&str> = explanation
            .contributions
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["num__age", "cat__genre_F", "cat__genre_H"]);
        assert!(explanation.chart_png.is_some());
    }

    #[test]
    fn test_contributions_sum_to_logit_shift() {
        let model = model();
        let features = row(45, "H");
        let explanation = model.explain(&features).unwrap();
        let sum: f64 = explanation.contributions.iter().map(|(_, v)| v).sum();

        // logit(x) - logit(baseline), computed by hand from the artifact:
        // z = [1.0, 0.0, 1.0], b = [0.0, 0.45, 0.55]
        let expected = 0.8 * 1.0 + (-0.5) * (0.0 - 0.45) + 0.5 * (1.0 - 0.55);
        assert!((sum - expected).abs() < 1e-12);
    }

    #[test]
    fn test_explain_propagates_transform_failure() {
        let model = model();
        let err = model.explain(&row(45, "X")).unwrap_err();
        assert!(matches!(err, InferenceError::UnknownCategory { .. }));
    }

    #[test]
    fn test_stub_model_degrades() {
        let stub = StubModel;
        assert_eq!(stub.version(), "stub");
        assert_eq!(stub.score(&BTreeMap::new()).unwrap(), 0.5);
        let explanation = stub.explain(&BTreeMap::new()).unwrap();
        assert_eq!(
            explanation.contributions,
            vec![(STUB_CONTRIBUTION_KEY.to_string(), 0.0)]
        );
        assert!(explanation.chart_png.is_none());
    }
}
