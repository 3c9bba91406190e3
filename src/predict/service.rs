//! The request lifecycle from raw id to composed result.

use std::sync::Arc;
use std::time::Instant;

use base64::Engine as _;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::{decision_label, AttritionModel, Explanation, InferenceError};
use crate::store::{ApiEvent, AuditLogger, Db, StoreError, READ_ONLY_SENTINEL};

/// Failures a prediction can surface to the HTTP layer.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("employee {0} not found")]
    UnknownEmployee(i64),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// The composed `/predict` response body.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub prediction: &'static str,
    pub score: f64,
    pub donnees_brutes: serde_json::Map<String, Value>,
    pub id_employee: i64,
    pub shap_waterfall: serde_json::Map<String, Value>,
    pub shap_waterfall_img: String,
}

/// Composes store access, inference, attribution and audit logging into
/// one request lifecycle. Stateless across requests; built once at
/// startup and shared.
pub struct PredictionService {
    features: Db,
    audit: AuditLogger,
    model: Arc<dyn AttritionModel>,
    user_id: String,
}

impl PredictionService {
    pub fn new(
        features: Db,
        audit: AuditLogger,
        model: Arc<dyn AttritionModel>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            features,
            audit,
            model,
            user_id: user_id.into(),
        }
    }

    /// Run one prediction end to end.
    pub async fn predict(&self, id_employee: i64) -> Result<PredictionResult, PredictError> {
        let started = Instant::now();
        let request_payload = json!({ "id_employee": id_employee });

        let input_id = self.audit_input(&request_payload).await;

        let row = match self.features.fetch_employee(id_employee).await {
            Ok(row) => row,
            Err(StoreError::NotFound(id)) => {
                self.audit_failure(&request_payload, 404, started, "ID salarié non trouvé")
                    .await;
                return Err(PredictError::UnknownEmployee(id));
            }
            Err(error) => {
                self.audit_failure(&request_payload, 500, started, &error.to_string())
                    .await;
                return Err(PredictError::Store(error));
            }
        };

        let features = row.feature_map();
        let score = match self.model.score(&features) {
            Ok(score) => score,
            Err(error) => {
                self.audit_failure(&request_payload, 500, started, &error.to_string())
                    .await;
                return Err(PredictError::Inference(error));
            }
        };

        // Attribution is best-effort: a failure here degrades the
        // explanation, not the prediction.
        let explanation = match self.model.explain(&features) {
            Ok(explanation) => explanation,
            Err(error) => {
                tracing::warn!(%error, id_employee, "Attribution failed, returning empty explanation");
                Explanation::default()
            }
        };

        let result = PredictionResult {
            prediction: decision_label(score),
            score,
            donnees_brutes: row.raw_values(),
            id_employee,
            shap_waterfall: explanation
                .contributions
                .iter()
                .map(|(name, value)| (name.clone(), json!(value)))
                .collect(),
            shap_waterfall_img: explanation
                .chart_png
                .map(|png| base64::engine::general_purpose::STANDARD.encode(png))
                .unwrap_or_default(),
        };

        let response_payload =
            serde_json::to_value(&result).unwrap_or_else(|_| json!({ "id_employee": id_employee }));
        self.audit_output(input_id, &response_payload).await;
        self.audit_event(ApiEvent {
            event_type: "predict",
            request: Some(&request_payload),
            response: Some(&response_payload),
            http_code: 200,
            user_id: &self.user_id,
            duration_ms: elapsed_ms(started),
            error: None,
        })
        .await;

        Ok(result)
    }

    async fn audit_input(&self, payload: &Value) -> i64 {
        match self.audit.log_input(payload).await {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(%error, "model_input audit write failed");
                READ_ONLY_SENTINEL
            }
        }
    }

    async fn audit_output(&self, input_id: i64, payload: &Value) {
        if let Err(error) = self
            .audit
            .log_output(input_id, payload, self.model.version())
            .await
        {
            tracing::warn!(%error, input_id, "model_output audit write failed");
        }
    }

    async fn audit_event(&self, event: ApiEvent<'_>) {
        if let Err(error) = self.audit.log_event(event).await {
            tracing::warn!(%error, "api_log audit write failed");
        }
    }

    async fn audit_failure(&self, request: &Value, http_code: u16, started: Instant, detail: &str) {
        self.audit_event(ApiEvent {
            event_type: "predict_error",
            request: Some(request),
            response: None,
            http_code,
            user_id: &self.user_id,
            duration_ms: elapsed_ms(started),
            error: Some(detail),
        })
        .await;
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}
