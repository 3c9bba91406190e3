//! Endpoint handlers.
//!
//! Thin transport layer: extract parameters, delegate to the orchestrator
//! or the store handles in [`AppState`], map the outcome. No business
//! logic lives here.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::predict::PredictionResult;
use crate::store::AuditTable;

/// Default row count for `/log_sample` when `n` is absent.
const DEFAULT_SAMPLE_SIZE: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    pub id_employee: i64,
}

#[derive(Debug, Deserialize)]
pub struct LogSampleParams {
    pub table: String,
    pub n: Option<i64>,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "env": state.environment,
    }))
}

/// `GET /employee_list`
pub async fn employee_list(State(state): State<AppState>) -> Result<Json<Vec<i64>>, ApiError> {
    let started = Instant::now();
    match state.features.list_employee_ids().await {
        Ok(ids) => {
            metrics::record_request("employee_list", 200, started);
            Ok(Json(ids))
        }
        Err(error) => {
            metrics::record_request("employee_list", 500, started);
            Err(error.into())
        }
    }
}

/// `GET /predict?id_employee=`
pub async fn predict_get(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> Result<Json<PredictionResult>, ApiError> {
    run_predict(&state, params.id_employee).await
}

/// `POST /predict` with `{"id_employee": n}`
pub async fn predict_post(
    State(state): State<AppState>,
    Json(params): Json<PredictParams>,
) -> Result<Json<PredictionResult>, ApiError> {
    run_predict(&state, params.id_employee).await
}

async fn run_predict(state: &AppState, id_employee: i64) -> Result<Json<PredictionResult>, ApiError> {
    let started = Instant::now();
    match state.service.predict(id_employee).await {
        Ok(result) => {
            metrics::record_request("predict", 200, started);
            Ok(Json(result))
        }
        Err(error) => {
            let error: ApiError = error.into();
            let status = match error {
                ApiError::NotFound => 404,
                ApiError::Internal => 500,
            };
            metrics::record_request("predict", status, started);
            Err(error)
        }
    }
}

/// `GET /log_sample?table=&n=`
///
/// An unknown table name answers 200 with `{"error": "Table inconnue"}`.
/// Error-as-data is the published contract for this endpoint; the
/// dashboard renders the body instead of branching on the status code.
pub async fn log_sample(
    State(state): State<AppState>,
    Query(params): Query<LogSampleParams>,
) -> Result<Json<Value>, ApiError> {
    let started = Instant::now();
    let Some(table) = AuditTable::parse(&params.table) else {
        metrics::record_request("log_sample", 200, started);
        return Ok(Json(json!({ "error": "Table inconnue" })));
    };

    let n = params.n.unwrap_or(DEFAULT_SAMPLE_SIZE);
    match state.audit.sample(table, n).await {
        Ok(rows) => {
            metrics::record_request("log_sample", 200, started);
            Ok(Json(Value::Array(rows)))
        }
        Err(error) => {
            metrics::record_request("log_sample", 500, started);
            Err(error.into())
        }
    }
}
