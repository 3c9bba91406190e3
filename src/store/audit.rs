//! Audit logging to the secondary store.
//!
//! Three append-only tables record every inference: the model input, the
//! model output (weakly referencing its input), and one API event per
//! call. In read-only deployments the writes become no-ops returning
//! [`READ_ONLY_SENTINEL`]; reads (`/log_sample`) still work.
//!
//! Callers are expected to treat every write as best-effort: a broken
//! audit store must never turn a good prediction into a failed response,
//! so the orchestrator wraps each call and only logs the failure.

use serde::Serialize;
use serde_json::Value;

use crate::store::db::{Db, SqlParam};
use crate::store::StoreError;

/// Id returned by the write operations when nothing was written.
pub const READ_ONLY_SENTINEL: i64 = -1;

/// The three audit tables `/log_sample` may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditTable {
    ModelInput,
    ModelOutput,
    ApiLog,
}

impl AuditTable {
    /// Parse a request-supplied table name. Anything unknown is `None`;
    /// the HTTP layer answers that with an error-as-data body, not a 4xx.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "model_input" => Some(AuditTable::ModelInput),
            "model_output" => Some(AuditTable::ModelOutput),
            "api_log" => Some(AuditTable::ApiLog),
            _ => None,
        }
    }
}

/// One `api_log` row, as passed by the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct ApiEvent<'a> {
    pub event_type: &'a str,
    pub request: Option<&'a Value>,
    pub response: Option<&'a Value>,
    pub http_code: u16,
    pub user_id: &'a str,
    pub duration_ms: i64,
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ModelInputRow {
    pub input_id: i64,
    pub timestamp: String,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ModelOutputRow {
    pub output_id: i64,
    pub input_id: i64,
    pub timestamp: String,
    pub prediction: String,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiLogRow {
    pub log_id: i64,
    pub timestamp: String,
    pub event_type: String,
    pub request_payload: Option<String>,
    pub response_payload: Option<String>,
    pub http_code: i64,
    pub user_id: Option<String>,
    pub duration_ms: i64,
    pub error_detail: Option<String>,
}

/// Handle on the audit store.
///
/// Holds the connection (if startup managed to establish one) and the
/// read-only flag. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct AuditLogger {
    db: Option<Db>,
    read_only: bool,
}

impl AuditLogger {
    /// Connect to the audit store. A connection failure degrades to a
    /// disabled logger instead of aborting startup; predictions must keep
    /// working without their audit trail.
    pub async fn connect(url: &str, read_only: bool) -> Self {
        match Db::connect(url).await {
            Ok(db) => {
                tracing::info!(backend = db.kind(), read_only, "Audit store connected");
                Self {
                    db: Some(db),
                    read_only,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Audit store unreachable, audit logging disabled");
                Self {
                    db: None,
                    read_only,
                }
            }
        }
    }

    /// Logger over an already-connected store (used by tests).
    pub fn new(db: Db, read_only: bool) -> Self {
        Self {
            db: Some(db),
            read_only,
        }
    }

    /// Logger that never writes and has nothing to read.
    pub fn disabled() -> Self {
        Self {
            db: None,
            read_only: true,
        }
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Store handle for writes; `None` when read-only or never connected.
    fn write_db(&self) -> Option<&Db> {
        if self.read_only {
            return None;
        }
        self.db.as_ref()
    }

    /// Record the raw request payload. Returns the generated `input_id`,
    /// or the sentinel when no write happened.
    pub async fn log_input(&self, payload: &Value) -> Result<i64, StoreError> {
        let Some(db) = self.write_db() else {
            return Ok(READ_ONLY_SENTINEL);
        };
        let timestamp = now();
        let payload = payload.to_string();
        db.insert_and_return_id(
            "model_input",
            "input_id",
            &["timestamp", "payload"],
            &[SqlParam::Str(&timestamp), SqlParam::Str(&payload)],
        )
        .await
    }

    /// Record the full prediction payload against its input row.
    pub async fn log_output(
        &self,
        input_id: i64,
        prediction: &Value,
        model_version: &str,
    ) -> Result<i64, StoreError> {
        let Some(db) = self.write_db() else {
            return Ok(READ_ONLY_SENTINEL);
        };
        let timestamp = now();
        let prediction = prediction.to_string();
        db.insert_and_return_id(
            "model_output",
            "output_id",
            &["input_id", "timestamp", "prediction", "model_version"],
            &[
                SqlParam::I64(input_id),
                SqlParam::Str(&timestamp),
                SqlParam::Str(&prediction),
                SqlParam::Str(model_version),
            ],
        )
        .await
    }

    /// Record one API call, success or failure. Fire-and-forget: the
    /// caller needs no id back.
    pub async fn log_event(&self, event: ApiEvent<'_>) -> Result<(), StoreError> {
        let Some(db) = self.write_db() else {
            return Ok(());
        };
        let timestamp = now();
        let request = event.request.map(Value::to_string);
        let response = event.response.map(Value::to_string);
        db.insert(
            "api_log",
            &[
                "timestamp",
                "event_type",
                "request_payload",
                "response_payload",
                "http_code",
                "user_id",
                "duration_ms",
                "error_detail",
            ],
            &[
                SqlParam::Str(&timestamp),
                SqlParam::Str(event.event_type),
                SqlParam::OptStr(request.as_deref()),
                SqlParam::OptStr(response.as_deref()),
                SqlParam::I64(i64::from(event.http_code)),
                SqlParam::Str(event.user_id),
                SqlParam::I64(event.duration_ms),
                SqlParam::OptStr(event.error),
            ],
        )
        .await
    }

    /// The `n` most recent rows of one audit table, newest first.
    pub async fn sample(&self, table: AuditTable, n: i64) -> Result<Vec<Value>, StoreError> {
        let db = self.db.as_ref().ok_or(StoreError::Unconfigured)?;
        let n = n.max(1);
        let rows = match table {
            AuditTable::ModelInput => {
                const SQL: &str =
                    "SELECT * FROM model_input ORDER BY input_id DESC LIMIT $1";
                fetch_rows::<ModelInputRow>(db, SQL, n).await?
            }
            AuditTable::ModelOutput => {
                const SQL: &str =
                    "SELECT * FROM model_output ORDER BY output_id DESC LIMIT $1";
                fetch_rows::<ModelOutputRow>(db, SQL, n).await?
            }
            AuditTable::ApiLog => {
                const SQL: &str = "SELECT * FROM api_log ORDER BY log_id DESC LIMIT $1";
                fetch_rows::<ApiLogRow>(db, SQL, n).await?
            }
        };
        Ok(rows)
    }
}

async fn fetch_rows<T>(db: &Db, sql: &str, n: i64) -> Result<Vec<Value>, StoreError>
where
    T: Serialize
        + Send
        + Unpin
        + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>
        + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    let rows: Vec<T> = match db {
        Db::Sqlite(pool) => sqlx::query_as(sql).bind(n).fetch_all(pool).await?,
        Db::Postgres(pool) => sqlx::query_as(sql).bind(n).fetch_all(pool).await?,
    };
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(|e| sqlx::Error::Decode(e.into()).into()))
        .collect()
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tables() {
        assert_eq!(AuditTable::parse("model_input"), Some(AuditTable::ModelInput));
        assert_eq!(AuditTable::parse("model_output"), Some(AuditTable::ModelOutput));
        assert_eq!(AuditTable::parse("api_log"), Some(AuditTable::ApiLog));
    }

    #[test]
    fn test_parse_rejects_unknown_table() {
        assert_eq!(AuditTable::parse("tablebidon"), None);
        assert_eq!(AuditTable::parse(""), None);
        assert_eq!(AuditTable::parse("MODEL_INPUT"), None);
    }

    #[tokio::test]
    async fn test_disabled_logger_returns_sentinel() {
        let logger = AuditLogger::disabled();
        let payload = serde_json::json!({"id_employee": 1});
        assert_eq!(logger.log_input(&payload).await.unwrap(), READ_ONLY_SENTINEL);
        assert_eq!(
            logger.log_output(1, &payload, "1.0").await.unwrap(),
            READ_ONLY_SENTINEL
        );
        logger
            .log_event(ApiEvent {
                event_type: "predict",
                request: Some(&payload),
                response: None,
                http_code: 200,
                user_id: "demo",
                duration_ms: 1,
                error: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_disabled_logger_cannot_sample() {
        let logger = AuditLogger::disabled();
        let err = logger.sample(AuditTable::ApiLog, 5).await.unwrap_err();
        assert!(matches!(err, StoreError::Unconfigured));
    }
}
