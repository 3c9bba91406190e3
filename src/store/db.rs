//! Connection handles and the per-backend id-return strategy.
//!
//! SQLite reports the generated key through the driver's last-insert-rowid;
//! PostgreSQL appends `RETURNING <id>` to the statement. Both strategies
//! live behind [`Db::insert_and_return_id`] so no caller ever branches on
//! the dialect.

use sqlx::postgres::PgPool;
use sqlx::sqlite::SqlitePool;

use crate::store::StoreError;

/// A connected store, one variant per supported backend.
///
/// Pools are cheap to clone and safe for concurrent use; every operation
/// checks a connection out of the pool for its single statement.
#[derive(Clone, Debug)]
pub enum Db {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// One bind parameter for a dynamically assembled insert.
#[derive(Debug, Clone, Copy)]
pub enum SqlParam<'a> {
    I64(i64),
    Str(&'a str),
    OptStr(Option<&'a str>),
}

impl Db {
    /// Connect to the store named by `url`. The backend is selected from
    /// the URL scheme; anything other than `sqlite:` or `postgres:` is
    /// rejected.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if url.starts_with("sqlite:") {
            Ok(Db::Sqlite(SqlitePool::connect(url).await?))
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(Db::Postgres(PgPool::connect(url).await?))
        } else {
            Err(StoreError::UnsupportedUrl(url.to_string()))
        }
    }

    /// Backend name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Db::Sqlite(_) => "sqlite",
            Db::Postgres(_) => "postgres",
        }
    }

    /// Insert one row and return the store-generated id.
    ///
    /// `columns` and `params` must line up one-to-one. The statement uses
    /// `$N` placeholders, which both supported drivers accept.
    pub async fn insert_and_return_id(
        &self,
        table: &str,
        id_column: &str,
        columns: &[&str],
        params: &[SqlParam<'_>],
    ) -> Result<i64, StoreError> {
        debug_assert_eq!(columns.len(), params.len());
        let sql = build_insert(table, columns);

        match self {
            Db::Sqlite(pool) => {
                let mut query = sqlx::query::<sqlx::Sqlite>(&sql);
                for param in params {
                    query = match param {
                        SqlParam::I64(v) => query.bind(*v),
                        SqlParam::Str(v) => query.bind(*v),
                        SqlParam::OptStr(v) => query.bind(*v),
                    };
                }
                let result = query.execute(pool).await?;
                Ok(result.last_insert_rowid())
            }
            Db::Postgres(pool) => {
                let sql = format!("{sql} RETURNING {id_column}");
                let mut query = sqlx::query_scalar::<sqlx::Postgres, i64>(&sql);
                for param in params {
                    query = match param {
                        SqlParam::I64(v) => query.bind(*v),
                        SqlParam::Str(v) => query.bind(*v),
                        SqlParam::OptStr(v) => query.bind(*v),
                    };
                }
                Ok(query.fetch_one(pool).await?)
            }
        }
    }

    /// Insert one row without reading back an id (fire-and-forget events).
    pub async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        params: &[SqlParam<'_>],
    ) -> Result<(), StoreError> {
        debug_assert_eq!(columns.len(), params.len());
        let sql = build_insert(table, columns);

        match self {
            Db::Sqlite(pool) => {
                let mut query = sqlx::query::<sqlx::Sqlite>(&sql);
                for param in params {
                    query = match param {
                        SqlParam::I64(v) => query.bind(*v),
                        SqlParam::Str(v) => query.bind(*v),
                        SqlParam::OptStr(v) => query.bind(*v),
                    };
                }
                query.execute(pool).await?;
            }
            Db::Postgres(pool) => {
                let mut query = sqlx::query::<sqlx::Postgres>(&sql);
                for param in params {
                    query = match param {
                        SqlParam::I64(v) => query.bind(*v),
                        SqlParam::Str(v) => query.bind(*v),
                        SqlParam::OptStr(v) => query.bind(*v),
                    };
                }
                query.execute(pool).await?;
            }
        }
        Ok(())
    }
}

/// Assemble `INSERT INTO t (a, b) VALUES ($1, $2)`.
///
/// Table and column names come from code, never from request input.
fn build_insert(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_insert_placeholders() {
        let sql = build_insert("model_input", &["timestamp", "payload"]);
        assert_eq!(
            sql,
            "INSERT INTO model_input (timestamp, payload) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_build_insert_single_column() {
        let sql = build_insert("t", &["a"]);
        assert_eq!(sql, "INSERT INTO t (a) VALUES ($1)");
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let err = Db::connect("mysql://localhost/db").await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedUrl(_)));
    }
}
