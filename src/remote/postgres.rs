//! PostgreSQL implementation of [`RemoteStore`] on top of sqlx.
//!
//! No pool is kept: every call opens a connection, uses it, and closes it,
//! so an idle client holds nothing open on the server.

use super::RemoteStore;
use crate::db::initialize::validate_table_name;
use crate::errors::{AppResult, RemoteError};
use crate::models::event::RemoteRow;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Connection parameters for the central server.
#[derive(Debug, Clone)]
pub struct PgParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub statement_timeout: Duration,
}

pub struct PgRemote {
    options: PgConnectOptions,
    connect_timeout: Duration,
    table: String,
    table_ready: AtomicBool,
}

impl std::fmt::Debug for PgRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRemote")
            .field("table", &self.table)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl PgRemote {
    pub fn new(params: &PgParams, table: &str) -> AppResult<Self> {
        validate_table_name(table)?;

        let statement_timeout = format!("{}ms", params.statement_timeout.as_millis());
        let options = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .database(&params.database)
            .username(&params.user)
            .password(&params.password)
            .application_name("clocksync")
            .options([("statement_timeout", statement_timeout.as_str())]);

        Ok(Self {
            options,
            connect_timeout: params.connect_timeout,
            table: table.to_string(),
            table_ready: AtomicBool::new(false),
        })
    }

    async fn connect(&self) -> Result<PgConnection, RemoteError> {
        match tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options))
            .await
        {
            Ok(conn) => conn.map_err(classify),
            Err(_) => Err(RemoteError::Timeout(self.connect_timeout)),
        }
    }

    fn create_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                id           SERIAL PRIMARY KEY,
                employee_id  INTEGER NOT NULL,
                clock_in     TIMESTAMP NOT NULL,
                clock_out    TIMESTAMP,
                created_at   TIMESTAMP,
                modified_at  TIMESTAMP
            )"#,
            self.table
        )
    }

    /// Create the remote table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), RemoteError> {
        let mut conn = self.connect().await?;
        let sql = self.create_table_sql();
        let res = sqlx::query(&sql).execute(&mut conn).await.map_err(classify);
        close_quietly(conn).await;
        res?;
        self.table_ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn insert_in_tx(
        &self,
        conn: &mut PgConnection,
        rows: &[RemoteRow],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = conn.begin().await?;

        if !self.table_ready.load(Ordering::Acquire) {
            sqlx::query(&self.create_table_sql()).execute(&mut *tx).await?;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"INSERT INTO "{}" (employee_id, clock_in, clock_out, created_at, modified_at) "#,
            self.table
        ));
        qb.push_values(rows, |mut b, row| {
            b.push_bind(row.employee_id)
                .push_bind(row.clock_in)
                .push_bind(row.clock_out)
                .push_bind(row.created_at)
                .push_bind(row.modified_at);
        });

        let inserted = qb.build().execute(&mut *tx).await?.rows_affected();
        tx.commit().await?;

        self.table_ready.store(true, Ordering::Release);
        Ok(inserted)
    }
}

#[async_trait]
impl RemoteStore for PgRemote {
    async fn ping(&self) -> bool {
        match self.connect().await {
            Ok(conn) => {
                close_quietly(conn).await;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "remote ping failed");
                false
            }
        }
    }

    async fn bulk_insert(&self, rows: &[RemoteRow]) -> Result<u64, RemoteError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connect().await?;
        // an error drops the transaction, which rolls it back
        let res = self.insert_in_tx(&mut conn, rows).await.map_err(classify);
        close_quietly(conn).await;
        res
    }
}

async fn close_quietly(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "error while closing remote connection");
    }
}

/// Split sqlx failures into transient connectivity problems and rejections
/// of the batch itself.
fn classify(err: sqlx::Error) -> RemoteError {
    match err {
        sqlx::Error::Database(db) => {
            if db.code().is_some_and(|c| is_transient_sqlstate(&c)) {
                RemoteError::Connection(db.to_string())
            } else {
                RemoteError::Constraint(db.to_string())
            }
        }
        other => RemoteError::Connection(other.to_string()),
    }
}

/// SQLSTATE class 08 is connection exception; 57 covers operator
/// intervention such as statement_timeout (57014) or admin shutdown.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("57")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn connection_and_cancel_classes_are_transient() {
        assert!(is_transient_sqlstate("08006"));
        assert!(is_transient_sqlstate("08001"));
        assert!(is_transient_sqlstate("57014"));
        assert!(is_transient_sqlstate("57P01"));
    }

    #[test]
    fn data_errors_are_rejections() {
        assert!(!is_transient_sqlstate("23505"));
        assert!(!is_transient_sqlstate("23502"));
        assert!(!is_transient_sqlstate("42P01"));
    }

    #[test]
    fn transport_failures_map_to_connection() {
        let err = classify(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "refused",
        )));
        assert!(matches!(err, RemoteError::Connection(_)));
        assert!(err.is_transient());

        let err = classify(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RemoteError::Connection(_)));
    }
}
