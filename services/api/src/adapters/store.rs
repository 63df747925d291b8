//! services/api/src/adapters/store.rs
//!
//! This module contains the report store adapter, the concrete implementation
//! of the `ReportStore` port from the `core` crate. It persists reports in
//! PostgreSQL using `sqlx`.

use async_trait::async_trait;
use campusflow_core::domain::{Report, ReportCategory};
use campusflow_core::ports::{self, PortError, PortResult, ReportStore};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A store adapter that implements the `ReportStore` port on PostgreSQL.
///
/// The `(building, ts)` primary key plus an upsert supplies the per-item
/// atomic, last-write-wins semantics the port requires.
#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    /// Creates a new `PgReportStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ReportRecord {
    building: String,
    ts: DateTime<Utc>,
    category: String,
    description: String,
    photo_url: Option<String>,
}

impl ReportRecord {
    fn to_domain(self) -> Report {
        Report {
            building: self.building,
            // Rows are only ever written from the typed enum; anything else
            // found in the column degrades to `other`.
            category: self.category.parse().unwrap_or(ReportCategory::Other),
            description: self.description,
            submitted_at: self.ts,
            photo_url: self.photo_url,
        }
    }
}

/// Maps sqlx failures onto the port's error kinds. Connectivity problems
/// surface as `StoreUnavailable` so callers can treat them as retryable.
fn map_store_error(err: sqlx::Error) -> PortError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => PortError::StoreUnavailable(err.to_string()),
        _ => PortError::Unexpected(err.to_string()),
    }
}

//=========================================================================================
// `ReportStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReportStore for PgReportStore {
    async fn put(&self, report: &Report) -> PortResult<()> {
        ports::validate(report)?;

        sqlx::query(
            "INSERT INTO reports (building, ts, category, description, photo_url) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (building, ts) DO UPDATE \
             SET category = EXCLUDED.category, \
                 description = EXCLUDED.description, \
                 photo_url = EXCLUDED.photo_url",
        )
        .bind(&report.building)
        .bind(report.submitted_at)
        .bind(report.category.as_str())
        .bind(&report.description)
        .bind(&report.photo_url)
        .execute(&self.pool)
        .await
        .map_err(map_store_error)?;

        Ok(())
    }

    async fn list_day(&self, day: NaiveDate, building: Option<&str>) -> PortResult<Vec<Report>> {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let records = match building {
            Some(building) => {
                sqlx::query_as::<_, ReportRecord>(
                    "SELECT building, ts, category, description, photo_url FROM reports \
                     WHERE ts >= $1 AND ts < $2 AND building = $3 ORDER BY ts ASC",
                )
                .bind(start)
                .bind(end)
                .bind(building)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ReportRecord>(
                    "SELECT building, ts, category, description, photo_url FROM reports \
                     WHERE ts >= $1 AND ts < $2 ORDER BY ts ASC",
                )
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_store_error)?;

        Ok(records.into_iter().map(ReportRecord::to_domain).collect())
    }

    async fn list_since(&self, cutoff: DateTime<Utc>) -> PortResult<Vec<Report>> {
        let records = sqlx::query_as::<_, ReportRecord>(
            "SELECT building, ts, category, description, photo_url FROM reports \
             WHERE ts >= $1 ORDER BY ts ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_error)?;

        Ok(records.into_iter().map(ReportRecord::to_domain).collect())
    }
}
