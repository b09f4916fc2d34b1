use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;

use common::{Conditions, Error, HistoryStore, Observation, Result};

/// Observation history kept in a local SQLite database.
///
/// Rows are returned in insertion order, newest first.
pub struct SqliteHistoryStore {
    db: SqlitePool,
}

impl SqliteHistoryStore {
    /// Open (creating if needed) the database and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // One connection: the poll cycle is sequential, and `sqlite::memory:`
        // gives every connection its own database.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::migrate!("../../migrations")
            .run(&db)
            .await
            .map_err(sqlx::Error::from)?;
        info!("SQLite history store ready");
        Ok(Self { db })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn last(&self) -> Result<Option<Observation>> {
        let row = sqlx::query("SELECT * FROM market_checks ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.db)
            .await?;
        row.as_ref().map(observation_from_row).transpose()
    }

    async fn append(&self, observation: &Observation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO market_checks (
                timestamp, primary_move, secondary_move, activity_count,
                participation_count, volatility_streak, volatility_met,
                maturity_met, participation_met, ready
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(format_timestamp(observation.timestamp))
        .bind(observation.primary_move)
        .bind(observation.secondary_move)
        .bind(i64::from(observation.activity_count))
        .bind(i64::from(observation.participation_count))
        .bind(i64::from(observation.volatility_streak))
        .bind(observation.conditions.volatility_met)
        .bind(observation.conditions.maturity_met)
        .bind(observation.conditions.participation_met)
        .bind(observation.ready)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Observation>> {
        let rows = sqlx::query("SELECT * FROM market_checks WHERE timestamp >= ?1 ORDER BY id DESC")
            .bind(format_timestamp(cutoff))
            .fetch_all(&self.db)
            .await?;
        rows.iter().map(observation_from_row).collect()
    }
}

/// Fixed-width RFC 3339 so that text comparison matches time order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn observation_from_row(row: &SqliteRow) -> Result<Observation> {
    let raw_ts: String = row.try_get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_ts)
        .map_err(|e| Error::Other(format!("invalid stored timestamp '{raw_ts}': {e}")))?
        .with_timezone(&Utc);

    Ok(Observation {
        timestamp,
        primary_move: row.try_get("primary_move")?,
        secondary_move: row.try_get("secondary_move")?,
        activity_count: count(row, "activity_count")?,
        participation_count: count(row, "participation_count")?,
        volatility_streak: count(row, "volatility_streak")?,
        conditions: Conditions {
            volatility_met: row.try_get("volatility_met")?,
            maturity_met: row.try_get("maturity_met")?,
            participation_met: row.try_get("participation_met")?,
        },
        ready: row.try_get("ready")?,
    })
}

fn count(row: &SqliteRow, column: &str) -> Result<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| Error::Other(format!("stored {column} out of range: {value}")))
}
