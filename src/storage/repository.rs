use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{format_timestamp, parse_timestamp, Amount, BalanceWindow, Entry};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_DATETIME_INDEX};

/// Matches the fixed-width storage format 'YYYY-MM-DD HH:MM:SS'.
const TIMESTAMP_GLOB: &str =
    "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9] [0-9][0-9]:[0-9][0-9]:[0-9][0-9]";

/// Statistics for ledger integrity verification.
#[derive(Debug, Clone)]
pub struct IntegrityStats {
    pub entry_count: i64,
    pub min_id: Option<i64>,
    pub max_id: Option<i64>,
    pub has_id_gaps: bool,
    pub null_fields: i64,
    pub malformed_timestamps: i64,
}

/// Repository for persisting and querying ledger entries.
///
/// Holds a single SQLite connection for its whole lifetime.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database {}", database_url))?;
        tracing::debug!(database_url, "connected to ledger database");
        Ok(Self::new(pool))
    }

    /// Ensure the schema exists. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_DATETIME_INDEX)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Release the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Entry operations
    // ========================

    /// Insert a new entry and return it with its assigned id.
    pub async fn insert_entry(
        &self,
        name: &str,
        amount: Amount,
        recorded_at: NaiveDateTime,
    ) -> Result<Entry> {
        let result = sqlx::query("INSERT INTO accounts (name, money, datetime) VALUES (?, ?, ?)")
            .bind(name)
            .bind(amount)
            .bind(format_timestamp(&recorded_at))
            .execute(&self.pool)
            .await
            .context("Failed to insert entry")?;

        let entry = Entry {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            amount,
            recorded_at,
        };
        tracing::debug!(id = entry.id, name, amount, "inserted entry");
        Ok(entry)
    }

    /// Delete the row with the highest row id, returning it.
    /// Returns `None` when the table is empty.
    pub async fn delete_most_recent(&self) -> Result<Option<Entry>> {
        let row = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE rowid = (SELECT MAX(rowid) FROM accounts)
            RETURNING id, name, money, datetime
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete most recent entry")?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    /// List all entries, newest first. Ties on timestamp are broken by insertion order.
    pub async fn list_entries(&self) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, money, datetime
            FROM accounts
            ORDER BY datetime DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// List the `limit` newest entries.
    pub async fn list_recent_entries(&self, limit: usize) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, money, datetime
            FROM accounts
            ORDER BY datetime DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list recent entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Sum amounts per participant over entries strictly after the window cutoff.
    /// The fixed-width timestamp format makes text comparison chronological.
    pub async fn compute_balances(&self, window: &BalanceWindow) -> Result<HashMap<String, Amount>> {
        let rows = sqlx::query(
            r#"
            SELECT name, SUM(money) as balance
            FROM accounts
            WHERE datetime > ? AND name IS NOT NULL AND money IS NOT NULL
            GROUP BY name
            "#,
        )
        .bind(window.cutoff_key())
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute balances")?;

        let mut balances = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name").context("Invalid name")?;
            let balance: Amount = row.try_get("balance").context("Invalid balance")?;
            balances.insert(name, balance);
        }

        Ok(balances)
    }

    /// Sum of all amounts in the window. Zero when no entries match.
    pub async fn compute_total(&self, window: &BalanceWindow) -> Result<Amount> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(money), 0) as total
            FROM accounts
            WHERE datetime > ? AND name IS NOT NULL AND money IS NOT NULL
            "#,
        )
        .bind(window.cutoff_key())
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute total")?;

        row.try_get("total").context("Invalid total")
    }

    /// Get statistics for integrity checking.
    pub async fn get_integrity_stats(&self) -> Result<IntegrityStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as count,
                MIN(id) as min_id,
                MAX(id) as max_id
            FROM accounts
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count entries")?;

        let entry_count: i64 = row.try_get("count")?;
        let min_id: Option<i64> = row.try_get("min_id")?;
        let max_id: Option<i64> = row.try_get("max_id")?;

        let has_id_gaps = match (min_id, max_id) {
            (Some(min), Some(max)) => (max - min + 1) != entry_count,
            _ => false,
        };

        let null_fields: i64 = sqlx::query(
            "SELECT COUNT(*) as count FROM accounts WHERE name IS NULL OR money IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count incomplete entries")?
        .try_get("count")?;

        let malformed_timestamps: i64 = sqlx::query(
            "SELECT COUNT(*) as count FROM accounts WHERE datetime IS NULL OR datetime NOT GLOB ?",
        )
        .bind(TIMESTAMP_GLOB)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count malformed timestamps")?
        .try_get("count")?;

        Ok(IntegrityStats {
            entry_count,
            min_id,
            max_id,
            has_id_gaps,
            null_fields,
            malformed_timestamps,
        })
    }

    fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
        let id: i64 = row.try_get("id").context("Invalid entry id")?;
        let name: Option<String> = row.try_get("name").context("Invalid name")?;
        let amount: Option<Amount> = row.try_get("money").context("Invalid money")?;
        let datetime: Option<String> = row.try_get("datetime").context("Invalid datetime")?;

        let datetime =
            datetime.ok_or_else(|| anyhow::anyhow!("Entry {} has no datetime", id))?;

        Ok(Entry {
            id,
            name: name.ok_or_else(|| anyhow::anyhow!("Entry {} has no name", id))?,
            amount: amount.ok_or_else(|| anyhow::anyhow!("Entry {} has no money", id))?,
            recorded_at: parse_timestamp(&datetime)
                .with_context(|| format!("Invalid datetime '{}' on entry {}", datetime, id))?,
        })
    }
}
