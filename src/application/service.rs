use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::domain::{
    compute_balances, compute_total, local_now, parse_amount, parse_timestamp, sorted_balances,
    Amount, BalanceWindow, Entry,
};
use crate::storage::Repository;

use super::{
    build_integrity_report, AppError, BankSummary, IntegrityReport, LedgerConfig,
    ParticipantBalance,
};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, tests, a future GUI).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (creating if needed) the database at the given path and ensure the schema exists.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        Self::open(&LedgerConfig::new(database_path)).await
    }

    /// Open the database described by `config` and ensure the schema exists.
    pub async fn open(config: &LedgerConfig) -> Result<Self, AppError> {
        let repo = Repository::init(&config.database_url()).await?;
        Ok(Self::new(repo))
    }

    /// Idempotently create the schema.
    pub async fn initialize(&self) -> Result<(), AppError> {
        Ok(self.repo.migrate().await?)
    }

    /// Release the database connection.
    pub async fn close(self) {
        self.repo.close().await;
    }

    // ========================
    // Ledger operations
    // ========================

    /// Record a deposit (positive) or withdrawal (negative) for `name`,
    /// timestamped with the current local time.
    pub async fn append(&self, name: &str, raw_amount: &str) -> Result<Entry, AppError> {
        self.append_at(name, raw_amount, local_now()).await
    }

    /// Record an entry with an explicit timestamp.
    /// Nothing is written when `raw_amount` is not an integer.
    pub async fn append_at(
        &self,
        name: &str,
        raw_amount: &str,
        recorded_at: NaiveDateTime,
    ) -> Result<Entry, AppError> {
        let amount = parse_amount(raw_amount).map_err(|source| {
            tracing::warn!(name, raw_amount, %source, "rejected entry");
            AppError::InvalidAmount {
                input: raw_amount.to_string(),
                source,
            }
        })?;

        Ok(self.repo.insert_entry(name, amount, recorded_at).await?)
    }

    /// Parse a user supplied timestamp in storage format.
    pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, AppError> {
        parse_timestamp(input).map_err(|_| AppError::InvalidTimestamp(input.to_string()))
    }

    /// Delete the most recently inserted entry. `None` when the ledger is empty.
    pub async fn delete_most_recent(&self) -> Result<Option<Entry>, AppError> {
        let deleted = self.repo.delete_most_recent().await?;
        match &deleted {
            Some(entry) => tracing::info!(
                id = entry.id,
                name = %entry.name,
                amount = entry.amount,
                "deleted most recent entry"
            ),
            None => tracing::debug!("ledger is empty, nothing to delete"),
        }
        Ok(deleted)
    }

    /// Full history, newest first.
    pub async fn list_history(&self) -> Result<Vec<Entry>, AppError> {
        Ok(self.repo.list_entries().await?)
    }

    /// The `limit` newest entries.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Entry>, AppError> {
        Ok(self.repo.list_recent_entries(limit).await?)
    }

    // ========================
    // Balance operations
    // ========================

    /// Net balance per participant within the window.
    pub async fn compute_balances(
        &self,
        window: &BalanceWindow,
    ) -> Result<HashMap<String, Amount>, AppError> {
        Ok(self.repo.compute_balances(window).await?)
    }

    /// Sum of all amounts within the window (zero when empty).
    pub async fn compute_total(&self, window: &BalanceWindow) -> Result<Amount, AppError> {
        Ok(self.repo.compute_total(window).await?)
    }

    /// Balances and total for one window, sharing the same "now".
    pub async fn summary(&self, window: &BalanceWindow) -> Result<BankSummary, AppError> {
        let balances = self.compute_balances(window).await?;
        let total = self.compute_total(window).await?;
        tracing::debug!(
            window_hours = window.hours(),
            participants = balances.len(),
            total,
            "computed summary"
        );

        Ok(BankSummary {
            as_of: window.now(),
            window_hours: window.hours(),
            balances: sorted_balances(balances)
                .into_iter()
                .map(|(name, balance)| ParticipantBalance { name, balance })
                .collect(),
            total,
        })
    }

    // ========================
    // Integrity
    // ========================

    /// Verify stored data and cross-check SQL aggregates against the history.
    pub async fn check_integrity(&self, window: &BalanceWindow) -> Result<IntegrityReport, AppError> {
        let stats = self.repo.get_integrity_stats().await?;
        let balances = self.repo.compute_balances(window).await?;
        let total = self.repo.compute_total(window).await?;
        let balances_sum = balances.values().fold(0, |sum: Amount, b| sum.saturating_add(*b));

        // Rows that cannot be decoded make the history unavailable; stats already flag them
        let recomputation_matches = if stats.null_fields == 0 && stats.malformed_timestamps == 0 {
            let history = self.repo.list_entries().await?;
            Some(
                compute_balances(&history, window) == balances
                    && compute_total(&history, window) == total,
            )
        } else {
            None
        };

        Ok(build_integrity_report(
            stats,
            window.hours(),
            total,
            balances_sum,
            recomputation_matches,
        ))
    }
}
