use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{BankSummary, LedgerService};
use crate::domain::{format_timestamp, BalanceWindow, Entry};

/// History snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub version: String,
    pub exported_at: DateTime<Local>,
    pub entries: Vec<Entry>,
}

/// Exporter for converting ledger data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the full history to CSV, newest first. Columns mirror the table.
    pub async fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.list_history().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "datetime", "name", "money"])?;

        for entry in &entries {
            csv_writer.write_record([
                entry.id.to_string(),
                format_timestamp(&entry.recorded_at),
                entry.name.clone(),
                entry.amount.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(entries.len())
    }

    /// Export the full history as a JSON snapshot
    pub async fn export_history_json<W: Write>(&self, mut writer: W) -> Result<HistorySnapshot> {
        let snapshot = HistorySnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Local::now(),
            entries: self.service.list_history().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }

    /// Export windowed balances to CSV, followed by a `total` row
    pub async fn export_summary_csv<W: Write>(
        &self,
        writer: W,
        window: &BalanceWindow,
    ) -> Result<BankSummary> {
        let summary = self.service.summary(window).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Names are free text, so the total is told apart by `kind`, not by name
        csv_writer.write_record(["kind", "name", "balance"])?;
        for balance in &summary.balances {
            csv_writer.write_record([
                "participant".to_string(),
                balance.name.clone(),
                balance.balance.to_string(),
            ])?;
        }
        csv_writer.write_record(["total".to_string(), String::new(), summary.total.to_string()])?;

        csv_writer.flush()?;
        Ok(summary)
    }

    /// Export windowed balances as JSON
    pub async fn export_summary_json<W: Write>(
        &self,
        mut writer: W,
        window: &BalanceWindow,
    ) -> Result<BankSummary> {
        let summary = self.service.summary(window).await?;

        let json = serde_json::to_string_pretty(&summary)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(summary)
    }
}
