// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use pokerbank::application::LedgerService;
use pokerbank::domain::BalanceWindow;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::init(db_path(&temp_dir).to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}

/// Fixed reference instant, chosen away from DST transitions
pub fn reference_now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 6, 15, 20, 0, 0)
        .single()
        .unwrap()
}

/// Default 23-hour window ending at the reference instant
pub fn reference_window() -> BalanceWindow {
    BalanceWindow::ending_at(23, reference_now())
}

/// Local wall-clock time `hours` before the reference instant
pub fn hours_ago(hours: i64) -> NaiveDateTime {
    (reference_now() - Duration::hours(hours)).naive_local()
}
