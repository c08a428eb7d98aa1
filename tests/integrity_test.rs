mod common;

use anyhow::Result;
use common::{db_path, hours_ago, reference_window, test_service};
use sqlx::SqlitePool;

#[tokio::test]
async fn test_check_on_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let report = service.check_integrity(&reference_window()).await?;
    assert!(report.is_healthy());
    assert_eq!(report.entry_count, 0);
    assert_eq!(report.min_id, None);
    assert_eq!(report.recomputation_matches, Some(true));

    Ok(())
}

#[tokio::test]
async fn test_check_after_undo_reports_gap_but_stays_healthy() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.append_at("Alice", "100", hours_ago(1)).await?;
    service.append_at("Bob", "-40", hours_ago(2)).await?;
    service.delete_most_recent().await?;
    service.append_at("Carol", "15", hours_ago(3)).await?;

    let report = service.check_integrity(&reference_window()).await?;
    assert!(report.is_healthy(), "issues: {:?}", report.issues);
    assert_eq!(report.entry_count, 2);
    // AUTOINCREMENT never reuses the deleted id
    assert!(report.has_id_gaps);
    assert_eq!(report.total, 115);
    assert_eq!(report.balances_sum, 115);

    Ok(())
}

#[tokio::test]
async fn test_check_flags_rows_written_by_other_tools() -> Result<()> {
    let (service, temp) = test_service().await?;
    service.append_at("Alice", "100", hours_ago(1)).await?;

    let url = format!("sqlite:{}", db_path(&temp).display());
    let pool = SqlitePool::connect(&url).await?;
    sqlx::query("INSERT INTO accounts (name, money, datetime) VALUES ('Bob', 5, '15/06/2024 10:00')")
        .execute(&pool)
        .await?;
    sqlx::query("INSERT INTO accounts (name, money, datetime) VALUES (NULL, 5, '2024-06-15 10:00:00')")
        .execute(&pool)
        .await?;
    pool.close().await;

    let report = service.check_integrity(&reference_window()).await?;
    assert!(!report.is_healthy());
    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.recomputation_matches, None);

    Ok(())
}

#[tokio::test]
async fn test_schema_matches_existing_data_files() -> Result<()> {
    let (service, temp) = test_service().await?;
    service.append_at("Alice", "100", hours_ago(1)).await?;

    let url = format!("sqlite:{}", db_path(&temp).display());
    let pool = SqlitePool::connect(&url).await?;
    let (name, money, datetime): (String, i64, String) =
        sqlx::query_as("SELECT name, money, datetime FROM accounts")
            .fetch_one(&pool)
            .await?;
    pool.close().await;

    assert_eq!(name, "Alice");
    assert_eq!(money, 100);
    assert_eq!(datetime, pokerbank::format_timestamp(&hours_ago(1)));

    Ok(())
}
