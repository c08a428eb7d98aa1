use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::Amount;
use crate::storage::IntegrityStats;

/// Windowed balances and total computed from a single "now".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub as_of: DateTime<Local>,
    pub window_hours: u32,
    /// Sorted by participant name
    pub balances: Vec<ParticipantBalance>,
    pub total: Amount,
}

impl BankSummary {
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn balance_of(&self, name: &str) -> Option<Amount> {
        self.balances
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.balance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub name: String,
    pub balance: Amount,
}

/// Result of a ledger integrity check.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub entry_count: i64,
    pub min_id: Option<i64>,
    pub max_id: Option<i64>,
    /// Informational: deleting the most recent entry leaves gaps by design of the store
    pub has_id_gaps: bool,
    pub window_hours: u32,
    /// Total computed by SQL aggregation
    pub total: Amount,
    /// Sum of the per-participant balances computed by SQL aggregation
    pub balances_sum: Amount,
    /// Whether an in-memory recomputation over the history matched SQL.
    /// `None` when the history could not be loaded.
    pub recomputation_matches: Option<bool>,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Assemble an integrity report from storage statistics and the aggregated figures.
pub fn build_integrity_report(
    stats: IntegrityStats,
    window_hours: u32,
    total: Amount,
    balances_sum: Amount,
    recomputation_matches: Option<bool>,
) -> IntegrityReport {
    let mut issues = Vec::new();

    if stats.null_fields > 0 {
        issues.push(format!(
            "{} entries are missing a name or amount",
            stats.null_fields
        ));
    }
    if stats.malformed_timestamps > 0 {
        issues.push(format!(
            "{} entries have a datetime not in YYYY-MM-DD HH:MM:SS format",
            stats.malformed_timestamps
        ));
    }
    if total != balances_sum {
        issues.push(format!(
            "Total {} does not equal the sum of balances {}",
            total, balances_sum
        ));
    }
    if recomputation_matches == Some(false) {
        issues.push("Stored aggregates disagree with a recomputation over the history".to_string());
    }

    IntegrityReport {
        entry_count: stats.entry_count,
        min_id: stats.min_id,
        max_id: stats.max_id,
        has_id_gaps: stats.has_id_gaps,
        window_hours,
        total,
        balances_sum,
        recomputation_matches,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_stats() -> IntegrityStats {
        IntegrityStats {
            entry_count: 3,
            min_id: Some(1),
            max_id: Some(4),
            has_id_gaps: true,
            null_fields: 0,
            malformed_timestamps: 0,
        }
    }

    #[test]
    fn test_id_gaps_are_not_an_issue() {
        let report = build_integrity_report(clean_stats(), 23, 75, 75, Some(true));
        assert!(report.is_healthy());
        assert!(report.has_id_gaps);
    }

    #[test]
    fn test_report_flags_bad_rows() {
        let stats = IntegrityStats {
            null_fields: 1,
            malformed_timestamps: 2,
            ..clean_stats()
        };
        let report = build_integrity_report(stats, 23, 0, 0, None);
        assert!(!report.is_healthy());
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_report_flags_inconsistent_totals() {
        let report = build_integrity_report(clean_stats(), 23, 10, 12, Some(false));
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_balance_of() {
        let summary = BankSummary {
            as_of: Local::now(),
            window_hours: 23,
            balances: vec![ParticipantBalance {
                name: "Alice".into(),
                balance: 125,
            }],
            total: 125,
        };
        assert_eq!(summary.balance_of("Alice"), Some(125));
        assert_eq!(summary.balance_of("Bob"), None);
        assert!(!summary.is_empty());
    }
}
