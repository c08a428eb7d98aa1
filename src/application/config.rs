use crate::domain::{BalanceWindow, DEFAULT_WINDOW_HOURS};

/// Default database file, shared with existing installs.
pub const DEFAULT_DATABASE_PATH: &str = "poker_accounting.db";

/// Runtime settings for a ledger session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub database_path: String,
    pub window_hours: u32,
}

impl LedgerConfig {
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }

    pub fn with_window_hours(mut self, hours: u32) -> Self {
        self.window_hours = hours;
        self
    }

    /// SQLite URL that creates the file when missing.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path)
    }

    /// A window of the configured length ending now.
    pub fn window(&self) -> BalanceWindow {
        BalanceWindow::trailing(self.window_hours)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.database_path, "poker_accounting.db");
        assert_eq!(config.window_hours, 23);
        assert_eq!(config.database_url(), "sqlite:poker_accounting.db?mode=rwc");
    }

    #[test]
    fn test_window_uses_configured_hours() {
        let config = LedgerConfig::new("bank.db").with_window_hours(6);
        assert_eq!(config.window().hours(), 6);
    }
}
