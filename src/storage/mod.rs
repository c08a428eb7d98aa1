mod repository;

pub use repository::*;

/// SQL migration for the accounts table
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQL migration for the datetime index
pub const MIGRATION_002_DATETIME_INDEX: &str = include_str!("migrations/002_datetime_index.sql");
