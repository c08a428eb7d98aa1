use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{BankSummary, LedgerConfig, LedgerService, DEFAULT_DATABASE_PATH};
use crate::domain::{
    format_signed, format_timestamp, BalanceWindow, Entry, DEFAULT_WINDOW_HOURS,
};
use crate::logging::init_tracing;

/// Pokerbank - shared poker bank ledger
#[derive(Parser)]
#[command(name = "pokerbank")]
#[command(about = "Track deposits and withdrawals into a shared poker bank")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, global = true, default_value = DEFAULT_DATABASE_PATH)]
    pub database: String,

    /// Length of the trailing balance window, in hours
    #[arg(long, global = true, default_value_t = DEFAULT_WINDOW_HOURS)]
    pub window_hours: u32,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database (safe to run on an existing one)
    Init,

    /// Record a deposit (positive) or withdrawal (negative)
    #[command(allow_negative_numbers = true)]
    Add {
        /// Participant name
        name: String,

        /// Whole amount, e.g. "100" or "-50"
        amount: String,

        /// Record at a given local time (YYYY-MM-DD HH:MM:SS, defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Delete the most recently recorded entry
    Undo,

    /// Show recorded entries, newest first
    History {
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show balances and the bank total within the window
    Balance {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: history, summary
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Verify ledger integrity
    Check,
}

impl Cli {
    pub fn config(&self) -> LedgerConfig {
        LedgerConfig::new(self.database.clone()).with_window_hours(self.window_hours)
    }

    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        let config = self.config();
        let service = LedgerService::open(&config)
            .await
            .with_context(|| format!("Failed to open database: {}", config.database_path))?;

        let result = run_command(&service, &config, self.command).await;
        service.close().await;
        result
    }
}

async fn run_command(service: &LedgerService, config: &LedgerConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Database initialized: {}", config.database_path);
        }

        Commands::Add { name, amount, at } => {
            let entry = match at {
                Some(at) => {
                    let recorded_at = LedgerService::parse_timestamp(&at)?;
                    service.append_at(&name, &amount, recorded_at).await?
                }
                None => service.append(&name, &amount).await?,
            };
            println!(
                "Recorded: {} {} ({})",
                entry.name,
                format_signed(entry.amount),
                format_timestamp(&entry.recorded_at)
            );
            println!();
            print_summary(&service.summary(&config.window()).await?);
        }

        Commands::Undo => match service.delete_most_recent().await? {
            Some(entry) => println!(
                "Deleted: {} {} ({})",
                entry.name,
                format_signed(entry.amount),
                format_timestamp(&entry.recorded_at)
            ),
            None => println!("No entries to delete."),
        },

        Commands::History { limit } => {
            let entries = match limit {
                Some(limit) => service.list_recent(limit).await?,
                None => service.list_history().await?,
            };

            if entries.is_empty() {
                println!("No entries found.");
            } else {
                println!(
                    "{:<20} {:<20} {:>10} {:<10}",
                    "DATETIME", "NAME", "MONEY", "KIND"
                );
                println!("{}", "-".repeat(63));
                for entry in entries {
                    println!(
                        "{:<20} {:<20} {:>10} {:<10}",
                        format_timestamp(&entry.recorded_at),
                        truncate(&entry.name, 20),
                        format_signed(entry.amount),
                        entry_kind(&entry)
                    );
                }
            }
        }

        Commands::Balance { format } => {
            let summary = service.summary(&config.window()).await?;
            match format.as_str() {
                "table" => print_summary(&summary),
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
            }
        }

        Commands::Export {
            export_type,
            output,
            format,
        } => {
            run_export_command(
                service,
                &config.window(),
                &export_type,
                output.as_deref(),
                &format,
            )
            .await?;
        }

        Commands::Check => {
            run_check_command(service, &config.window()).await?;
        }
    }

    Ok(())
}

fn print_summary(summary: &BankSummary) {
    println!("Now in bank: {}", summary.total);
    println!();
    if summary.is_empty() {
        println!(
            "No entries in the last {} hours.",
            summary.window_hours
        );
    } else {
        println!("{:<20} {:>10}", "NAME", "MONEY");
        println!("{}", "-".repeat(31));
        for balance in &summary.balances {
            println!(
                "{:<20} {:>10}",
                truncate(&balance.name, 20),
                balance.balance
            );
        }
    }
}

async fn run_export_command(
    service: &LedgerService,
    window: &BalanceWindow,
    export_type: &str,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match (export_type, format) {
        ("history", "csv") => exporter.export_history_csv(writer).await?,
        ("history", "json") => exporter.export_history_json(writer).await?.entries.len(),
        ("summary", "csv") => exporter.export_summary_csv(writer, window).await?.balances.len(),
        ("summary", "json") => exporter.export_summary_json(writer, window).await?.balances.len(),
        ("history" | "summary", _) => {
            anyhow::bail!("Invalid format '{}'. Valid formats: csv, json", format);
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: history, summary",
                export_type
            );
        }
    };

    if output.is_some() {
        eprintln!("Exported {} {} rows", count, export_type);
    }

    Ok(())
}

async fn run_check_command(service: &LedgerService, window: &BalanceWindow) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity(window).await?;

    println!("Entries:   {}", report.entry_count);
    if let (Some(min), Some(max)) = (report.min_id, report.max_id) {
        println!(
            "Id range:  {}..={}{}",
            min,
            max,
            if report.has_id_gaps { " (with gaps)" } else { "" }
        );
    }
    println!();

    println!("Last {} hours:", report.window_hours);
    println!("  {:<16} {:>10}", "Total:", report.total);
    println!("  {:<16} {:>10}", "Sum of balances:", report.balances_sum);
    println!(
        "  {:<16} {:>10}",
        "Recomputation:",
        match report.recomputation_matches {
            Some(true) => "OK",
            Some(false) => "MISMATCH!",
            None => "skipped",
        }
    );
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}

fn entry_kind(entry: &Entry) -> &'static str {
    if entry.is_deposit() {
        "deposit"
    } else if entry.is_withdrawal() {
        "withdrawal"
    } else {
        "-"
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_negative_amount() {
        let cli = Cli::try_parse_from(["pokerbank", "add", "Bob", "-50"]).unwrap();
        match cli.command {
            Commands::Add { name, amount, at } => {
                assert_eq!(name, "Bob");
                assert_eq!(amount, "-50");
                assert!(at.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_global_options_build_config() {
        let cli = Cli::try_parse_from([
            "pokerbank",
            "balance",
            "--database",
            "bank.db",
            "--window-hours",
            "12",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.database_path, "bank.db");
        assert_eq!(config.window_hours, 12);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pokerbank", "history"]).unwrap();
        assert_eq!(cli.config(), LedgerConfig::default());
    }

    #[test]
    fn test_entry_kind() {
        let mut entry = Entry {
            id: 1,
            name: "Alice".into(),
            amount: 100,
            recorded_at: crate::domain::local_now(),
        };
        assert_eq!(entry_kind(&entry), "deposit");

        entry.amount = -40;
        assert_eq!(entry_kind(&entry), "withdrawal");

        entry.amount = 0;
        assert_eq!(entry_kind(&entry), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Alice", 20), "Alice");
        assert_eq!(truncate("Bartholomew the Third", 10), "Barthol...");
    }
}
