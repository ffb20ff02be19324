//! Command-line argument definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// FreshBooks weekly time summary and invoicing CLI.
#[derive(Debug, Parser)]
#[command(name = "freshlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authenticate with FreshBooks via OAuth.
    Setup,

    /// Refresh OAuth tokens (cron-friendly: silent on success).
    Refresh,

    /// Show the weekly time summary grouped by client.
    Weekly {
        /// Show the week containing this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        week_of: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List clients with their IDs.
    Clients,

    /// Create an invoice for all unbilled time entries for a client.
    Invoice {
        /// Client ID to invoice.
        client_id: u64,

        /// Override the hourly rate for this run.
        #[arg(long)]
        rate: Option<String>,

        /// Override the currency code (default: config or USD).
        #[arg(long)]
        currency: Option<String>,

        /// Show what would be invoiced without creating it.
        #[arg(long)]
        dry_run: bool,

        /// Add notes to the invoice.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Log a time entry.
    Log {
        /// Note for the time entry.
        #[arg(short, long)]
        message: String,

        /// Duration, e.g. 2h, 30m, 1h30m.
        #[arg(short, long)]
        duration: String,

        /// Client ID (overrides .freshlog.json).
        #[arg(long)]
        client: Option<u64>,

        /// Project ID (overrides .freshlog.json).
        #[arg(long)]
        project: Option<u64>,

        /// Service ID (overrides .freshlog.json).
        #[arg(long)]
        service: Option<u64>,

        /// Mark as non-billable.
        #[arg(long)]
        no_billable: bool,
    },

    /// Start a time tracking timer.
    Start {
        /// Note for the time entry.
        #[arg(short, long)]
        message: Option<String>,

        /// Client ID (overrides .freshlog.json).
        #[arg(long)]
        client: Option<u64>,

        /// Project ID (overrides .freshlog.json).
        #[arg(long)]
        project: Option<u64>,

        /// Service ID (overrides .freshlog.json).
        #[arg(long)]
        service: Option<u64>,

        /// Mark as non-billable.
        #[arg(long)]
        no_billable: bool,
    },

    /// Stop the running timer and log the time entry.
    Stop {
        /// Override the note set at start.
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show the current timer status.
    Status,

    /// Initialize .freshlog.json in the current directory.
    Init,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD.".to_string())
}
