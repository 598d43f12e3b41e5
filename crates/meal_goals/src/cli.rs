//! Command-line surface of the `meal-goals` binary.

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand, ValueEnum};
use meal_history_client::config::Config;

use crate::error::ReportError;
use crate::normalize::parse_iso_datetime;
use crate::service::MealSelection;

#[derive(Debug, Parser)]
#[command(name = "meal-goals", version)]
#[command(about = "Compare meal history to dietary goals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Explicit meal collection name (overrides auto-detect)
    #[arg(long)]
    pub collection: Option<String>,
    /// User id field in meal documents (default: env USER_FIELD or userId)
    #[arg(long)]
    pub user_field: Option<String>,
    /// Timestamp field in meal documents (default: env CREATED_FIELD or createdAt)
    #[arg(long)]
    pub created_field: Option<String>,
    /// Start datetime (e.g. 2025-10-01 or 2025-10-01T00:00)
    #[arg(long, value_parser = parse_bound)]
    pub start: Option<DateTime<FixedOffset>>,
    /// End datetime (e.g. 2025-10-27 or 2025-10-27T23:59)
    #[arg(long, value_parser = parse_bound)]
    pub end: Option<DateTime<FixedOffset>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare each day's meals against the user's goals
    Compare {
        /// User whose meals and goals are compared
        #[arg(long)]
        user_id: String,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Goals collection (default: env GOALS_COLLECTION or goals)
        #[arg(long)]
        goals_collection: Option<String>,
        /// Max documents to scan
        #[arg(long, default_value_t = 1000)]
        limit: u32,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print raw meal documents as JSON
    Fetch {
        /// Filter by user id
        #[arg(long)]
        user_id: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Max documents to return
        #[arg(long, default_value_t = 200)]
        limit: u32,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
}

pub fn parse_bound(s: &str) -> Result<DateTime<FixedOffset>, String> {
    parse_iso_datetime(s).ok_or_else(|| format!("Invalid date/time: {s}"))
}

impl SelectionArgs {
    /// Flags win over configuration. The configured meal collection stays
    /// behind an explicit `--collection` as the next candidate.
    pub fn into_selection(self, config: &Config, user_id: Option<String>, limit: u32) -> MealSelection {
        MealSelection {
            collection: self.collection,
            fallback_collection: config.meal_collection.clone(),
            user_id,
            user_field: self.user_field.unwrap_or_else(|| config.user_field.clone()),
            created_field: self
                .created_field
                .unwrap_or_else(|| config.created_field.clone()),
            start: self.start,
            end: self.end,
            limit,
        }
    }
}

/// Process exit code for a failed run; anything that is not a
/// [`ReportError`] counts as an upstream failure.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ReportError>()
        .map_or(1, ReportError::exit_code)
}
