//! Command-line interface argument parsing for daybook.
//!
//! - `daybook login`
//! - `daybook sync --from 2025-10-01 --to 2025-10-07`
//! - `daybook show --month 10`
//! - `daybook log-diet --consumed 2100 --active 600 --bmr 1700`

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};

/// Personal health tracking journal with Fitbit sync.
#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file (overrides settings.json)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Pause between dates during range syncs, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize access to your Fitbit account
    Login,

    /// Remove stored Fitbit tokens
    Logout,

    /// Show authentication, storage and last sync state
    Status,

    /// Sync an inclusive date range from Fitbit
    Sync {
        /// First date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
    },

    /// Sync today's data from Fitbit
    SyncToday,

    /// Sync the last 7 days, ending today
    SyncWeek,

    /// Sync the last 30 days, ending today
    SyncMonth,

    /// Show one month of tracked data
    Show {
        /// Year; defaults to the current year
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Month (1-12); defaults to the current month
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Print the month as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a night of sleep
    LogSleep {
        /// Date the sleep ended on (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Hours in bed
        #[arg(long)]
        in_bed: f64,

        /// Hours fully asleep
        #[arg(long)]
        asleep: f64,

        /// Sleep score (0-100)
        #[arg(long)]
        score: u32,

        /// Average heart rate while asleep
        #[arg(long, default_value = "0")]
        avg_hr: u32,

        /// Bedtime (HH:MM)
        #[arg(long, value_parser = parse_time)]
        from: Option<NaiveTime>,

        /// Wake-up time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        to: Option<NaiveTime>,

        /// Nap start (HH:MM)
        #[arg(long, value_parser = parse_time, requires = "nap_to")]
        nap_from: Option<NaiveTime>,

        /// Nap end (HH:MM)
        #[arg(long, value_parser = parse_time, requires = "nap_from")]
        nap_to: Option<NaiveTime>,

        /// Hours asleep during the nap
        #[arg(long, requires = "nap_from")]
        nap_asleep: Option<f64>,
    },

    /// Record diet and calories burned
    LogDiet {
        /// Date (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Calories consumed
        #[arg(long)]
        consumed: i64,

        /// Protein in grams
        #[arg(long, default_value = "0")]
        protein: f64,

        /// Fat in grams
        #[arg(long, default_value = "0")]
        fat: f64,

        /// Carbohydrates in grams
        #[arg(long, default_value = "0")]
        carbs: f64,

        /// Sugar in grams
        #[arg(long, default_value = "0")]
        sugar: f64,

        /// Calories burned through activity
        #[arg(long, default_value = "0")]
        active: i64,

        /// Calories burned by basal metabolism
        #[arg(long, default_value = "0")]
        bmr: i64,

        /// Calories burned by activity the tracker missed
        #[arg(long, default_value = "0")]
        unregistered: i64,
    },

    /// Record weight, resting heart rate and cardio load
    LogOther {
        /// Date (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Morning weight
        #[arg(long)]
        weight: f64,

        /// Resting heart rate
        #[arg(long)]
        resting_hr: u32,

        /// Cardio load recorded by the tracker
        #[arg(long, default_value = "0")]
        cardio_load: u32,

        /// Cardio load of activity the tracker missed
        #[arg(long, default_value = "0")]
        unregistered_load: u32,
    },

    /// Delete all tracked data
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    tracking::parse_date_key(s).map_err(|e| e.to_string())
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| format!("invalid time {:?}, expected HH:MM", s))
}
