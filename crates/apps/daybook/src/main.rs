//! daybook: a personal health tracking journal with Fitbit sync
//!
//! Daily records live in a local SQLite database; Fitbit data is synced
//! one date at a time and merged with manually entered values.

mod cli;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use log::{info, warn};
use tracking::{
    CaloriesInput, DateRangeSyncer, DateStore, DietData, EntryHandler, FitbitAuth, FitbitClient,
    FitbitCredentials, FitbitFetcher, MonthKey, OtherMetricsInput, SleepData,
    SqliteKeyValueStore, SyncObserver, SyncProgress, SyncResult, SyncSettings, date_key,
    month_view, sync_due, today,
};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse_args();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        warn!("Failed to initialize config directory: {}", e);
    }

    let settings = load_settings(cli.db, cli.delay_ms);

    match cli.command {
        Commands::Login => {
            let auth = fitbit_auth()?;
            auth.login()?;
            info!("Fitbit login complete");
        }
        Commands::Logout => {
            fitbit_auth()?.logout()?;
            println!("Logged out of Fitbit.");
        }
        Commands::Status => print_status(&settings)?,
        Commands::Sync { from, to } => {
            let syncer = syncer(&settings)?;
            let result = run_with_progress(|observer| syncer.sync_range(from, to, observer));
            render::print_sync_result(&result);
        }
        Commands::SyncToday => {
            let syncer = syncer(&settings)?;
            let date = syncer.sync_today()?;
            println!("Synced {}.", date_key(date));
        }
        Commands::SyncWeek => {
            let syncer = syncer(&settings)?;
            let result = run_with_progress(|observer| syncer.sync_last_week(observer));
            render::print_sync_result(&result);
        }
        Commands::SyncMonth => {
            let syncer = syncer(&settings)?;
            let result = run_with_progress(|observer| syncer.sync_last_month(observer));
            render::print_sync_result(&result);
        }
        Commands::Show { year, month, json } => {
            let store = open_store(&settings)?;
            let current = MonthKey::current();
            let month = match month {
                Some(month) => MonthKey::new(year.unwrap_or(current.year), month - 1)
                    .context("Month must be between 1 and 12")?,
                None => current,
            };

            let view = month_view(&store, month);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                render::print_month(&view);
            }
        }
        Commands::LogSleep {
            date,
            in_bed,
            asleep,
            score,
            avg_hr,
            from,
            to,
            nap_from,
            nap_to,
            nap_asleep,
        } => {
            let date = date.unwrap_or_else(today);
            let sleep = SleepData {
                time_in_bed: in_bed,
                time_fully_asleep: asleep,
                sleep_score: score,
                avg_sleep_hr: avg_hr,
                sleep_from: from,
                sleep_to: to,
                nap_from,
                nap_to,
                nap_fully_asleep: nap_from.map(|_| nap_asleep.unwrap_or(0.0)),
            };
            entries(&settings)?.record_sleep(date, sleep)?;
            println!("Recorded sleep for {}.", date_key(date));
        }
        Commands::LogDiet {
            date,
            consumed,
            protein,
            fat,
            carbs,
            sugar,
            active,
            bmr,
            unregistered,
        } => {
            let date = date.unwrap_or_else(today);
            let diet = DietData {
                calories_consumed: consumed,
                protein,
                fat,
                carbs,
                sugar,
            };
            let burned = CaloriesInput {
                active,
                bmr,
                unregistered,
            };
            let calories = entries(&settings)?.record_diet(date, diet, burned)?;
            println!(
                "Recorded diet for {}: burned {}, {} {}.",
                date_key(date),
                calories.calories_burned_total,
                if calories.calories_deficit >= 0 { "deficit" } else { "surplus" },
                calories.calories_deficit.abs()
            );
        }
        Commands::LogOther {
            date,
            weight,
            resting_hr,
            cardio_load,
            unregistered_load,
        } => {
            let date = date.unwrap_or_else(today);
            let input = OtherMetricsInput {
                weight_morning: weight,
                resting_hr,
                cardio_load,
                unregistered_cardio_load: unregistered_load,
            };
            let other = entries(&settings)?.record_other(date, input)?;
            println!(
                "Recorded metrics for {}: total cardio load {}.",
                date_key(date),
                other.cardio_load_total
            );
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete all tracked data without --yes");
            }
            open_store(&settings)?.clear_all()?;
            println!("All tracked data deleted.");
        }
    }

    Ok(())
}

/// Settings from settings.json with command-line overrides applied
fn load_settings(db: Option<PathBuf>, delay_ms: Option<u64>) -> SyncSettings {
    let mut settings = SyncSettings::load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable settings: {:#}", e);
        SyncSettings::default()
    });
    if let Some(db) = db {
        settings.database_path = Some(db);
    }
    if let Some(delay_ms) = delay_ms {
        settings.request_delay_ms = delay_ms;
    }
    settings
}

fn open_store(settings: &SyncSettings) -> Result<DateStore> {
    let path = settings.database_path()?;
    let kv = SqliteKeyValueStore::new(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    Ok(DateStore::new(Arc::new(kv)))
}

fn entries(settings: &SyncSettings) -> Result<EntryHandler> {
    Ok(EntryHandler::new(open_store(settings)?))
}

fn fitbit_auth() -> Result<FitbitAuth> {
    let credentials = FitbitCredentials::load().context(
        "Fitbit credentials not found. Set FITBIT_CLIENT_ID and FITBIT_CLIENT_SECRET \
         or create ~/.config/daybook/fitbit-credentials.json",
    )?;
    FitbitAuth::new(credentials)
}

fn syncer(settings: &SyncSettings) -> Result<DateRangeSyncer> {
    let client = FitbitClient::new(fitbit_auth()?).with_max_retries(settings.max_retries);
    if !client.is_authenticated() {
        anyhow::bail!("Not logged in to Fitbit. Run `daybook login` first.");
    }

    let fetcher = Arc::new(FitbitFetcher::new(client));
    Ok(DateRangeSyncer::new(fetcher, open_store(settings)?).with_options(settings.sync_options()))
}

/// Run a range sync, printing one line per processed date
fn run_with_progress(sync: impl FnOnce(&mut dyn SyncObserver) -> SyncResult) -> SyncResult {
    let mut seen_errors = 0;
    let mut observer = |progress: &SyncProgress| {
        let failed = progress.errors.len() > seen_errors;
        seen_errors = progress.errors.len();
        if let Some(line) = render::progress_line(progress, failed) {
            println!("{}", line);
        }
    };
    sync(&mut observer)
}

fn print_status(settings: &SyncSettings) -> Result<()> {
    let credentials = FitbitCredentials::is_available();
    println!(
        "Fitbit credentials: {}",
        if credentials { "configured" } else { "missing" }
    );
    if credentials {
        let logged_in = fitbit_auth()?.is_authenticated();
        println!("Fitbit login:       {}", if logged_in { "yes" } else { "no" });
    }

    let path = settings.database_path()?;
    println!("Database:           {}", path.display());

    let store = open_store(settings)?;
    let records = store.load_all();
    println!("Days recorded:      {}", records.len());
    if let (Some(first), Some(last)) = (records.keys().next(), records.keys().next_back()) {
        println!(
            "Recorded range:     {} to {}",
            date_key(*first),
            date_key(*last)
        );
    }

    let last_sync = store.last_sync_date();
    match last_sync {
        Some(date) => println!("Last sync:          {}", date_key(date)),
        None => println!("Last sync:          never"),
    }
    if sync_due(last_sync, today(), 1) {
        println!("\nA sync is due; run `daybook sync-week`.");
    }

    let month = month_view(&store, MonthKey::current());
    println!(
        "This month:         {} day(s) in {}",
        month.recorded_days(),
        month.month
    );

    Ok(())
}
