//! Plain-text output for sync results and month views

use tracking::{DayRow, FragmentKind, MonthView, SyncProgress, SyncResult, date_key};

/// One progress line per processed date
pub fn progress_line(progress: &SyncProgress, failed: bool) -> Option<String> {
    let date = progress.current?;
    Some(format!(
        "[{:>3}/{}] {}{}",
        progress.completed,
        progress.total,
        date_key(date),
        if failed { "  failed" } else { "" }
    ))
}

pub fn print_sync_result(result: &SyncResult) {
    if result.total == 0 {
        println!("Nothing to sync: the range is empty.");
        return;
    }

    println!(
        "\nSynced {} of {} day(s): {} succeeded, {} failed ({:.1}s)",
        result.success + result.failed,
        result.total,
        result.success,
        result.failed,
        result.duration_ms as f64 / 1000.0
    );
    if result.cancelled {
        println!("Sync was cancelled; the last sync date was not updated.");
    } else if !result.marker_saved {
        println!("Warning: the last sync date could not be saved.");
    }
    for error in &result.errors {
        println!("  - {}", error);
    }
}

pub fn print_month(view: &MonthView) {
    println!("{}\n", view.month);
    println!(
        "{:<10}  {:>7} {:>4} {:>5}  {:>6} {:>6} {:>7}  {:>6} {:>4} {:>5}",
        "Date", "Asleep", "Eff", "Score", "Eaten", "Burned", "Balance", "Weight", "RHR", "Load"
    );

    for row in &view.days {
        println!("{}", day_line(row));
    }

    println!("\n+ marks a day with a nap. Balance is burned minus eaten.");
    println!(
        "{} day(s) recorded: {} sleep, {} diet, {} calories, {} other",
        view.recorded_days(),
        view.count(FragmentKind::Sleep),
        view.count(FragmentKind::Diet),
        view.count(FragmentKind::Calories),
        view.count(FragmentKind::Other),
    );
}

fn day_line(row: &DayRow) -> String {
    let record = row.record.as_ref();
    let sleep = record.and_then(|r| r.sleep.as_ref());
    let diet = record.and_then(|r| r.diet.as_ref());
    let calories = record.and_then(|r| r.calories.as_ref());
    let other = record.and_then(|r| r.other.as_ref());

    format!(
        "{:<10}  {:>7} {:>4} {:>5}  {:>6} {:>6} {:>7}  {:>6} {:>4} {:>5}",
        date_key(row.date),
        cell(sleep.map(|s| {
            let nap = if s.has_nap() { "+" } else { "" };
            format!("{:.1}h{}", s.time_fully_asleep, nap)
        })),
        cell(sleep.map(|s| format!("{:.0}%", s.efficiency() * 100.0))),
        cell(sleep.map(|s| s.sleep_score)),
        cell(diet.map(|d| d.calories_consumed)),
        cell(calories.map(|c| c.calories_burned_total)),
        cell(record.and_then(|r| r.calorie_balance())),
        cell(other.map(|o| format!("{:.1}", o.weight_morning))),
        cell(other.map(|o| o.resting_hr)),
        cell(other.map(|o| o.cardio_load_total)),
    )
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
