//! Fitbit API response normalization
//!
//! Converts Fitbit API responses to metric fragments.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use super::api::{ActivityResponse, HeartResponse, SleepResponse, WeightResponse};
use crate::models::{CaloriesData, OtherMetrics, SleepData};
use crate::sync::FetchError;

/// Normalize a sleep response.
///
/// Returns `Ok(None)` when no sleep was logged for the day. The main sleep
/// is the entry flagged `isMainSleep` (or the first entry); the first other
/// entry is reported as the nap.
pub fn normalize_sleep(response: &SleepResponse) -> Result<Option<SleepData>, FetchError> {
    let Some(main) = response
        .sleep
        .iter()
        .find(|s| s.is_main_sleep)
        .or_else(|| response.sleep.first())
    else {
        return Ok(None);
    };

    let nap = response
        .sleep
        .iter()
        .find(|s| !s.is_main_sleep && !std::ptr::eq(*s, main));

    let (nap_from, nap_to, nap_fully_asleep) = match nap {
        Some(nap) => (
            Some(clock_time(&nap.start_time)?),
            Some(clock_time(&nap.end_time)?),
            Some(hours(nap.minutes_asleep)),
        ),
        None => (None, None, None),
    };

    let score = response
        .summary
        .as_ref()
        .and_then(|s| s.score)
        .unwrap_or(0.0);

    Ok(Some(SleepData {
        time_in_bed: hours(main.time_in_bed),
        time_fully_asleep: hours(main.minutes_asleep),
        sleep_score: score.round() as u32,
        avg_sleep_hr: main.average_heart_rate.unwrap_or(0.0).round() as u32,
        sleep_from: Some(clock_time(&main.start_time)?),
        sleep_to: Some(clock_time(&main.end_time)?),
        nap_from,
        nap_to,
        nap_fully_asleep,
    }))
}

/// Normalize an activity response into calories burned.
///
/// Returns `None` when the response carries no summary. The deficit needs
/// diet data and is left at zero.
pub fn normalize_calories(response: &ActivityResponse) -> Option<CaloriesData> {
    let summary = response.summary.as_ref()?;
    Some(CaloriesData::from_reported_total(
        summary.calories_out.unwrap_or(0),
        summary.activity_calories.unwrap_or(0),
        summary.calories_bmr.unwrap_or(0),
    ))
}

/// Approximate cardio load from active minutes.
///
/// Fitbit has no direct cardio load figure; very active minutes count
/// double, and the sum is scaled by 1.5.
pub fn cardio_load(very_active_minutes: u32, fairly_active_minutes: u32) -> u32 {
    ((f64::from(very_active_minutes) * 2.0 + f64::from(fairly_active_minutes)) * 1.5).round() as u32
}

/// Combine the body and cardio sources of a day into [`OtherMetrics`].
///
/// Each source is `None` when its request failed. Returns `None` when no
/// source contributed anything; missing values default to zero.
pub fn normalize_other(
    weight: Option<&WeightResponse>,
    heart: Option<&HeartResponse>,
    activity: Option<&ActivityResponse>,
) -> Option<OtherMetrics> {
    let weight_morning = weight.and_then(|w| w.weight.first()).map(|log| log.weight);
    let resting_hr = heart
        .and_then(|h| h.activities_heart.first())
        .map(|day| day.value.resting_heart_rate.unwrap_or(0));
    let load = activity.map(|a| {
        let summary = a.summary.as_ref();
        cardio_load(
            summary.and_then(|s| s.very_active_minutes).unwrap_or(0),
            summary.and_then(|s| s.fairly_active_minutes).unwrap_or(0),
        )
    });

    if weight_morning.is_none() && resting_hr.is_none() && load.is_none() {
        return None;
    }

    Some(OtherMetrics::new(
        weight_morning.unwrap_or(0.0),
        resting_hr.unwrap_or(0),
        load.unwrap_or(0),
        0,
    ))
}

fn hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

/// Hour and minute of a Fitbit local timestamp
fn clock_time(timestamp: &str) -> Result<NaiveTime, FetchError> {
    let parsed = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| FetchError::Decode(format!("bad sleep timestamp {timestamp:?}: {e}")))?;
    let time = parsed.time();
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
        .ok_or_else(|| FetchError::Decode(format!("bad sleep timestamp {timestamp:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_normalize_sleep_with_nap() {
        let response: SleepResponse = serde_json::from_str(
            r#"{
                "sleep": [
                    {
                        "isMainSleep": false, "timeInBed": 50, "minutesAsleep": 45,
                        "startTime": "2025-10-05T14:30:00.000", "endTime": "2025-10-05T15:20:00.000"
                    },
                    {
                        "isMainSleep": true, "timeInBed": 480, "minutesAsleep": 435,
                        "startTime": "2025-10-04T23:12:30.000", "endTime": "2025-10-05T07:12:30.000",
                        "averageHeartRate": 55.6
                    }
                ],
                "summary": { "score": 81.4, "totalMinutesAsleep": 480 }
            }"#,
        )
        .unwrap();

        let sleep = normalize_sleep(&response).unwrap().unwrap();
        assert_eq!(sleep.time_in_bed, 8.0);
        assert_eq!(sleep.time_fully_asleep, 7.25);
        assert_eq!(sleep.sleep_score, 81);
        assert_eq!(sleep.avg_sleep_hr, 56);
        assert_eq!(sleep.sleep_from, Some(time(23, 12)));
        assert_eq!(sleep.sleep_to, Some(time(7, 12)));
        assert_eq!(sleep.nap_from, Some(time(14, 30)));
        assert_eq!(sleep.nap_to, Some(time(15, 20)));
        assert_eq!(sleep.nap_fully_asleep, Some(0.75));
    }

    #[test]
    fn test_normalize_sleep_without_main_flag() {
        let response: SleepResponse = serde_json::from_str(
            r#"{ "sleep": [ {
                "timeInBed": 420, "minutesAsleep": 400,
                "startTime": "2025-10-05T00:05:00.000", "endTime": "2025-10-05T07:05:00.000"
            } ] }"#,
        )
        .unwrap();

        let sleep = normalize_sleep(&response).unwrap().unwrap();
        assert_eq!(sleep.sleep_from, Some(time(0, 5)));
        assert_eq!(sleep.sleep_score, 0);
        assert_eq!(sleep.avg_sleep_hr, 0);
        assert!(!sleep.has_nap());
    }

    #[test]
    fn test_normalize_sleep_empty_day() {
        let response: SleepResponse = serde_json::from_str(r#"{ "sleep": [] }"#).unwrap();
        assert_eq!(normalize_sleep(&response).unwrap(), None);
        assert_eq!(normalize_sleep(&SleepResponse::default()).unwrap(), None);
    }

    #[test]
    fn test_normalize_sleep_bad_timestamp() {
        let response: SleepResponse = serde_json::from_str(
            r#"{ "sleep": [ { "isMainSleep": true, "startTime": "yesterday", "endTime": "today" } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            normalize_sleep(&response),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn test_normalize_calories() {
        let response: ActivityResponse = serde_json::from_str(
            r#"{ "summary": { "caloriesOut": 2650, "activityCalories": 820, "caloriesBMR": 1710 } }"#,
        )
        .unwrap();

        let calories = normalize_calories(&response).unwrap();
        assert_eq!(calories.calories_burned_total, 2650);
        assert_eq!(calories.calories_burned_unregistered, 120);
        assert_eq!(calories.calories_deficit, 0);

        assert_eq!(normalize_calories(&ActivityResponse::default()), None);
    }

    #[test]
    fn test_cardio_load() {
        assert_eq!(cardio_load(0, 0), 0);
        assert_eq!(cardio_load(10, 5), 38);
        assert_eq!(cardio_load(30, 20), 120);
    }

    #[test]
    fn test_normalize_other_all_sources() {
        let weight: WeightResponse =
            serde_json::from_str(r#"{ "weight": [ { "weight": 79.3 }, { "weight": 79.9 } ] }"#)
                .unwrap();
        let heart: HeartResponse = serde_json::from_str(
            r#"{ "activities-heart": [ { "value": { "restingHeartRate": 53 } } ] }"#,
        )
        .unwrap();
        let activity: ActivityResponse = serde_json::from_str(
            r#"{ "summary": { "veryActiveMinutes": 30, "fairlyActiveMinutes": 20 } }"#,
        )
        .unwrap();

        let other = normalize_other(Some(&weight), Some(&heart), Some(&activity)).unwrap();
        assert_eq!(other.weight_morning, 79.3);
        assert_eq!(other.resting_hr, 53);
        assert_eq!(other.cardio_load, 120);
        assert_eq!(other.cardio_load_total, 120);
        assert_eq!(other.unregistered_cardio_load, 0);
    }

    #[test]
    fn test_normalize_other_partial_and_empty() {
        let weight = WeightResponse::default();
        assert_eq!(normalize_other(Some(&weight), None, None), None);
        assert_eq!(normalize_other(None, None, None), None);

        let heart: HeartResponse = serde_json::from_str(
            r#"{ "activities-heart": [ { "value": { "restingHeartRate": 61 } } ] }"#,
        )
        .unwrap();
        let other = normalize_other(None, Some(&heart), None).unwrap();
        assert_eq!(other.resting_hr, 61);
        assert_eq!(other.weight_morning, 0.0);
    }
}
