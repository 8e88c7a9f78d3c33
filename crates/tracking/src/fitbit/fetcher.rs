//! Per-date fetch from the Fitbit Web API

use chrono::NaiveDate;
use log::{debug, warn};

use super::FitbitClient;
use super::normalize::{normalize_calories, normalize_other, normalize_sleep};
use crate::dates::date_key;
use crate::models::DailyUpdate;
use crate::sync::{DayFetcher, FetchError};

/// [`DayFetcher`] backed by the Fitbit Web API.
///
/// The four endpoints of a date are requested concurrently and joined
/// before the date is returned. Sleep and activity failures fail the date;
/// weight and heart rate are optional and a failure there only drops
/// those values.
pub struct FitbitFetcher {
    client: FitbitClient,
}

impl FitbitFetcher {
    pub fn new(client: FitbitClient) -> Self {
        Self { client }
    }
}

impl DayFetcher for FitbitFetcher {
    fn fetch_day(&self, date: NaiveDate) -> Result<DailyUpdate, FetchError> {
        let client = &self.client;
        let token = client.access_token()?;

        let ((sleep, activity), (weight, heart)) = rayon::join(
            || {
                rayon::join(
                    || client.sleep(&token, date),
                    || client.activity(&token, date),
                )
            },
            || {
                rayon::join(
                    || client.weight(&token, date),
                    || client.heart(&token, date),
                )
            },
        );

        let sleep = sleep?;
        let activity = activity?;
        let weight = optional("weight", date, weight)?;
        let heart = optional("heart rate", date, heart)?;

        let update = DailyUpdate {
            sleep: normalize_sleep(&sleep)?,
            diet: None,
            calories: normalize_calories(&activity),
            other: normalize_other(weight.as_ref(), heart.as_ref(), Some(&activity)),
        };
        debug!(
            "Fetched {} fragment(s) for {}",
            update.len(),
            date_key(date)
        );
        Ok(update)
    }
}

/// Tolerate a failed optional sub-fetch. Authentication failures still
/// fail the date.
fn optional<T>(
    what: &str,
    date: NaiveDate,
    result: Result<T, FetchError>,
) -> Result<Option<T>, FetchError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(FetchError::NotAuthenticated) => Err(FetchError::NotAuthenticated),
        Err(e) => {
            warn!("Skipping {} for {}: {}", what, date_key(date), e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 5).unwrap()
    }

    #[test]
    fn test_optional_passes_values_through() {
        assert_eq!(optional("weight", date(), Ok(81.5)), Ok(Some(81.5)));
    }

    #[test]
    fn test_optional_tolerates_source_errors() {
        let missing: Result<u32, FetchError> = Err(FetchError::Http {
            status: 404,
            endpoint: "/body/log/weight/date/2025-10-05.json".into(),
        });
        assert_eq!(optional("weight", date(), missing), Ok(None));

        let flaky: Result<u32, FetchError> = Err(FetchError::Transport("timed out".into()));
        assert_eq!(optional("heart rate", date(), flaky), Ok(None));
    }

    #[test]
    fn test_optional_keeps_auth_failures() {
        let denied: Result<u32, FetchError> = Err(FetchError::NotAuthenticated);
        assert_eq!(
            optional("heart rate", date(), denied),
            Err(FetchError::NotAuthenticated)
        );
    }
}
