//! Fitbit Web API HTTP client
//!
//! Provides methods for fetching one day of sleep, activity, weight and
//! heart rate data. Uses synchronous HTTP (ureq) to be executor-agnostic.

use chrono::NaiveDate;
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::FitbitAuth;
use super::api::{ActivityResponse, HeartResponse, SleepResponse, WeightResponse};
use crate::dates::date_key;
use crate::sync::FetchError;

/// Fitbit API client
pub struct FitbitClient {
    auth: FitbitAuth,
    base_url: String,
    max_retries: u32,
}

impl FitbitClient {
    /// Fitbit API base URL for the authenticated user
    const BASE_URL: &'static str = "https://api.fitbit.com/1/user/-";

    /// Create a new Fitbit client
    pub fn new(auth: FitbitAuth) -> Self {
        Self {
            auth,
            base_url: Self::BASE_URL.to_string(),
            max_retries: 3,
        }
    }

    /// Set how many attempts each request gets before failing
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Get a valid access token without starting an interactive login
    pub fn access_token(&self) -> Result<String, FetchError> {
        self.auth.access_token()
    }

    /// Check if the client is authenticated
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Run the interactive authorization flow
    pub fn authenticate(&self) -> anyhow::Result<()> {
        self.auth.login()
    }

    /// Sleep logs for a date
    pub fn sleep(&self, access_token: &str, date: NaiveDate) -> Result<SleepResponse, FetchError> {
        self.get_json(access_token, &format!("/sleep/date/{}.json", date_key(date)))
    }

    /// Activity summary (calories, active minutes) for a date
    pub fn activity(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<ActivityResponse, FetchError> {
        self.get_json(access_token, &format!("/activities/date/{}.json", date_key(date)))
    }

    /// Weight logs for a date
    pub fn weight(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<WeightResponse, FetchError> {
        self.get_json(
            access_token,
            &format!("/body/log/weight/date/{}.json", date_key(date)),
        )
    }

    /// Heart rate summary (resting heart rate) for a date
    pub fn heart(&self, access_token: &str, date: NaiveDate) -> Result<HeartResponse, FetchError> {
        self.get_json(
            access_token,
            &format!("/activities/heart/date/{}/1d.json", date_key(date)),
        )
    }

    /// GET an endpoint with exponential backoff retry on transient failures
    fn get_json<T: DeserializeOwned>(
        &self,
        access_token: &str,
        endpoint: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut delay = Duration::from_millis(100);
        let mut attempt = 1;

        loop {
            match Self::get_json_once(access_token, &url, endpoint) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    debug!(
                        "Retrying {} after attempt {}/{}: {}",
                        endpoint, attempt, self.max_retries, e
                    );
                    // Add jitter to delay
                    let jitter = Duration::from_millis(rand_jitter());
                    std::thread::sleep(delay + jitter);
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn get_json_once<T: DeserializeOwned>(
        access_token: &str,
        url: &str,
        endpoint: &str,
    ) -> Result<T, FetchError> {
        let response = ureq::get(url)
            .header("Authorization", &format!("Bearer {}", access_token))
            .call();

        match response {
            Ok(mut resp) => resp
                .body_mut()
                .read_json::<T>()
                .map_err(|e| FetchError::Decode(format!("{}: {}", endpoint, e))),
            Err(ureq::Error::StatusCode(401)) => Err(FetchError::NotAuthenticated),
            Err(ureq::Error::StatusCode(status)) => Err(FetchError::Http {
                status,
                endpoint: endpoint.to_string(),
            }),
            Err(e) => Err(FetchError::Transport(e.to_string())),
        }
    }
}

/// Generate a random jitter value (0-100ms)
fn rand_jitter() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let hasher = RandomState::new().build_hasher();
    hasher.finish() % 100
}
