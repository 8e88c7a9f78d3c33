//! Metric fragments: the four independently present categories of a day

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Sleep metrics for one night (from Fitbit or manual entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepData {
    /// Hours spent in bed
    pub time_in_bed: f64,
    /// Hours actually asleep
    pub time_fully_asleep: f64,
    /// Sleep score, 0-100
    pub sleep_score: u32,
    /// Average heart rate while asleep (bpm)
    #[serde(rename = "avgSleepHR")]
    pub avg_sleep_hr: u32,
    /// Bedtime; manual entries may leave it blank
    #[serde(default, with = "hhmm_blank")]
    pub sleep_from: Option<NaiveTime>,
    #[serde(default, with = "hhmm_blank")]
    pub sleep_to: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub nap_from: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub nap_to: Option<NaiveTime>,
    /// Hours asleep during the nap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nap_fully_asleep: Option<f64>,
}

impl SleepData {
    /// Fraction of time in bed spent asleep (0.0 when no time in bed)
    pub fn efficiency(&self) -> f64 {
        if self.time_in_bed > 0.0 {
            self.time_fully_asleep / self.time_in_bed
        } else {
            0.0
        }
    }

    pub fn has_nap(&self) -> bool {
        self.nap_from.is_some() && self.nap_to.is_some()
    }
}

/// Diet metrics for one day (manual entry)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietData {
    pub calories_consumed: i64,
    /// Grams
    pub protein: f64,
    /// Grams
    pub fat: f64,
    /// Grams
    pub carbs: f64,
    /// Grams
    pub sugar: f64,
}

/// Calories burned for one day
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaloriesData {
    pub calories_burned_total: i64,
    pub calories_burned_active: i64,
    #[serde(rename = "caloriesBurnedBMR")]
    pub calories_burned_bmr: i64,
    pub calories_burned_unregistered: i64,
    /// Burned minus consumed. Positive is a deficit, negative a surplus.
    pub calories_deficit: i64,
}

impl CaloriesData {
    /// Build from the three burn components, deriving the total and the
    /// deficit against `consumed`.
    pub fn from_components(active: i64, bmr: i64, unregistered: i64, consumed: i64) -> Self {
        let total = active + bmr + unregistered;
        Self {
            calories_burned_total: total,
            calories_burned_active: active,
            calories_burned_bmr: bmr,
            calories_burned_unregistered: unregistered,
            calories_deficit: total - consumed,
        }
    }

    /// Build from a device-reported total; the unregistered share is whatever
    /// the total does not attribute to activity or BMR.
    pub fn from_reported_total(total: i64, active: i64, bmr: i64) -> Self {
        Self {
            calories_burned_total: total,
            calories_burned_active: active,
            calories_burned_bmr: bmr,
            calories_burned_unregistered: total - active - bmr,
            calories_deficit: 0,
        }
    }
}

/// Body and cardio metrics for one day
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherMetrics {
    /// Morning weight (kg or lbs, whatever the source reports)
    pub weight_morning: f64,
    #[serde(rename = "restingHR")]
    pub resting_hr: u32,
    pub cardio_load_total: u32,
    pub cardio_load: u32,
    pub unregistered_cardio_load: u32,
}

impl OtherMetrics {
    /// Build with the total cardio load derived from its two parts
    pub fn new(weight_morning: f64, resting_hr: u32, cardio_load: u32, unregistered: u32) -> Self {
        Self {
            weight_morning,
            resting_hr,
            cardio_load_total: cardio_load + unregistered,
            cardio_load,
            unregistered_cardio_load: unregistered,
        }
    }
}

/// Fragment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Sleep,
    Diet,
    Calories,
    Other,
}

impl FragmentKind {
    pub const ALL: [FragmentKind; 4] = [Self::Sleep, Self::Diet, Self::Calories, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Diet => "diet",
            Self::Calories => "calories",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category of daily metrics
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Sleep(SleepData),
    Diet(DietData),
    Calories(CaloriesData),
    Other(OtherMetrics),
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Sleep(_) => FragmentKind::Sleep,
            Fragment::Diet(_) => FragmentKind::Diet,
            Fragment::Calories(_) => FragmentKind::Calories,
            Fragment::Other(_) => FragmentKind::Other,
        }
    }
}

impl From<SleepData> for Fragment {
    fn from(data: SleepData) -> Self {
        Fragment::Sleep(data)
    }
}

impl From<DietData> for Fragment {
    fn from(data: DietData) -> Self {
        Fragment::Diet(data)
    }
}

impl From<CaloriesData> for Fragment {
    fn from(data: CaloriesData) -> Self {
        Fragment::Calories(data)
    }
}

impl From<OtherMetrics> for Fragment {
    fn from(data: OtherMetrics) -> Self {
        Fragment::Other(data)
    }
}

const TIME_FORMAT: &str = "%H:%M";

fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
}

/// Serde adapter for `HH:MM` clock times that are stored as `""` when blank
mod hhmm_blank {
    use chrono::NaiveTime;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.collect_str(&t.format(super::TIME_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        super::hhmm_opt::deserialize(deserializer)
    }
}

mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.collect_str(&t.format(super::TIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        // Blank form fields are stored as empty strings
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => super::parse_time(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
