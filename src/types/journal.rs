use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::day::DayId;
use crate::types::weather::Weather;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DayMetrics {
    pub miles: f64,
    /// Feet climbed.
    pub elevation: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<DayMetrics>,
    #[serde(default, alias = "isRestDay")]
    pub is_rest_day: bool,
    #[serde(default, alias = "featuredImage", skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default, alias = "imageCaption", skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
}

/// Every journal entry, keyed by day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalBook(BTreeMap<DayId, JournalEntry>);

impl JournalBook {
    pub fn get(&self, day: DayId) -> Option<&JournalEntry> {
        self.0.get(&day)
    }

    pub fn insert(&mut self, day: DayId, entry: JournalEntry) {
        self.0.insert(day, entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DayId, &JournalEntry)> {
        self.0.iter()
    }
}

impl FromIterator<(DayId, JournalEntry)> for JournalBook {
    fn from_iter<I: IntoIterator<Item = (DayId, JournalEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub const FIRST_ORIGIN: &str = "Austin, TX";
pub const UNKNOWN_ORIGIN: &str = "Previous Stop";
pub const UNKNOWN_DESTINATION: &str = "On the Road";
pub const EMPTY_CONTENT: &str = "No journal entry for this day yet.";
pub const STORY_PLACEHOLDER: &str = "Writing in progress... check back soon!";

/// Row of the day list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: DayId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<DayMetrics>,
    pub is_rest_day: bool,
    pub has_route: bool,
}

/// Everything one day section shows: heading, weather strip, metrics and the
/// short narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCard {
    pub day: DayId,
    pub origin: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_date: Option<String>,
    pub is_rest_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherStrip>,
    /// Hidden on rest days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<DayMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    pub content: String,
    pub story_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherStrip {
    pub code: u16,
    pub description: String,
    pub max: i64,
    pub min: i64,
    /// Only set when it rained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip: Option<String>,
}

impl From<&Weather> for WeatherStrip {
    fn from(w: &Weather) -> Self {
        Self {
            code: w.code,
            description: w.description().to_string(),
            max: w.max.round() as i64,
            min: w.min.round() as i64,
            precip: w.has_precipitation().then(|| format!("{:.2}", w.precip)),
        }
    }
}
