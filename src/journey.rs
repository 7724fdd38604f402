//! The static content of the journey: route, journal and photo manifest,
//! loaded once at startup and shared read-only by every request.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::DataError;
use crate::types::day::DayId;
use crate::types::journal::{
    DayCard, DaySummary, JournalBook, WeatherStrip, EMPTY_CONTENT, FIRST_ORIGIN, UNKNOWN_DESTINATION,
    UNKNOWN_ORIGIN,
};
use crate::types::photo::Photo;
use crate::types::route::{FeatureCollection, RouteIndex};

#[derive(Debug, Clone)]
pub struct Journey {
    pub route: RouteIndex,
    pub journal: JournalBook,
    pub photos: Vec<Photo>,
    pub stories_dir: PathBuf,
    pub total_days: u16,
}

impl Journey {
    /// Loads the data directory. A missing file means no content yet and is
    /// only warned about; a file that exists but does not parse is an error.
    pub fn load(config: &Config) -> Result<Self, DataError> {
        let route: FeatureCollection = load_json_or_default(&config.route_path())?;
        let journal: JournalBook = load_json_or_default(&config.journal_path())?;
        let photos: Vec<Photo> = load_json_or_default(&config.photos_path())?;

        tracing::info!(
            "Loaded journey: {} route days, {} journal entries, {} photos",
            route.features.len(),
            journal.len(),
            photos.len()
        );

        Ok(Self::from_parts(
            route,
            journal,
            photos,
            config.stories_dir(),
            config.total_days,
        ))
    }

    pub fn from_parts(
        route: FeatureCollection,
        journal: JournalBook,
        photos: Vec<Photo>,
        stories_dir: PathBuf,
        total_days: u16,
    ) -> Self {
        Self {
            route: RouteIndex::new(route),
            journal,
            photos,
            stories_dir,
            total_days,
        }
    }

    /// Parses a day from a path or query and checks it is part of the journey.
    pub fn day(&self, raw: &str) -> Result<DayId, DataError> {
        DayId::parse_within(raw, self.total_days)
    }

    pub fn story_path(&self, day: DayId) -> PathBuf {
        self.stories_dir.join(format!("day-{}.md", day))
    }

    pub fn summaries(&self) -> Vec<DaySummary> {
        DayId::all(self.total_days)
            .map(|day| {
                let entry = self.journal.get(day);
                DaySummary {
                    day,
                    title: entry
                        .map(|e| e.title.clone())
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| UNKNOWN_DESTINATION.to_string()),
                    date: entry.and_then(|e| e.date.clone()).or_else(|| {
                        self.route.properties(day).and_then(|p| p.date.clone())
                    }),
                    metrics: entry.and_then(|e| e.metrics),
                    is_rest_day: entry.is_some_and(|e| e.is_rest_day),
                    has_route: self.route.get(day).is_some(),
                }
            })
            .collect()
    }

    /// Everything the day section shows, with fallbacks for missing content.
    pub fn day_card(&self, day: DayId) -> DayCard {
        let entry = self.journal.get(day);
        let props = self.route.properties(day);

        let origin = if day.is_first() {
            FIRST_ORIGIN.to_string()
        } else {
            day.prev()
                .and_then(|prev| self.journal.get(prev))
                .map(|prev| prev.title.clone())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
        };
        let destination = entry
            .map(|e| e.title.clone())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_DESTINATION.to_string());

        // The recorded date is formatted; a hand-written journal date is shown as is.
        let formatted_date = props
            .and_then(|p| p.date.as_deref())
            .map(format_date)
            .or_else(|| entry.and_then(|e| e.date.clone()));
        let is_rest_day = entry.is_some_and(|e| e.is_rest_day);

        DayCard {
            day,
            origin,
            destination,
            formatted_date,
            is_rest_day,
            weather: props.and_then(|p| p.weather.as_ref()).map(WeatherStrip::from),
            metrics: if is_rest_day {
                None
            } else {
                entry.and_then(|e| e.metrics)
            },
            featured_image: entry.and_then(|e| e.featured_image.clone()),
            image_caption: entry.and_then(|e| e.image_caption.clone()),
            content: entry
                .and_then(|e| e.content.clone())
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| EMPTY_CONTENT.to_string()),
            story_url: format!("/api/days/{}/story", day),
        }
    }
}

/// `2025-05-17` -> `Sat, May 17`. Anything that is not an ISO date is shown
/// as written.
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%a, %B %-d").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, DataError> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{} not found, starting empty", path.display());
            Ok(T::default())
        }
        Err(source) => Err(DataError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads a route file that must exist.
pub fn load_route(path: &Path) -> Result<FeatureCollection, DataError> {
    let bytes = std::fs::read(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}
