use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

pub const DEFAULT_PASSPHRASE: &str = "whatever the weather";
const DEV_JWT_SECRET: &str = "ridejournal-dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Holds route.json, journal.json, photos.json, journal/ and photos/.
    pub data_dir: PathBuf,
    pub passphrase: String,
    pub jwt_secret: String,
    /// How long a correct passphrase keeps the journal unlocked.
    pub auth_window: Duration,
    pub total_days: u16,
    pub trip_start: NaiveDate,
    /// How long a manual jump keeps scroll tracking from taking over.
    pub manual_scroll_release: Duration,
    /// Minimum visible fraction for a day section to count as reached.
    pub visibility_threshold: f64,
    pub session_ttl: Duration,
    pub preview_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            passphrase: DEFAULT_PASSPHRASE.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            auth_window: Duration::from_secs(24 * 60 * 60),
            total_days: 70,
            trip_start: NaiveDate::from_ymd_opt(2025, 5, 17).unwrap_or_default(),
            manual_scroll_release: Duration::from_millis(1200),
            visibility_threshold: 0.1,
            session_ttl: Duration::from_secs(3600),
            preview_cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let auth_window_hours: u64 = env_parse("AUTH_WINDOW_HOURS").unwrap_or(24);
        let manual_release_ms: u64 = env_parse("MANUAL_SCROLL_RELEASE_MS").unwrap_or(1200);
        let session_ttl_seconds: u64 = env_parse("SESSION_TTL_SECONDS").unwrap_or(3600);
        let preview_ttl_seconds: u64 = env_parse("PREVIEW_CACHE_TTL_SECONDS").unwrap_or(3600);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            defaults.jwt_secret.clone()
        });

        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            passphrase: std::env::var("JOURNEY_PASSPHRASE").unwrap_or(defaults.passphrase),
            jwt_secret,
            auth_window: Duration::from_secs(auth_window_hours * 3600),
            total_days: env_parse("TOTAL_DAYS")
                .filter(|days| *days > 0)
                .unwrap_or(defaults.total_days),
            trip_start: std::env::var("TRIP_START_DATE")
                .ok()
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
                .unwrap_or(defaults.trip_start),
            manual_scroll_release: Duration::from_millis(manual_release_ms),
            visibility_threshold: env_parse("VISIBILITY_THRESHOLD")
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.visibility_threshold),
            session_ttl: Duration::from_secs(session_ttl_seconds),
            preview_cache_ttl: Duration::from_secs(preview_ttl_seconds),
        }
    }

    pub fn route_path(&self) -> PathBuf {
        self.data_dir.join("route.json")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal.json")
    }

    pub fn photos_path(&self) -> PathBuf {
        self.data_dir.join("photos.json")
    }

    pub fn stories_dir(&self) -> PathBuf {
        self.data_dir.join("journal")
    }

    pub fn photo_files_dir(&self) -> PathBuf {
        self.data_dir.join("photos")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
