use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

/// A recorded GPX track for one day of riding.
#[derive(Debug, Clone)]
pub struct Track {
    pub points: Vec<TrackPoint>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackMetrics {
    pub distance_km: f64,
    pub elevation_gain_m: f64,
}

impl TrackMetrics {
    pub fn miles(&self) -> f64 {
        self.distance_km * 0.621_371
    }

    pub fn elevation_gain_ft(&self) -> f64 {
        self.elevation_gain_m * 3.280_84
    }
}
