//! Turns per-day GPX recordings into the route file the map serves.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde_json::{Map, Value};

use crate::error::ImportError;
use crate::pipeline::parse;
use crate::types::day::DayId;
use crate::types::route::{FeatureCollection, FeatureProperties, Geometry, Position, RouteFeature, RouteIndex};
use crate::types::track::{Track, TrackMetrics, TrackPoint};

/// Vertices kept per day; the map does not need more.
const MAX_POINTS: usize = 1000;

pub fn compute_metrics(points: &[TrackPoint]) -> TrackMetrics {
    let mut distance_km = 0.0;
    let mut elevation_gain_m = 0.0;

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        distance_km += haversine_distance(prev.lat, prev.lon, curr.lat, curr.lon);

        if let (Some(prev_ele), Some(curr_ele)) = (prev.elevation, curr.elevation) {
            let gain = curr_ele - prev_ele;
            if gain > 0.0 {
                elevation_gain_m += gain;
            }
        }
    }

    TrackMetrics {
        distance_km,
        elevation_gain_m,
    }
}

/// One route feature for `day`. The date is taken from the first timestamped
/// point; `miles` and `elevation_ft` land in the feature's extra properties.
pub fn build_feature(day: DayId, track: &Track) -> Result<RouteFeature, ImportError> {
    if track.points.len() < 2 {
        return Err(ImportError::InsufficientPoints(track.points.len()));
    }

    let metrics = compute_metrics(&track.points);
    let date = track
        .points
        .iter()
        .find_map(|p| p.time)
        .map(|t| t.date_naive().format("%Y-%m-%d").to_string());

    let coordinates = downsample(&track.points, MAX_POINTS)
        .into_iter()
        .map(|p| Position {
            lng: p.lon,
            lat: p.lat,
            alt: p.elevation,
        })
        .collect();

    let mut extra = Map::new();
    extra.insert("miles".to_string(), Value::from(round_to(metrics.miles(), 1)));
    extra.insert(
        "elevation_ft".to_string(),
        Value::from(metrics.elevation_gain_ft().round()),
    );

    Ok(RouteFeature::new(
        FeatureProperties {
            day,
            date,
            weather: None,
            extra,
        },
        Geometry::LineString { coordinates },
    ))
}

/// `day-12.gpx` -> day 12.
pub fn day_from_file_name(name: &str) -> Option<DayId> {
    let stem = name.strip_suffix(".gpx").or_else(|| name.strip_suffix(".GPX"))?;
    stem.strip_prefix("day-")?.parse().ok()
}

/// Builds the route from every `day-<N>.gpx` in `input_dir`. Weather recorded
/// in `previous` is carried over day by day. Files that fail to parse are
/// skipped with a warning.
pub fn import_directory(
    input_dir: &Path,
    previous: Option<&RouteIndex>,
) -> Result<FeatureCollection, ImportError> {
    fs::metadata(input_dir).map_err(|source| ImportError::Io {
        path: input_dir.to_path_buf(),
        source,
    })?;

    let files: Vec<(DayId, PathBuf)> = WalkBuilder::new(input_dir)
        .max_depth(Some(1))
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter_map(|entry| {
            let day = entry.file_name().to_str().and_then(day_from_file_name)?;
            Some((day, entry.into_path()))
        })
        .collect();

    let mut features = Vec::with_capacity(files.len());
    for (day, path) in files {
        match import_file(day, &path) {
            Ok(mut feature) => {
                if let Some(props) = previous.and_then(|route| route.properties(day)) {
                    feature.properties.weather = props.weather;
                    if feature.properties.date.is_none() {
                        feature.properties.date = props.date.clone();
                    }
                }
                features.push(feature);
            }
            Err(err) => tracing::warn!("Skipping {}: {}", path.display(), err),
        }
    }
    features.sort_by_key(RouteFeature::day);

    tracing::info!("Imported {} days of route from {}", features.len(), input_dir.display());
    Ok(FeatureCollection::new(features))
}

fn import_file(day: DayId, path: &Path) -> Result<RouteFeature, ImportError> {
    let bytes = fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let track = parse::parse_gpx(&bytes).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    build_feature(day, &track)
}

pub fn write_route(path: &Path, route: &FeatureCollection) -> Result<(), ImportError> {
    let json = serde_json::to_vec_pretty(route)?;
    fs::write(path, json).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Largest-triangle-three-buckets over (index, elevation), keeping the first
/// and last point.
fn downsample(data: &[TrackPoint], threshold: usize) -> Vec<&TrackPoint> {
    if threshold >= data.len() || threshold < 3 {
        return data.iter().collect();
    }

    let mut sampled = Vec::with_capacity(threshold);
    sampled.push(&data[0]);

    let bucket_size = (data.len() - 2) as f64 / (threshold - 2) as f64;
    let mut a = 0;

    for i in 0..(threshold - 2) {
        let avg_range_start = ((i + 1) as f64 * bucket_size).floor() as usize + 1;
        let avg_range_end = (((i + 2) as f64 * bucket_size).floor() as usize + 1).min(data.len());

        let avg_x = (avg_range_start + avg_range_end) as f64 / 2.0;
        let avg_y = data[avg_range_start..avg_range_end]
            .iter()
            .filter_map(|p| p.elevation)
            .sum::<f64>()
            / (avg_range_end - avg_range_start).max(1) as f64;

        let range_start = (i as f64 * bucket_size).floor() as usize + 1;
        let range_end = ((i + 1) as f64 * bucket_size).floor() as usize + 1;

        let point_a_x = a as f64;
        let point_a_y = data[a].elevation.unwrap_or(0.0);

        let mut max_area = -1.0;
        let mut max_area_point = range_start;
        for (s, point) in data.iter().enumerate().take(range_end).skip(range_start) {
            let area = ((point_a_x - avg_x) * (point.elevation.unwrap_or(0.0) - point_a_y)
                - (point_a_x - s as f64) * (avg_y - point_a_y))
                .abs();
            if area > max_area {
                max_area = area;
                max_area_point = s;
            }
        }

        sampled.push(&data[max_area_point]);
        a = max_area_point;
    }

    sampled.push(&data[data.len() - 1]);
    sampled
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    R * c
}
