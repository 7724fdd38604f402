use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::day::DayId;
use crate::types::weather::Weather;

/// A GeoJSON position. A third element (altitude) is kept when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    pub lng: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl Position {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat, alt: None }
    }

    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [lng, lat] => Ok(Self::new(*lng, *lat)),
            [lng, lat, alt, ..] => Ok(Self {
                lng: *lng,
                lat: *lat,
                alt: Some(*alt),
            }),
            _ => Err(format!("position needs at least 2 values, got {}", v.len())),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        match p.alt {
            Some(alt) => vec![p.lng, p.lat, alt],
            None => vec![p.lng, p.lat],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Point { coordinates: Position },
}

impl Geometry {
    /// The geometry as drawable line parts. A point yields a single-vertex part.
    pub fn lines(&self) -> Vec<&[Position]> {
        match self {
            Geometry::LineString { coordinates } => vec![coordinates.as_slice()],
            Geometry::MultiLineString { coordinates } => {
                coordinates.iter().map(|line| line.as_slice()).collect()
            }
            Geometry::Point { coordinates } => vec![std::slice::from_ref(coordinates)],
        }
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.lines().into_iter().flatten())
    }
}

/// `[min_lng, min_lat, max_lng, max_lat]`, as produced by turf's `bbox`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn enclosing<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Option<Self> {
        positions.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    min_lng: p.lng,
                    min_lat: p.lat,
                    max_lng: p.lng,
                    max_lat: p.lat,
                },
                Some(b) => Self {
                    min_lng: b.min_lng.min(p.lng),
                    min_lat: b.min_lat.min(p.lat),
                    max_lng: b.max_lng.max(p.lng),
                    max_lat: b.max_lat.max(p.lat),
                },
            })
        })
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        ]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self {
            min_lng: v[0],
            min_lat: v[1],
            max_lng: v[2],
            max_lat: v[3],
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lng, b.min_lat, b.max_lng, b.max_lat]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub day: DayId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    /// Anything else the route file carries, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFeature {
    #[serde(rename = "type", default = "feature_tag")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

impl RouteFeature {
    pub fn new(properties: FeatureProperties, geometry: Geometry) -> Self {
        Self {
            kind: feature_tag(),
            properties,
            geometry,
        }
    }

    pub fn day(&self) -> DayId {
        self.properties.day
    }
}

fn feature_tag() -> String {
    "Feature".to_string()
}

fn collection_tag() -> String {
    "FeatureCollection".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_tag")]
    pub kind: String,
    pub features: Vec<RouteFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<RouteFeature>) -> Self {
        Self {
            kind: collection_tag(),
            features,
        }
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Anything that can say where the map should look for a given day.
pub trait DayFraming {
    fn day_bbox(&self, day: DayId) -> Option<BoundingBox>;
}

/// Route features indexed by day for constant-time lookup.
#[derive(Debug, Clone, Default)]
pub struct RouteIndex {
    collection: FeatureCollection,
    by_day: HashMap<DayId, usize>,
}

impl RouteIndex {
    pub fn new(collection: FeatureCollection) -> Self {
        // A later feature for the same day replaces an earlier one.
        let by_day = collection
            .features
            .iter()
            .enumerate()
            .map(|(idx, feature)| (feature.day(), idx))
            .collect();
        Self { collection, by_day }
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn get(&self, day: DayId) -> Option<&RouteFeature> {
        self.by_day
            .get(&day)
            .and_then(|idx| self.collection.features.get(*idx))
    }

    pub fn properties(&self, day: DayId) -> Option<&FeatureProperties> {
        self.get(day).map(|feature| &feature.properties)
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// Features for days up to and including `through`, ordered by day.
    pub fn through(&self, through: DayId) -> Vec<&RouteFeature> {
        let mut features: Vec<&RouteFeature> = self
            .by_day
            .iter()
            .filter(|(day, _)| **day <= through)
            .filter_map(|(_, idx)| self.collection.features.get(*idx))
            .collect();
        features.sort_by_key(|feature| feature.day());
        features
    }

    /// The box enclosing every route segment ridden by the end of `through`.
    pub fn bbox_through(&self, through: DayId) -> Option<BoundingBox> {
        self.through(through)
            .into_iter()
            .filter_map(|feature| feature.geometry.bbox())
            .reduce(BoundingBox::union)
    }
}

impl DayFraming for RouteIndex {
    fn day_bbox(&self, day: DayId) -> Option<BoundingBox> {
        self.get(day).and_then(|feature| feature.geometry.bbox())
    }
}
