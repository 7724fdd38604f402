use serde::{Deserialize, Serialize};

use crate::types::day::DayId;

/// A manifest entry: one resized photo placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub day: DayId,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoDirection {
    Next,
    Prev,
}

/// Photos already reached by `active_day`, in manifest order.
pub fn visible(photos: &[Photo], active_day: DayId) -> Vec<&Photo> {
    photos.iter().filter(|p| p.day <= active_day).collect()
}

/// Steps from `current_id` through `visible`, wrapping at both ends. Returns
/// `None` when `current_id` is not among the visible photos.
pub fn step<'a>(visible: &[&'a Photo], current_id: &str, direction: PhotoDirection) -> Option<&'a Photo> {
    let idx = visible.iter().position(|p| p.id == current_id)?;
    let len = visible.len();
    let next = match direction {
        PhotoDirection::Next => (idx + 1) % len,
        PhotoDirection::Prev => (idx + len - 1) % len,
    };
    visible.get(next).copied()
}
