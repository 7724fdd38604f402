use serde::{Deserialize, Serialize};

/// Stroke of days already ridden.
pub const PAST_COLOR: &str = "#fdba74";
pub const PAST_OPACITY: f64 = 0.6;
/// Stroke of the active day.
pub const ACTIVE_COLOR: &str = "#f97316";
pub const PHOTO_COLOR: &str = "#475569";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewFormat {
    #[default]
    Post,
    Story,
    Wide,
}

impl PreviewFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "post" => Some(PreviewFormat::Post),
            "story" => Some(PreviewFormat::Story),
            "wide" => Some(PreviewFormat::Wide),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            PreviewFormat::Post => (1080, 1080),
            PreviewFormat::Story => (1080, 1920),
            PreviewFormat::Wide => (1920, 1080),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    /// Width of the active day's line; past days are drawn at 3/4 of it.
    pub stroke_width: f32,
    pub glow: bool,
    pub show_photos: bool,
    pub label: bool,
    /// Delay between animation frames.
    pub frame_delay_ms: u32,
}

impl RenderOptions {
    pub fn for_format(format: PreviewFormat) -> Self {
        let (width, height) = format.dimensions();
        Self {
            width,
            height,
            padding: 80,
            stroke_width: 4.0,
            glow: true,
            show_photos: true,
            label: true,
            frame_delay_ms: 250,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_format(PreviewFormat::default())
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub background: Option<(u8, u8, u8, u8)>,
    /// Caption stamped along the bottom edge, e.g. "Day 12 of 70".
    pub label: Option<String>,
}

impl OutputConfig {
    pub fn for_options(options: &RenderOptions) -> Self {
        Self {
            width: options.width,
            height: options.height,
            // slate-100, the map's backdrop
            background: Some((241, 245, 249, 255)),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
