use serde::{Deserialize, Serialize};

use crate::types::route::BoundingBox;

/// Viewports narrower than this get the bottom-sheet layout.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Padding {
    /// Sidebar on the left third of the screen.
    pub const DESKTOP: Padding = Padding {
        top: 50,
        bottom: 50,
        left: 450,
        right: 50,
    };
    /// Sheet over the bottom of the screen.
    pub const MOBILE: Padding = Padding {
        top: 50,
        bottom: 250,
        left: 20,
        right: 20,
    };
    pub const NONE: Padding = Padding {
        top: 0,
        bottom: 0,
        left: 0,
        right: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
}

impl Viewport {
    pub fn new(width: u32) -> Self {
        Self { width }
    }

    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_BREAKPOINT
    }

    pub fn padding(&self) -> Padding {
        if self.is_mobile() {
            Padding::MOBILE
        } else {
            Padding::DESKTOP
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280 }
    }
}

/// An instruction for the map camera. The client starts it right away; a
/// newer command simply interrupts an animation still in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraCommand {
    FitBounds {
        bbox: BoundingBox,
        padding: Padding,
        duration_ms: u32,
    },
    FlyTo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        center: Option<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zoom: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pitch: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bearing: Option<f64>,
        padding: Padding,
        duration_ms: u32,
    },
}

impl CameraCommand {
    pub fn duration_ms(&self) -> u32 {
        match self {
            CameraCommand::FitBounds { duration_ms, .. } | CameraCommand::FlyTo { duration_ms, .. } => {
                *duration_ms
            }
        }
    }
}
