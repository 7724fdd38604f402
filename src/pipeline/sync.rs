//! Keeps one active day consistent across the scrolling day list, the map
//! camera and the day slider.
//!
//! Two sources move the active day. Scroll tracking ([`PositionSynchronizer::observe`])
//! follows whichever day section the reader has scrolled to. Manual input
//! (the slider, "jump to day", photo markers) sets the day directly and
//! holds scroll tracking off until `manual_until`, so the programmatic scroll
//! it triggers cannot drag the day back. The hold is purely time based: a
//! smooth scroll that outlasts it can still be overtaken by the observer.
//!
//! Every transition takes `now` from the caller and returns the camera and
//! scroll commands the client should apply.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::types::camera::{CameraCommand, Padding, Viewport};
use crate::types::day::DayId;
use crate::types::photo::{self, Photo, PhotoDirection};
use crate::types::route::DayFraming;

/// Camera transition when scroll tracking or a closed photo reframes the map.
pub const REFRAME_MS: u32 = 1200;
/// The opening sweep onto day 1 is slower.
pub const FIRST_DAY_REFRAME_MS: u32 = 4000;
/// Manual jumps answer faster than scroll tracking.
pub const MANUAL_REFRAME_MS: u32 = 600;
pub const PHOTO_FLY_MS: u32 = 800;
pub const PHOTO_ZOOM: f64 = 12.0;
pub const DETAIL_ENTER_MS: u32 = 2000;
pub const DETAIL_LEAVE_MS: u32 = 1500;
pub const DETAIL_ZOOM: f64 = 10.0;
pub const DETAIL_PITCH: f64 = 65.0;

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub manual_release: Duration,
    pub visibility_threshold: f64,
    /// Last day of the trip. Events naming a later day are rejected.
    pub total_days: u16,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            manual_release: Duration::from_millis(1200),
            visibility_threshold: 0.1,
            total_days: 70,
        }
    }
}

/// One observer report for one day section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionVisibility {
    pub day: DayId,
    pub intersecting: bool,
    #[serde(default = "fully_visible")]
    pub visible_fraction: f64,
}

fn fully_visible() -> f64 {
    1.0
}

/// UI events a client forwards to its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    Observe { entries: Vec<SectionVisibility> },
    JumpToDay { day: DayId },
    SelectPhoto { photo_id: String },
    NavigatePhoto { direction: PhotoDirection },
    ClosePhoto,
    Resize { width: u32 },
    EnterDetail { day: DayId },
    LeaveDetail,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub active_day: DayId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraCommand>,
    /// Day section the list should scroll into view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_to: Option<DayId>,
}

#[derive(Debug, Clone)]
pub struct PositionSynchronizer {
    active_day: DayId,
    selected_photo: Option<Photo>,
    manual_until: Option<Instant>,
    viewport: Viewport,
    detail_view: bool,
    settings: SyncSettings,
}

impl PositionSynchronizer {
    pub fn new(viewport: Viewport, settings: SyncSettings) -> Self {
        Self {
            active_day: DayId::FIRST,
            selected_photo: None,
            manual_until: None,
            viewport,
            detail_view: false,
            settings,
        }
    }

    pub fn active_day(&self) -> DayId {
        self.active_day
    }

    pub fn selected_photo(&self) -> Option<&Photo> {
        self.selected_photo.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn in_detail_view(&self) -> bool {
        self.detail_view
    }

    /// Whether scroll tracking is currently held off.
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.selected_photo.is_some() || self.manual_until.is_some_and(|until| now < until)
    }

    pub fn apply(
        &mut self,
        event: SyncEvent,
        route: &impl DayFraming,
        photos: &[Photo],
        now: Instant,
    ) -> Result<SyncOutcome, SyncError> {
        let outcome = match event {
            SyncEvent::Observe { entries } => {
                for entry in &entries {
                    self.check_day(entry.day)?;
                }
                self.observe(&entries, route, now)
            }
            SyncEvent::JumpToDay { day } => {
                self.check_day(day)?;
                self.jump_to_day(day, route, now)
            }
            SyncEvent::SelectPhoto { photo_id } => {
                let photo = photos
                    .iter()
                    .find(|p| p.id == photo_id)
                    .ok_or(SyncError::UnknownPhoto(photo_id))?;
                self.select_photo(photo.clone(), now)
            }
            SyncEvent::NavigatePhoto { direction } => self.navigate_photo(direction, photos, now),
            SyncEvent::ClosePhoto => self.close_photo(route),
            SyncEvent::Resize { width } => self.resize(width, route),
            SyncEvent::EnterDetail { day } => {
                self.check_day(day)?;
                self.enter_detail(day, route)
            }
            SyncEvent::LeaveDetail => self.leave_detail(),
            SyncEvent::Reset => self.reset(route),
        };
        Ok(outcome)
    }

    /// Scroll tracking. Ignored while a photo is open or a manual jump is in
    /// flight. When several sections qualify in one report the last one wins,
    /// and at most one reframe is issued.
    pub fn observe(
        &mut self,
        entries: &[SectionVisibility],
        route: &impl DayFraming,
        now: Instant,
    ) -> SyncOutcome {
        if self.is_suppressed(now) {
            return self.outcome(None, None);
        }

        let promoted = entries
            .iter()
            .filter(|entry| entry.intersecting)
            .filter(|entry| entry.visible_fraction >= self.settings.visibility_threshold)
            .filter(|entry| entry.day != self.active_day)
            .filter(|entry| entry.day.get() <= self.settings.total_days)
            .map(|entry| entry.day)
            .last();

        let Some(day) = promoted else {
            return self.outcome(None, None);
        };

        tracing::debug!("scroll tracking moved active day {} -> {}", self.active_day, day);
        self.active_day = day;
        let camera = self.frame_day(route, day, reframe_duration(day));
        self.outcome(camera, None)
    }

    /// Slider drag or "jump to day". Always reframes, even onto the current
    /// day, and holds scroll tracking off for the release window.
    pub fn jump_to_day(&mut self, day: DayId, route: &impl DayFraming, now: Instant) -> SyncOutcome {
        self.manual_until = Some(now + self.settings.manual_release);
        self.active_day = day;
        let camera = self.frame_day(route, day, MANUAL_REFRAME_MS);
        self.outcome(camera, Some(day))
    }

    /// Opening a photo counts as manual input and restarts the hold.
    pub fn select_photo(&mut self, photo: Photo, now: Instant) -> SyncOutcome {
        let camera = self.fly_to_photo(&photo);
        self.selected_photo = Some(photo);
        self.manual_until = Some(now + self.settings.manual_release);
        self.outcome(Some(camera), None)
    }

    /// Moves through the photos visible at the active day, wrapping at either
    /// end. Nothing changes if the open photo is not among them.
    pub fn navigate_photo(
        &mut self,
        direction: PhotoDirection,
        photos: &[Photo],
        now: Instant,
    ) -> SyncOutcome {
        let Some(current) = self.selected_photo.as_ref() else {
            return self.outcome(None, None);
        };
        let visible = photo::visible(photos, self.active_day);
        let Some(next) = photo::step(&visible, &current.id, direction) else {
            return self.outcome(None, None);
        };
        let next = next.clone();
        self.select_photo(next, now)
    }

    /// Closing the photo hands control back to scroll tracking and restores
    /// the active day's framing.
    pub fn close_photo(&mut self, route: &impl DayFraming) -> SyncOutcome {
        self.selected_photo = None;
        self.manual_until = None;
        let camera = self.frame_day(route, self.active_day, reframe_duration(self.active_day));
        self.outcome(camera, None)
    }

    pub fn resize(&mut self, width: u32, route: &impl DayFraming) -> SyncOutcome {
        self.viewport = Viewport::new(width);
        if self.selected_photo.is_some() {
            return self.outcome(None, None);
        }
        let camera = self.frame_day(route, self.active_day, 0);
        self.outcome(camera, None)
    }

    /// The full-story view for `day` makes it the active day, tilts the map
    /// over its route and drops the sidebar offsets.
    pub fn enter_detail(&mut self, day: DayId, route: &impl DayFraming) -> SyncOutcome {
        self.detail_view = true;
        self.active_day = day;
        let camera = CameraCommand::FlyTo {
            center: route.day_bbox(day).map(|bbox| bbox.center()),
            zoom: Some(DETAIL_ZOOM),
            pitch: Some(DETAIL_PITCH),
            bearing: None,
            padding: Padding::NONE,
            duration_ms: DETAIL_ENTER_MS,
        };
        self.outcome(Some(camera), None)
    }

    pub fn leave_detail(&mut self) -> SyncOutcome {
        self.detail_view = false;
        let camera = CameraCommand::FlyTo {
            center: None,
            zoom: None,
            pitch: Some(0.0),
            bearing: Some(0.0),
            padding: self.viewport.padding(),
            duration_ms: DETAIL_LEAVE_MS,
        };
        self.outcome(Some(camera), None)
    }

    /// Back to the top of the list on day 1, as after unlocking the journal.
    pub fn reset(&mut self, route: &impl DayFraming) -> SyncOutcome {
        self.active_day = DayId::FIRST;
        self.selected_photo = None;
        self.manual_until = None;
        self.detail_view = false;
        let camera = self.frame_day(route, DayId::FIRST, FIRST_DAY_REFRAME_MS);
        self.outcome(camera, Some(DayId::FIRST))
    }

    fn check_day(&self, day: DayId) -> Result<(), SyncError> {
        if day.get() > self.settings.total_days {
            return Err(SyncError::DayOutOfRange {
                day: day.get(),
                total: self.settings.total_days,
            });
        }
        Ok(())
    }

    /// Framing for `day`, or `None` when the route has no feature for it.
    fn frame_day(&self, route: &impl DayFraming, day: DayId, duration_ms: u32) -> Option<CameraCommand> {
        let Some(bbox) = route.day_bbox(day) else {
            tracing::debug!("no route feature for day {}, skipping reframe", day);
            return None;
        };
        Some(CameraCommand::FitBounds {
            bbox,
            padding: self.viewport.padding(),
            duration_ms,
        })
    }

    fn fly_to_photo(&self, photo: &Photo) -> CameraCommand {
        CameraCommand::FlyTo {
            center: Some(photo.coordinates),
            zoom: Some(PHOTO_ZOOM),
            pitch: None,
            bearing: None,
            padding: self.viewport.padding(),
            duration_ms: PHOTO_FLY_MS,
        }
    }

    fn outcome(&self, camera: Option<CameraCommand>, scroll_to: Option<DayId>) -> SyncOutcome {
        SyncOutcome {
            active_day: self.active_day,
            selected_photo: self.selected_photo.as_ref().map(|p| p.id.clone()),
            camera,
            scroll_to,
        }
    }
}

fn reframe_duration(day: DayId) -> u32 {
    if day.is_first() {
        FIRST_DAY_REFRAME_MS
    } else {
        REFRAME_MS
    }
}
