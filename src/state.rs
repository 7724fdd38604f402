use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::error::SyncError;
use crate::journey::Journey;
use crate::pipeline::sync::{PositionSynchronizer, SyncEvent, SyncOutcome, SyncSettings};
use crate::types::camera::Viewport;
use crate::types::day::DayId;
use crate::types::viz::PreviewFormat;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub journey: Arc<Journey>,
    pub gate: Arc<AuthGate>,
    sessions: Arc<DashMap<Uuid, ViewerSession>>,
    previews: Arc<DashMap<PreviewKey, CachedPreview>>,
}

/// One open page view and the position it is showing.
struct ViewerSession {
    sync: PositionSynchronizer,
    last_seen: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    Still,
    Animation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewKey {
    pub kind: PreviewKind,
    pub day: DayId,
    pub format: PreviewFormat,
}

struct CachedPreview {
    bytes: Arc<Vec<u8>>,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config, journey: Journey) -> Self {
        let gate = AuthGate::new(&config.passphrase, config.auth_window);
        Self {
            config: Arc::new(config),
            journey: Arc::new(journey),
            gate: Arc::new(gate),
            sessions: Arc::new(DashMap::new()),
            previews: Arc::new(DashMap::new()),
        }
    }

    fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            manual_release: self.config.manual_scroll_release,
            visibility_threshold: self.config.visibility_threshold,
            total_days: self.journey.total_days,
        }
    }

    /// Opens a session on day 1 and returns its id.
    pub fn create_session(&self, viewport: Viewport) -> (Uuid, DayId) {
        let id = Uuid::new_v4();
        let sync = PositionSynchronizer::new(viewport, self.sync_settings());
        let active_day = sync.active_day();
        self.sessions.insert(
            id,
            ViewerSession {
                sync,
                last_seen: Instant::now(),
            },
        );
        tracing::info!("Viewer session {} opened ({} active)", id, self.sessions.len());
        (id, active_day)
    }

    /// Runs one UI event through the session's synchronizer. The entry stays
    /// locked for the length of the transition.
    pub fn apply_event(&self, id: Uuid, event: SyncEvent, now: Instant) -> Result<SyncOutcome, SyncError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| SyncError::UnknownSession(id.to_string()))?;
        session.last_seen = now;
        session
            .sync
            .apply(event, &self.journey.route, &self.journey.photos, now)
    }

    pub fn session_active_day(&self, id: Uuid) -> Option<DayId> {
        self.sessions.get(&id).map(|session| session.sync.active_day())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn evict_idle_sessions(&self, ttl: Duration) {
        let now = Instant::now();
        self.sessions
            .retain(|_, session| now.duration_since(session.last_seen) < ttl);
        tracing::info!("Session eviction complete. Open sessions: {}", self.sessions.len());
    }

    pub fn preview(&self, key: &PreviewKey) -> Option<Arc<Vec<u8>>> {
        self.previews.get(key).map(|entry| Arc::clone(&entry.bytes))
    }

    pub fn insert_preview(&self, key: PreviewKey, bytes: Vec<u8>) -> Arc<Vec<u8>> {
        let bytes = Arc::new(bytes);
        self.previews.insert(
            key,
            CachedPreview {
                bytes: Arc::clone(&bytes),
                inserted_at: Instant::now(),
            },
        );
        bytes
    }

    pub fn evict_expired_previews(&self, ttl: Duration) {
        let now = Instant::now();
        self.previews
            .retain(|_, cached| now.duration_since(cached.inserted_at) < ttl);
        tracing::info!("Preview cache eviction complete. Current size: {}", self.previews.len());
    }
}
