//! Application state management
//!
//! Author: hephaex@gmail.com

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use cosmo_agent::FirecrawlAgent;
use cosmo_chat::{Assistant, Explorer, Session};
use cosmo_core::{AppConfig, Result, SearchAgent};
use cosmo_graph::GraphRenderer;

/// Session handle; the mutex serializes work on one session
pub type SharedSession = Arc<Mutex<Session>>;

struct SessionEntry {
    session: SharedSession,
    last_access: Instant,
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Ready status
    pub is_ready: AtomicBool,
    /// Exploration pipeline
    pub explorer: Explorer,
    /// Chat dispatch
    pub assistant: Assistant,
    /// Stand-alone graph renderer
    pub renderer: GraphRenderer,
    /// Live sessions with their last access time
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl AppState {
    /// Create new application state with config; the search agent is
    /// enabled when its API key is configured
    pub fn new(config: AppConfig) -> Result<Self> {
        let agent = FirecrawlAgent::from_config(&config.agent)
            .map(|agent| Arc::new(agent) as Arc<dyn SearchAgent>);
        info!(agent_enabled = agent.is_some(), "Initializing application state");

        Ok(Self {
            explorer: Explorer::new(&config)?,
            assistant: Assistant::new(agent),
            renderer: GraphRenderer::new(&config.render),
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            is_ready: AtomicBool::new(true),
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Replace the search agent
    pub fn with_agent(mut self, agent: Arc<dyn SearchAgent>) -> Self {
        self.assistant = Assistant::new(Some(agent));
        self
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.config.server.session_ttl_secs)
    }

    /// Open a new session. Idle sessions are evicted first; at the
    /// `max_sessions` cap the least recently used one makes room.
    pub async fn create_session(&self) -> (Uuid, SharedSession) {
        let now = Instant::now();
        let session = Session::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, now, self.session_ttl());

        let max = self.config.server.max_sessions.max(1);
        while sessions.len() >= max {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!(session_id = %oldest, max, "Session limit reached, evicted least recently used");
        }

        sessions.insert(
            id,
            SessionEntry {
                session: shared.clone(),
                last_access: now,
            },
        );
        (id, shared)
    }

    /// Look up a live session and mark it as used
    pub async fn session(&self, id: Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, now, self.session_ttl());

        sessions.get_mut(&id).map(|entry| {
            entry.last_access = now;
            entry.session.clone()
        })
    }

    /// Drop a session; false if it did not exist
    pub async fn remove_session(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop sessions idle for longer than the TTL as of `now`; returns
    /// how many were removed
    pub async fn evict_idle_sessions(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, now, self.session_ttl())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| now.saturating_duration_since(entry.last_access) <= ttl);

    let evicted = before - sessions.len();
    if evicted > 0 {
        info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = AppState::new(AppConfig::default()).unwrap();

        let (id, _) = state.create_session().await;
        assert_eq!(state.session_count().await, 1);
        assert!(state.session(id).await.is_some());

        assert!(state.remove_session(id).await);
        assert!(!state.remove_session(id).await);
        assert!(state.session(id).await.is_none());
    }

    fn config(ttl: u64, max_sessions: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.session_ttl_secs = ttl;
        config.server.max_sessions = max_sessions;
        config
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let state = AppState::new(config(60, 100)).unwrap();
        let (a, _) = state.create_session().await;
        let (b, _) = state.create_session().await;

        // Nothing is idle yet
        assert_eq!(state.evict_idle_sessions(Instant::now()).await, 0);
        assert_eq!(state.session_count().await, 2);

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(state.evict_idle_sessions(later).await, 2);
        assert_eq!(state.session_count().await, 0);
        assert!(state.session(a).await.is_none());
        assert!(state.session(b).await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_keeps_session_alive() {
        let state = AppState::new(config(60, 100)).unwrap();
        let (a, _) = state.create_session().await;
        let (b, _) = state.create_session().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(state.session(a).await.is_some());
        let touched = Instant::now();

        // `a` was used 50ms after `b` was last seen; a cut-off between the
        // two expiry times keeps only `a`
        let cutoff = touched + Duration::from_secs(60) - Duration::from_millis(25);
        assert_eq!(state.evict_idle_sessions(cutoff).await, 1);
        assert!(state.session(a).await.is_some());
        assert!(state.session(b).await.is_none());
    }

    #[tokio::test]
    async fn test_session_cap_evicts_least_recently_used() {
        let state = AppState::new(config(3600, 2)).unwrap();
        let (a, _) = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (b, _) = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(state.session(a).await.is_some());
        tokio::time::sleep(Duration::from_millis(5)).await;

        let (c, _) = state.create_session().await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.session(a).await.is_some());
        assert!(state.session(b).await.is_none());
        assert!(state.session(c).await.is_some());
    }

    #[test]
    fn test_agent_disabled_without_key() {
        let state = AppState::new(AppConfig::default()).unwrap();
        assert!(!state.assistant.has_agent());
        assert!(state.is_ready());
    }
}
