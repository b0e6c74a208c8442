//! Live session registry.
//!
//! Sessions are keyed by an opaque id carried in a browser cookie. Each one
//! owns its state and its in-flight inference slot; nothing is shared
//! between sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use llamaocr_core::InflightSlot;

use crate::context::{SessionContext, SessionLimits};

pub type SessionId = Uuid;

/// One user's session.
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    context: Mutex<SessionContext>,
    inflight: InflightSlot,
    last_seen: StdMutex<Instant>,
}

impl Session {
    fn new(id: SessionId, limits: SessionLimits) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            context: Mutex::new(SessionContext::new(limits)),
            inflight: InflightSlot::new(),
            last_seen: StdMutex::new(Instant::now()),
        }
    }

    /// Session state. Never hold the guard across a model call.
    pub fn context(&self) -> &Mutex<SessionContext> {
        &self.context
    }

    /// Slot for this session's single in-flight model call.
    pub fn inflight(&self) -> &InflightSlot {
        &self.inflight
    }

    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(|p| p.into_inner()) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .elapsed()
    }
}

/// Owns every live session.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Session>>>>,
    limits: SessionLimits,
}

impl SessionRegistry {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limits,
        }
    }

    /// Look up the session for `id`, creating a fresh one when it is absent or
    /// unknown. The flag is `true` when a session was created.
    pub async fn resolve(&self, id: Option<SessionId>) -> (Arc<Session>, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                session.touch();
                return (session, false);
            }
        }

        let session = Arc::new(Session::new(Uuid::new_v4(), self.limits));
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        debug!(session = %session.id, "Session created");
        (session, true)
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// End a session: cancel its in-flight call and discard its state.
    pub async fn end(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.inflight().cancel();
                debug!(session = %id, "Session ended");
                true
            }
            None => false,
        }
    }

    /// End every session idle longer than `max_idle`. Returns the ended ids.
    pub async fn reap_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        let mut sessions = self.sessions.write().await;
        let idle: Vec<SessionId> = sessions
            .values()
            .filter(|s| s.idle_for() > max_idle && !s.inflight().is_busy())
            .map(|s| s.id)
            .collect();
        for id in &idle {
            sessions.remove(id);
        }
        if !idle.is_empty() {
            info!("[SessionReaper] Ended {} idle sessions", idle.len());
        }
        idle
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Run [`reap_idle`](Self::reap_idle) every `interval`.
    pub fn spawn_reaper(
        &self,
        interval: Duration,
        max_idle: Duration,
        on_reaped: impl Fn(SessionId) + Send + 'static,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                for id in registry.reap_idle(max_idle).await {
                    on_reaped(id);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamaocr_core::{run_bounded, InferenceError, OcrRecord};

    fn registry() -> SessionRegistry {
        SessionRegistry::new(SessionLimits::default())
    }

    #[tokio::test]
    async fn resolve_creates_then_reuses() {
        let reg = registry();
        let (first, created) = reg.resolve(None).await;
        assert!(created);

        let (again, created) = reg.resolve(Some(first.id)).await;
        assert!(!created);
        assert_eq!(again.id, first.id);
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_id_gets_a_fresh_session() {
        let reg = registry();
        let (session, created) = reg.resolve(Some(Uuid::new_v4())).await;
        assert!(created);
        assert!(reg.get(session.id).await.is_some());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let reg = registry();
        let (a, _) = reg.resolve(None).await;
        let (b, _) = reg.resolve(None).await;

        a.context()
            .lock()
            .await
            .record_ocr(OcrRecord::new("a.png", "A", "/uploads/a.png"));

        assert_eq!(a.context().lock().await.history().len(), 1);
        assert!(b.context().lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn end_discards_state_and_cancels_inflight() {
        let reg = registry();
        let (session, _) = reg.resolve(None).await;

        let worker = session.clone();
        let call = tokio::spawn(async move {
            run_bounded(worker.inflight(), Duration::from_secs(10), async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, InferenceError>(())
            })
            .await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(reg.end(session.id).await);
        assert_eq!(call.await.unwrap(), Err(InferenceError::Cancelled));
        assert!(reg.get(session.id).await.is_none());
        assert!(!reg.end(session.id).await);

        let (fresh, created) = reg.resolve(Some(session.id)).await;
        assert!(created);
        assert!(fresh.context().lock().await.current().is_none());
    }

    #[tokio::test]
    async fn reap_idle_ends_only_stale_sessions() {
        let reg = registry();
        let (stale, _) = reg.resolve(None).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        let (fresh, _) = reg.resolve(None).await;

        let reaped = reg.reap_idle(Duration::from_millis(100)).await;
        assert_eq!(reaped, vec![stale.id]);
        assert!(reg.get(fresh.id).await.is_some());
        assert!(reg.get(stale.id).await.is_none());
    }

    #[tokio::test]
    async fn touch_keeps_session_alive() {
        let reg = registry();
        let (session, _) = reg.resolve(None).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        reg.resolve(Some(session.id)).await;

        assert!(reg.reap_idle(Duration::from_millis(100)).await.is_empty());
        assert!(!reg.is_empty().await);
    }
}
