//! Session Registry (A5): the single mutable shared structure named in §5.
//! Guarded only on create/remove/lookup; per-session alignment work happens
//! against an `Arc` handle without holding this lock.

use parking_lot::RwLock;
use quran_track_core::SessionState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// One session's alignment state plus the bookkeeping the registry needs
/// for idle cleanup. Each chunk's alignment work serializes on `state`.
pub struct ManagedSession {
    pub id: String,
    pub state: tokio::sync::Mutex<SessionState>,
    last_activity: RwLock<Instant>,
}

impl ManagedSession {
    fn new(id: String, max_buffer_seconds: f32) -> Self {
        Self {
            id,
            state: tokio::sync::Mutex::new(SessionState::new(max_buffer_seconds)),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_activity.read().elapsed()
    }
}

pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<ManagedSession>>>,
    max_sessions: usize,
    idle_timeout: Duration,
    max_buffer_seconds: f32,
}

impl SessionManager {
    pub fn new(max_sessions: usize, idle_timeout: Duration, max_buffer_seconds: f32) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
            max_buffer_seconds,
        }
    }

    /// Look up a session, creating one lazily if it doesn't exist yet
    /// (§7 `session_missing` policy).
    pub fn get_or_create(&self, id: &str) -> Arc<ManagedSession> {
        if let Some(existing) = self.sessions.read().get(id) {
            existing.touch();
            return existing.clone();
        }

        let mut sessions = self.sessions.write();
        if let Some(existing) = sessions.get(id) {
            existing.touch();
            return existing.clone();
        }

        let session = Arc::new(ManagedSession::new(id.to_string(), self.max_buffer_seconds));
        sessions.insert(id.to_string(), session.clone());
        tracing::info!(session_id = %id, count = sessions.len(), "session opened");
        session
    }

    pub fn remove(&self, id: &str) -> Option<Arc<ManagedSession>> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "session closed");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_at_capacity(&self) -> bool {
        self.count() >= self.max_sessions
    }

    /// Remove sessions idle for longer than `idle_timeout`. Returns how many
    /// were evicted.
    pub fn cleanup_expired(&self) -> usize {
        let expired: Vec<String> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, s)| s.idle_for() > self.idle_timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            self.sessions.write().remove(id);
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "evicted idle sessions");
        }
        expired.len()
    }

    /// Spawn a background task that periodically sweeps idle sessions.
    /// Returns a shutdown sender; dropping or sending on it stops the task.
    pub fn start_cleanup_task(
        self: Arc<Self>,
        interval: Duration,
    ) -> (tokio::task::JoinHandle<()>, watch::Sender<bool>) {
        let (tx, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.cleanup_expired();
                    }
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        (handle, tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_idempotent() {
        let mgr = SessionManager::new(10, Duration::from_secs(60), 8.0);
        let a = mgr.get_or_create("s1");
        let b = mgr.get_or_create("s1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(mgr.count(), 1);
    }

    #[test]
    fn remove_drops_session() {
        let mgr = SessionManager::new(10, Duration::from_secs(60), 8.0);
        mgr.get_or_create("s1");
        assert_eq!(mgr.count(), 1);
        mgr.remove("s1");
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn cleanup_expired_evicts_idle_sessions() {
        let mgr = SessionManager::new(10, Duration::from_millis(1), 8.0);
        mgr.get_or_create("s1");
        std::thread::sleep(Duration::from_millis(20));
        let evicted = mgr.cleanup_expired();
        assert_eq!(evicted, 1);
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn capacity_check_reflects_session_count() {
        let mgr = SessionManager::new(1, Duration::from_secs(60), 8.0);
        assert!(!mgr.is_at_capacity());
        mgr.get_or_create("s1");
        assert!(mgr.is_at_capacity());
    }
}
