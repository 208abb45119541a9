//! Shared application state across all handlers.

use parking_lot::RwLock;
use quran_track_config::{load_settings, Settings};
use quran_track_core::ReferenceIndex;
use quran_track_pipeline::{Decoder, Transcriber};
use std::sync::Arc;

use crate::session_manager::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<Settings>>,
    pub reference_index: Arc<ReferenceIndex>,
    pub sessions: Arc<SessionManager>,
    pub decoder: Arc<dyn Decoder>,
    pub transcriber: Arc<dyn Transcriber>,
    env: Option<String>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        reference_index: Arc<ReferenceIndex>,
        decoder: Arc<dyn Decoder>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(
            settings.server.max_sessions,
            std::time::Duration::from_secs(settings.server.session_idle_secs),
            settings.alignment.max_buffer_seconds,
        ));
        Self {
            settings: Arc::new(RwLock::new(settings)),
            reference_index,
            sessions,
            decoder,
            transcriber,
            env: None,
        }
    }

    pub fn with_env(mut self, env: Option<String>) -> Self {
        self.env = env;
        self
    }

    pub fn get_settings(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.settings.read()
    }

    /// Re-run the load sequence and swap the value behind the lock (§4.9).
    /// In-flight sessions are untouched; only subsequently-read settings see
    /// the new values.
    pub fn reload_settings(&self) -> Result<(), String> {
        let new_settings =
            load_settings(self.env.as_deref()).map_err(|e| format!("failed to reload settings: {e}"))?;
        *self.settings.write() = new_settings;
        tracing::info!("settings reloaded");
        Ok(())
    }

    pub fn alignment_config(&self) -> quran_track_core::AlignmentConfig {
        (&self.settings.read().alignment).into()
    }
}
