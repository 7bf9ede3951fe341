//! Periodic sweep of expired session records
//!
//! The job is an owned timer object: the lifecycle controller starts it,
//! keeps it, and stops it on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::repositories::SessionRepository;

/// Configuration for the session cleanup job
#[derive(Debug, Clone)]
pub struct SessionCleanupConfig {
    /// How often to sweep
    pub interval: Duration,
    /// Whether to run the sweep at all
    pub enabled: bool,
}

impl Default for SessionCleanupConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(25 * 60),
            enabled: true,
        }
    }
}

/// Result of a single sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of expired sessions deleted
    pub deleted: u64,
    /// Error of a failed sweep
    pub error: Option<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Background job deleting expired sessions on a fixed interval
pub struct SessionCleanupJob {
    repository: Arc<dyn SessionRepository>,
    config: SessionCleanupConfig,
    stop_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCleanupJob {
    pub fn new(repository: Arc<dyn SessionRepository>, config: SessionCleanupConfig) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            repository,
            config,
            stop_tx,
            handle: Mutex::new(None),
        }
    }

    /// Run a single sweep; failures are reported, never raised
    pub async fn run_once(&self) -> CleanupResult {
        sweep(self.repository.as_ref()).await
    }

    /// Spawn the timer loop
    ///
    /// The first tick is skipped so no sweep runs at boot. Returns `false`
    /// when the job is disabled or already running.
    pub async fn start(&self) -> bool {
        if !self.config.enabled {
            warn!("Session cleanup job is disabled");
            return false;
        }

        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return false;
        }

        let repository = self.repository.clone();
        let interval = self.config.interval;
        let mut stop_rx = self.stop_tx.subscribe();

        *handle = Some(tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Session cleanup job started");

            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        sweep(repository.as_ref()).await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Session cleanup job stopped");
        }));
        true
    }

    /// Signal the loop to stop and wait for it to exit
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Session cleanup job ended abnormally: {}", e);
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}

async fn sweep(repository: &dyn SessionRepository) -> CleanupResult {
    match repository.delete_expired_sessions().await {
        Ok(deleted) => {
            info!(deleted, "Deleted expired sessions");
            CleanupResult { deleted, error: None }
        }
        Err(e) => {
            error!("Failed to delete expired sessions: {}", e);
            CleanupResult {
                deleted: 0,
                error: Some(e.to_string()),
            }
        }
    }
}
