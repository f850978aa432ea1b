//! # Kora Directory
//!
//! The orchestrator directory: the read-only list of staking
//! counterparties shown in the wallet.
//!
//! A live provider is attempted first; on error or when none is
//! configured the directory serves a fixed five-entry fallback list.
//! Refresh happens once at startup and then on a fixed interval, with no
//! backoff and no error differentiation: a failed refresh logs and
//! silently retains the previous snapshot.

pub mod fallback;

pub use fallback::fallback_orchestrators;

use async_trait::async_trait;
use kora_core::{Orchestrator, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default refresh interval: 5 minutes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Source of live orchestrator data
///
/// The production implementation would read the bonding manager's
/// registered transcoder set; none is wired in yet, so deployments run
/// on the fallback list.
#[async_trait]
pub trait OrchestratorProvider: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Orchestrator>>;
}

/// Refresh counters
#[derive(Clone, Debug, Default)]
pub struct DirectoryStats {
    /// Refresh attempts (including the initial one)
    pub refreshes: u64,
    /// Refreshes that fell back or retained stale data
    pub failed_refreshes: u64,
    /// Timestamp of the last successful snapshot swap
    pub last_refresh: Option<i64>,
}

/// Called after every refresh attempt, e.g. to advance an exporter counter
pub type RefreshHook = Box<dyn Fn() + Send + Sync>;

/// The orchestrator directory
pub struct OrchestratorDirectory {
    provider: Option<Arc<dyn OrchestratorProvider>>,
    snapshot: RwLock<Vec<Orchestrator>>,
    stats: RwLock<DirectoryStats>,
    refresh_interval: Duration,
    refresh_hook: RwLock<Option<RefreshHook>>,
}

impl OrchestratorDirectory {
    /// Create a directory with no live provider (fallback only)
    pub fn new() -> Self {
        Self::with_provider(None, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_provider(
        provider: Option<Arc<dyn OrchestratorProvider>>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            provider,
            snapshot: RwLock::new(fallback_orchestrators()),
            stats: RwLock::new(DirectoryStats::default()),
            refresh_interval,
            refresh_hook: RwLock::new(None),
        }
    }

    /// Install a hook invoked once per refresh attempt
    pub fn set_refresh_hook(&self, hook: RefreshHook) {
        *self.refresh_hook.write() = Some(hook);
    }

    /// Up to `limit` orchestrators from the current snapshot
    pub fn list(&self, limit: usize) -> Vec<Orchestrator> {
        let snapshot = self.snapshot.read();
        snapshot.iter().take(limit).cloned().collect()
    }

    /// Look up one orchestrator by address
    pub fn get(&self, address: &kora_core::OrchestratorAddress) -> Option<Orchestrator> {
        self.snapshot.read().iter().find(|o| o.address == *address).cloned()
    }

    /// Current counters
    pub fn stats(&self) -> DirectoryStats {
        self.stats.read().clone()
    }

    /// Attempt one refresh
    ///
    /// Live fetch errors retain the previous snapshot; a directory with
    /// no provider re-serves the fallback list.
    pub async fn refresh(&self) {
        self.stats.write().refreshes += 1;
        if let Some(hook) = self.refresh_hook.read().as_ref() {
            hook();
        }

        let Some(provider) = self.provider.as_ref() else {
            debug!("no live provider configured, serving fallback list");
            *self.snapshot.write() = fallback_orchestrators();
            self.stats.write().last_refresh = Some(chrono::Utc::now().timestamp());
            return;
        };

        match provider.fetch().await {
            Ok(list) if !list.is_empty() => {
                let count = list.len();
                *self.snapshot.write() = list;
                let mut stats = self.stats.write();
                stats.last_refresh = Some(chrono::Utc::now().timestamp());
                info!(count, "orchestrator directory refreshed");
            }
            Ok(_) => {
                self.stats.write().failed_refreshes += 1;
                warn!("live provider returned empty list, retaining previous snapshot");
            }
            Err(e) => {
                self.stats.write().failed_refreshes += 1;
                warn!("orchestrator refresh failed, retaining previous snapshot: {}", e);
            }
        }
    }

    /// Spawn the periodic refresh task
    ///
    /// Refreshes immediately, then every `refresh_interval` until the
    /// shutdown channel fires.
    pub fn spawn_refresh_task(
        self: &Arc<Self>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let directory = Arc::clone(self);
        let interval = directory.refresh_interval;
        tokio::spawn(async move {
            directory.refresh().await;
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick completes immediately
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        directory.refresh().await;
                    }
                    _ = shutdown_rx.recv() => {
                        info!("orchestrator refresh task stopping");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for OrchestratorDirectory {
    fn default() -> Self {
        Self::new()
    }
}
