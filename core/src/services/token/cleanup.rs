//! Token cleanup service for periodic sweeping of expired token families
//!
//! A family can be deleted once its refresh token has expired, since nothing can
//! be done with it afterwards.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl From<&tg_shared::config::SessionConfig> for TokenCleanupConfig {
    fn from(session: &tg_shared::config::SessionConfig) -> Self {
        Self {
            interval_seconds: session.sweep_interval_seconds,
            enabled: session.sweep_interval_seconds > 0,
        }
    }
}

/// Service for sweeping expired token families
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
}

impl<R: TokenRepository> TokenCleanupService<R> {
    /// Create a new token cleanup service
    pub fn new(repository: Arc<R>, config: TokenCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of cleanup operations
    /// * `Err(DomainError)` - If the store could not be swept
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let deleted = self.repository.delete_expired_tokens().await?;
        info!(deleted, "Swept expired token families");

        Ok(CleanupResult {
            expired_families_deleted: deleted,
        })
    }

    /// Start the cleanup service as a background task
    ///
    /// The first sweep runs immediately, then once per interval.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!("Token cleanup cycle failed: {}", e);
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired families deleted
    pub expired_families_deleted: usize,
}
