use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quickdrop_core::{AppError, Clock, RetentionPolicy, SystemClock};
use quickdrop_storage::{keys, Storage, StorageError};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Youngest age at which a leftover partial upload is removed, whatever the policy
pub const PARTIAL_UPLOAD_MIN_AGE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to list storage root: {0}")]
    StorageListFailed(#[source] StorageError),

    #[error("Failed to read creation time of {name}: {source}")]
    StorageReadFailed {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to delete {name}: {source}")]
    StorageDeleteFailed {
        name: String,
        #[source]
        source: StorageError,
    },
}

impl From<SweepError> for AppError {
    fn from(err: SweepError) -> Self {
        let message = err.to_string();
        match err {
            SweepError::StorageListFailed(_) | SweepError::StorageReadFailed { .. } => {
                AppError::StorageListFailed(message)
            }
            SweepError::StorageDeleteFailed { .. } => AppError::StorageDeleteFailed(message),
        }
    }
}

/// What happened to a single entry during a pass
#[derive(Debug)]
pub enum SweepOutcome {
    Deleted,
    Retained,
    Failed(SweepError),
}

/// Totals of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub retained: usize,
    pub failed: usize,
}

impl SweepReport {
    fn record(&mut self, outcome: &SweepOutcome) {
        self.scanned += 1;
        match outcome {
            SweepOutcome::Deleted => self.deleted += 1,
            SweepOutcome::Retained => self.retained += 1,
            SweepOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Deletes files whose age exceeds the retention policy's `max_age`.
pub struct RetentionSweeper {
    storage: Arc<dyn Storage>,
    policy: RetentionPolicy,
    clock: Arc<dyn Clock>,
}

/// Running sweeper task; dropping it leaves the task running until shutdown.
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Cancel the task and wait for it to finish. An in-flight pass completes first.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Retention sweeper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl RetentionSweeper {
    pub fn new(storage: Arc<dyn Storage>, policy: RetentionPolicy) -> Self {
        Self {
            storage,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start the background sweep task.
    ///
    /// The first pass runs immediately, then once every `sweep_interval`.
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut sweep_interval = interval(self.policy.sweep_interval);
            sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                max_age_ms = self.policy.max_age.as_millis() as u64,
                sweep_interval_ms = self.policy.sweep_interval.as_millis() as u64,
                "Retention sweeper started"
            );

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = sweep_interval.tick() => {}
                }

                if let Err(e) = self.run_once().await {
                    tracing::error!(error = %e, "Retention sweep failed");
                }
            }

            tracing::info!("Retention sweeper stopped");
        });

        SweeperHandle { cancel, task }
    }

    /// Run a single pass over the storage root.
    ///
    /// Only a listing failure aborts the pass; per-entry failures are counted in
    /// the report.
    #[tracing::instrument(skip(self), fields(retention.operation = "sweep"))]
    pub async fn run_once(&self) -> Result<SweepReport, SweepError> {
        let entries = self
            .storage
            .list()
            .await
            .map_err(SweepError::StorageListFailed)?;

        let now = self.clock.now();
        let mut report = SweepReport::default();

        for name in entries {
            let outcome = self.sweep_entry(&name, now).await;
            if let SweepOutcome::Failed(ref e) = outcome {
                tracing::warn!(error = %e, file = %name, "Skipping entry");
            }
            report.record(&outcome);
        }

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted,
            retained = report.retained,
            failed = report.failed,
            "Retention sweep completed"
        );

        Ok(report)
    }

    async fn sweep_entry(&self, name: &str, now: DateTime<Utc>) -> SweepOutcome {
        let created_at = match self.storage.created_at(name).await {
            Ok(created_at) => created_at,
            // Removed between listing and stat
            Err(StorageError::NotFound(_)) => return SweepOutcome::Retained,
            Err(source) => {
                return SweepOutcome::Failed(SweepError::StorageReadFailed {
                    name: name.to_string(),
                    source,
                })
            }
        };

        // In-flight uploads must not vanish before they are linked into place
        let max_age = if keys::is_partial_upload(name) {
            self.policy.max_age.max(PARTIAL_UPLOAD_MIN_AGE)
        } else {
            self.policy.max_age
        };

        if !is_expired(created_at, now, max_age) {
            return SweepOutcome::Retained;
        }

        tracing::info!(file = %name, created_at = %created_at, "Deleting expired file");

        match self.storage.delete(name).await {
            Ok(()) => SweepOutcome::Deleted,
            Err(source) => SweepOutcome::Failed(SweepError::StorageDeleteFailed {
                name: name.to_string(),
                source,
            }),
        }
    }

}

fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    // Negative ages (clock skew, future timestamps) never expire
    match now.signed_duration_since(created_at).to_std() {
        Ok(age) => age > max_age,
        Err(_) => false,
    }
}
