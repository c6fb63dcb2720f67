//! Detached schedule write-back
//!
//! Corrected next-occurrence dates are persisted off the read path. Readers
//! hand a [`ScheduleUpdate`] to a [`ScheduleWriter`], which pushes it onto a
//! bounded queue without waiting; a single worker task drains the queue into a
//! [`ScheduleStore`].
//!
//! Delivery is best effort:
//! - a full or closed queue drops the update with a warning
//! - a failed store write is logged with the entity id and not retried
//!
//! Shutdown: once every `ScheduleWriter` clone is dropped the queue closes,
//! the worker finishes what is already queued, and [`WriterHandle::finish`]
//! returns the tally.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::Result;

/// Default bound on queued write-backs
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// A request to persist a corrected next-occurrence date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub id: String,
    pub next_expected_date: NaiveDate,
}

/// Persistence sink for corrected schedule dates
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn persist_next_expected_date(&self, id: &str, date: NaiveDate) -> Result<()>;
}

/// Counts reported by the worker when it shuts down
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
    pub written: usize,
    pub failed: usize,
}

/// Non-blocking producer side of the write-back queue
#[derive(Debug, Clone)]
pub struct ScheduleWriter {
    tx: mpsc::Sender<ScheduleUpdate>,
}

impl ScheduleWriter {
    /// Create a writer and the raw receiving end of its queue
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ScheduleUpdate>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Create a writer whose queue is drained into `store` by a spawned task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<dyn ScheduleStore>, capacity: usize) -> (Self, WriterHandle) {
        let (writer, rx) = Self::channel(capacity);
        let join = tokio::spawn(run_writer(store, rx));
        (writer, WriterHandle { join })
    }

    /// Queue an update without waiting; returns false if it was dropped
    pub fn enqueue(&self, update: ScheduleUpdate) -> bool {
        match self.tx.try_send(update) {
            Ok(()) => true,
            Err(TrySendError::Full(update)) => {
                warn!(
                    "Schedule write-back queue full, dropping update for {} ({})",
                    update.id, update.next_expected_date
                );
                false
            }
            Err(TrySendError::Closed(update)) => {
                warn!(
                    "Schedule write-back queue closed, dropping update for {} ({})",
                    update.id, update.next_expected_date
                );
                false
            }
        }
    }
}

/// Handle to the worker task spawned by [`ScheduleWriter::spawn`]
#[derive(Debug)]
pub struct WriterHandle {
    join: JoinHandle<WriterStats>,
}

impl WriterHandle {
    /// Wait for the worker to drain its queue and exit
    ///
    /// Only returns after every `ScheduleWriter` clone has been dropped.
    pub async fn finish(self) -> WriterStats {
        match self.join.await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Schedule write-back worker stopped abnormally: {}", e);
                WriterStats::default()
            }
        }
    }
}

async fn run_writer(
    store: Arc<dyn ScheduleStore>,
    mut rx: mpsc::Receiver<ScheduleUpdate>,
) -> WriterStats {
    let mut stats = WriterStats::default();

    while let Some(update) = rx.recv().await {
        match store
            .persist_next_expected_date(&update.id, update.next_expected_date)
            .await
        {
            Ok(()) => {
                stats.written += 1;
                debug!(
                    "Persisted next expected date {} for {}",
                    update.next_expected_date, update.id
                );
            }
            Err(e) => {
                stats.failed += 1;
                error!(
                    "Failed to persist next expected date for {}: {}",
                    update.id, e
                );
            }
        }
    }

    stats
}
