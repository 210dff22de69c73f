//! One full synchronization pass over the catalog.
//!
//! Records are processed one at a time, in listing order. Per-record failures
//! (fetch, write, notify) are logged and never stop the walk; only the
//! initial listing and the notifier handshake can abort a run.

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use steamwatch_core::{
    CatalogEntry, EntryUpdate, TransitionKind, classify, notification_message, store_url,
};
use steamwatch_provider::Provider;
use steamwatch_store::{RecordStore, list_all};
use tracing::{error, info, warn};

use crate::{Notifier, Readiness, SyncError};

/// What happened to one record during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub app_id: String,
    /// `None` when the provider fetch failed and the record was skipped.
    pub transition: Option<TransitionKind>,
    pub written: bool,
    pub notified: bool,
    pub suppressed: bool,
    pub notify_failed: bool,
}

impl RecordOutcome {
    fn skipped(app_id: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            transition: None,
            written: false,
            notified: false,
            suppressed: false,
            notify_failed: false,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<RecordOutcome>,
}

impl RunReport {
    pub fn seen(&self) -> usize {
        self.outcomes.len()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| o.transition.is_none())
    }

    pub fn updated(&self) -> usize {
        self.count(|o| o.written)
    }

    pub fn write_failures(&self) -> usize {
        self.count(|o| o.transition.is_some() && !o.written)
    }

    pub fn notified(&self) -> usize {
        self.count(|o| o.notified)
    }

    pub fn suppressed(&self) -> usize {
        self.count(|o| o.suppressed)
    }

    pub fn notify_failures(&self) -> usize {
        self.count(|o| o.notify_failed)
    }

    /// Outcome for a given app id, if it was listed.
    pub fn outcome(&self, app_id: &str) -> Option<&RecordOutcome> {
        self.outcomes.iter().find(|o| o.app_id == app_id)
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Drives the store walk, provider fetches, classification, writes and
/// notifications for one pass.
///
/// Assumes it is the only engine running against the store.
pub struct SyncEngine<'a> {
    store: &'a dyn RecordStore,
    provider: &'a dyn Provider,
    notifier: &'a dyn Notifier,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        provider: &'a dyn Provider,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            store,
            provider,
            notifier,
        }
    }

    /// Run one full pass.
    ///
    /// Waits for `readiness` first; there is no timeout on that wait. The
    /// notifier session is closed before returning, whether or not the run
    /// succeeded.
    pub async fn run(&self, readiness: Readiness) -> Result<RunReport, SyncError> {
        let started_at = Utc::now();
        info!("waiting for notifier");
        if let Err(e) = readiness.wait().await {
            self.notifier.close().await;
            return Err(SyncError::NotifierUnavailable(e));
        }

        let result = self.process_all().await;
        self.notifier.close().await;
        let outcomes = result?;

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            seen = report.seen(),
            updated = report.updated(),
            notified = report.notified(),
            suppressed = report.suppressed(),
            skipped = report.skipped(),
            write_failures = report.write_failures(),
            notify_failures = report.notify_failures(),
            "sync run complete"
        );
        Ok(report)
    }

    async fn process_all(&self) -> Result<Vec<RecordOutcome>, SyncError> {
        let entries: Vec<CatalogEntry> = list_all(self.store)
            .try_collect()
            .await
            .map_err(|e| {
                error!(error = %e, "listing records failed");
                SyncError::StoreUnavailable(e)
            })?;
        info!(count = entries.len(), "listed tracked entries");

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in &entries {
            outcomes.push(self.process_entry(entry).await);
        }
        Ok(outcomes)
    }

    async fn process_entry(&self, entry: &CatalogEntry) -> RecordOutcome {
        let app_id = entry.app_id.as_str();
        let fresh = match self.provider.fetch_state(app_id).await {
            Ok(state) => state,
            Err(e) if e.is_not_found() => {
                warn!(app_id, title = %entry.title, "item not found on provider; skipping");
                return RecordOutcome::skipped(app_id);
            }
            Err(e) => {
                error!(app_id, title = %entry.title, error = %e, "provider fetch failed; skipping");
                return RecordOutcome::skipped(app_id);
            }
        };

        let transition = classify(entry, &fresh);
        let mut outcome = RecordOutcome {
            transition: Some(transition),
            ..RecordOutcome::skipped(app_id)
        };

        match self
            .store
            .update(&entry.record_id, &EntryUpdate::from(&fresh))
            .await
        {
            Ok(()) => outcome.written = true,
            Err(e) => error!(app_id, error = %e, "record update failed"),
        }

        let message = notification_message(transition, &fresh, &store_url(app_id));
        let Some(message) = message else {
            info!(app_id, title = %fresh.title, "updated");
            return outcome;
        };
        if entry.is_suppressed() {
            info!(
                app_id,
                title = %fresh.title,
                transition = transition.as_str(),
                "notification suppressed by tag"
            );
            outcome.suppressed = true;
            return outcome;
        }

        info!(app_id, transition = transition.as_str(), "{message}");
        match self.notifier.send(&message).await {
            Ok(()) => outcome.notified = true,
            Err(e) => {
                error!(app_id, error = %e, "notification failed");
                outcome.notify_failed = true;
            }
        }
        outcome
    }
}
