//! Row actions and bulk delete.
//!
//! Every mutation runs to completion before anything else happens: on
//! success the queue is refreshed exactly once, on failure the error is
//! logged and handed back to the caller without a refresh. The per-row menu
//! always closes after an action, whatever the outcome.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::error::Result;
use crate::remote::{QueueApi, RowAction};
use crate::selection::SelectionSet;
use crate::types::EntryId;

/// Reloads the queue after a successful mutation.
pub trait Refresh: Send + Sync {
    fn refresh(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Outcome of one mutation.
#[derive(Debug)]
pub struct MutationOutcome {
    pub id: EntryId,
    pub action: RowAction,
    pub result: Result<()>,
}

impl MutationOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of a bulk delete.
#[derive(Debug)]
pub struct BulkDeleteReport {
    pub outcomes: Vec<MutationOutcome>,
    /// Result of the single refresh issued after all deletes settled.
    pub refresh: Result<()>,
}

impl BulkDeleteReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &EntryId> {
        self.outcomes.iter().filter(|o| o.is_ok()).map(|o| &o.id)
    }

    pub fn failed(&self) -> impl Iterator<Item = &MutationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(MutationOutcome::is_ok)
    }
}

pub struct RowActionController<A, R> {
    api: Arc<A>,
    refresher: Arc<R>,
    menu: Mutex<Option<EntryId>>,
}

impl<A: QueueApi, R: Refresh> RowActionController<A, R> {
    pub fn new(api: Arc<A>, refresher: Arc<R>) -> Self {
        Self {
            api,
            refresher,
            menu: Mutex::new(None),
        }
    }

    /// Open the action menu anchored on `id`. At most one menu is open.
    pub fn open_menu(&self, id: EntryId) {
        *self.menu.lock() = Some(id);
    }

    pub fn close_menu(&self) {
        *self.menu.lock() = None;
    }

    pub fn menu_open_for(&self) -> Option<EntryId> {
        self.menu.lock().clone()
    }

    /// Apply `action` to entry `id`.
    ///
    /// The refresh result is returned alongside the mutation result; a
    /// failed refresh after a successful mutation is reported as an error.
    pub async fn perform(&self, action: RowAction, id: &EntryId) -> Result<()> {
        let result = self.api.apply_action(action, id).await;
        self.close_menu();

        match result {
            Ok(()) => {
                info!(%id, %action, "queue entry updated");
                self.refresher.refresh().await
            }
            Err(e) => {
                error!(%id, %action, error = %e, "queue action failed");
                Err(e)
            }
        }
    }

    /// Soft-delete every id concurrently, refresh once after all settle, and
    /// clear the selection whether or not individual deletes failed.
    pub async fn bulk_delete(
        &self,
        ids: &[EntryId],
        selection: &mut SelectionSet,
    ) -> BulkDeleteReport {
        let action = RowAction::Skip;
        let results = join_all(ids.iter().map(|id| self.api.apply_action(action, id))).await;

        let outcomes: Vec<MutationOutcome> = ids
            .iter()
            .cloned()
            .zip(results)
            .map(|(id, result)| {
                if let Err(e) = &result {
                    error!(%id, error = %e, "bulk delete failed for entry");
                }
                MutationOutcome { id, action, result }
            })
            .collect();

        let refresh = self.refresher.refresh().await;
        selection.clear();

        let report = BulkDeleteReport { outcomes, refresh };
        info!(
            requested = ids.len(),
            failed = report.failed().count(),
            "bulk delete finished"
        );
        report
    }
}
