//! Queue screen state.
//!
//! [`QueueStore`] owns the raw entries fetched from the API. Reloads are
//! serialized through an async gate so a slow reload can never land after,
//! and overwrite, a reload that started later.
//!
//! [`QueueScreen`] ties the store to the filter/sort pipeline, the row
//! selection, and the action controller.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::actions::{BulkDeleteReport, Refresh, RowActionController};
use crate::config::QueueSettings;
use crate::error::Result;
use crate::query::{self, FilterSortState, PageView};
use crate::remote::{QueueApi, QueueSource, RowAction};
use crate::selection::{SelectAllScope, SelectionKey, SelectionSet, SelectionState};
use crate::types::{EntryId, QueueEntry};

pub struct QueueStore<A> {
    api: Arc<A>,
    source: RwLock<QueueSource>,
    entries: RwLock<Vec<QueueEntry>>,
    load_error: RwLock<Option<String>>,
    gate: AsyncMutex<()>,
}

impl<A: QueueApi> QueueStore<A> {
    pub fn new(api: Arc<A>, source: QueueSource) -> Self {
        Self {
            api,
            source: RwLock::new(source),
            entries: RwLock::new(Vec::new()),
            load_error: RwLock::new(None),
            gate: AsyncMutex::new(()),
        }
    }

    pub fn source(&self) -> QueueSource {
        self.source.read().clone()
    }

    /// Switch the queue being shown. Takes effect on the next reload.
    pub fn set_source(&self, source: QueueSource) {
        *self.source.write() = source;
    }

    /// Copy of the current raw entries.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.read().clone()
    }

    /// Message of the last failed load, cleared by the next successful one.
    pub fn load_error(&self) -> Option<String> {
        self.load_error.read().clone()
    }

    /// Fetch the queue and replace the stored entries.
    ///
    /// On failure the previous entries are kept and the error is recorded
    /// for display as well as returned.
    pub async fn reload(&self) -> Result<()> {
        let _guard = self.gate.lock().await;
        let source = self.source();
        debug!(path = %source.path(), "reloading queue");

        match self.api.queue_details(&source).await {
            Ok(entries) => {
                debug!(count = entries.len(), "queue loaded");
                *self.entries.write() = entries;
                *self.load_error.write() = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load queue");
                *self.load_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }
}

impl<A: QueueApi> Refresh for QueueStore<A> {
    async fn refresh(&self) -> Result<()> {
        self.reload().await
    }
}

pub struct QueueScreen<A> {
    store: Arc<QueueStore<A>>,
    controller: RowActionController<A, QueueStore<A>>,
    state: FilterSortState,
    selection: SelectionSet,
    scope: SelectAllScope,
    key: SelectionKey,
}

impl<A: QueueApi> QueueScreen<A> {
    pub fn new(api: Arc<A>, source: QueueSource, settings: &QueueSettings) -> Self {
        let store = Arc::new(QueueStore::new(api.clone(), source));
        Self {
            controller: RowActionController::new(api, store.clone()),
            store,
            state: FilterSortState::new(settings.rows_per_page),
            selection: SelectionSet::new(),
            scope: settings.select_all_scope,
            key: settings.selection_key,
        }
    }

    pub fn store(&self) -> &Arc<QueueStore<A>> {
        &self.store
    }

    pub fn controller(&self) -> &RowActionController<A, QueueStore<A>> {
        &self.controller
    }

    pub fn state(&self) -> &FilterSortState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FilterSortState {
        &mut self.state
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub async fn load(&self) -> Result<()> {
        self.store.reload().await
    }

    /// Run the pipeline over `entries` with the current state.
    pub fn view<'a>(&self, entries: &'a [QueueEntry]) -> PageView<'a> {
        query::apply(entries, &self.state)
    }

    pub fn toggle_row(&mut self, entry: &QueueEntry) {
        self.selection.toggle(&self.key.key_of(entry));
    }

    pub fn is_selected(&self, entry: &QueueEntry) -> bool {
        self.selection.contains(&self.key.key_of(entry))
    }

    /// Select `entry` unless its key is already selected.
    pub fn select_row(&mut self, entry: &QueueEntry) {
        if !self.is_selected(entry) {
            self.toggle_row(entry);
        }
    }

    /// Keys the "select all" checkbox covers under the configured scope.
    fn candidates(&self, entries: &[QueueEntry]) -> Vec<String> {
        let view = self.view(entries);
        match self.scope {
            SelectAllScope::Filtered => self.key.keys_of(view.matching().iter().copied()),
            SelectAllScope::Page => self.key.keys_of(view.rows().iter().copied()),
        }
    }

    pub fn toggle_all(&mut self, entries: &[QueueEntry]) {
        let candidates = self.candidates(entries);
        self.selection.toggle_all(&candidates);
    }

    pub fn selection_state(&self, entries: &[QueueEntry]) -> SelectionState {
        self.selection.state(&self.candidates(entries))
    }

    /// Ids of every entry whose key is selected, in entry order.
    pub fn selected_ids(&self, entries: &[QueueEntry]) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = Vec::new();
        for entry in entries {
            if self.is_selected(entry) && !ids.contains(&entry.id) {
                ids.push(entry.id.clone());
            }
        }
        ids
    }

    pub async fn bulk_delete_selected(&mut self, entries: &[QueueEntry]) -> BulkDeleteReport {
        let ids = self.selected_ids(entries);
        self.bulk_delete(&ids).await
    }

    /// Soft-delete exactly `ids`, then clear the selection.
    pub async fn bulk_delete(&mut self, ids: &[EntryId]) -> BulkDeleteReport {
        self.controller.bulk_delete(ids, &mut self.selection).await
    }

    pub async fn perform(&self, action: RowAction, id: &EntryId) -> Result<()> {
        self.controller.perform(action, id).await
    }
}
