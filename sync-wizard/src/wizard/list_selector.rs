// List Selector
// Pick an existing remote list/channel or create one inline. Inline creation
// selects a placeholder (`id == "-1"`) that is resolved to a real backend id
// at save time.

use log::warn;

use crate::api::{ApiError, SyncBackend};
use crate::models::responses::RemoteList;
use crate::notify::Notifier;
use crate::utils::validation::validate_list_name;

/// Sentinel id of a locally created, not-yet-persisted list.
pub const PENDING_LIST_ID: &str = "-1";

#[derive(Debug, Clone, Default)]
pub struct ListSelector {
    lists: Vec<RemoteList>,
    selected: Option<RemoteList>,
    dropdown_open: bool,
    create_error: Option<&'static str>,
    loading: bool,
    loaded: bool,
}

impl ListSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lists(&self) -> &[RemoteList] {
        &self.lists
    }

    pub fn selected(&self) -> Option<&RemoteList> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn create_error(&self) -> Option<&'static str> {
        self.create_error
    }

    /// A selection exists (existing or pending-create).
    pub fn is_valid(&self) -> bool {
        self.selected.is_some()
    }

    pub fn has_pending_create(&self) -> bool {
        matches!(&self.selected, Some(l) if l.id == PENDING_LIST_ID)
    }

    pub fn dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    pub fn set_dropdown_open(&mut self, open: bool) {
        // Closing the dropdown never discards a made selection.
        self.dropdown_open = open;
    }

    /// Fetch the remote lists through the backend seam. A failed fetch leaves
    /// the set empty and surfaces a notice; it never propagates an error to
    /// the caller.
    pub async fn load_lists(
        &mut self,
        backend: &dyn SyncBackend,
        notifier: &dyn Notifier,
        service: &str,
        customer_id: Option<&str>,
    ) {
        self.loading = true;
        let result = backend.fetch_lists(service, customer_id).await;
        self.apply_loaded(result, notifier);
    }

    /// Apply a fetch outcome. Split from `load_lists` so a host that runs the
    /// fetch on a worker thread can feed the result back in.
    pub fn apply_loaded(&mut self, result: Result<Vec<RemoteList>, ApiError>, notifier: &dyn Notifier) {
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(lists) => {
                self.lists = lists;
            }
            Err(e) => {
                warn!(
                    "[PHASE: wizard] [STEP: load_lists] List fetch failed: {}",
                    e
                );
                self.lists = Vec::new();
                notifier.error("Failed to load lists. Please try again.");
            }
        }
    }

    /// Pick one of the fetched lists.
    pub fn select_existing(&mut self, list: RemoteList) {
        self.selected = Some(list);
        self.create_error = None;
        self.dropdown_open = false;
    }

    /// Inline creation: validate the name against the fetched lists, then
    /// select a placeholder entry that resolves at save time. Returns whether
    /// a selection was produced.
    pub fn begin_create(&mut self, name: &str) -> bool {
        match validate_list_name(name, &self.lists) {
            Ok(()) => {
                self.selected = Some(RemoteList {
                    id: PENDING_LIST_ID.to_string(),
                    name: name.to_string(),
                });
                self.create_error = None;
                self.dropdown_open = false;
                true
            }
            Err(msg) => {
                self.create_error = Some(msg);
                false
            }
        }
    }

    /// Resolve a pending (`"-1"`) selection into a real backend list. Called
    /// at submission time; a failure aborts the whole save.
    pub async fn resolve_pending_create(
        &mut self,
        backend: &dyn SyncBackend,
        service: &str,
        customer_id: Option<&str>,
    ) -> Result<(), ApiError> {
        if !self.has_pending_create() {
            return Ok(());
        }
        let name = self
            .selected
            .as_ref()
            .map(|l| l.name.clone())
            .unwrap_or_default();

        let created = backend.create_remote_list(service, &name, customer_id).await?;
        self.lists.push(created.clone());
        self.selected = Some(created);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
