// Sync Submission
// Save is split in three so a host can run the network leg off-thread:
// `begin_submit` validates and freezes an immutable plan, the free
// `execute_submit_plan` performs the one create-or-update write (resolving a
// pending "-1" list first), and `finish_submit` folds the outcome back into
// the wizard, discarding it if the drawer was reset in the meantime.

use log::{info, warn};
use uuid::Uuid;

use crate::api::{ApiError, SyncBackend};
use crate::models::requests::{SyncCreateRequest, SyncUpdateRequest};
use crate::models::responses::RemoteList;
use crate::notify::Notifier;

use super::list_selector::PENDING_LIST_ID;
use super::{SyncWizard, WizardMode, WizardStep};

/// Everything the network leg needs, captured at `begin_submit` time. The
/// wizard can keep mutating afterwards without racing the save.
#[derive(Debug, Clone)]
pub struct SubmitPlan {
    pub service: &'static str,
    pub mode: WizardMode,
    pub list: RemoteList,
    pub leads_type: &'static str,
    pub data_map: Vec<crate::models::requests::FieldMapEntry>,
    pub customer_id: Option<String>,
    /// Correlates the log lines of one save attempt.
    pub correlation_id: String,
}

#[derive(Debug)]
pub enum SubmitError {
    /// The inline-created list could not be persisted; nothing was written.
    CreateList(ApiError),
    /// The sync write itself failed. If the pending list had already been
    /// created, `resolved_list` carries its real id so a retry does not
    /// create it twice.
    Save {
        error: ApiError,
        resolved_list: Option<RemoteList>,
    },
}

impl SubmitError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            SubmitError::CreateList(e) => e,
            SubmitError::Save { error, .. } => error,
        }
    }
}

pub enum BeginSubmit {
    /// Plan frozen, wizard marked in-flight. The caller owns running
    /// `execute_submit_plan` and feeding `finish_submit`.
    Started { plan: SubmitPlan, generation: u64 },
    /// A save is already running; pressing the button again does nothing.
    InFlight,
    /// Some step fails validation; the wizard moved there with its error
    /// flag set. No network call happens.
    Invalid(WizardStep),
}

impl SyncWizard {
    /// Validate every step and freeze the submit payload. Pure.
    pub fn build_submit_plan(&self) -> Result<SubmitPlan, WizardStep> {
        for step in WizardStep::ALL {
            if !self.validate_step(step) {
                return Err(step);
            }
        }

        // validate_step(Filter) and validate_step(Destination) passed, so
        // both are present.
        let filter = self.contact_filter().ok_or(WizardStep::Filter)?;
        let list = self
            .selector
            .selected()
            .cloned()
            .ok_or(WizardStep::Destination)?;

        Ok(SubmitPlan {
            service: self.profile().service_name(),
            mode: self.mode().clone(),
            list,
            leads_type: filter.as_id(),
            data_map: self.mapper.data_map(),
            customer_id: self.customer_id().map(str::to_string),
            correlation_id: Uuid::new_v4().to_string(),
        })
    }

    /// Gate and start a save. At most one save runs per wizard at a time.
    pub fn begin_submit(&mut self) -> BeginSubmit {
        if self.is_submitting() {
            return BeginSubmit::InFlight;
        }
        match self.build_submit_plan() {
            Ok(plan) => {
                self.set_submitting(true);
                info!(
                    "[PHASE: wizard] [STEP: submit] Starting save {} for {} (list {})",
                    plan.correlation_id, plan.service, plan.list.name
                );
                BeginSubmit::Started {
                    generation: self.generation(),
                    plan,
                }
            }
            Err(step) => {
                self.set_step_error(step);
                BeginSubmit::Invalid(step)
            }
        }
    }

    /// Fold a finished save back in. Completions stamped with a stale
    /// generation belong to a drawer that was closed; they are dropped
    /// without touching state. Returns whether the result was applied.
    pub fn finish_submit(
        &mut self,
        generation: u64,
        result: Result<RemoteList, SubmitError>,
        notifier: &dyn Notifier,
    ) -> bool {
        if generation != self.generation() {
            info!(
                "[PHASE: wizard] [STEP: submit] Dropping stale save result (generation {} != {})",
                generation,
                self.generation()
            );
            return false;
        }
        self.set_submitting(false);

        match result {
            Ok(list) => {
                self.selector.select_existing(list);
                self.mark_submitted();
                notifier.success("Sync saved successfully");
            }
            Err(err) => {
                warn!("[PHASE: wizard] [STEP: submit] Save failed: {}", err.api_error());
                if let SubmitError::Save {
                    resolved_list: Some(list),
                    ..
                } = &err
                {
                    // The list exists now; keep its real id so a retry only
                    // repeats the sync write.
                    self.selector.select_existing(list.clone());
                }
                notifier.error("Failed to save sync. Please try again.");
            }
        }
        true
    }
}

/// The network leg. Free function so a worker thread can run it with only the
/// backend and the frozen plan. Issues exactly one sync write; the pending
/// placeholder id never reaches the sync payload.
pub async fn execute_submit_plan(
    backend: &dyn SyncBackend,
    plan: &SubmitPlan,
) -> Result<RemoteList, SubmitError> {
    let mut list = plan.list.clone();
    let mut created_inline = false;

    if list.id == PENDING_LIST_ID {
        list = backend
            .create_remote_list(plan.service, &list.name, plan.customer_id.as_deref())
            .await
            .map_err(SubmitError::CreateList)?;
        created_inline = true;
        info!(
            "[PHASE: wizard] [STEP: submit] {}: created list '{}' (id {})",
            plan.correlation_id, list.name, list.id
        );
    }

    let save_result = match &plan.mode {
        WizardMode::Create => {
            let req = SyncCreateRequest {
                list_id: list.id.clone(),
                list_name: list.name.clone(),
                leads_type: plan.leads_type.to_string(),
                data_map: plan.data_map.clone(),
                customer_id: plan.customer_id.clone(),
            };
            backend.create_sync(plan.service, &req).await
        }
        WizardMode::Edit { sync_id } => {
            let req = SyncUpdateRequest {
                integrations_users_sync_id: sync_id.clone(),
                list_id: list.id.clone(),
                list_name: list.name.clone(),
                leads_type: plan.leads_type.to_string(),
                data_map: Some(plan.data_map.clone()),
                customer_id: plan.customer_id.clone(),
            };
            backend.update_sync(plan.service, &req).await
        }
    };

    match save_result {
        Ok(()) => Ok(list),
        Err(error) => Err(SubmitError::Save {
            error,
            resolved_list: created_inline.then_some(list),
        }),
    }
}

// =============================================================================
// Unit tests: the full save path against a recording mock backend
// =============================================================================
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::responses::SubAccount;
    use crate::notify::{NoticeKind, NullNotifier, RecordingNotifier};
    use crate::wizard::service::{ServiceKind, ServiceProfile};
    use crate::wizard::{ContactFilter, SavedSync, WizardOutcome};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        FetchLists,
        CreateList { name: String },
        CreateSync(SyncCreateRequest),
        UpdateSync(SyncUpdateRequest),
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<Call>>,
        fail_create_list: bool,
        fail_save: bool,
    }

    impl MockBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn server_error() -> ApiError {
            ApiError::Status {
                status: 500,
                body: "internal error".to_string(),
            }
        }
    }

    #[async_trait]
    impl SyncBackend for MockBackend {
        async fn fetch_lists(
            &self,
            _service: &str,
            _customer_id: Option<&str>,
        ) -> Result<Vec<RemoteList>, ApiError> {
            self.calls.lock().unwrap().push(Call::FetchLists);
            Ok(vec![RemoteList {
                id: "42".to_string(),
                name: "Newsletter".to_string(),
            }])
        }

        async fn fetch_sub_accounts(&self, _service: &str) -> Result<Vec<SubAccount>, ApiError> {
            Ok(Vec::new())
        }

        async fn create_remote_list(
            &self,
            _service: &str,
            name: &str,
            _customer_id: Option<&str>,
        ) -> Result<RemoteList, ApiError> {
            self.calls.lock().unwrap().push(Call::CreateList {
                name: name.to_string(),
            });
            if self.fail_create_list {
                return Err(Self::server_error());
            }
            Ok(RemoteList {
                id: "777".to_string(),
                name: name.to_string(),
            })
        }

        async fn create_sync(
            &self,
            _service: &str,
            req: &SyncCreateRequest,
        ) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(Call::CreateSync(req.clone()));
            if self.fail_save {
                return Err(Self::server_error());
            }
            Ok(())
        }

        async fn update_sync(
            &self,
            _service: &str,
            req: &SyncUpdateRequest,
        ) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(Call::UpdateSync(req.clone()));
            if self.fail_save {
                return Err(Self::server_error());
            }
            Ok(())
        }
    }

    fn ready_wizard() -> SyncWizard {
        let mut w = SyncWizard::new(ServiceProfile::for_kind(ServiceKind::Slack));
        w.set_contact_filter(ContactFilter::AllContacts);
        w.selector.select_existing(RemoteList {
            id: "42".to_string(),
            name: "Newsletter".to_string(),
        });
        w
    }

    async fn run_save(
        wizard: &mut SyncWizard,
        backend: &MockBackend,
        notifier: &dyn Notifier,
    ) -> bool {
        match wizard.begin_submit() {
            BeginSubmit::Started { plan, generation } => {
                let result = execute_submit_plan(backend, &plan).await;
                wizard.finish_submit(generation, result, notifier)
            }
            BeginSubmit::InFlight => false,
            BeginSubmit::Invalid(_) => false,
        }
    }

    #[tokio::test]
    async fn create_round_trip_issues_exactly_one_post() {
        let backend = MockBackend::default();
        let notifier = RecordingNotifier::new();
        let mut w = ready_wizard();

        assert!(run_save(&mut w, &backend, &notifier).await);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1, "exactly one write must go out");
        match &calls[0] {
            Call::CreateSync(req) => {
                assert_eq!(req.list_id, "42");
                assert_eq!(req.list_name, "Newsletter");
                assert_eq!(req.leads_type, "allContacts");
                assert_eq!(req.data_map.len(), 4, "default rows go out as-is");
                assert_eq!(req.customer_id, None);
            }
            other => panic!("expected CreateSync, got {:?}", other),
        }

        assert_eq!(w.outcome(), Some(WizardOutcome::Submitted));
        assert!(!w.is_open(), "successful save closes the drawer");
        assert!(!w.is_submitting());
        let notices = notifier.take();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Success);
    }

    #[tokio::test]
    async fn pending_list_is_created_before_the_sync_write() {
        let backend = MockBackend::default();
        let notifier = RecordingNotifier::new();
        let mut w = ready_wizard();
        assert!(w.selector.begin_create("Spring campaign"));

        assert!(run_save(&mut w, &backend, &notifier).await);

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::CreateList {
                name: "Spring campaign".to_string()
            },
            "list creation must precede the sync write"
        );
        match &calls[1] {
            Call::CreateSync(req) => {
                assert_eq!(req.list_id, "777", "the backend-assigned id is used");
                assert_ne!(req.list_id, PENDING_LIST_ID, "placeholder never hits the wire");
                assert_eq!(req.list_name, "Spring campaign");
            }
            other => panic!("expected CreateSync, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_list_creation_aborts_without_a_sync_write() {
        let backend = MockBackend {
            fail_create_list: true,
            ..MockBackend::default()
        };
        let notifier = RecordingNotifier::new();
        let mut w = ready_wizard();
        assert!(w.selector.begin_create("Spring campaign"));

        assert!(run_save(&mut w, &backend, &notifier).await);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1, "no sync write after a failed list creation");
        assert!(matches!(calls[0], Call::CreateList { .. }));
        assert!(w.is_open(), "drawer stays open on failure");
        assert!(w.selector.has_pending_create(), "pending selection survives");
        assert_eq!(notifier.take()[0].kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn edit_mode_issues_exactly_one_put() {
        let backend = MockBackend::default();
        let saved = SavedSync {
            sync_id: "sync-9".to_string(),
            list: RemoteList {
                id: "42".to_string(),
                name: "Newsletter".to_string(),
            },
            leads_type: "visitor".to_string(),
            data_map: vec![crate::models::requests::FieldMapEntry {
                source_field: "Email".to_string(),
                destination_field: "email".to_string(),
            }],
            customer_id: None,
        };
        let mut w = SyncWizard::for_edit(ServiceProfile::for_kind(ServiceKind::Slack), saved);

        assert!(run_save(&mut w, &backend, &NullNotifier).await);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::UpdateSync(req) => {
                assert_eq!(req.integrations_users_sync_id, "sync-9");
                assert_eq!(req.list_id, "42");
                assert_eq!(req.leads_type, "visitor");
                assert_eq!(req.data_map.as_ref().unwrap().len(), 1);
            }
            other => panic!("expected UpdateSync, got {:?}", other),
        }
        assert_eq!(w.outcome(), Some(WizardOutcome::Submitted));
    }

    #[tokio::test]
    async fn server_error_keeps_drawer_open_and_clears_loading() {
        let backend = MockBackend {
            fail_save: true,
            ..MockBackend::default()
        };
        let notifier = RecordingNotifier::new();
        let mut w = ready_wizard();

        assert!(run_save(&mut w, &backend, &notifier).await);

        assert!(w.is_open(), "failed save must not close the drawer");
        assert!(!w.is_submitting(), "loading flag must clear");
        assert_eq!(w.outcome(), None);
        assert_eq!(w.contact_filter(), Some(ContactFilter::AllContacts));
        assert_eq!(w.selector.selected().unwrap().id, "42");
        let notices = notifier.take();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn failed_save_after_inline_creation_keeps_resolved_id() {
        let backend = MockBackend {
            fail_save: true,
            ..MockBackend::default()
        };
        let mut w = ready_wizard();
        assert!(w.selector.begin_create("Spring campaign"));

        assert!(run_save(&mut w, &backend, &NullNotifier).await);

        // The list exists server-side now; a retry must not create it again.
        assert!(!w.selector.has_pending_create());
        assert_eq!(w.selector.selected().unwrap().id, "777");

        let backend2 = MockBackend::default();
        assert!(run_save(&mut w, &backend2, &NullNotifier).await);
        let calls = backend2.calls();
        assert_eq!(calls.len(), 1, "retry repeats only the sync write");
        assert!(matches!(calls[0], Call::CreateSync(_)));
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_a_no_op() {
        let mut w = ready_wizard();

        let first = w.begin_submit();
        assert!(matches!(first, BeginSubmit::Started { .. }));
        assert!(matches!(w.begin_submit(), BeginSubmit::InFlight));

        // The first save still completes normally afterwards.
        let backend = MockBackend::default();
        if let BeginSubmit::Started { plan, generation } = first {
            let result = execute_submit_plan(&backend, &plan).await;
            assert!(w.finish_submit(generation, result, &NullNotifier));
        }
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn invalid_wizard_never_reaches_the_network() {
        let backend = MockBackend::default();
        let mut w = SyncWizard::new(ServiceProfile::for_kind(ServiceKind::Slack));

        match w.begin_submit() {
            BeginSubmit::Invalid(step) => assert_eq!(step, WizardStep::Filter),
            _ => panic!("submit with no filter must be Invalid"),
        }
        assert!(backend.calls().is_empty(), "no network call on validation failure");
        assert!(w.has_error(WizardStep::Filter));
        assert!(!w.is_submitting());
    }

    #[tokio::test]
    async fn stale_generation_result_is_dropped() {
        let backend = MockBackend::default();
        let notifier = RecordingNotifier::new();
        let mut w = ready_wizard();

        let (plan, generation) = match w.begin_submit() {
            BeginSubmit::Started { plan, generation } => (plan, generation),
            _ => panic!("expected Started"),
        };
        let result = execute_submit_plan(&backend, &plan).await;

        // Drawer closed while the save was in flight.
        w.reset_on_close();

        assert!(
            !w.finish_submit(generation, result, &notifier),
            "stale completion must be discarded"
        );
        assert_eq!(w.outcome(), None);
        assert!(notifier.take().is_empty(), "no notice for a stale result");
        assert_eq!(w.step(), WizardStep::Filter, "reset state stays untouched");
    }
}
