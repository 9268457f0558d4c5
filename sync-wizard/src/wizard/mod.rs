// Sync-configuration wizard engine.
// The step controller: a three-step state machine (contact filter ->
// destination list -> field mapping) with per-step validation gating.
// Everything here is plain state, fully testable without a terminal or a
// network; the TUI host and the HTTP client hang off the seams.

pub mod field_mapper;
pub mod list_selector;
pub mod service;
pub mod submission;

use crate::models::requests::FieldMapEntry;
use crate::models::responses::{RemoteList, SubAccount};

use field_mapper::FieldMapper;
use list_selector::ListSelector;
use service::ServiceProfile;

// =========================
// Steps and filters
// =========================

/// Wizard step. Wire ids are the tab ids the product UI always used
/// ("1" / "2" / "3").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Filter,
    Destination,
    Mapping,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::Filter,
        WizardStep::Destination,
        WizardStep::Mapping,
    ];

    pub fn as_id(&self) -> &'static str {
        match self {
            WizardStep::Filter => "1",
            WizardStep::Destination => "2",
            WizardStep::Mapping => "3",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Filter => "Contacts to sync",
            WizardStep::Destination => "Destination",
            WizardStep::Mapping => "Field mapping",
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Filter => Some(WizardStep::Destination),
            WizardStep::Destination => Some(WizardStep::Mapping),
            WizardStep::Mapping => None,
        }
    }

    pub fn prev(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Filter => None,
            WizardStep::Destination => Some(WizardStep::Filter),
            WizardStep::Mapping => Some(WizardStep::Destination),
        }
    }

    fn index(&self) -> usize {
        match self {
            WizardStep::Filter => 0,
            WizardStep::Destination => 1,
            WizardStep::Mapping => 2,
        }
    }
}

/// Which contacts flow into the sync. Wire ids per the backend contract;
/// never absent at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFilter {
    AllContacts,
    Visitor,
    ViewedProduct,
    AddedToCart,
    ConvertedSales,
}

impl ContactFilter {
    pub const ALL: [ContactFilter; 5] = [
        ContactFilter::AllContacts,
        ContactFilter::Visitor,
        ContactFilter::ViewedProduct,
        ContactFilter::AddedToCart,
        ContactFilter::ConvertedSales,
    ];

    pub fn as_id(&self) -> &'static str {
        match self {
            ContactFilter::AllContacts => "allContacts",
            ContactFilter::Visitor => "visitor",
            ContactFilter::ViewedProduct => "viewed_product",
            ContactFilter::AddedToCart => "added_to_cart",
            ContactFilter::ConvertedSales => "converted_sales",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactFilter::AllContacts => "All contacts",
            ContactFilter::Visitor => "Visitors",
            ContactFilter::ViewedProduct => "Viewed a product",
            ContactFilter::AddedToCart => "Added to cart",
            ContactFilter::ConvertedSales => "Converted sales",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ContactFilter::ALL.into_iter().find(|f| f.as_id() == s)
    }
}

// =========================
// Mode and edit seeding
// =========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { sync_id: String },
}

/// A persisted sync record used to pre-populate the wizard in edit mode.
#[derive(Debug, Clone)]
pub struct SavedSync {
    pub sync_id: String,
    pub list: RemoteList,
    pub leads_type: String,
    pub data_map: Vec<FieldMapEntry>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Submitted,
}

// =========================
// The wizard
// =========================

pub struct SyncWizard {
    profile: ServiceProfile,
    mode: WizardMode,
    step: WizardStep,
    contact_filter: Option<ContactFilter>,
    /// Step currently showing an inline validation error, if any.
    step_error: Option<WizardStep>,
    pub selector: ListSelector,
    pub mapper: FieldMapper,
    sub_accounts: Vec<SubAccount>,
    selected_sub_account: Option<SubAccount>,
    open: bool,
    outcome: Option<WizardOutcome>,
    submitting: bool,
    /// Bumped on every reset; async completions stamped with an older value
    /// are discarded (the drawer they belonged to is gone).
    generation: u64,
    on_saved: Option<Box<dyn Fn() + Send + Sync>>,
}

impl SyncWizard {
    /// Fresh create-mode wizard for one integration.
    pub fn new(profile: ServiceProfile) -> Self {
        let mapper = FieldMapper::seeded(profile.default_rows);
        Self {
            mode: WizardMode::Create,
            step: WizardStep::Filter,
            contact_filter: None,
            step_error: None,
            selector: ListSelector::new(),
            mapper,
            sub_accounts: Vec::new(),
            selected_sub_account: None,
            open: true,
            outcome: None,
            submitting: false,
            generation: 0,
            on_saved: None,
            profile,
        }
    }

    /// Edit-mode wizard pre-populated from a persisted sync.
    pub fn for_edit(profile: ServiceProfile, saved: SavedSync) -> Self {
        let mut wizard = Self::new(profile);
        wizard.mapper = FieldMapper::from_saved(&saved.data_map, wizard.profile.default_rows);
        wizard.contact_filter = ContactFilter::parse(&saved.leads_type);
        wizard.selector.select_existing(saved.list);
        if let Some(customer_id) = &saved.customer_id {
            wizard.selected_sub_account = Some(SubAccount {
                id: customer_id.clone(),
                descriptive_name: String::new(),
            });
        }
        wizard.mode = WizardMode::Edit {
            sync_id: saved.sync_id,
        };
        wizard
    }

    /// Edit-mode wizard when only the sync id is at hand: the user re-walks
    /// the steps and the save issues an update instead of a create.
    pub fn for_sync_id(profile: ServiceProfile, sync_id: String) -> Self {
        let mut wizard = Self::new(profile);
        wizard.mode = WizardMode::Edit { sync_id };
        wizard
    }

    /// Shared refresh signal: fired once after a successful save so the
    /// parent list-of-syncs view can re-fetch.
    pub fn set_on_saved(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_saved = Some(Box::new(callback));
    }

    pub fn profile(&self) -> &ServiceProfile {
        &self.profile
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn outcome(&self) -> Option<WizardOutcome> {
        self.outcome
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contact_filter(&self) -> Option<ContactFilter> {
        self.contact_filter
    }

    pub fn set_contact_filter(&mut self, filter: ContactFilter) {
        self.contact_filter = Some(filter);
        if self.step_error == Some(WizardStep::Filter) {
            self.step_error = None;
        }
    }

    pub fn step_error(&self) -> Option<WizardStep> {
        self.step_error
    }

    pub fn has_error(&self, step: WizardStep) -> bool {
        self.step_error == Some(step)
    }

    pub fn sub_accounts(&self) -> &[SubAccount] {
        &self.sub_accounts
    }

    pub fn set_sub_accounts(&mut self, accounts: Vec<SubAccount>) {
        self.sub_accounts = accounts;
    }

    pub fn selected_sub_account(&self) -> Option<&SubAccount> {
        self.selected_sub_account.as_ref()
    }

    /// Picking a sub-account re-scopes the destination step: previously
    /// fetched lists (and any selection made against them) are discarded.
    pub fn select_sub_account(&mut self, account: SubAccount) {
        if self.selected_sub_account.as_ref() == Some(&account) {
            return;
        }
        self.selected_sub_account = Some(account);
        self.selector.reset();
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.selected_sub_account.as_ref().map(|a| a.id.as_str())
    }

    /// Per-step validation. Pure; never issues a network call.
    pub fn validate_step(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Filter => self.contact_filter.is_some(),
            WizardStep::Destination => {
                let sub_account_ok =
                    !self.profile.requires_sub_account || self.selected_sub_account.is_some();
                sub_account_ok && self.selector.is_valid()
            }
            WizardStep::Mapping => self.mapper.is_complete(),
        }
    }

    /// "Next" on the current step: move forward if the step validates,
    /// otherwise set the step's inline error flag and stay. Validation
    /// failure is local and non-fatal.
    pub fn advance(&mut self) -> bool {
        if !self.validate_step(self.step) {
            self.step_error = Some(self.step);
            return false;
        }
        self.step_error = None;
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Tab-header navigation. Backward jumps are unconditional; forward
    /// jumps re-validate every skipped step and stop on the first invalid
    /// one (with its error flag set).
    pub fn set_step(&mut self, target: WizardStep) {
        if target.index() <= self.step.index() {
            self.step = target;
            return;
        }
        let mut current = self.step;
        while current.index() < target.index() {
            if !self.validate_step(current) {
                self.step = current;
                self.step_error = Some(current);
                return;
            }
            match current.next() {
                Some(next) => current = next,
                None => break,
            }
        }
        self.step_error = None;
        self.step = current;
    }

    /// Drawer closed: every piece of wizard state returns to its initial
    /// value so re-opening starts clean, and the generation bumps so any
    /// in-flight async completion is discarded on arrival.
    pub fn reset_on_close(&mut self) {
        self.mode = WizardMode::Create;
        self.step = WizardStep::Filter;
        self.contact_filter = None;
        self.step_error = None;
        self.selector.reset();
        self.mapper = FieldMapper::seeded(self.profile.default_rows);
        self.sub_accounts = Vec::new();
        self.selected_sub_account = None;
        self.open = false;
        self.outcome = None;
        self.submitting = false;
        self.generation += 1;
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.outcome = Some(WizardOutcome::Submitted);
        self.open = false;
        if let Some(callback) = &self.on_saved {
            callback();
        }
    }

    pub(crate) fn set_step_error(&mut self, step: WizardStep) {
        self.step = step;
        self.step_error = Some(step);
    }
}

// =============================================================================
// Unit tests: step gating, tab navigation, reset
// =============================================================================
#[cfg(test)]
mod tests {
    use super::service::{ServiceKind, ServiceProfile};
    use super::*;

    fn wizard(kind: ServiceKind) -> SyncWizard {
        SyncWizard::new(ServiceProfile::for_kind(kind))
    }

    fn list(id: &str, name: &str) -> RemoteList {
        RemoteList {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn advance_without_filter_stays_and_flags_error() {
        let mut w = wizard(ServiceKind::Slack);
        assert!(!w.advance(), "step 1 must not advance without a filter");
        assert_eq!(w.step(), WizardStep::Filter);
        assert!(w.has_error(WizardStep::Filter));
    }

    #[test]
    fn choosing_filter_clears_error_and_unlocks_advance() {
        let mut w = wizard(ServiceKind::Slack);
        let _ = w.advance();
        w.set_contact_filter(ContactFilter::AllContacts);
        assert!(!w.has_error(WizardStep::Filter), "picking a filter clears the flag");
        assert!(w.advance());
        assert_eq!(w.step(), WizardStep::Destination);
    }

    #[test]
    fn destination_requires_selection() {
        let mut w = wizard(ServiceKind::Slack);
        w.set_contact_filter(ContactFilter::Visitor);
        assert!(w.advance());

        assert!(!w.advance(), "no list selected yet");
        assert!(w.has_error(WizardStep::Destination));

        w.selector.select_existing(list("42", "Newsletter"));
        assert!(w.advance());
        assert_eq!(w.step(), WizardStep::Mapping);
    }

    #[test]
    fn google_ads_destination_also_requires_sub_account() {
        let mut w = wizard(ServiceKind::GoogleAds);
        w.set_contact_filter(ContactFilter::AllContacts);
        assert!(w.advance());

        w.selector.select_existing(list("7", "Audience"));
        assert!(
            !w.advance(),
            "Google Ads must not pass the destination step without a sub-account"
        );

        w.select_sub_account(SubAccount {
            id: "123-456".to_string(),
            descriptive_name: "Main".to_string(),
        });
        // Re-scoping cleared the selection; pick again.
        w.selector.select_existing(list("7", "Audience"));
        assert!(w.advance());
    }

    #[test]
    fn selecting_sub_account_rescopes_lists() {
        let mut w = wizard(ServiceKind::GoogleAds);
        w.selector.select_existing(list("7", "Audience"));
        w.select_sub_account(SubAccount {
            id: "123".to_string(),
            descriptive_name: "A".to_string(),
        });
        assert!(
            w.selector.selected().is_none(),
            "changing sub-account must discard the old scope's selection"
        );
    }

    #[test]
    fn set_step_backward_is_unconditional() {
        let mut w = wizard(ServiceKind::Slack);
        w.set_contact_filter(ContactFilter::AllContacts);
        w.selector.select_existing(list("1", "A"));
        assert!(w.advance());
        assert!(w.advance());
        assert_eq!(w.step(), WizardStep::Mapping);

        w.set_step(WizardStep::Filter);
        assert_eq!(w.step(), WizardStep::Filter);
        assert!(w.step_error().is_none());
    }

    #[test]
    fn set_step_forward_revalidates_skipped_steps() {
        let mut w = wizard(ServiceKind::Slack);
        // Nothing chosen: jumping straight to mapping must stop at step 1.
        w.set_step(WizardStep::Mapping);
        assert_eq!(w.step(), WizardStep::Filter);
        assert!(w.has_error(WizardStep::Filter));

        // Filter ok, list missing: same jump now stops at step 2.
        w.set_contact_filter(ContactFilter::Visitor);
        w.set_step(WizardStep::Mapping);
        assert_eq!(w.step(), WizardStep::Destination);
        assert!(w.has_error(WizardStep::Destination));

        // Everything valid: the jump lands.
        w.selector.select_existing(list("1", "A"));
        w.set_step(WizardStep::Mapping);
        assert_eq!(w.step(), WizardStep::Mapping);
        assert!(w.step_error().is_none());
    }

    #[test]
    fn reset_on_close_restores_all_initial_values() {
        let mut w = wizard(ServiceKind::Slack);
        let generation_before = w.generation();

        // Progress deep into the wizard and dirty every piece of state.
        w.set_contact_filter(ContactFilter::ConvertedSales);
        assert!(w.advance());
        w.selector.select_existing(list("42", "Newsletter"));
        assert!(w.advance());
        let row = w.mapper.add_row();
        w.mapper
            .update_row(row, field_mapper::RowField::DestinationValue, "extra");
        w.set_submitting(true);

        w.reset_on_close();

        assert_eq!(w.step(), WizardStep::Filter);
        assert!(w.contact_filter().is_none());
        assert!(w.step_error().is_none());
        assert!(w.selector.selected().is_none());
        assert!(w.selector.lists().is_empty());
        assert_eq!(w.mapper.rows().len(), 4, "mapper reseeded with defaults");
        assert!(!w.is_submitting());
        assert!(!w.is_open());
        assert_eq!(w.generation(), generation_before + 1, "generation must bump");
    }

    #[test]
    fn edit_mode_prepopulates_state() {
        let saved = SavedSync {
            sync_id: "sync-9".to_string(),
            list: list("42", "Newsletter"),
            leads_type: "added_to_cart".to_string(),
            data_map: vec![FieldMapEntry {
                source_field: "Email".to_string(),
                destination_field: "email".to_string(),
            }],
            customer_id: None,
        };
        let w = SyncWizard::for_edit(ServiceProfile::for_kind(ServiceKind::Meta), saved);

        assert_eq!(w.contact_filter(), Some(ContactFilter::AddedToCart));
        assert_eq!(w.selector.selected().unwrap().id, "42");
        assert_eq!(w.mapper.rows().len(), 1);
        assert!(matches!(w.mode(), WizardMode::Edit { sync_id } if sync_id == "sync-9"));
    }

    #[test]
    fn filter_ids_match_wire_contract() {
        assert_eq!(ContactFilter::AllContacts.as_id(), "allContacts");
        assert_eq!(ContactFilter::Visitor.as_id(), "visitor");
        assert_eq!(ContactFilter::ViewedProduct.as_id(), "viewed_product");
        assert_eq!(ContactFilter::AddedToCart.as_id(), "added_to_cart");
        assert_eq!(ContactFilter::ConvertedSales.as_id(), "converted_sales");
        for f in ContactFilter::ALL {
            assert_eq!(ContactFilter::parse(f.as_id()), Some(f));
        }
    }

    #[test]
    fn step_ids_are_string_encoded_integers() {
        assert_eq!(WizardStep::Filter.as_id(), "1");
        assert_eq!(WizardStep::Destination.as_id(), "2");
        assert_eq!(WizardStep::Mapping.as_id(), "3");
    }
}
