//! Terminal UI host for the sync-configuration wizard.
//!
//! Layout:
//! - Centered window frame titled "Sync Setup"
//! - Tab header for the three wizard steps
//! - Main content panel per page
//! - Bottom button row: [ Back ] [ Next ] [ Cancel ]
//! - Modal confirmations (Cancel, remove mapping row)
//!
//! All network work (list/customer fetches, the save itself) runs on spawned
//! threads with a current-thread runtime, reporting back over an mpsc channel
//! of generation-stamped messages. Logging is file-only in TUI mode (stdout
//! logging is disabled) to avoid corrupting the terminal UI.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::info;
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::api::{ApiClient, ApiError};
use crate::models::responses::{RemoteList, SubAccount};
use crate::notify::{NoticeKind, Notifier, NullNotifier, RecordingNotifier};
use crate::wizard::field_mapper::RowField;
use crate::wizard::service::{ServiceKind, ServiceProfile};
use crate::wizard::submission::{execute_submit_plan, BeginSubmit, SubmitError};
use crate::wizard::{ContactFilter, SyncWizard, WizardOutcome, WizardStep};

const BANNER: &str = r#"  ___ _   _ _ _  ___
 / __| | | | '_ \/ __|
 \__ \ |_| | | | \__ \
 |___/\__, |_| |_|___/
      |___/           "#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Service,
    Filter,
    Destination,
    Mapping,
    Saving,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel,
    ConfirmRemoveRow,
    Message { title: String, body: String },
}

#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            cursor: v.len(),
            value: v,
        }
    }

    /// Byte offset of the char boundary before the cursor.
    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Byte offset of the char boundary after the cursor.
    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.value.len())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                // The cursor is a byte index; multi-byte chars advance it by
                // their full width so it always sits on a char boundary.
                self.value.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let idx = self.prev_boundary();
                    self.value.remove(idx);
                    self.cursor = idx;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.len() {
                    self.value.remove(self.cursor);
                }
                true
            }
            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor = self.prev_boundary();
                }
                true
            }
            KeyCode::Right => {
                if self.cursor < self.value.len() {
                    self.cursor = self.next_boundary();
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            _ => false,
        }
    }
}

/// Which row cell is being edited on the mapping page.
#[derive(Debug, Clone)]
struct RowEdit {
    row_id: u64,
    field: RowField,
    input: TextInput,
}

/// Background-work completions. Every message carries the wizard generation
/// it was started under; stale ones are dropped on arrival.
enum UiMsg {
    ListsLoaded {
        generation: u64,
        result: Result<Vec<RemoteList>, ApiError>,
    },
    SubAccountsLoaded {
        generation: u64,
        result: Result<Vec<SubAccount>, ApiError>,
    },
    SaveFinished {
        generation: u64,
        result: Result<RemoteList, SubmitError>,
    },
}

struct TuiState {
    page: Page,
    client: ApiClient,
    notifier: RecordingNotifier,
    quit: bool,

    // Service picker
    service_index: usize,
    preselected: Option<ServiceKind>,
    edit_sync_id: Option<String>,

    wizard: Option<SyncWizard>,
    focus: ButtonFocus,
    modal: Option<Modal>,
    status: Option<(NoticeKind, String)>,

    // Destination page
    list_index: usize,
    creating: bool,
    new_list_name: TextInput,
    lists_requested: bool,
    sub_accounts_requested: bool,

    // Mapping page
    row_index: usize,
    editing: Option<RowEdit>,
}

impl TuiState {
    fn new(client: ApiClient, service: Option<ServiceKind>, edit_sync_id: Option<String>) -> Self {
        let service_index = service
            .and_then(|s| ServiceKind::ALL.iter().position(|k| *k == s))
            .unwrap_or(0);
        Self {
            page: Page::Service,
            client,
            notifier: RecordingNotifier::new(),
            quit: false,
            service_index,
            preselected: service,
            edit_sync_id,
            wizard: None,
            focus: ButtonFocus::Next,
            modal: None,
            status: None,
            list_index: 0,
            creating: false,
            new_list_name: TextInput::new(""),
            lists_requested: false,
            sub_accounts_requested: false,
            row_index: 0,
            editing: None,
        }
    }
}

fn page_for_step(step: WizardStep) -> Page {
    match step {
        WizardStep::Filter => Page::Filter,
        WizardStep::Destination => Page::Destination,
        WizardStep::Mapping => Page::Mapping,
    }
}

fn page_title(state: &TuiState) -> String {
    match state.page {
        Page::Service => "Choose an integration".to_string(),
        Page::Filter => "Which contacts should sync?".to_string(),
        Page::Destination => match &state.wizard {
            Some(w) => format!("Choose a {}", w.profile().list_noun),
            None => "Destination".to_string(),
        },
        Page::Mapping => "Map contact fields".to_string(),
        Page::Saving => "Saving sync configuration".to_string(),
        Page::Complete => "All set".to_string(),
    }
}

fn next_label(page: Page) -> &'static str {
    match page {
        Page::Mapping => "Save",
        Page::Complete => "Finish",
        _ => "Next",
    }
}

fn can_go_back(page: Page) -> bool {
    matches!(page, Page::Destination | Page::Mapping)
}

// =========================
// Entry points
// =========================

pub fn run(
    client: ApiClient,
    service: Option<ServiceKind>,
    edit_sync_id: Option<String>,
) -> Result<()> {
    info!("[PHASE: tui] [STEP: start] Starting sync wizard TUI");

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, client, service, edit_sync_id);
    restore_terminal(&mut terminal)?;

    result
}

/// Non-interactive smoke mode: render a single frame and exit.
/// Target pages: service|filter|destination|mapping|saving|complete
pub fn smoke(target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let t = target.trim().to_ascii_lowercase();
    let state = new_smoke_state(t.as_str());

    // In-memory backend so CI can run this without a real terminal (no raw
    // mode / alternate screen).
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &state))?;

    Ok(())
}

fn smoke_client() -> ApiClient {
    let cfg = crate::config::AppConfig {
        api_base_url: "https://smoke.invalid".to_string(),
        api_token: String::new(),
        request_timeout_secs: 5,
    };
    ApiClient::new(&cfg)
}

fn new_smoke_state(target: &str) -> TuiState {
    // Smoke-only: seeded state for deterministic page rendering in CI.
    let mut state = TuiState::new(smoke_client(), None, None);
    let profile = ServiceProfile::for_kind(ServiceKind::Slack);

    let seeded_wizard = || {
        let mut w = SyncWizard::new(profile.clone());
        w.set_contact_filter(ContactFilter::AllContacts);
        w.selector.apply_loaded(
            Ok(vec![
                RemoteList {
                    id: "42".to_string(),
                    name: "Newsletter".to_string(),
                },
                RemoteList {
                    id: "43".to_string(),
                    name: "Spring campaign".to_string(),
                },
            ]),
            &NullNotifier,
        );
        w
    };

    match target {
        "filter" => {
            state.page = Page::Filter;
            state.wizard = Some(seeded_wizard());
        }
        "destination" => {
            state.page = Page::Destination;
            let mut w = seeded_wizard();
            w.selector.select_existing(RemoteList {
                id: "42".to_string(),
                name: "Newsletter".to_string(),
            });
            state.wizard = Some(w);
            state.lists_requested = true;
        }
        "mapping" => {
            state.page = Page::Mapping;
            let mut w = seeded_wizard();
            w.selector.select_existing(RemoteList {
                id: "42".to_string(),
                name: "Newsletter".to_string(),
            });
            state.wizard = Some(w);
            state.row_index = 1;
        }
        "saving" => {
            state.page = Page::Saving;
            state.wizard = Some(seeded_wizard());
        }
        "complete" => {
            state.page = Page::Complete;
            state.status = Some((NoticeKind::Success, "Sync saved successfully".to_string()));
        }
        _ => {
            state.page = Page::Service;
        }
    }

    state
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    client: ApiClient,
    service: Option<ServiceKind>,
    edit_sync_id: Option<String>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut state = TuiState::new(client, service, edit_sync_id);
    let (tx, rx) = mpsc::channel::<UiMsg>();

    // A preselected service skips the picker.
    if state.preselected.is_some() {
        open_wizard(&mut state);
    }

    while !state.quit {
        drain_messages(&mut state, &rx);
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut state, key.code, &tx),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

// =========================
// Background workers
// =========================

fn start_load_lists(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    let Some(wizard) = &state.wizard else { return };
    let client = state.client.clone();
    let service = wizard.profile().service_name().to_string();
    let customer_id = wizard.customer_id().map(str::to_string);
    let generation = wizard.generation();
    state.lists_requested = true;

    let tx = tx.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match rt {
            Ok(rt) => rt.block_on(client.get_channels(&service, customer_id.as_deref())),
            Err(e) => Err(ApiError::Backend(format!("Internal error: {}", e))),
        };
        let _ = tx.send(UiMsg::ListsLoaded { generation, result });
    });
}

fn start_load_sub_accounts(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    let Some(wizard) = &state.wizard else { return };
    let client = state.client.clone();
    let service = wizard.profile().service_name().to_string();
    let generation = wizard.generation();
    state.sub_accounts_requested = true;

    let tx = tx.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match rt {
            Ok(rt) => rt.block_on(client.customers_info(&service)),
            Err(e) => Err(ApiError::Backend(format!("Internal error: {}", e))),
        };
        let _ = tx.send(UiMsg::SubAccountsLoaded { generation, result });
    });
}

fn start_save(
    state: &mut TuiState,
    tx: &mpsc::Sender<UiMsg>,
    plan: crate::wizard::submission::SubmitPlan,
    generation: u64,
) {
    let client = state.client.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match rt {
            Ok(rt) => rt.block_on(execute_submit_plan(&client, &plan)),
            Err(e) => Err(SubmitError::Save {
                error: ApiError::Backend(format!("Internal error: {}", e)),
                resolved_list: None,
            }),
        };
        let _ = tx.send(UiMsg::SaveFinished { generation, result });
    });
}

// =========================
// Message handling
// =========================

fn drain_messages(state: &mut TuiState, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::ListsLoaded { generation, result } => {
                if let Some(wizard) = &mut state.wizard {
                    if generation == wizard.generation() {
                        wizard.selector.apply_loaded(result, &state.notifier);
                        state.list_index = 0;
                    }
                }
            }
            UiMsg::SubAccountsLoaded { generation, result } => {
                if let Some(wizard) = &mut state.wizard {
                    if generation == wizard.generation() {
                        match result {
                            Ok(accounts) => wizard.set_sub_accounts(accounts),
                            Err(_) => state
                                .notifier
                                .error("Failed to load accounts. Please try again."),
                        }
                    }
                }
            }
            UiMsg::SaveFinished { generation, result } => {
                if let Some(wizard) = &mut state.wizard {
                    if wizard.finish_submit(generation, result, &state.notifier) {
                        state.page = match wizard.outcome() {
                            Some(WizardOutcome::Submitted) => Page::Complete,
                            None => Page::Mapping,
                        };
                    }
                }
            }
        }
    }

    // Surface the most recent notice in the footer.
    for notice in state.notifier.take() {
        state.status = Some((notice.kind, notice.text));
    }
}

// =========================
// Key handling
// =========================

fn open_wizard(state: &mut TuiState) {
    let kind = state
        .preselected
        .take()
        .unwrap_or(ServiceKind::ALL[state.service_index]);
    let profile = ServiceProfile::for_kind(kind);
    let wizard = match state.edit_sync_id.take() {
        Some(sync_id) => {
            state.modal = Some(Modal::Message {
                title: "Editing existing sync".to_string(),
                body: format!(
                    "Walking through the steps will update sync {} instead of creating a new one.",
                    sync_id
                ),
            });
            SyncWizard::for_sync_id(profile, sync_id)
        }
        None => SyncWizard::new(profile),
    };
    info!(
        "[PHASE: tui] [STEP: open] Opening wizard for {}",
        kind.as_id()
    );
    state.page = page_for_step(wizard.step());
    state.wizard = Some(wizard);
    state.focus = ButtonFocus::Next;
    state.list_index = 0;
    state.row_index = 0;
    state.creating = false;
    state.lists_requested = false;
    state.sub_accounts_requested = false;
    state.status = None;
}

fn close_wizard(state: &mut TuiState) {
    if let Some(wizard) = &mut state.wizard {
        wizard.reset_on_close();
    }
    state.wizard = None;
    state.page = Page::Service;
    state.focus = ButtonFocus::Next;
    state.creating = false;
    state.editing = None;
    state.status = None;
}

/// Entering the destination step kicks off the fetches it needs.
fn on_enter_destination(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    let (needs_lists, needs_accounts) = match &state.wizard {
        Some(w) => (
            !state.lists_requested && !w.selector.is_loaded(),
            w.profile().requires_sub_account && !state.sub_accounts_requested,
        ),
        None => (false, false),
    };
    if needs_accounts {
        start_load_sub_accounts(state, tx);
    }
    // Google Ads lists are scoped per sub-account; wait for the pick.
    let defer_lists = state
        .wizard
        .as_ref()
        .map(|w| w.profile().requires_sub_account && w.selected_sub_account().is_none())
        .unwrap_or(false);
    if needs_lists && !defer_lists {
        start_load_lists(state, tx);
    }
}

fn cycle_button(state: &mut TuiState, forward: bool) {
    let back_enabled = can_go_back(state.page);
    let order: &[ButtonFocus] = if back_enabled {
        &[ButtonFocus::Back, ButtonFocus::Next, ButtonFocus::Cancel]
    } else {
        &[ButtonFocus::Next, ButtonFocus::Cancel]
    };
    let idx = order.iter().position(|b| *b == state.focus).unwrap_or(0);
    let next = if forward {
        (idx + 1) % order.len()
    } else {
        (idx + order.len() - 1) % order.len()
    };
    state.focus = order[next];
}

fn handle_key(state: &mut TuiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    // Modal handling first.
    if let Some(modal) = state.modal.clone() {
        match modal {
            Modal::ConfirmCancel => match code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                    state.focus = match state.focus {
                        ButtonFocus::Cancel => ButtonFocus::Next,
                        _ => ButtonFocus::Cancel,
                    };
                }
                KeyCode::Enter => {
                    let confirm = state.focus == ButtonFocus::Cancel;
                    state.modal = None;
                    if confirm {
                        close_wizard(state);
                    }
                }
                KeyCode::Esc => state.modal = None,
                _ => {}
            },
            Modal::ConfirmRemoveRow => match code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    state.modal = None;
                    if let Some(wizard) = &mut state.wizard {
                        wizard.mapper.confirm_remove();
                        let len = wizard.mapper.rows().len();
                        if state.row_index >= len && len > 0 {
                            state.row_index = len - 1;
                        }
                    }
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    state.modal = None;
                    if let Some(wizard) = &mut state.wizard {
                        wizard.mapper.cancel_remove();
                    }
                }
                _ => {}
            },
            Modal::Message { .. } => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                    state.modal = None;
                }
            }
        }
        return;
    }

    // Active text edits capture keys next.
    if state.creating {
        match code {
            KeyCode::Enter => {
                if let Some(wizard) = &mut state.wizard {
                    if wizard.selector.begin_create(state.new_list_name.value.trim()) {
                        state.creating = false;
                        state.new_list_name = TextInput::new("");
                    }
                }
            }
            KeyCode::Esc => {
                state.creating = false;
                state.new_list_name = TextInput::new("");
            }
            other => {
                state.new_list_name.handle_key(other);
            }
        }
        return;
    }
    if state.editing.is_some() {
        match code {
            KeyCode::Enter => {
                if let Some(edit) = state.editing.take() {
                    if let Some(wizard) = &mut state.wizard {
                        wizard
                            .mapper
                            .update_row(edit.row_id, edit.field, edit.input.value.trim());
                    }
                }
            }
            KeyCode::Esc => {
                state.editing = None;
            }
            other => {
                if let Some(edit) = &mut state.editing {
                    edit.input.handle_key(other);
                }
            }
        }
        return;
    }

    // Global keys.
    match code {
        KeyCode::Tab => {
            if state.page != Page::Service && state.page != Page::Saving {
                cycle_button(state, true);
            }
            return;
        }
        KeyCode::BackTab => {
            if state.page != Page::Service && state.page != Page::Saving {
                cycle_button(state, false);
            }
            return;
        }
        KeyCode::Esc => {
            match state.page {
                Page::Service => state.quit = true,
                Page::Complete => state.quit = true,
                Page::Saving => {}
                _ => state.modal = Some(Modal::ConfirmCancel),
            }
            return;
        }
        // Tab-header navigation: backward always, forward re-validates.
        KeyCode::Char(c @ '1'..='3')
            if matches!(state.page, Page::Filter | Page::Destination | Page::Mapping) =>
        {
            if let Some(wizard) = &mut state.wizard {
                let target = match c {
                    '1' => WizardStep::Filter,
                    '2' => WizardStep::Destination,
                    _ => WizardStep::Mapping,
                };
                wizard.set_step(target);
                let landed = wizard.step();
                state.page = page_for_step(landed);
                if landed == WizardStep::Destination {
                    on_enter_destination(state, tx);
                }
            }
            return;
        }
        _ => {}
    }

    match state.page {
        Page::Service => handle_service_key(state, code),
        Page::Filter => handle_filter_key(state, code, tx),
        Page::Destination => handle_destination_key(state, code, tx),
        Page::Mapping => handle_mapping_key(state, code, tx),
        Page::Saving => {}
        Page::Complete => {
            if matches!(code, KeyCode::Enter | KeyCode::Char('q')) {
                state.quit = true;
            }
        }
    }
}

fn handle_service_key(state: &mut TuiState, code: KeyCode) {
    match code {
        KeyCode::Up => {
            state.service_index =
                (state.service_index + ServiceKind::ALL.len() - 1) % ServiceKind::ALL.len();
        }
        KeyCode::Down => {
            state.service_index = (state.service_index + 1) % ServiceKind::ALL.len();
        }
        KeyCode::Enter => open_wizard(state),
        KeyCode::Char('q') => state.quit = true,
        _ => {}
    }
}

fn activate_button(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    let Some(wizard) = &mut state.wizard else { return };
    match state.focus {
        ButtonFocus::Cancel => {
            state.modal = Some(Modal::ConfirmCancel);
        }
        ButtonFocus::Back => {
            if let Some(prev) = wizard.step().prev() {
                wizard.set_step(prev);
                state.page = page_for_step(wizard.step());
            }
        }
        ButtonFocus::Next => {
            if wizard.step() == WizardStep::Mapping {
                // Save.
                match wizard.begin_submit() {
                    BeginSubmit::Started { plan, generation } => {
                        state.page = Page::Saving;
                        start_save(state, tx, plan, generation);
                    }
                    BeginSubmit::InFlight => {}
                    BeginSubmit::Invalid(step) => {
                        state.page = page_for_step(step);
                    }
                }
            } else if wizard.advance() {
                let landed = wizard.step();
                state.page = page_for_step(landed);
                if landed == WizardStep::Destination {
                    on_enter_destination(state, tx);
                }
            }
        }
    }
}

fn handle_filter_key(state: &mut TuiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    match code {
        KeyCode::Up | KeyCode::Down => {
            if let Some(wizard) = &mut state.wizard {
                let current = wizard
                    .contact_filter()
                    .and_then(|f| ContactFilter::ALL.iter().position(|x| *x == f))
                    .unwrap_or(0);
                let len = ContactFilter::ALL.len();
                let next = if wizard.contact_filter().is_none() {
                    0
                } else if code == KeyCode::Down {
                    (current + 1) % len
                } else {
                    (current + len - 1) % len
                };
                wizard.set_contact_filter(ContactFilter::ALL[next]);
            }
        }
        KeyCode::Enter => activate_button(state, tx),
        KeyCode::Left => cycle_button(state, false),
        KeyCode::Right => cycle_button(state, true),
        _ => {}
    }
}

fn handle_destination_key(state: &mut TuiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    match code {
        KeyCode::Up => {
            state.list_index = state.list_index.saturating_sub(1);
        }
        KeyCode::Down => {
            if let Some(wizard) = &state.wizard {
                let len = wizard.selector.lists().len();
                if len > 0 {
                    state.list_index = (state.list_index + 1).min(len - 1);
                }
            }
        }
        KeyCode::Char(' ') => {
            if let Some(wizard) = &mut state.wizard {
                if let Some(list) = wizard.selector.lists().get(state.list_index).cloned() {
                    wizard.selector.select_existing(list);
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            state.creating = true;
            state.new_list_name = TextInput::new("");
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            // Cycle the sub-account pick; re-scopes and reloads lists.
            let mut reload = false;
            if let Some(wizard) = &mut state.wizard {
                if wizard.profile().requires_sub_account && !wizard.sub_accounts().is_empty() {
                    let accounts = wizard.sub_accounts().to_vec();
                    let current = wizard
                        .selected_sub_account()
                        .and_then(|sel| accounts.iter().position(|a| a == sel));
                    let next = match current {
                        Some(i) => (i + 1) % accounts.len(),
                        None => 0,
                    };
                    wizard.select_sub_account(accounts[next].clone());
                    state.lists_requested = false;
                    state.list_index = 0;
                    reload = true;
                }
            }
            if reload {
                start_load_lists(state, tx);
            }
        }
        KeyCode::Enter => activate_button(state, tx),
        KeyCode::Left => cycle_button(state, false),
        KeyCode::Right => cycle_button(state, true),
        _ => {}
    }
}

fn handle_mapping_key(state: &mut TuiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    match code {
        KeyCode::Up => {
            state.row_index = state.row_index.saturating_sub(1);
        }
        KeyCode::Down => {
            if let Some(wizard) = &state.wizard {
                let len = wizard.mapper.rows().len();
                if len > 0 {
                    state.row_index = (state.row_index + 1).min(len - 1);
                }
            }
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            if let Some(wizard) = &mut state.wizard {
                let id = wizard.mapper.add_row();
                state.row_index = wizard
                    .mapper
                    .rows()
                    .iter()
                    .position(|r| r.id == id)
                    .unwrap_or(0);
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            if let Some(wizard) = &mut state.wizard {
                if let Some(row) = wizard.mapper.rows().get(state.row_index) {
                    let id = row.id;
                    if wizard.mapper.request_remove(id) {
                        state.modal = Some(Modal::ConfirmRemoveRow);
                    }
                }
            }
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            begin_row_edit(state, RowField::SourceLabel);
        }
        KeyCode::Char('e') | KeyCode::Char('E') => {
            begin_row_edit(state, RowField::DestinationValue);
        }
        KeyCode::Enter => activate_button(state, tx),
        KeyCode::Left => cycle_button(state, false),
        KeyCode::Right => cycle_button(state, true),
        _ => {}
    }
}

fn begin_row_edit(state: &mut TuiState, field: RowField) {
    if let Some(wizard) = &state.wizard {
        if let Some(row) = wizard.mapper.rows().get(state.row_index) {
            // Default-row source labels are fixed.
            if field == RowField::SourceLabel && !row.deletable {
                return;
            }
            let value = match field {
                RowField::SourceLabel => row.source_label.clone(),
                RowField::DestinationValue => row.destination_value.clone(),
            };
            state.editing = Some(RowEdit {
                row_id: row.id,
                field,
                input: TextInput::new(value),
            });
        }
    }
}

// =========================
// Drawing
// =========================

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &TuiState) {
    let (window, inner) = centered_window(area, 90, 28);

    let frame = Block::default()
        .borders(Borders::ALL)
        .title(" Sync Setup ")
        .title_alignment(Alignment::Center);
    f.render_widget(frame, window);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // banner
            Constraint::Length(1), // tab header
            Constraint::Min(5),    // content
            Constraint::Length(1), // status
            Constraint::Length(3), // buttons
        ])
        .split(inner);

    let banner = Paragraph::new(Text::raw(BANNER))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(banner, rows[0]);

    draw_tab_header(f, rows[1], state);

    let content = rows[2];
    match state.page {
        Page::Service => draw_service_page(f, content, state),
        Page::Filter => draw_filter_page(f, content, state),
        Page::Destination => draw_destination_page(f, content, state),
        Page::Mapping => draw_mapping_page(f, content, state),
        Page::Saving => draw_saving_page(f, content),
        Page::Complete => draw_complete_page(f, content),
    }

    if let Some((kind, text)) = &state.status {
        let color = match kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        let status =
            Paragraph::new(Line::from(text.as_str())).style(Style::default().fg(color));
        f.render_widget(status, rows[3]);
    }

    if state.page != Page::Service && state.page != Page::Complete {
        draw_buttons(f, rows[4], state);
    }

    match &state.modal {
        Some(Modal::ConfirmCancel) => draw_cancel_modal(f, window, state),
        Some(Modal::ConfirmRemoveRow) => draw_remove_modal(f, window, state),
        Some(Modal::Message { title, body }) => draw_message_modal(f, window, title, body),
        None => {}
    }
}

fn draw_tab_header(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    if !matches!(state.page, Page::Filter | Page::Destination | Page::Mapping) {
        let title = Paragraph::new(Line::from(page_title(state)))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(title, area);
        return;
    }
    let Some(wizard) = &state.wizard else { return };

    let mut spans: Vec<Span> = Vec::new();
    for step in WizardStep::ALL {
        let mut style = Style::default().fg(Color::DarkGray);
        if page_for_step(step) == state.page {
            style = Style::default().add_modifier(Modifier::BOLD);
        }
        if wizard.has_error(step) {
            style = style.fg(Color::Red);
        }
        spans.push(Span::styled(
            format!(" [{}] {} ", step.as_id(), step.title()),
            style,
        ));
    }
    let header = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn draw_service_page(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let mut lines = vec![
        Line::from("Pick the integration to configure a contact sync for:"),
        Line::from(""),
    ];
    for (i, kind) in ServiceKind::ALL.iter().enumerate() {
        let marker = if i == state.service_index { "> " } else { "  " };
        let style = if i == state.service_index {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, kind.as_str()),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down select, Enter open, Esc quit",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_filter_page(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let Some(wizard) = &state.wizard else { return };
    let mut lines = vec![Line::from(page_title(state)), Line::from("")];
    for filter in ContactFilter::ALL {
        let chosen = wizard.contact_filter() == Some(filter);
        let marker = if chosen { "(x) " } else { "( ) " };
        let style = if chosen {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, filter.as_str()),
            style,
        )));
    }
    if wizard.has_error(WizardStep::Filter) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Choose which contacts to sync before continuing.",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down choose, Tab move focus, Enter activate",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_destination_page(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let Some(wizard) = &state.wizard else { return };
    let mut lines = vec![Line::from(page_title(state)), Line::from("")];

    if wizard.profile().requires_sub_account {
        let label = match wizard.selected_sub_account() {
            Some(acc) if !acc.descriptive_name.is_empty() => {
                format!("Account: {} ({})", acc.descriptive_name, acc.id)
            }
            Some(acc) => format!("Account: {}", acc.id),
            None => "Account: <press 'a' to pick>".to_string(),
        };
        lines.push(Line::from(label));
        lines.push(Line::from(""));
    }

    if state.creating {
        lines.push(Line::from(format!(
            "New {} name: {}_",
            wizard.profile().list_noun,
            state.new_list_name.value
        )));
        if let Some(err) = wizard.selector.create_error() {
            lines.push(Line::from(Span::styled(err, Style::default().fg(Color::Red))));
        }
        lines.push(Line::from(Span::styled(
            "Enter create, Esc back",
            Style::default().fg(Color::DarkGray),
        )));
    } else if wizard.selector.is_loading() {
        lines.push(Line::from("Loading..."));
    } else {
        for (i, list) in wizard.selector.lists().iter().enumerate() {
            let cursor = if i == state.list_index { "> " } else { "  " };
            let selected = wizard
                .selector
                .selected()
                .map(|s| s.id == list.id)
                .unwrap_or(false);
            let marker = if selected { "(x) " } else { "( ) " };
            let style = if i == state.list_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{}{}{}", cursor, marker, list.name),
                style,
            )));
        }
        if wizard.selector.has_pending_create() {
            if let Some(pending) = wizard.selector.selected() {
                lines.push(Line::from(Span::styled(
                    format!("(x) {} (new)", pending.name),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
        }
        if wizard.selector.is_loaded() && wizard.selector.lists().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("No existing {}s found.", wizard.profile().list_noun),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if wizard.has_error(WizardStep::Destination) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Select a destination before continuing.",
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Space select, 'n' new, Up/Down move, Enter activate button",
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_mapping_page(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let Some(wizard) = &state.wizard else { return };
    let mut lines = vec![Line::from(page_title(state)), Line::from("")];

    for (i, row) in wizard.mapper.rows().iter().enumerate() {
        let cursor = if i == state.row_index { "> " } else { "  " };
        let lock = if row.deletable { " " } else { "*" };
        let editing_marker = state
            .editing
            .as_ref()
            .filter(|e| e.row_id == row.id)
            .map(|e| match e.field {
                RowField::SourceLabel => format!(" [editing source: {}_]", e.input.value),
                RowField::DestinationValue => {
                    format!(" [editing destination: {}_]", e.input.value)
                }
            })
            .unwrap_or_default();
        let dest = if row.destination_value.is_empty() {
            "<empty>"
        } else {
            row.destination_value.as_str()
        };
        let style = if i == state.row_index {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{}{} {:<16} -> {}{}",
                cursor, lock, row.source_label, dest, editing_marker
            ),
            style,
        )));
    }

    let dupes = wizard.mapper.duplicate_destinations();
    if !dupes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Duplicate destinations: {}", dupes.join(", ")),
            Style::default().fg(Color::Yellow),
        )));
    }
    if wizard.has_error(WizardStep::Mapping) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Every row needs a destination field before saving.",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "'a' add row, 'd' delete, 'e' edit destination, 's' edit source, Enter activate",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_saving_page(f: &mut ratatui::Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from("Saving sync configuration..."),
        Line::from(""),
        Line::from(Span::styled(
            "This usually takes a moment.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        area,
    );
}

fn draw_complete_page(f: &mut ratatui::Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Sync saved successfully.",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Contacts will start flowing to the destination shortly."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to exit.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        area,
    );
}

fn centered_window(area: Rect, width: u16, height: u16) -> (Rect, Rect) {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let window = Rect::new(x, y, w, h);
    let inner = Rect::new(
        window.x + 1,
        window.y + 1,
        window.width.saturating_sub(2),
        window.height.saturating_sub(2),
    );
    (window, inner)
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let back_enabled = can_go_back(state.page);
    let saving = state.page == Page::Saving;

    let spans = vec![
        button_text("Back", state.focus == ButtonFocus::Back, back_enabled && !saving),
        Span::raw("   "),
        button_text(
            next_label(state.page),
            state.focus == ButtonFocus::Next,
            !saving,
        ),
        Span::raw("   "),
        button_text("Cancel", state.focus == ButtonFocus::Cancel, !saving),
    ];
    let row = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(row, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let text = format!("[ {} ]", label);
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    } else if focused {
        style = style
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
    }
    Span::styled(text, style)
}

fn draw_cancel_modal(f: &mut ratatui::Frame<'_>, window: Rect, state: &TuiState) {
    let (modal, inner) = centered_window(window, 50, 7);
    f.render_widget(Clear, modal);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Discard changes? ");
    f.render_widget(block, modal);

    let confirm_focused = state.focus == ButtonFocus::Cancel;
    let lines = vec![
        Line::from("Close the wizard and discard this sync?"),
        Line::from(""),
        Line::from(vec![
            button_text("Keep editing", !confirm_focused, true),
            Span::raw("   "),
            button_text("Discard", confirm_focused, true),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn draw_remove_modal(f: &mut ratatui::Frame<'_>, window: Rect, state: &TuiState) {
    let (modal, inner) = centered_window(window, 50, 7);
    f.render_widget(Clear, modal);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Remove mapping row? ");
    f.render_widget(block, modal);

    let name = state
        .wizard
        .as_ref()
        .and_then(|w| w.mapper.pending_remove().and_then(|id| w.mapper.row(id)))
        .map(|r| r.source_label.clone())
        .unwrap_or_default();
    let lines = vec![
        Line::from(format!("Remove the mapping for \"{}\"?", name)),
        Line::from(""),
        Line::from("Enter/y remove   Esc/n keep"),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window: Rect, title: &str, body: &str) {
    let (modal, inner) = centered_window(window, 60, 9);
    f.render_widget(Clear, modal);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    f.render_widget(block, modal);

    let lines = vec![
        Line::from(body.to_string()),
        Line::from(""),
        Line::from("Press Enter to continue."),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

// =============================================================================
// Unit tests: smoke frames render without panicking
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_targets_render_a_frame() {
        for target in ["service", "filter", "destination", "mapping", "saving", "complete"] {
            let state = new_smoke_state(target);
            let backend = TestBackend::new(100, 30);
            let mut terminal = Terminal::new(backend).expect("terminal");
            terminal
                .draw(|f| draw(f.size(), f, &state))
                .unwrap_or_else(|e| panic!("smoke target {} failed to render: {}", target, e));
        }
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::new("abc");
        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Char('x'));
        assert_eq!(input.value, "abxc");
        input.handle_key(KeyCode::Backspace);
        assert_eq!(input.value, "abc");
        input.handle_key(KeyCode::Home);
        input.handle_key(KeyCode::Delete);
        assert_eq!(input.value, "bc");
    }

    #[test]
    fn text_input_handles_multibyte_chars() {
        let mut input = TextInput::new("");
        input.handle_key(KeyCode::Char('é'));
        input.handle_key(KeyCode::Char('x'));
        assert_eq!(input.value, "éx");

        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Char('ü'));
        assert_eq!(input.value, "üéx");

        input.handle_key(KeyCode::Backspace);
        assert_eq!(input.value, "éx");
        input.handle_key(KeyCode::Delete);
        assert_eq!(input.value, "x");

        // End lands on the final boundary, not past it.
        input.handle_key(KeyCode::Char('ß'));
        input.handle_key(KeyCode::End);
        input.handle_key(KeyCode::Backspace);
        assert_eq!(input.value, "ß");
    }

    #[test]
    fn unknown_smoke_target_falls_back_to_service_page() {
        let state = new_smoke_state("nonsense");
        assert_eq!(state.page, Page::Service);
    }
}
