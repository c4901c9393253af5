// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use hrdesk_app::{
    AppCommand, AppEvent, AppMode, AppState, CreateForm, DateForm, EntityKind, GatewayError,
    LoadState, Record, RemoteOutcome, RemoteRequest, TabularRecordView, Ticket, ViewError,
    ViewEvent,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::collections::BTreeMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::Date;
use tracing::debug;

/// Side effects the UI needs from the outside world.
pub trait AppRuntime {
    fn execute(&mut self, request: &RemoteRequest) -> Result<RemoteOutcome, GatewayError>;

    /// Runs `request` and reports its outcome on `tx`. The default runs it
    /// inline; runtimes backed by a network should hand it to a thread.
    fn spawn_request(&mut self, request: RemoteRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.execute(&request);
        tx.send(InternalEvent::Remote {
            entity: request.entity,
            ticket: request.ticket,
            result,
        })
        .map_err(|_| anyhow!("request event channel closed"))?;
        Ok(())
    }

    /// Reference date for "not in the future" checks.
    fn today(&self) -> Date;
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Remote {
        entity: EntityKind,
        ticket: Ticket,
        result: Result<RemoteOutcome, GatewayError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct FormUiState {
    form: CreateForm,
    cursor: usize,
    pending: Option<Ticket>,
    failure: Option<String>,
}

impl FormUiState {
    fn new(kind: EntityKind) -> Self {
        Self {
            form: CreateForm::blank(kind),
            cursor: 0,
            pending: None,
            failure: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    views: BTreeMap<EntityKind, TabularRecordView>,
    selected_row: usize,
    column_cursor: usize,
    edit_cursor: usize,
    form: Option<FormUiState>,
    status_token: u64,
}

impl ViewData {
    fn active(&self, state: &AppState) -> Option<&TabularRecordView> {
        self.views.get(&state.active_tab)
    }

    fn active_mut(&mut self, state: &AppState) -> &mut TabularRecordView {
        self.views
            .entry(state.active_tab)
            .or_insert_with(|| TabularRecordView::new(state.active_tab))
    }

    fn selected_record(&self, state: &AppState) -> Option<Record> {
        let view = self.active(state)?;
        view.displayed()
            .get(self.selected_row)
            .map(|record| (*record).clone())
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    load_active(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Remote {
                entity,
                ticket,
                result,
            } => complete_request(state, view_data, tx, entity, ticket, result),
        }
    }
}

fn complete_request(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    entity: EntityKind,
    ticket: Ticket,
    result: Result<RemoteOutcome, GatewayError>,
) {
    let Some(view) = view_data.views.get_mut(&entity) else {
        return;
    };
    let event = view.complete(ticket, result);

    let form_request = view_data
        .form
        .as_ref()
        .is_some_and(|form| form.pending == Some(ticket));
    if form_request {
        match &event {
            ViewEvent::Created(_) => {
                view_data.form = None;
                if state.mode == AppMode::Create {
                    state.dispatch(AppCommand::ExitToNav);
                }
            }
            ViewEvent::MutationFailed { error, .. } => {
                if let Some(form) = view_data.form.as_mut() {
                    form.pending = None;
                    form.failure = Some(error.to_string());
                }
            }
            _ => {}
        }
    }

    if let Some(notice) = event.notice(entity) {
        emit_status(state, view_data, tx, notice);
    }
    if entity == state.active_tab {
        sync_mode_with_view(state, view_data);
        clamp_selection(state, view_data);
    }
}

/// Popups owned by the view close themselves on success; follow them.
fn sync_mode_with_view(state: &mut AppState, view_data: &ViewData) {
    let Some(view) = view_data.active(state) else {
        return;
    };
    let closed = match state.mode {
        AppMode::Edit => view.edit().is_none(),
        AppMode::ConfirmDelete => view.delete_prompt().is_none(),
        _ => false,
    };
    if closed {
        state.dispatch(AppCommand::ExitToNav);
    }
}

fn clamp_selection(state: &AppState, view_data: &mut ViewData) {
    let shown = view_data
        .active(state)
        .map(|view| view.displayed().len())
        .unwrap_or(0);
    view_data.selected_row = view_data.selected_row.min(shown.saturating_sub(1));
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn issue<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request: RemoteRequest,
) {
    debug!(
        entity = request.entity.label(),
        op = request.op.verb(),
        ticket = request.ticket.id,
        "dispatching request"
    );
    let entity = request.entity;
    let ticket = request.ticket;
    if let Err(error) = runtime.spawn_request(request, tx.clone()) {
        // Release the key rather than leave it pending forever.
        let failure = GatewayError::Transport(error.to_string());
        complete_request(state, view_data, tx, entity, ticket, Err(failure));
    }
}

fn load_active<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    match view_data.active_mut(state).prepare_load() {
        Ok(request) => issue(state, runtime, view_data, tx, request),
        Err(error) => emit_status(state, view_data, tx, error.to_string()),
    }
}

/// Leaving a tab unmounts its view; anything it still has in flight is
/// dropped when it lands.
fn switch_tab<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let previous = state.active_tab;
    let events = state.dispatch(command);
    if !events
        .iter()
        .any(|event| matches!(event, AppEvent::TabChanged(_)))
    {
        return;
    }
    if let Some(view) = view_data.views.get_mut(&previous) {
        view.unmount();
    }
    view_data.selected_row = 0;
    view_data.column_cursor = 0;
    view_data.form = None;
    load_active(state, runtime, view_data, tx);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.mode {
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
        AppMode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                state.dispatch(AppCommand::ExitToNav);
            }
        }
        AppMode::Search => handle_search_key(state, view_data, key),
        AppMode::ColumnPicker => handle_column_picker_key(state, view_data, key),
        AppMode::Edit => handle_edit_key(state, runtime, view_data, internal_tx, key),
        AppMode::ConfirmDelete => handle_delete_key(state, runtime, view_data, internal_tx, key),
        AppMode::Create => handle_form_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('f') | KeyCode::Tab => {
            switch_tab(state, runtime, view_data, tx, AppCommand::NextTab);
        }
        KeyCode::Char('b') | KeyCode::BackTab => {
            switch_tab(state, runtime, view_data, tx, AppCommand::PrevTab);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.selected_row = view_data.selected_row.saturating_add(1);
            clamp_selection(state, view_data);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('g') => view_data.selected_row = 0,
        KeyCode::Char('G') => {
            view_data.selected_row = usize::MAX;
            clamp_selection(state, view_data);
        }
        KeyCode::Char('/') => {
            state.dispatch(AppCommand::Enter(AppMode::Search));
        }
        KeyCode::Esc => {
            view_data.active_mut(state).search("");
            clamp_selection(state, view_data);
        }
        KeyCode::Char('c') => {
            view_data.active_mut(state).open_column_picker();
            view_data.column_cursor = 0;
            state.dispatch(AppCommand::Enter(AppMode::ColumnPicker));
        }
        KeyCode::Char('e') => {
            let Some(record) = view_data.selected_record(state) else {
                emit_status(state, view_data, tx, "nothing selected to edit");
                return;
            };
            match view_data.active_mut(state).begin_edit(&record) {
                Ok(()) => {
                    view_data.edit_cursor = 0;
                    state.dispatch(AppCommand::Enter(AppMode::Edit));
                }
                Err(error) => emit_status(state, view_data, tx, error.to_string()),
            }
        }
        KeyCode::Char('d') => {
            let Some(record) = view_data.selected_record(state) else {
                emit_status(state, view_data, tx, "nothing selected to delete");
                return;
            };
            match view_data.active_mut(state).begin_delete(&record) {
                Ok(()) => {
                    state.dispatch(AppCommand::Enter(AppMode::ConfirmDelete));
                }
                Err(error) => emit_status(state, view_data, tx, error.to_string()),
            }
        }
        KeyCode::Char('a') => {
            view_data.form = Some(FormUiState::new(state.active_tab));
            state.dispatch(AppCommand::Enter(AppMode::Create));
        }
        KeyCode::Char('r') => load_active(state, runtime, view_data, tx),
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::Enter(AppMode::Help));
        }
        _ => {}
    }
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let view = view_data.active_mut(state);
    let mut query = view.query().to_owned();
    match key.code {
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Esc => {
            query.clear();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => query.push(ch),
        _ => return,
    }
    view.search(&query);
    view_data.selected_row = 0;
}

fn handle_column_picker_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let cursor = view_data.column_cursor;
    let view = view_data.active_mut(state);
    let count = view.columns().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.column_cursor = (cursor + 1).min(count.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.column_cursor = cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(column) = view.columns().columns().get(cursor) {
                let name = column.name;
                view.toggle_column(name);
            }
        }
        KeyCode::Esc | KeyCode::Char('c') => {
            view.close_column_picker();
            state.dispatch(AppCommand::ExitToNav);
        }
        _ => {}
    }
}

fn move_cursor(cursor: usize, count: usize, forward: bool) -> usize {
    if count == 0 {
        return 0;
    }
    if forward {
        (cursor + 1) % count
    } else {
        (cursor + count - 1) % count
    }
}

/// Applies a typing key to `current`. Returns `None` for non-editing keys.
fn edited_text(current: &str, key: KeyEvent) -> Option<String> {
    match key.code {
        KeyCode::Backspace => {
            let mut text = current.to_owned();
            text.pop();
            Some(text)
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(format!("{current}{ch}"))
        }
        _ => None,
    }
}

fn handle_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let edit_cursor = view_data.edit_cursor;
    let view = view_data.active_mut(state);
    let fields: Vec<&'static str> = view
        .schema()
        .editable_fields()
        .map(|field| field.name)
        .collect();
    let Some(edit) = view.edit() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let submitting = edit.submitting;
    let cursor = edit_cursor.min(fields.len().saturating_sub(1));

    match key.code {
        KeyCode::Esc => {
            if submitting {
                emit_status(state, view_data, tx, "save in flight -- wait for it");
                return;
            }
            view.cancel_edit();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab | KeyCode::Down => {
            view_data.edit_cursor = move_cursor(cursor, fields.len(), true);
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.edit_cursor = move_cursor(cursor, fields.len(), false);
        }
        KeyCode::Enter => {
            let today = runtime.today();
            match view.prepare_commit(today) {
                Ok(request) => issue(state, runtime, view_data, tx, request),
                Err(error) => emit_status(state, view_data, tx, error.to_string()),
            }
        }
        _ => {
            let Some(field) = fields.get(cursor).copied() else {
                return;
            };
            if let Some(text) = edited_text(edit.input(field), key) {
                view.set_edit_input(field, &text);
            }
        }
    }
}

fn handle_delete_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let view = view_data.active_mut(state);
    match key.code {
        KeyCode::Char('y') => match view.prepare_delete() {
            Ok(request) => issue(state, runtime, view_data, tx, request),
            Err(error) => emit_status(state, view_data, tx, error.to_string()),
        },
        KeyCode::Char('n') | KeyCode::Esc => {
            if view.delete_prompt().is_some_and(|prompt| prompt.submitting) {
                return;
            }
            view.cancel_delete();
            state.dispatch(AppCommand::ExitToNav);
        }
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form_ui) = view_data.form.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let fields: Vec<&'static str> = form_ui
        .form
        .fields()
        .into_iter()
        .map(|field| field.name)
        .collect();
    let cursor = form_ui.cursor.min(fields.len().saturating_sub(1));
    let submitting = form_ui.pending.is_some();

    match key.code {
        KeyCode::Esc => {
            if submitting {
                emit_status(state, view_data, tx, "add in flight -- wait for it");
                return;
            }
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab | KeyCode::Down => form_ui.cursor = move_cursor(cursor, fields.len(), true),
        KeyCode::BackTab | KeyCode::Up => {
            form_ui.cursor = move_cursor(cursor, fields.len(), false);
        }
        KeyCode::Enter => {
            if submitting {
                return;
            }
            let record = match form_ui.form.to_record(runtime.today()) {
                Ok(record) => record,
                Err(errors) => {
                    let message = ViewError::Validation(errors).to_string();
                    emit_status(state, view_data, tx, message);
                    return;
                }
            };
            form_ui.failure = None;
            match view_data.active_mut(state).prepare_create(record) {
                Ok(request) => {
                    if let Some(form_ui) = view_data.form.as_mut() {
                        form_ui.pending = Some(request.ticket);
                    }
                    issue(state, runtime, view_data, tx, request);
                }
                Err(error) => emit_status(state, view_data, tx, error.to_string()),
            }
        }
        _ => {
            if submitting {
                return;
            }
            let Some(field) = fields.get(cursor).copied() else {
                return;
            };
            if form_ui.form.is_derived(field) {
                emit_status(state, view_data, tx, format!("{field} is computed"));
                return;
            }
            if let Some(text) = edited_text(form_ui.form.input(field), key) {
                form_ui.form.set_input(field, &text);
            }
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = EntityKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(EntityKind::ALL.iter().map(|tab| tab.label()))
        .block(Block::default().title("hrdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    let overlay = match state.mode {
        AppMode::Nav | AppMode::Search => None,
        AppMode::Help => Some(("help", help_overlay_text().to_owned(), (80, 60))),
        AppMode::ColumnPicker => view_data.active(state).map(|view| {
            (
                "columns",
                render_column_picker_text(view, view_data.column_cursor),
                (50, 70),
            )
        }),
        AppMode::Edit => view_data.active(state).map(|view| {
            (
                "edit",
                render_edit_overlay_text(view, view_data.edit_cursor),
                (70, 80),
            )
        }),
        AppMode::ConfirmDelete => view_data
            .active(state)
            .map(|view| ("delete", render_delete_overlay_text(view), (50, 20))),
        AppMode::Create => view_data
            .form
            .as_ref()
            .map(|form| ("add", render_form_overlay_text(form), (70, 80))),
    };
    if let Some((title, text, (percent_x, percent_y))) = overlay {
        let area = centered_rect(percent_x, percent_y, frame.area());
        frame.render_widget(Clear, area);
        let popup =
            Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(popup, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let Some(view) = view_data.active(state) else {
        let empty = Paragraph::new(String::new()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active_tab.schema().title),
        );
        frame.render_widget(empty, area);
        return;
    };

    let title = table_title(view);
    if let Some(message) = placeholder_text(view) {
        let body =
            Paragraph::new(message).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(body, area);
        return;
    }

    let fields = view.columns().visible_fields();
    let widths = vec![Constraint::Min(8); fields.len()];
    let header = Row::new(fields.iter().map(|field| {
        Cell::from(view.columns().label(field)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let schema = view.schema();
    let rows = view
        .displayed()
        .into_iter()
        .enumerate()
        .map(|(row_index, record)| {
            let pending = schema
                .natural_key(record, DateForm::Display)
                .is_some_and(|key| view.is_pending(&key));
            let mut style = Style::default();
            if pending {
                style = style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
            }
            if row_index == view_data.selected_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Row::new(
                fields
                    .iter()
                    .map(|field| Cell::from(record.display(field)))
                    .collect::<Vec<_>>(),
            )
            .style(style)
        });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

/// Text shown instead of the table, if any. A reload keeps showing the rows
/// it already has.
fn placeholder_text(view: &TabularRecordView) -> Option<String> {
    match view.load_state() {
        LoadState::Idle => return Some("loading...".to_owned()),
        LoadState::Loading if view.base().is_empty() => return Some("loading...".to_owned()),
        LoadState::LoadFailed(error) if view.base().is_empty() => {
            return Some(format!("load failed: {error}\npress r to retry"));
        }
        LoadState::Loading | LoadState::Loaded | LoadState::LoadFailed(_) => {}
    }
    if view.columns().visible_fields().is_empty() {
        return Some("every column is hidden -- press c to choose columns".to_owned());
    }
    if view.displayed().is_empty() && !view.query().trim().is_empty() {
        return Some(format!("no records match {:?}", view.query()));
    }
    None
}

fn table_title(view: &TabularRecordView) -> String {
    let mut title = format!(
        "{} ({}/{})",
        view.schema().title,
        view.displayed().len(),
        view.base().len()
    );
    if !view.query().is_empty() {
        title.push_str(&format!(" | search: {}", view.query()));
    }
    if view.pending_count() > 0 {
        title.push_str(&format!(" | {} pending", view.pending_count()));
    }
    if let LoadState::LoadFailed(_) = view.load_state() {
        title.push_str(" | reload failed");
    }
    title
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let hints = match state.mode {
        AppMode::Nav => "j/k rows | b/f tabs | / search | c cols | e edit | d del | a add | r reload | ? help | ctrl+q",
        AppMode::Search => "type to filter | enter keep | esc clear",
        AppMode::ColumnPicker => "j/k move | space toggle | esc close",
        AppMode::Edit | AppMode::Create => "tab/shift+tab field | enter save | esc cancel",
        AppMode::ConfirmDelete => "y delete | n cancel",
        AppMode::Help => "esc close",
    };
    let mut parts = vec![state.mode.label().to_owned()];
    if state.mode == AppMode::Search
        && let Some(view) = view_data.active(state)
    {
        parts.push(format!("/{}", view.query()));
    }
    if let Some(status) = &state.status_line {
        parts.push(status.clone());
    }
    parts.push(hints.to_owned());
    parts.join(" | ")
}

fn render_column_picker_text(view: &TabularRecordView, cursor: usize) -> String {
    view.columns()
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            format!(
                "{} [{}] {}",
                if index == cursor { ">" } else { " " },
                if column.visible { "x" } else { " " },
                column.alias.unwrap_or(column.name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_edit_overlay_text(view: &TabularRecordView, cursor: usize) -> String {
    let Some(edit) = view.edit() else {
        return String::new();
    };
    let schema = view.schema();
    let mut lines = vec![format!("record {}", edit.key)];
    for name in schema.key_fields {
        lines.push(format!(
            "    {}: {} (key)",
            view.columns().label(name),
            edit.input(name)
        ));
    }
    for (index, field) in schema.editable_fields().enumerate() {
        let marker = if index == cursor { ">" } else { " " };
        let mut line = format!(
            "  {marker} {}: {}",
            view.columns().label(field.name),
            edit.input(field.name)
        );
        if let Some(error) = edit.error_for(field.name) {
            line.push_str(&format!("  ! {}", error.message));
        }
        lines.push(line);
    }
    if let Some(failure) = &edit.failure {
        lines.push(format!("save failed: {failure}"));
    }
    if edit.submitting {
        lines.push("saving...".to_owned());
    }
    lines.join("\n")
}

fn render_delete_overlay_text(view: &TabularRecordView) -> String {
    let Some(prompt) = view.delete_prompt() else {
        return String::new();
    };
    if prompt.submitting {
        return format!("deleting record {}...", prompt.key);
    }
    format!("delete record {}?\ny confirm | n cancel", prompt.key)
}

fn render_form_overlay_text(form_ui: &FormUiState) -> String {
    let form = &form_ui.form;
    let mut lines = vec![format!("new {} record", form.schema().title)];
    for (index, field) in form.fields().into_iter().enumerate() {
        let marker = if index == form_ui.cursor { ">" } else { " " };
        let mut line = format!("  {marker} {}: {}", field.label(), form.input(field.name));
        if form.is_derived(field.name) {
            line.push_str(" (auto)");
        }
        if let Some(error) = form.error_for(field.name) {
            line.push_str(&format!("  ! {}", error.message));
        }
        lines.push(line);
    }
    if let Some(failure) = &form_ui.failure {
        lines.push(format!("add failed: {failure}"));
    }
    if form_ui.pending.is_some() {
        lines.push("adding...".to_owned());
    }
    lines.push("dates use YYYY-MM-DD".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
nav: j/k or up/down rows | g/G first/last | b/f or tab tabs | r reload\n\
nav: / search | esc clear search | c columns | e edit | d delete | a add | ? help\n\
search: type to filter | backspace | enter keep | esc clear\n\
columns: j/k move | space or enter toggle | esc close\n\
edit/add: tab/shift+tab field | type to change | enter save | esc cancel\n\
delete: y confirm | n cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, handle_key_event, help_overlay_text,
        placeholder_text, process_internal_events, render_column_picker_text,
        render_delete_overlay_text, render_edit_overlay_text, render_form_overlay_text,
        status_text, table_title,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use hrdesk_app::{
        AppMode, AppState, EntityKind, GatewayError, LoadState, Record, RemoteOutcome,
        RemoteRequest,
    };
    use hrdesk_testkit::{MemoryGateway, StaffFaker, fixture_today};
    use std::sync::mpsc::{self, Receiver, Sender};
    use time::Date;

    #[derive(Debug, Default)]
    struct TestRuntime {
        gateway: MemoryGateway,
        /// When set, requests are parked here instead of running.
        parked: Option<Vec<RemoteRequest>>,
    }

    impl AppRuntime for TestRuntime {
        fn execute(&mut self, request: &RemoteRequest) -> Result<RemoteOutcome, GatewayError> {
            request.execute(&self.gateway)
        }

        fn spawn_request(
            &mut self,
            request: RemoteRequest,
            tx: Sender<InternalEvent>,
        ) -> Result<()> {
            if let Some(parked) = self.parked.as_mut() {
                parked.push(request);
                return Ok(());
            }
            let result = self.execute(&request);
            tx.send(InternalEvent::Remote {
                entity: request.entity,
                ticket: request.ticket,
                result,
            })?;
            Ok(())
        }

        fn today(&self) -> Date {
            fixture_today()
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(gateway: MemoryGateway, tab: EntityKind) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                state: AppState {
                    active_tab: tab,
                    ..AppState::default()
                },
                runtime: TestRuntime {
                    gateway,
                    parked: None,
                },
                view_data: ViewData::default(),
                tx,
                rx,
            };
            super::load_active(
                &mut harness.state,
                &mut harness.runtime,
                &mut harness.view_data,
                &harness.tx,
            );
            harness.drain();
            harness
        }

        fn drain(&mut self) {
            process_internal_events(&mut self.state, &mut self.view_data, &self.tx, &self.rx);
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.press_with(code, KeyModifiers::NONE)
        }

        fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            );
            self.drain();
            quit
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn clear_field(&mut self, chars: usize) {
            for _ in 0..chars {
                self.press(KeyCode::Backspace);
            }
        }

        fn view(&self) -> &hrdesk_app::TabularRecordView {
            self.view_data
                .views
                .get(&self.state.active_tab)
                .expect("active view mounted")
        }
    }

    fn attendance_gateway() -> MemoryGateway {
        let gateway = MemoryGateway::new();
        gateway.insert(
            EntityKind::Attendance,
            Record::new()
                .with("EID", 7)
                .with("A_DATE", "2024-01-05")
                .with("STATUS", "Present")
                .with("LOGIN", "09:00")
                .with("LOGOUT", "17:00"),
        );
        gateway.insert(
            EntityKind::Attendance,
            Record::new()
                .with("EID", 7)
                .with("A_DATE", "2024-01-06")
                .with("STATUS", "Absent")
                .with("LOGIN", "")
                .with("LOGOUT", ""),
        );
        gateway
    }

    #[test]
    fn ctrl_q_quits() {
        let mut harness = Harness::new(MemoryGateway::new(), EntityKind::Department);
        assert!(!harness.press(KeyCode::Char('q')));
        assert!(harness.press_with(KeyCode::Char('q'), KeyModifiers::CONTROL));
    }

    #[test]
    fn mount_loads_the_active_tab() {
        let harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        assert_eq!(harness.view().load_state(), &LoadState::Loaded);
        assert_eq!(harness.view().base().len(), 2);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("2 attendance loaded")
        );
    }

    #[test]
    fn tab_keys_cycle_and_load_each_tab() {
        let gateway = MemoryGateway::with_tables(StaffFaker::new(1).organization(3));
        let mut harness = Harness::new(gateway, EntityKind::Employee);

        harness.press(KeyCode::Char('f'));
        assert_eq!(harness.state.active_tab, EntityKind::Department);
        assert_eq!(harness.view().load_state(), &LoadState::Loaded);

        harness.press(KeyCode::Char('b'));
        harness.press(KeyCode::Char('b'));
        assert_eq!(harness.state.active_tab, EntityKind::Account);
        assert_eq!(harness.view().base().len(), 3);
    }

    #[test]
    fn search_mode_narrows_rows_as_you_type() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('/'));
        assert_eq!(harness.state.mode, AppMode::Search);
        harness.type_text("ABS");
        assert_eq!(harness.view().displayed().len(), 1);
        assert!(status_text(&harness.state, &harness.view_data).contains("/ABS"));

        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.view().query(), "ABS");

        harness.press(KeyCode::Esc);
        assert_eq!(harness.view().displayed().len(), 2);
    }

    #[test]
    fn column_picker_toggles_the_cursor_column() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('c'));
        assert_eq!(harness.state.mode, AppMode::ColumnPicker);
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char(' '));
        assert!(!harness.view().columns().is_visible("STATUS"));

        let text = render_column_picker_text(harness.view(), harness.view_data.column_cursor);
        assert!(text.contains("> [ ] Status"));

        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(!harness.view().column_picker_open());
    }

    #[test]
    fn edit_popup_saves_and_returns_to_nav() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char('e'));
        assert_eq!(harness.state.mode, AppMode::Edit);
        let text = render_edit_overlay_text(harness.view(), harness.view_data.edit_cursor);
        assert!(text.contains("record 7 / 2024-01-06"));
        assert!(text.contains("> Status: Absent"));

        harness.clear_field("Absent".len());
        harness.type_text("Leave");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.view().base()[1].display("STATUS"), "Leave");
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("record 7 / 2024-01-06 updated")
        );
    }

    #[test]
    fn edit_cursor_wraps_back_to_the_last_field() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('e'));
        harness.press(KeyCode::BackTab);
        assert_eq!(harness.view_data.edit_cursor, 2);
        let text = render_edit_overlay_text(harness.view(), harness.view_data.edit_cursor);
        assert!(text.contains("> Logout: 17:00"));

        harness.press(KeyCode::Down);
        assert_eq!(harness.view_data.edit_cursor, 0);
    }

    #[test]
    fn saving_an_untouched_edit_sends_nothing() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('e'));
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode, AppMode::Edit);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("nothing changed -- edit a field first")
        );
        assert!(harness.runtime.gateway.calls().iter().all(|call| !call.starts_with("PUT")));
    }

    #[test]
    fn invalid_edit_keeps_popup_open() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('e'));
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Tab);
        harness.clear_field("17:00".len());
        harness.type_text("08:00");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode, AppMode::Edit);
        let text = render_edit_overlay_text(harness.view(), harness.view_data.edit_cursor);
        assert!(text.contains("! must be at/after LOGIN"));
        assert!(harness.runtime.gateway.calls().iter().all(|call| !call.starts_with("PUT")));

        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(harness.view().edit().is_none());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.press(KeyCode::Char('d'));
        assert_eq!(
            render_delete_overlay_text(harness.view()),
            "delete record 7 / 2024-01-05?\ny confirm | n cancel"
        );
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.view().base().len(), 2);

        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Char('y'));
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.view().base().len(), 1);
        assert_eq!(harness.view().base()[0].display("STATUS"), "Absent");
    }

    #[test]
    fn failed_delete_reports_and_keeps_rows() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.runtime.gateway.fail_next(GatewayError::Rejected {
            status: 409,
            message: Some("record is referenced by payroll".to_owned()),
        });
        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Char('y'));

        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.view().base().len(), 2);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("delete 7 / 2024-01-05 failed: record is referenced by payroll")
        );
    }

    #[test]
    fn leave_form_derives_end_date_and_adds_row() {
        let mut harness = Harness::new(MemoryGateway::new(), EntityKind::Leave);
        harness.press(KeyCode::Char('a'));
        assert_eq!(harness.state.mode, AppMode::Create);

        harness.type_text("3");
        harness.press(KeyCode::Tab);
        harness.type_text("CL");
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Tab);
        harness.type_text("2");
        harness.press(KeyCode::Tab);
        harness.type_text("2024-07-10");

        let form = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(form.form.input("TO_DATE"), "2024-07-11");
        let text = render_form_overlay_text(form);
        assert!(text.contains("To Date: 2024-07-11 (auto)"));
        assert!(text.contains("Approval: PENDING"));

        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(harness.view_data.form.is_none());
        assert_eq!(harness.view().base()[0].display("FROM_DATE"), "10-07-2024");
        assert_eq!(harness.runtime.gateway.records(EntityKind::Leave).len(), 1);
    }

    #[test]
    fn rejected_form_stays_open_with_the_reason() {
        let mut harness = Harness::new(MemoryGateway::new(), EntityKind::Department);
        harness.press(KeyCode::Char('a'));
        harness.type_text("4");
        harness.press(KeyCode::Tab);
        harness.type_text("Physics");
        harness.runtime.gateway.fail_next(GatewayError::Rejected {
            status: 400,
            message: Some("department head required".to_owned()),
        });
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode, AppMode::Create);
        let form = harness.view_data.form.as_ref().expect("form open");
        assert!(render_form_overlay_text(form).contains("add failed: department head required"));
        assert!(harness.view().base().is_empty());
    }

    #[test]
    fn completions_for_a_left_tab_are_dropped() {
        let mut harness = Harness::new(attendance_gateway(), EntityKind::Attendance);
        harness.runtime.parked = Some(Vec::new());
        harness.press(KeyCode::Char('r'));
        assert_eq!(harness.view().load_state(), &LoadState::Loading);

        harness.press(KeyCode::Char('f'));
        assert_eq!(harness.state.active_tab, EntityKind::Leave);
        let parked = harness.runtime.parked.take().expect("parked requests");
        assert_eq!(parked.len(), 2, "the reload and the new tab's load");

        for request in parked {
            let result = request.execute(&harness.runtime.gateway);
            harness
                .tx
                .send(InternalEvent::Remote {
                    entity: request.entity,
                    ticket: request.ticket,
                    result,
                })
                .expect("channel open");
        }
        harness.drain();

        let attendance = harness
            .view_data
            .views
            .get(&EntityKind::Attendance)
            .expect("attendance view kept");
        assert_eq!(attendance.load_state(), &LoadState::Idle);
        assert!(attendance.base().is_empty());
        assert_eq!(harness.view().load_state(), &LoadState::Loaded);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("0 leave loaded")
        );
    }

    #[test]
    fn load_failure_is_shown_in_place_of_the_table() {
        let gateway = MemoryGateway::new();
        gateway.fail_next(GatewayError::Transport("connection refused".to_owned()));
        let mut harness = Harness::new(gateway, EntityKind::Payroll);
        let text = placeholder_text(harness.view()).expect("placeholder");
        assert!(text.contains("connection refused"));
        assert!(text.contains("press r to retry"));

        harness.press(KeyCode::Char('r'));
        assert_eq!(harness.view().load_state(), &LoadState::Loaded);
        assert_eq!(
            placeholder_text(harness.view()),
            None,
            "empty but loaded tables render"
        );
    }

    #[test]
    fn edit_on_empty_table_reports_nothing_selected() {
        let mut harness = Harness::new(MemoryGateway::new(), EntityKind::Family);
        harness.press(KeyCode::Char('e'));
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("nothing selected to edit")
        );
    }

    #[test]
    fn help_toggles_with_question_mark() {
        let mut harness = Harness::new(MemoryGateway::new(), EntityKind::Salary);
        harness.press(KeyCode::Char('?'));
        assert_eq!(harness.state.mode, AppMode::Help);
        assert!(help_overlay_text().contains("c columns"));
        harness.press(KeyCode::Char('?'));
        assert_eq!(harness.state.mode, AppMode::Nav);
    }
}
