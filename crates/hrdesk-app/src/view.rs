// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! One searchable, column-configurable table of one entity, backed by a
//! [`RecordGateway`].
//!
//! Every remote operation is split in two: `prepare_*` validates, marks the
//! natural key as pending and hands back a [`RemoteRequest`]; [`complete`]
//! applies the outcome. The split lets a caller run the request on another
//! thread. The synchronous helpers (`load`, `commit_edit`, `confirm_delete`,
//! `submit_create`) run both halves in place.
//!
//! After a successful mutation the base collection is patched locally, with
//! no re-fetch. This keeps the table responsive, at the price of drifting
//! when another client edits the same record; `prepare_load` re-syncs.
//!
//! [`complete`]: TabularRecordView::complete

use crate::columns::ColumnVisibilityModel;
use crate::gateway::{
    GatewayError, RecordGateway, RemoteOp, RemoteOutcome, RemoteRequest, Ticket,
};
use crate::schema::{DateForm, EntityKind, EntitySchema, FieldSpec};
use crate::search;
use crate::validation::{FieldError, FieldInputs};
use crate::value::{NaturalKey, Record};
use std::fmt;
use time::Date;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    LoadFailed(String),
}

/// Scratch copy of the row being edited. Inputs hold dates in storage form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub key: NaturalKey,
    pub original: Record,
    pub inputs: FieldInputs,
    pub errors: Vec<FieldError>,
    pub failure: Option<String>,
    pub submitting: bool,
}

impl EditBuffer {
    pub fn input(&self, field: &str) -> &str {
        self.inputs.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletePrompt {
    pub key: NaturalKey,
    pub record: Record,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Loaded { count: usize },
    LoadFailed(GatewayError),
    Created(NaturalKey),
    Updated(NaturalKey),
    Deleted(NaturalKey),
    MutationFailed {
        key: NaturalKey,
        verb: &'static str,
        error: GatewayError,
    },
    /// The completion belonged to an earlier mount and was dropped.
    Discarded,
}

impl ViewEvent {
    /// Transient notice for the user, if the event warrants one.
    pub fn notice(&self, kind: EntityKind) -> Option<String> {
        match self {
            Self::Loaded { count } => Some(format!("{count} {} loaded", kind.label())),
            Self::LoadFailed(error) => Some(format!("load {} failed: {error}", kind.label())),
            Self::Created(key) => Some(format!("record {key} added")),
            Self::Updated(key) => Some(format!("record {key} updated")),
            Self::Deleted(key) => Some(format!("record {key} deleted")),
            Self::MutationFailed { key, verb, error } => {
                Some(format!("{verb} {key} failed: {error}"))
            }
            Self::Discarded => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    Validation(Vec<FieldError>),
    KeyBusy(NaturalKey),
    LoadInFlight,
    NotLoaded,
    NoEditOpen,
    NoChanges,
    NoDeletePending,
    MissingKey,
    Gateway(GatewayError),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => {
                let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "fix the highlighted fields: {}", parts.join("; "))
            }
            Self::KeyBusy(key) => write!(f, "record {key} has a request in flight -- wait for it"),
            Self::LoadInFlight => f.write_str("still loading -- wait for the current load"),
            Self::NotLoaded => f.write_str("records are not loaded -- press r to reload"),
            Self::NoEditOpen => f.write_str("no edit in progress"),
            Self::NoChanges => f.write_str("nothing changed -- edit a field first"),
            Self::NoDeletePending => f.write_str("no delete awaiting confirmation"),
            Self::MissingKey => f.write_str("record has no usable key"),
            Self::Gateway(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for ViewError {}

#[derive(Debug, Clone, PartialEq)]
enum PendingOp {
    Load,
    Create { key: NaturalKey, record: Record },
    Update { key: NaturalKey, patch: Record },
    Delete { key: NaturalKey },
}

impl PendingOp {
    fn key(&self) -> Option<&NaturalKey> {
        match self {
            Self::Load => None,
            Self::Create { key, .. } | Self::Update { key, .. } | Self::Delete { key } => Some(key),
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    ticket: Ticket,
    op: PendingOp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularRecordView {
    schema: &'static EntitySchema,
    state: LoadState,
    base: Vec<Record>,
    query: String,
    columns: ColumnVisibilityModel,
    column_picker_open: bool,
    edit: Option<EditBuffer>,
    delete: Option<DeletePrompt>,
    in_flight: Vec<InFlight>,
    generation: u64,
    next_ticket: u64,
}

impl TabularRecordView {
    pub fn new(kind: EntityKind) -> Self {
        let schema = kind.schema();
        Self {
            schema,
            state: LoadState::Idle,
            base: Vec::new(),
            query: String::new(),
            columns: ColumnVisibilityModel::new(schema.fields),
            column_picker_open: false,
            edit: None,
            delete: None,
            in_flight: Vec::new(),
            generation: 0,
            next_ticket: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn base(&self) -> &[Record] {
        &self.base
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn columns(&self) -> &ColumnVisibilityModel {
        &self.columns
    }

    pub fn column_picker_open(&self) -> bool {
        self.column_picker_open
    }

    pub fn edit(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    pub fn delete_prompt(&self) -> Option<&DeletePrompt> {
        self.delete.as_ref()
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_pending(&self, key: &NaturalKey) -> bool {
        self.in_flight.iter().any(|flight| flight.op.key() == Some(key))
    }

    /// Drops all local state. Requests issued before this call will be
    /// discarded when they complete.
    pub fn unmount(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self::new(self.kind());
        self.generation = generation;
    }

    pub fn prepare_load(&mut self) -> Result<RemoteRequest, ViewError> {
        if self
            .in_flight
            .iter()
            .any(|flight| flight.op == PendingOp::Load)
        {
            return Err(ViewError::LoadInFlight);
        }
        self.state = LoadState::Loading;
        Ok(self.issue(PendingOp::Load, RemoteOp::List))
    }

    pub fn load<G: RecordGateway + ?Sized>(&mut self, gateway: &G) -> Result<ViewEvent, ViewError> {
        let request = self.prepare_load()?;
        self.run(gateway, request)
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.to_owned();
    }

    /// Base collection narrowed by the current query.
    pub fn displayed(&self) -> Vec<&Record> {
        search::filter(&self.base, &self.query)
    }

    /// Displayed records projected onto the visible columns.
    pub fn displayed_rows(&self) -> Vec<Vec<String>> {
        let fields = self.columns.visible_fields();
        self.displayed()
            .into_iter()
            .map(|record| fields.iter().map(|field| record.display(field)).collect())
            .collect()
    }

    pub fn toggle_column(&mut self, field: &str) -> Option<bool> {
        self.columns.toggle(field)
    }

    pub fn open_column_picker(&mut self) {
        self.column_picker_open = true;
    }

    pub fn close_column_picker(&mut self) {
        self.column_picker_open = false;
    }

    pub fn begin_edit(&mut self, record: &Record) -> Result<(), ViewError> {
        let key = self.loaded_key_of(record)?;
        self.edit = Some(EditBuffer {
            key,
            original: record.clone(),
            inputs: self.schema.inputs_from_display(record),
            errors: Vec::new(),
            failure: None,
            submitting: false,
        });
        Ok(())
    }

    /// Changes one input of the open edit buffer. Key fields and unknown
    /// fields are refused.
    pub fn set_edit_input(&mut self, field: &str, value: &str) -> bool {
        let schema = self.schema;
        let Some(edit) = self.edit.as_mut() else {
            return false;
        };
        if edit.submitting || schema.is_key_field(field) || schema.field(field).is_none() {
            return false;
        }
        edit.inputs.insert(field.to_owned(), value.to_owned());
        edit.errors.retain(|error| error.field != field);
        edit.failure = None;
        true
    }

    pub fn cancel_edit(&mut self) {
        if self.edit.as_ref().is_some_and(|edit| !edit.submitting) {
            self.edit = None;
        }
    }

    pub fn prepare_commit(&mut self, today: Date) -> Result<RemoteRequest, ViewError> {
        let schema = self.schema;
        let edit = self.edit.as_mut().ok_or(ViewError::NoEditOpen)?;
        let errors = schema.validate(schema.fields, &edit.inputs, today);
        if !errors.is_empty() {
            edit.errors = errors.clone();
            return Err(ViewError::Validation(errors));
        }
        let seed = schema.inputs_from_display(&edit.original);
        let changed: Vec<&FieldSpec> = schema
            .editable_fields()
            .filter(|field| seed.get(field.name) != edit.inputs.get(field.name))
            .collect();
        if changed.is_empty() {
            return Err(ViewError::NoChanges);
        }
        let patch = match schema.record_from_inputs(changed, &edit.inputs) {
            Ok(patch) => patch,
            Err(errors) => {
                edit.errors = errors.clone();
                return Err(ViewError::Validation(errors));
            }
        };
        let key = edit.key.clone();
        if self.is_pending(&key) {
            return Err(ViewError::KeyBusy(key));
        }
        if let Some(edit) = self.edit.as_mut() {
            edit.errors.clear();
            edit.failure = None;
            edit.submitting = true;
        }
        Ok(self.issue(
            PendingOp::Update {
                key: key.clone(),
                patch: patch.clone(),
            },
            RemoteOp::Update { key, patch },
        ))
    }

    pub fn commit_edit<G: RecordGateway + ?Sized>(
        &mut self,
        gateway: &G,
        today: Date,
    ) -> Result<ViewEvent, ViewError> {
        let request = self.prepare_commit(today)?;
        self.run(gateway, request)
    }

    pub fn begin_delete(&mut self, record: &Record) -> Result<(), ViewError> {
        let key = self.loaded_key_of(record)?;
        self.delete = Some(DeletePrompt {
            key,
            record: record.clone(),
            submitting: false,
        });
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        if self.delete.as_ref().is_some_and(|prompt| !prompt.submitting) {
            self.delete = None;
        }
    }

    pub fn prepare_delete(&mut self) -> Result<RemoteRequest, ViewError> {
        let key = self
            .delete
            .as_ref()
            .map(|prompt| prompt.key.clone())
            .ok_or(ViewError::NoDeletePending)?;
        if self.is_pending(&key) {
            return Err(ViewError::KeyBusy(key));
        }
        if let Some(prompt) = self.delete.as_mut() {
            prompt.submitting = true;
        }
        Ok(self.issue(
            PendingOp::Delete { key: key.clone() },
            RemoteOp::Delete(key),
        ))
    }

    pub fn confirm_delete<G: RecordGateway + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<ViewEvent, ViewError> {
        let request = self.prepare_delete()?;
        self.run(gateway, request)
    }

    /// Issues a create for an already validated, storage-form record.
    pub fn prepare_create(&mut self, record: Record) -> Result<RemoteRequest, ViewError> {
        let key = self
            .schema
            .natural_key(&record, DateForm::Storage)
            .ok_or(ViewError::MissingKey)?;
        if self.is_pending(&key) {
            return Err(ViewError::KeyBusy(key));
        }
        Ok(self.issue(
            PendingOp::Create {
                key,
                record: record.clone(),
            },
            RemoteOp::Create(record),
        ))
    }

    pub fn submit_create<G: RecordGateway + ?Sized>(
        &mut self,
        gateway: &G,
        record: Record,
    ) -> Result<ViewEvent, ViewError> {
        let request = self.prepare_create(record)?;
        self.run(gateway, request)
    }

    /// Applies the outcome of a request issued by this view.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<RemoteOutcome, GatewayError>,
    ) -> ViewEvent {
        if ticket.generation != self.generation {
            debug!(
                entity = self.schema.collection,
                ticket = ticket.id,
                "discarding completion from an earlier mount"
            );
            return ViewEvent::Discarded;
        }
        let Some(index) = self
            .in_flight
            .iter()
            .position(|flight| flight.ticket == ticket)
        else {
            return ViewEvent::Discarded;
        };
        let flight = self.in_flight.remove(index);
        match result {
            Ok(outcome) => self.apply_success(flight.op, outcome),
            Err(error) => self.apply_failure(flight.op, error),
        }
    }

    fn run<G: RecordGateway + ?Sized>(
        &mut self,
        gateway: &G,
        request: RemoteRequest,
    ) -> Result<ViewEvent, ViewError> {
        let result = request.execute(gateway);
        match self.complete(request.ticket, result) {
            ViewEvent::LoadFailed(error) | ViewEvent::MutationFailed { error, .. } => {
                Err(ViewError::Gateway(error))
            }
            event => Ok(event),
        }
    }

    fn issue(&mut self, pending: PendingOp, op: RemoteOp) -> RemoteRequest {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = Ticket {
            generation: self.generation,
            id: self.next_ticket,
        };
        debug!(
            entity = self.schema.collection,
            ticket = ticket.id,
            op = op.verb(),
            "request issued"
        );
        self.in_flight.push(InFlight { ticket, op: pending });
        RemoteRequest {
            ticket,
            entity: self.kind(),
            op,
        }
    }

    fn loaded_key_of(&self, record: &Record) -> Result<NaturalKey, ViewError> {
        if self.state != LoadState::Loaded {
            return Err(ViewError::NotLoaded);
        }
        let key = self
            .schema
            .natural_key(record, DateForm::Display)
            .ok_or(ViewError::MissingKey)?;
        if self.is_pending(&key) {
            return Err(ViewError::KeyBusy(key));
        }
        Ok(key)
    }

    fn position_of(&self, key: &NaturalKey) -> Option<usize> {
        self.base.iter().position(|record| {
            self.schema.natural_key(record, DateForm::Display).as_ref() == Some(key)
        })
    }

    fn apply_success(&mut self, op: PendingOp, outcome: RemoteOutcome) -> ViewEvent {
        let schema = self.schema;
        match (op, outcome) {
            (PendingOp::Load, RemoteOutcome::Listed(records)) => {
                self.base = records.iter().map(|record| schema.to_display(record)).collect();
                self.state = LoadState::Loaded;
                info!(
                    entity = schema.collection,
                    count = self.base.len(),
                    "records loaded"
                );
                ViewEvent::Loaded {
                    count: self.base.len(),
                }
            }
            (PendingOp::Update { key, patch }, RemoteOutcome::Updated(echo)) => {
                if let Some(position) = self.position_of(&key) {
                    let mut stored = schema.to_storage(&self.base[position]);
                    stored.merge(&patch);
                    if let Some(echo) = echo {
                        stored.merge(&echo);
                    }
                    self.base[position] = schema.to_display(&stored);
                } else {
                    warn!(entity = schema.collection, %key, "updated record no longer listed");
                }
                if self.edit.as_ref().is_some_and(|edit| edit.key == key) {
                    self.edit = None;
                }
                info!(entity = schema.collection, %key, "record updated");
                ViewEvent::Updated(key)
            }
            (PendingOp::Delete { key }, RemoteOutcome::Deleted) => {
                self.base.retain(|record| {
                    schema.natural_key(record, DateForm::Display).as_ref() != Some(&key)
                });
                if self.delete.as_ref().is_some_and(|prompt| prompt.key == key) {
                    self.delete = None;
                }
                info!(entity = schema.collection, %key, "record deleted");
                ViewEvent::Deleted(key)
            }
            (PendingOp::Create { key, mut record }, RemoteOutcome::Created(echo)) => {
                if let Some(echo) = echo {
                    record.merge(&echo);
                }
                if self.state == LoadState::Loaded {
                    let shown = schema.to_display(&record);
                    match self.position_of(&key) {
                        Some(position) => self.base[position] = shown,
                        None => self.base.push(shown),
                    }
                }
                info!(entity = schema.collection, %key, "record created");
                ViewEvent::Created(key)
            }
            (op, outcome) => {
                let error = GatewayError::Decode(format!(
                    "{} request answered with {outcome:?}",
                    op.verb()
                ));
                self.apply_failure(op, error)
            }
        }
    }

    fn apply_failure(&mut self, op: PendingOp, error: GatewayError) -> ViewEvent {
        warn!(
            entity = self.schema.collection,
            op = op.verb(),
            transport = error.is_transport(),
            "request failed: {error}"
        );
        let verb = op.verb();
        match op {
            PendingOp::Load => {
                self.state = LoadState::LoadFailed(error.to_string());
                ViewEvent::LoadFailed(error)
            }
            PendingOp::Update { key, .. } => {
                if let Some(edit) = self.edit.as_mut()
                    && edit.key == key
                {
                    edit.submitting = false;
                    edit.failure = Some(error.to_string());
                }
                ViewEvent::MutationFailed { key, verb, error }
            }
            PendingOp::Delete { key } => {
                if self.delete.as_ref().is_some_and(|prompt| prompt.key == key) {
                    self.delete = None;
                }
                ViewEvent::MutationFailed { key, verb, error }
            }
            PendingOp::Create { key, .. } => ViewEvent::MutationFailed { key, verb, error },
        }
    }
}
