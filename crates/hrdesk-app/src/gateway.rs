// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::schema::{EntityKind, EntitySchema};
use crate::value::{NaturalKey, Record};
use std::fmt;

/// Failure of one remote call. Nothing here is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (unreachable host, timeout).
    Transport(String),
    /// The records service answered with a non-success status.
    Rejected { status: u16, message: Option<String> },
    /// A success status whose body could not be decoded.
    Decode(String),
}

impl GatewayError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(detail) => write!(
                f,
                "cannot reach the records service -- check the connection and retry ({detail})"
            ),
            Self::Rejected {
                message: Some(message),
                ..
            } => f.write_str(message),
            Self::Rejected {
                status,
                message: None,
            } => write!(f, "request failed ({status}) -- the records service gave no detail"),
            Self::Decode(detail) => write!(f, "unexpected response from records service: {detail}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// The four remote operations for one entity collection. Keys and records
/// crossing this boundary are in storage form.
pub trait RecordGateway {
    fn list(&self, schema: &EntitySchema) -> Result<Vec<Record>, GatewayError>;

    /// Returns the created record when the service echoes one back.
    fn create(&self, schema: &EntitySchema, record: &Record)
    -> Result<Option<Record>, GatewayError>;

    /// Returns the updated record when the service echoes one back.
    fn update(
        &self,
        schema: &EntitySchema,
        key: &NaturalKey,
        patch: &Record,
    ) -> Result<Option<Record>, GatewayError>;

    fn delete(&self, schema: &EntitySchema, key: &NaturalKey) -> Result<(), GatewayError>;
}

/// Identifies one issued request. `generation` is the view mount it was
/// issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    pub generation: u64,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOp {
    List,
    Create(Record),
    Update { key: NaturalKey, patch: Record },
    Delete(NaturalKey),
}

impl RemoteOp {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    Listed(Vec<Record>),
    Created(Option<Record>),
    Updated(Option<Record>),
    Deleted,
}

/// A prepared remote call, detached from the view so it can run elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub ticket: Ticket,
    pub entity: EntityKind,
    pub op: RemoteOp,
}

impl RemoteRequest {
    pub fn execute<G: RecordGateway + ?Sized>(
        &self,
        gateway: &G,
    ) -> Result<RemoteOutcome, GatewayError> {
        let schema = self.entity.schema();
        match &self.op {
            RemoteOp::List => gateway.list(schema).map(RemoteOutcome::Listed),
            RemoteOp::Create(record) => gateway.create(schema, record).map(RemoteOutcome::Created),
            RemoteOp::Update { key, patch } => gateway
                .update(schema, key, patch)
                .map(RemoteOutcome::Updated),
            RemoteOp::Delete(key) => gateway.delete(schema, key).map(|()| RemoteOutcome::Deleted),
        }
    }
}
