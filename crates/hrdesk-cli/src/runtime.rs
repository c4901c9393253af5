// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use hrdesk_app::{GatewayError, RecordGateway, RemoteOutcome, RemoteRequest};
use hrdesk_tui::{AppRuntime, InternalEvent};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

pub type SharedGateway = Arc<dyn RecordGateway + Send + Sync>;

/// Runs every remote request on its own worker thread.
pub struct GatewayRuntime {
    gateway: SharedGateway,
}

impl GatewayRuntime {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }
}

impl AppRuntime for GatewayRuntime {
    fn execute(&mut self, request: &RemoteRequest) -> Result<RemoteOutcome, GatewayError> {
        request.execute(self.gateway.as_ref())
    }

    fn spawn_request(&mut self, request: RemoteRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let name = format!("hrdesk-{}-{}", request.entity.label(), request.op.verb());
        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let result = request.execute(gateway.as_ref());
                if let Err(error) = &result {
                    warn!(
                        entity = request.entity.label(),
                        op = request.op.verb(),
                        %error,
                        "remote request failed"
                    );
                }
                let event = InternalEvent::Remote {
                    entity: request.entity,
                    ticket: request.ticket,
                    result,
                };
                if tx.send(event).is_err() {
                    debug!("ui closed before request finished");
                }
            })
            .context("spawn request worker")?;
        Ok(())
    }

    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}
