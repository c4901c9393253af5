// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use hrdesk_app::{DateForm, EntityKind, EntitySchema, GatewayError, NaturalKey, Record, RecordGateway};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Store {
    tables: BTreeMap<EntityKind, Vec<Record>>,
    failures: VecDeque<GatewayError>,
    echo: bool,
    calls: Vec<String>,
}

/// In-process records service. Clones share the same store, so a test can
/// keep one handle for inspection while the view owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    store: Arc<Mutex<Store>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: BTreeMap<EntityKind, Vec<Record>>) -> Self {
        let gateway = Self::new();
        gateway.lock().tables = tables;
        gateway
    }

    pub fn insert(&self, kind: EntityKind, record: Record) {
        self.lock().tables.entry(kind).or_default().push(record);
    }

    pub fn records(&self, kind: EntityKind) -> Vec<Record> {
        self.lock().tables.get(&kind).cloned().unwrap_or_default()
    }

    /// Queue an error for the next call, whatever it is.
    pub fn fail_next(&self, error: GatewayError) {
        self.lock().failures.push_back(error);
    }

    /// Whether create/update answer with the stored record.
    pub fn set_echo(&self, echo: bool) {
        self.lock().echo = echo;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, call: String) -> Result<MutexGuard<'_, Store>, GatewayError> {
        let mut store = self.lock();
        store.calls.push(call);
        match store.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(store),
        }
    }
}

fn position(table: &[Record], schema: &EntitySchema, key: &NaturalKey) -> Option<usize> {
    table
        .iter()
        .position(|record| schema.natural_key(record, DateForm::Storage).as_ref() == Some(key))
}

fn not_found(schema: &EntitySchema, key: &NaturalKey) -> GatewayError {
    GatewayError::Rejected {
        status: 404,
        message: Some(format!("no record {key} in {}", schema.collection)),
    }
}

impl RecordGateway for MemoryGateway {
    fn list(&self, schema: &EntitySchema) -> Result<Vec<Record>, GatewayError> {
        let store = self.begin(format!("GET /{}", schema.collection))?;
        Ok(store.tables.get(&schema.kind).cloned().unwrap_or_default())
    }

    fn create(
        &self,
        schema: &EntitySchema,
        record: &Record,
    ) -> Result<Option<Record>, GatewayError> {
        let mut store = self.begin(format!("POST /{}", schema.create_path))?;
        let key = schema
            .natural_key(record, DateForm::Storage)
            .ok_or_else(|| GatewayError::Rejected {
                status: 400,
                message: Some("missing key fields".to_owned()),
            })?;
        let echo = store.echo;
        let table = store.tables.entry(schema.kind).or_default();
        if position(table, schema, &key).is_some() {
            return Err(GatewayError::Rejected {
                status: 409,
                message: Some(format!("record {key} already exists in {}", schema.collection)),
            });
        }
        table.push(record.clone());
        Ok(echo.then(|| record.clone()))
    }

    fn update(
        &self,
        schema: &EntitySchema,
        key: &NaturalKey,
        patch: &Record,
    ) -> Result<Option<Record>, GatewayError> {
        let mut store = self.begin(format!("PUT /{}/{}", schema.collection, key.parts().join("/")))?;
        let echo = store.echo;
        let table = store.tables.entry(schema.kind).or_default();
        let index = position(table, schema, key).ok_or_else(|| not_found(schema, key))?;
        table[index].merge(patch);
        Ok(echo.then(|| table[index].clone()))
    }

    fn delete(&self, schema: &EntitySchema, key: &NaturalKey) -> Result<(), GatewayError> {
        let mut store =
            self.begin(format!("DELETE /{}/{}", schema.collection, key.parts().join("/")))?;
        let table = store.tables.entry(schema.kind).or_default();
        let index = position(table, schema, key).ok_or_else(|| not_found(schema, key))?;
        table.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryGateway;
    use hrdesk_app::{EntityKind, GatewayError, NaturalKey, Record, RecordGateway};

    fn department(did: i64, name: &str) -> Record {
        Record::new().with("DID", did).with("DNAME", name)
    }

    #[test]
    fn clones_share_one_store() {
        let gateway = MemoryGateway::new();
        let handle = gateway.clone();
        let schema = EntityKind::Department.schema();
        gateway
            .create(schema, &department(1, "Physics"))
            .expect("create");
        assert_eq!(handle.records(EntityKind::Department).len(), 1);
        assert_eq!(handle.calls(), vec!["POST /add-department".to_owned()]);
    }

    #[test]
    fn accounts_post_to_employee_details() {
        let gateway = MemoryGateway::new();
        let account = Record::new().with("EID", 3).with("PAN", "ABCDE1234F");
        gateway
            .create(EntityKind::Account.schema(), &account)
            .expect("create");
        assert_eq!(gateway.calls(), vec!["POST /add-employee-details".to_owned()]);
        assert_eq!(gateway.records(EntityKind::Account), vec![account]);
    }

    #[test]
    fn duplicate_create_is_a_conflict() {
        let gateway = MemoryGateway::new();
        let schema = EntityKind::Department.schema();
        gateway.insert(EntityKind::Department, department(1, "Physics"));
        let error = gateway
            .create(schema, &department(1, "Civil"))
            .expect_err("duplicate key");
        assert!(matches!(error, GatewayError::Rejected { status: 409, .. }));
    }

    #[test]
    fn update_and_delete_address_by_key() {
        let gateway = MemoryGateway::new();
        gateway.set_echo(true);
        let schema = EntityKind::Department.schema();
        gateway.insert(EntityKind::Department, department(1, "Physics"));
        gateway.insert(EntityKind::Department, department(2, "Civil"));

        let key = NaturalKey::new(["2"]);
        let echoed = gateway
            .update(schema, &key, &Record::new().with("DNAME", "Civil Engg"))
            .expect("update")
            .expect("echo");
        assert_eq!(echoed.display("DNAME"), "Civil Engg");

        gateway.delete(schema, &NaturalKey::new(["1"])).expect("delete");
        let remaining = gateway.records(EntityKind::Department);
        assert_eq!(remaining, vec![department(2, "Civil Engg")]);

        let missing = gateway
            .delete(schema, &NaturalKey::new(["9"]))
            .expect_err("unknown key");
        assert!(matches!(missing, GatewayError::Rejected { status: 404, .. }));
    }

    #[test]
    fn queued_failures_apply_once() {
        let gateway = MemoryGateway::new();
        let schema = EntityKind::Leave.schema();
        gateway.fail_next(GatewayError::Transport("offline".to_owned()));
        assert!(gateway.list(schema).is_err());
        assert!(gateway.list(schema).is_ok());
    }
}
