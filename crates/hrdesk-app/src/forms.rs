// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::date_codec;
use crate::schema::{EntityKind, EntitySchema, FieldSpec};
use crate::validation::{FieldError, FieldInputs};
use crate::value::Record;
use time::{Date, Duration};

/// Text inputs for adding one record. Dates are typed in storage form.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateForm {
    kind: EntityKind,
    inputs: FieldInputs,
    errors: Vec<FieldError>,
}

impl CreateForm {
    pub fn blank(kind: EntityKind) -> Self {
        let schema = kind.schema();
        let mut inputs: FieldInputs = schema
            .create_fields()
            .map(|field| (field.name.to_owned(), String::new()))
            .collect();
        for (field, value) in schema.create_defaults {
            inputs.insert((*field).to_owned(), (*value).to_owned());
        }
        Self {
            kind,
            inputs,
            errors: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.kind.schema()
    }

    pub fn fields(&self) -> Vec<&'static FieldSpec> {
        self.schema().create_fields().collect()
    }

    pub fn input(&self, field: &str) -> &str {
        self.inputs.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }

    /// Fields computed from other inputs rather than typed.
    pub fn is_derived(&self, field: &str) -> bool {
        self.kind == EntityKind::Leave && field == "TO_DATE"
    }

    /// Returns false for unknown and derived fields.
    pub fn set_input(&mut self, field: &str, value: &str) -> bool {
        if self.is_derived(field) || !self.inputs.contains_key(field) {
            return false;
        }
        self.inputs.insert(field.to_owned(), value.to_owned());
        self.errors.retain(|error| error.field != field);
        if self.kind == EntityKind::Leave && matches!(field, "FROM_DATE" | "NO_OF_DAYS") {
            let end = leave_end_date(self.input("FROM_DATE"), self.input("NO_OF_DAYS"));
            self.inputs.insert("TO_DATE".to_owned(), end);
        }
        true
    }

    /// Validates every input and builds the storage-form record to submit.
    /// Errors are also kept on the form for display.
    pub fn to_record(&mut self, today: Date) -> Result<Record, Vec<FieldError>> {
        let schema = self.schema();
        self.errors = schema.validate(schema.create_fields(), &self.inputs, today);
        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }
        schema
            .record_from_inputs(schema.create_fields(), &self.inputs)
            .inspect_err(|errors| self.errors = errors.clone())
    }
}

/// Last day of a leave that starts on `from` and lasts `days` days, in
/// storage form. Empty when either input is unusable.
pub fn leave_end_date(from: &str, days: &str) -> String {
    let Some(start) = date_codec::parse_storage_date(from) else {
        return String::new();
    };
    let Ok(days) = days.trim().parse::<i64>() else {
        return String::new();
    };
    if days < 1 {
        return String::new();
    }
    (days - 1)
        .checked_mul(86_400)
        .and_then(|seconds| start.checked_add(Duration::seconds(seconds)))
        .map(date_codec::format_storage_date)
        .unwrap_or_default()
}
