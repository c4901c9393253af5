// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One scalar cell as exchanged with the records service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

/// One row of one entity type, keyed by the remote schema's field names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn display(&self, field: &str) -> String {
        self.get(field).map(FieldValue::display).unwrap_or_default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.fields.insert(field.to_owned(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlays every field of `patch` onto this record.
    pub fn merge(&mut self, patch: &Record) {
        for (name, value) in &patch.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// The field values (storage form) that identify a record for update and
/// delete, in schema key order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NaturalKey {
    parts: Vec<String>,
}

impl NaturalKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, NaturalKey, Record};
    use anyhow::Result;

    #[test]
    fn json_numbers_keep_integer_and_decimal_shapes() -> Result<()> {
        let record: Record = serde_json::from_str(
            r#"{"EID": 7, "PERCENTAGE": 81.5, "STATUS": "Present", "LOGOUT": null}"#,
        )?;
        assert_eq!(record.get("EID"), Some(&FieldValue::Integer(7)));
        assert_eq!(record.get("PERCENTAGE"), Some(&FieldValue::Decimal(81.5)));
        assert_eq!(record.get("STATUS"), Some(&FieldValue::text("Present")));
        assert_eq!(record.get("LOGOUT"), Some(&FieldValue::Null));
        Ok(())
    }

    #[test]
    fn record_serializes_as_flat_object() -> Result<()> {
        let record = Record::new().with("EID", 7).with("DNAME", "Payroll");
        let json = serde_json::to_value(&record)?;
        assert_eq!(json, serde_json::json!({"EID": 7, "DNAME": "Payroll"}));
        Ok(())
    }

    #[test]
    fn display_renders_null_as_empty_and_decimals_compactly() {
        assert_eq!(FieldValue::Null.display(), "");
        assert_eq!(FieldValue::Decimal(12.0).display(), "12");
        assert_eq!(FieldValue::Decimal(12.25).display(), "12.25");
    }

    #[test]
    fn merge_overwrites_only_patched_fields() {
        let mut record = Record::new()
            .with("EID", 7)
            .with("STATUS", "Present")
            .with("LOGIN", "09:00");
        record.merge(&Record::new().with("STATUS", "Absent"));
        assert_eq!(record.display("STATUS"), "Absent");
        assert_eq!(record.display("LOGIN"), "09:00");
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn natural_key_display_joins_parts() {
        let key = NaturalKey::new(["7", "2024-01-06"]);
        assert_eq!(key.to_string(), "7 / 2024-01-06");
        assert_eq!(key.parts().len(), 2);
    }
}
