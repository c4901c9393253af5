// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::value::Record;

/// Case-insensitive substring search over every field of every record.
/// A blank query keeps everything; matches keep their input order.
pub fn filter<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| record_matches(record, &needle))
        .collect()
}

/// `needle` must already be trimmed and lower-cased.
pub fn record_matches(record: &Record, needle: &str) -> bool {
    record
        .values()
        .any(|value| value.display().to_lowercase().contains(needle))
}
