// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Conversion between the remote store's date layout (`YYYY-MM-DD`, sorts
//! lexicographically) and the layout shown in tables (`DD-MM-YYYY`).
//!
//! Both directions are total: anything that does not parse becomes
//! [`UNKNOWN_DATE`] instead of an error.

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const STORAGE_LAYOUT: &str = "YYYY-MM-DD";
pub const DISPLAY_LAYOUT: &str = "DD-MM-YYYY";
pub const UNKNOWN_DATE: &str = "N/A";

const STORAGE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month]-[year]");

pub fn to_display(storage: &str) -> String {
    parse_storage_date(storage)
        .and_then(|date| date.format(DISPLAY_FORMAT).ok())
        .unwrap_or_else(|| UNKNOWN_DATE.to_owned())
}

pub fn to_storage(display: &str) -> String {
    parse_display_date(display)
        .map(format_storage_date)
        .unwrap_or_else(|| UNKNOWN_DATE.to_owned())
}

pub fn is_unknown(value: &str) -> bool {
    value == UNKNOWN_DATE
}

/// Accepts a bare storage date or one carrying a time suffix
/// (`2024-01-05T00:00:00.000Z`), which is how SQL `DATE` columns come back
/// from the records service.
pub fn parse_storage_date(input: &str) -> Option<Date> {
    let trimmed = input.trim();
    let date_part = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(date, _)| date);
    Date::parse(date_part, STORAGE_FORMAT).ok()
}

pub fn parse_display_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), DISPLAY_FORMAT).ok()
}

pub fn format_storage_date(date: Date) -> String {
    date.format(STORAGE_FORMAT)
        .unwrap_or_else(|_| UNKNOWN_DATE.to_owned())
}

pub fn format_display_date(date: Date) -> String {
    date.format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| UNKNOWN_DATE.to_owned())
}
