// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::date_codec::{STORAGE_LAYOUT, parse_storage_date};
use std::collections::BTreeMap;
use std::fmt;
use time::macros::format_description;
use time::{Date, Time};

/// Text inputs of an edit buffer or creation form, keyed by field name.
/// Dates are in storage form.
pub type FieldInputs = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Entity-specific constraint checked before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    Required(&'static str),
    PositiveInteger(&'static str),
    Alphanumeric(&'static str),
    NonNegativeNumber(&'static str),
    Percentage(&'static str),
    OneOf(&'static str, &'static [&'static str]),
    NotInFuture(&'static str),
    /// The date lies between `max_years` and `min_years` before today.
    AgeBetween {
        field: &'static str,
        min_years: i32,
        max_years: i32,
    },
    DateOrder {
        earlier: &'static str,
        later: &'static str,
    },
    TimeOrder {
        earlier: &'static str,
        later: &'static str,
    },
    YearsAfter {
        earlier: &'static str,
        later: &'static str,
        years: i32,
    },
}

impl ValidationRule {
    pub fn check(self, inputs: &FieldInputs, today: Date) -> Option<FieldError> {
        match self {
            Self::Required(field) => {
                if input(inputs, field).is_empty() {
                    return Some(FieldError::new(field, "required -- enter a value and retry"));
                }
                None
            }
            Self::PositiveInteger(field) => {
                let value = input(inputs, field);
                match value.parse::<i64>() {
                    Ok(parsed) if parsed > 0 => None,
                    _ => Some(FieldError::new(field, "must be a positive whole number")),
                }
            }
            Self::Alphanumeric(field) => {
                let value = input(inputs, field);
                if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Some(FieldError::new(
                        field,
                        "must contain only letters and numbers",
                    ));
                }
                if let Ok(parsed) = value.parse::<i64>()
                    && parsed <= 0
                {
                    return Some(FieldError::new(field, "must be positive when numeric"));
                }
                None
            }
            Self::NonNegativeNumber(field) => {
                let value = input(inputs, field);
                if value.is_empty() {
                    return None;
                }
                match value.parse::<f64>() {
                    Ok(parsed) if parsed >= 0.0 => None,
                    Ok(_) => Some(FieldError::new(field, "cannot be negative")),
                    Err(_) => Some(FieldError::new(field, "must be a number")),
                }
            }
            Self::Percentage(field) => {
                let value = input(inputs, field);
                if value.is_empty() {
                    return None;
                }
                match value.parse::<f64>() {
                    Ok(parsed) if (0.0..=100.0).contains(&parsed) => None,
                    _ => Some(FieldError::new(field, "must be between 0 and 100")),
                }
            }
            Self::OneOf(field, options) => {
                let value = input(inputs, field);
                if options.contains(&value) {
                    return None;
                }
                Some(FieldError::new(
                    field,
                    format!("must be one of: {}", options.join(", ")),
                ))
            }
            Self::NotInFuture(field) => {
                let date = parse_storage_date(input(inputs, field))?;
                if date > today {
                    return Some(FieldError::new(field, "cannot be in the future"));
                }
                None
            }
            Self::AgeBetween {
                field,
                min_years,
                max_years,
            } => {
                let date = parse_storage_date(input(inputs, field))?;
                let youngest = shift_years(today, -min_years)?;
                let oldest = shift_years(today, -max_years)?;
                if date > youngest || date < oldest {
                    return Some(FieldError::new(
                        field,
                        format!("age must be between {min_years} and {max_years} years"),
                    ));
                }
                None
            }
            Self::DateOrder { earlier, later } => {
                let from = parse_storage_date(input(inputs, earlier))?;
                let to = parse_storage_date(input(inputs, later))?;
                if to < from {
                    return Some(FieldError::new(
                        later,
                        format!("must be on/after {earlier}"),
                    ));
                }
                None
            }
            Self::TimeOrder { earlier, later } => {
                let from = parse_time(input(inputs, earlier))?;
                let to = parse_time(input(inputs, later))?;
                if to < from {
                    return Some(FieldError::new(
                        later,
                        format!("must be at/after {earlier}"),
                    ));
                }
                None
            }
            Self::YearsAfter {
                earlier,
                later,
                years,
            } => {
                let from = parse_storage_date(input(inputs, earlier))?;
                let to = parse_storage_date(input(inputs, later))?;
                if to < shift_years(from, years)? {
                    return Some(FieldError::new(
                        later,
                        format!("must be at least {years} years after {earlier}"),
                    ));
                }
                None
            }
        }
    }
}

pub fn check_rules(rules: &[ValidationRule], inputs: &FieldInputs, today: Date) -> Vec<FieldError> {
    rules
        .iter()
        .filter_map(|rule| rule.check(inputs, today))
        .collect()
}

pub fn check_date_input(field: &'static str, value: &str) -> Option<FieldError> {
    if value.trim().is_empty() || parse_storage_date(value).is_some() {
        return None;
    }
    Some(FieldError::new(
        field,
        format!("invalid date -- use {STORAGE_LAYOUT}"),
    ))
}

pub fn check_time_input(field: &'static str, value: &str) -> Option<FieldError> {
    if value.trim().is_empty() || parse_time(value).is_some() {
        return None;
    }
    Some(FieldError::new(field, "invalid time -- use HH:MM or HH:MM:SS"))
}

pub fn parse_time(input: &str) -> Option<Time> {
    let trimmed = input.trim();
    Time::parse(trimmed, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(trimmed, format_description!("[hour]:[minute]")))
        .ok()
}

/// Same calendar day `years` later (or earlier when negative). 29 February
/// lands on 28 February in common years.
fn shift_years(date: Date, years: i32) -> Option<Date> {
    let year = date.year().checked_add(years)?;
    Date::from_calendar_date(year, date.month(), date.day())
        .or_else(|_| Date::from_calendar_date(year, date.month(), date.day() - 1))
        .ok()
}

fn input<'a>(inputs: &'a FieldInputs, field: &str) -> &'a str {
    inputs.get(field).map(|value| value.trim()).unwrap_or("")
}
