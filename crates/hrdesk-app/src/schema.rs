// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-entity descriptors: one value per entity carries the remote field
//! names, their display aliases, kinds, default visibility, the natural key
//! and the validation rules.

use crate::date_codec::{self, UNKNOWN_DATE};
use crate::validation::{
    FieldError, FieldInputs, ValidationRule, check_date_input, check_rules, check_time_input,
};
use crate::value::{FieldValue, NaturalKey, Record};
use serde::{Deserialize, Serialize};
use time::Date;

pub const ATTENDANCE_STATUSES: &[&str] = &["Present", "Absent", "Leave"];
pub const LEAVE_TYPES: &[&str] = &["ML", "LOP", "RH", "OOD", "CL"];
pub const LEAVE_APPROVALS: &[&str] = &["PENDING", "APPROVED", "REJECTED"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Employee,
    Department,
    Attendance,
    Leave,
    Payroll,
    Salary,
    Qualification,
    Family,
    Account,
}

impl EntityKind {
    pub const ALL: [Self; 9] = [
        Self::Employee,
        Self::Department,
        Self::Attendance,
        Self::Leave,
        Self::Payroll,
        Self::Salary,
        Self::Qualification,
        Self::Family,
        Self::Account,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employee => "employees",
            Self::Department => "departments",
            Self::Attendance => "attendance",
            Self::Leave => "leave",
            Self::Payroll => "payroll",
            Self::Salary => "salary",
            Self::Qualification => "qualifications",
            Self::Family => "family",
            Self::Account => "accounts",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.label() == wanted)
    }

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Self::Employee => &EMPLOYEE,
            Self::Department => &DEPARTMENT,
            Self::Attendance => &ATTENDANCE,
            Self::Leave => &LEAVE,
            Self::Payroll => &PAYROLL,
            Self::Salary => &SALARY,
            Self::Qualification => &QUALIFICATION,
            Self::Family => &FAMILY,
            Self::Account => &ACCOUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
    Time,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub kind: FieldKind,
    pub default_visible: bool,
    pub on_create: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, alias: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            alias: Some(alias),
            kind,
            default_visible: true,
            on_create: true,
        }
    }

    pub const fn hidden(self) -> Self {
        Self {
            default_visible: false,
            ..self
        }
    }

    pub const fn label(&self) -> &'static str {
        match self.alias {
            Some(alias) => alias,
            None => self.name,
        }
    }

    /// Converts one text input into the value sent to the records service.
    pub fn parse_input(&self, raw: &str) -> Result<FieldValue, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(FieldValue::Null);
        }
        match self.kind {
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| FieldError::new(self.name, "must be a whole number")),
            FieldKind::Decimal => trimmed
                .parse::<f64>()
                .map(FieldValue::Decimal)
                .map_err(|_| FieldError::new(self.name, "must be a number")),
            FieldKind::Date => date_codec::parse_storage_date(trimmed)
                .map(|date| FieldValue::Text(date_codec::format_storage_date(date)))
                .ok_or_else(|| {
                    FieldError::new(
                        self.name,
                        format!("invalid date -- use {}", date_codec::STORAGE_LAYOUT),
                    )
                }),
            FieldKind::Text | FieldKind::Time | FieldKind::Choice(_) => {
                Ok(FieldValue::text(trimmed))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateForm {
    Display,
    Storage,
}

#[derive(Debug, PartialEq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub title: &'static str,
    pub collection: &'static str,
    pub create_path: &'static str,
    pub fields: &'static [FieldSpec],
    pub key_fields: &'static [&'static str],
    pub rules: &'static [ValidationRule],
    pub create_defaults: &'static [(&'static str, &'static str)],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_key_field(&self, name: &str) -> bool {
        self.key_fields.contains(&name)
    }

    pub fn is_date_field(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|field| field.kind == FieldKind::Date)
    }

    pub fn editable_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields
            .iter()
            .filter(|field| !self.key_fields.contains(&field.name))
    }

    pub fn create_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|field| field.on_create)
    }

    /// Returns `None` when a key field is missing, null or (for dates) unknown.
    pub fn natural_key(&self, record: &Record, form: DateForm) -> Option<NaturalKey> {
        let mut parts = Vec::with_capacity(self.key_fields.len());
        for name in self.key_fields {
            let value = record.get(name)?;
            if value.is_null() {
                return None;
            }
            let mut part = value.display();
            if self.is_date_field(name) && form == DateForm::Display {
                part = date_codec::to_storage(&part);
            }
            if part.trim().is_empty() || date_codec::is_unknown(&part) {
                return None;
            }
            parts.push(part);
        }
        Some(NaturalKey::new(parts))
    }

    /// Rewrites every date field from storage to display form. Missing and
    /// null dates become the unknown sentinel.
    pub fn to_display(&self, record: &Record) -> Record {
        let mut out = record.clone();
        for field in self.date_fields() {
            let shown = match record.get(field.name) {
                Some(FieldValue::Text(value)) => date_codec::to_display(value),
                _ => UNKNOWN_DATE.to_owned(),
            };
            out.set(field.name, shown);
        }
        out
    }

    /// Rewrites every date field from display to storage form. Unknown dates
    /// become null rather than the sentinel text.
    pub fn to_storage(&self, record: &Record) -> Record {
        let mut out = record.clone();
        for field in self.date_fields() {
            let Some(FieldValue::Text(value)) = record.get(field.name) else {
                continue;
            };
            let stored = date_codec::to_storage(value);
            if date_codec::is_unknown(&stored) {
                out.set(field.name, FieldValue::Null);
            } else {
                out.set(field.name, stored);
            }
        }
        out
    }

    /// Text inputs for an edit buffer, seeded from a display-form record with
    /// dates rewritten to storage form.
    pub fn inputs_from_display(&self, record: &Record) -> FieldInputs {
        let stored = self.to_storage(record);
        self.fields
            .iter()
            .map(|field| (field.name.to_owned(), stored.display(field.name)))
            .collect()
    }

    /// Kind checks for every listed field followed by the entity rules.
    pub fn validate<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a FieldSpec>,
        inputs: &FieldInputs,
        today: Date,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for field in fields {
            let raw = inputs.get(field.name).map(String::as_str).unwrap_or("");
            let kind_error = match field.kind {
                FieldKind::Date => check_date_input(field.name, raw),
                FieldKind::Time => check_time_input(field.name, raw),
                FieldKind::Integer | FieldKind::Decimal => field.parse_input(raw).err(),
                FieldKind::Text | FieldKind::Choice(_) => None,
            };
            errors.extend(kind_error);
        }
        for error in check_rules(self.rules, inputs, today) {
            if !errors.iter().any(|existing| existing.field == error.field) {
                errors.push(error);
            }
        }
        errors
    }

    /// Builds a storage-form record from text inputs for the listed fields.
    pub fn record_from_inputs<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a FieldSpec>,
        inputs: &FieldInputs,
    ) -> Result<Record, Vec<FieldError>> {
        let mut record = Record::new();
        let mut errors = Vec::new();
        for field in fields {
            let raw = inputs.get(field.name).map(String::as_str).unwrap_or("");
            match field.parse_input(raw) {
                Ok(value) => record.set(field.name, value),
                Err(error) => errors.push(error),
            }
        }
        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }

    fn date_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.kind == FieldKind::Date)
    }
}

use FieldKind::{Choice, Date as DateField, Decimal, Integer, Text, Time as TimeField};

pub static EMPLOYEE: EntitySchema = EntitySchema {
    kind: EntityKind::Employee,
    title: "Employees",
    collection: "employees",
    create_path: "add-employee",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("INITIAL", "Initial", Text),
        FieldSpec::new("FIRSTNAME", "First Name", Text),
        FieldSpec::new("MIDDLENAME", "Middle Name", Text),
        FieldSpec::new("LASTNAME", "Last Name", Text),
        FieldSpec::new("DESIGNATION", "Designation", Text),
        FieldSpec::new("DOB", "Date of Birth", DateField),
        FieldSpec::new("DATE_OF_JOIN", "Date of Joining", DateField),
        FieldSpec::new("FTYPE", "Employee Type", Text).hidden(),
        FieldSpec::new("NATIONALITY", "Nationality", Text),
        FieldSpec::new("PHONE", "Phone", Text),
        FieldSpec::new("EMAIL", "Email", Text),
        FieldSpec::new("CASTE", "Caste", Text).hidden(),
        FieldSpec::new("DOORNO", "Door No", Text).hidden(),
        FieldSpec::new("CITY", "City", Text),
        FieldSpec::new("STATE", "State", Text),
        FieldSpec::new("PINCODE", "Pincode", Text),
        FieldSpec::new("GENDER", "Gender", Text),
        FieldSpec::new("PROFEXP_DESIGNATION", "Prof Exp Degn", Text),
        FieldSpec::new("PPROFEXP_FROM", "Prof Exp From", DateField),
        FieldSpec::new("PPROFEXP_TO", "Prof Exp To", DateField),
        FieldSpec::new("LEAVE_ML", "Leave ML", Integer),
        FieldSpec::new("LEAVE_LOP", "Leave LOP", Integer),
        FieldSpec::new("LEAVE_RH", "Leave RH", Integer),
        FieldSpec::new("LEAVE_OOD", "Leave OOD", Integer),
        FieldSpec::new("LEAVE_CL", "Leave CL", Integer),
        FieldSpec::new("DID", "Department ID", Integer),
    ],
    key_fields: &["EID"],
    rules: &[
        ValidationRule::PositiveInteger("EID"),
        ValidationRule::Required("FIRSTNAME"),
        ValidationRule::AgeBetween {
            field: "DOB",
            min_years: 18,
            max_years: 100,
        },
        ValidationRule::YearsAfter {
            earlier: "DOB",
            later: "DATE_OF_JOIN",
            years: 18,
        },
        ValidationRule::NotInFuture("DATE_OF_JOIN"),
        ValidationRule::NotInFuture("PPROFEXP_FROM"),
        ValidationRule::NotInFuture("PPROFEXP_TO"),
        ValidationRule::DateOrder {
            earlier: "PPROFEXP_FROM",
            later: "PPROFEXP_TO",
        },
    ],
    create_defaults: &[],
};

pub static DEPARTMENT: EntitySchema = EntitySchema {
    kind: EntityKind::Department,
    title: "Departments",
    collection: "departments",
    create_path: "add-department",
    fields: &[
        FieldSpec::new("DID", "Department ID", Integer),
        FieldSpec::new("DNAME", "Department Name", Text),
        FieldSpec::new("DHEAD", "Department Head", Text),
    ],
    key_fields: &["DID"],
    rules: &[
        ValidationRule::PositiveInteger("DID"),
        ValidationRule::Required("DNAME"),
    ],
    create_defaults: &[],
};

pub static ATTENDANCE: EntitySchema = EntitySchema {
    kind: EntityKind::Attendance,
    title: "Attendance Records",
    collection: "attendance",
    create_path: "add-attendance",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Text),
        FieldSpec::new("A_DATE", "Date", DateField),
        FieldSpec::new("STATUS", "Status", Choice(ATTENDANCE_STATUSES)),
        FieldSpec::new("LOGIN", "Login", TimeField),
        FieldSpec::new("LOGOUT", "Logout", TimeField),
    ],
    key_fields: &["EID", "A_DATE"],
    rules: &[
        ValidationRule::Alphanumeric("EID"),
        ValidationRule::Required("A_DATE"),
        ValidationRule::NotInFuture("A_DATE"),
        ValidationRule::OneOf("STATUS", ATTENDANCE_STATUSES),
        ValidationRule::TimeOrder {
            earlier: "LOGIN",
            later: "LOGOUT",
        },
    ],
    create_defaults: &[("STATUS", "Present")],
};

pub static LEAVE: EntitySchema = EntitySchema {
    kind: EntityKind::Leave,
    title: "Leave Records",
    collection: "leave",
    create_path: "add-leave",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("LTYPE", "Leave Type", Choice(LEAVE_TYPES)),
        FieldSpec::new("APPROVAL", "Approval", Choice(LEAVE_APPROVALS)),
        FieldSpec::new("NO_OF_DAYS", "No. of Days", Integer),
        FieldSpec::new("FROM_DATE", "From Date", DateField),
        FieldSpec::new("TO_DATE", "To Date", DateField),
    ],
    key_fields: &["EID", "FROM_DATE"],
    rules: &[
        ValidationRule::PositiveInteger("EID"),
        ValidationRule::OneOf("LTYPE", LEAVE_TYPES),
        ValidationRule::OneOf("APPROVAL", LEAVE_APPROVALS),
        ValidationRule::PositiveInteger("NO_OF_DAYS"),
        ValidationRule::Required("FROM_DATE"),
        ValidationRule::DateOrder {
            earlier: "FROM_DATE",
            later: "TO_DATE",
        },
    ],
    create_defaults: &[("APPROVAL", "PENDING")],
};

pub static PAYROLL: EntitySchema = EntitySchema {
    kind: EntityKind::Payroll,
    title: "Payroll Records",
    collection: "payroll",
    create_path: "add-payroll",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("P_DATE", "Date", DateField),
        FieldSpec::new("NO_OF_DAYS", "No. of Days Worked", Integer),
        FieldSpec::new("PF", "Provident Fund (PF)", Decimal),
        FieldSpec::new("VA", "Vacation Allowance (VA)", Decimal),
    ],
    key_fields: &["EID", "P_DATE"],
    rules: &[
        ValidationRule::PositiveInteger("EID"),
        ValidationRule::Required("P_DATE"),
        ValidationRule::NonNegativeNumber("NO_OF_DAYS"),
        ValidationRule::NonNegativeNumber("PF"),
        ValidationRule::NonNegativeNumber("VA"),
    ],
    create_defaults: &[],
};

pub static SALARY: EntitySchema = EntitySchema {
    kind: EntityKind::Salary,
    title: "Salary Details",
    collection: "salaries",
    create_path: "add-salary",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("BASIC_SAL", "Basic Salary", Decimal),
        FieldSpec::new("AGP", "AGP", Decimal),
        FieldSpec::new("ESI", "ESI", Decimal),
        FieldSpec::new("LOAN", "Loan", Decimal),
        FieldSpec::new("IT", "Income Tax", Decimal),
        FieldSpec::new("SAL_DATE", "Date", DateField),
    ],
    key_fields: &["EID"],
    rules: &[
        ValidationRule::PositiveInteger("EID"),
        ValidationRule::NonNegativeNumber("BASIC_SAL"),
        ValidationRule::NonNegativeNumber("AGP"),
        ValidationRule::NonNegativeNumber("ESI"),
        ValidationRule::NonNegativeNumber("LOAN"),
        ValidationRule::NonNegativeNumber("IT"),
    ],
    create_defaults: &[],
};

pub static QUALIFICATION: EntitySchema = EntitySchema {
    kind: EntityKind::Qualification,
    title: "Qualification Details",
    collection: "qualifications",
    create_path: "add-qualification",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("INSTITUTION", "Institution", Text),
        FieldSpec::new("PERCENTAGE", "Percentage", Decimal),
        FieldSpec::new("SPECIALIZATION", "Specialization", Text),
        FieldSpec::new("YOG", "Year of Graduation", Integer),
    ],
    key_fields: &["EID", "INSTITUTION"],
    rules: &[
        ValidationRule::PositiveInteger("EID"),
        ValidationRule::Required("INSTITUTION"),
        ValidationRule::Percentage("PERCENTAGE"),
    ],
    create_defaults: &[],
};

pub static FAMILY: EntitySchema = EntitySchema {
    kind: EntityKind::Family,
    title: "Family Details",
    collection: "families",
    create_path: "add-family",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("FNAME", "Family Member Name", Text),
        FieldSpec::new("F_DOB", "Family Member DOB", DateField),
        FieldSpec::new("MNAME", "Mother's Name", Text),
        FieldSpec::new("M_DOB", "Mother's DOB", DateField),
    ],
    key_fields: &["EID"],
    rules: &[
        ValidationRule::PositiveInteger("EID"),
        ValidationRule::AgeBetween {
            field: "F_DOB",
            min_years: 18,
            max_years: 100,
        },
        ValidationRule::AgeBetween {
            field: "M_DOB",
            min_years: 18,
            max_years: 100,
        },
    ],
    create_defaults: &[],
};

pub static ACCOUNT: EntitySchema = EntitySchema {
    kind: EntityKind::Account,
    title: "Employee Accounts",
    collection: "employee-accounts",
    create_path: "add-employee-details",
    fields: &[
        FieldSpec::new("EID", "Employee ID", Integer),
        FieldSpec::new("BIOMETRIC_CARD_NO", "Biometric Card No", Text),
        FieldSpec::new("AADHAR", "Aadhar Number", Text),
        FieldSpec::new("BANK_ACC", "Bank Account Number", Text),
        FieldSpec::new("PAN", "PAN Number", Text),
    ],
    key_fields: &["EID"],
    rules: &[ValidationRule::PositiveInteger("EID")],
    create_defaults: &[],
};

#[cfg(test)]
mod tests {
    use super::{DateForm, EntityKind, FieldKind};
    use crate::date_codec::UNKNOWN_DATE;
    use crate::validation::FieldError;
    use crate::value::{FieldValue, NaturalKey, Record};
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2024, Month::March, 1).expect("valid date")
    }

    #[test]
    fn every_key_field_is_a_declared_field() {
        for kind in EntityKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema.kind, kind);
            assert!(!schema.key_fields.is_empty() && schema.key_fields.len() <= 2);
            for key in schema.key_fields {
                assert!(schema.field(key).is_some(), "{} key {key}", kind.label());
            }
        }
    }

    #[test]
    fn entity_kind_parses_tab_labels() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.label()), Some(kind));
        }
        assert_eq!(EntityKind::parse(" Payroll "), Some(EntityKind::Payroll));
        assert_eq!(EntityKind::parse("vendors"), None);
    }

    #[test]
    fn natural_key_converts_display_dates_to_storage() {
        let schema = EntityKind::Attendance.schema();
        let record = Record::new()
            .with("EID", 7)
            .with("A_DATE", "06-01-2024")
            .with("STATUS", "Absent");
        assert_eq!(
            schema.natural_key(&record, DateForm::Display),
            Some(NaturalKey::new(["7", "2024-01-06"]))
        );
    }

    #[test]
    fn natural_key_missing_when_key_date_unknown() {
        let schema = EntityKind::Attendance.schema();
        let record = Record::new().with("EID", 7).with("A_DATE", UNKNOWN_DATE);
        assert_eq!(schema.natural_key(&record, DateForm::Display), None);
    }

    #[test]
    fn display_and_storage_conversion_touch_only_date_fields() {
        let schema = EntityKind::Employee.schema();
        let stored = Record::new()
            .with("EID", 3)
            .with("FIRSTNAME", "Asha")
            .with("DOB", "1990-04-12T00:00:00.000Z")
            .with("DATE_OF_JOIN", FieldValue::Null);
        let shown = schema.to_display(&stored);
        assert_eq!(shown.display("DOB"), "12-04-1990");
        assert_eq!(shown.display("DATE_OF_JOIN"), UNKNOWN_DATE);
        assert_eq!(shown.display("PPROFEXP_FROM"), UNKNOWN_DATE);
        assert_eq!(shown.display("FIRSTNAME"), "Asha");

        let back = schema.to_storage(&shown);
        assert_eq!(back.display("DOB"), "1990-04-12");
        assert_eq!(back.get("DATE_OF_JOIN"), Some(&FieldValue::Null));
        assert_eq!(back.get("EID"), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn parse_input_types_values_by_kind() {
        let schema = EntityKind::Payroll.schema();
        let days = schema.field("NO_OF_DAYS").expect("field exists");
        assert_eq!(days.parse_input(" 22 "), Ok(FieldValue::Integer(22)));
        assert!(days.parse_input("twenty").is_err());
        let pf = schema.field("PF").expect("field exists");
        assert_eq!(pf.parse_input("1800.5"), Ok(FieldValue::Decimal(1800.5)));
        assert_eq!(pf.parse_input(""), Ok(FieldValue::Null));
        let date = schema.field("P_DATE").expect("field exists");
        assert_eq!(date.kind, FieldKind::Date);
        assert_eq!(date.parse_input("2024-02-29"), Ok(FieldValue::text("2024-02-29")));
    }

    #[test]
    fn employee_rules_catch_join_before_birth() {
        let schema = EntityKind::Employee.schema();
        let mut inputs = schema.inputs_from_display(&Record::new());
        inputs.insert("EID".to_owned(), "4".to_owned());
        inputs.insert("FIRSTNAME".to_owned(), "Ravi".to_owned());
        inputs.insert("DOB".to_owned(), "1995-01-01".to_owned());
        inputs.insert("DATE_OF_JOIN".to_owned(), "1990-01-01".to_owned());
        let errors = schema.validate(schema.fields, &inputs, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "DATE_OF_JOIN");
    }

    #[test]
    fn employee_dates_follow_onboarding_limits() {
        let schema = EntityKind::Employee.schema();
        let base = |dob: &str, joined: &str, exp_to: &str| {
            let mut inputs = schema.inputs_from_display(&Record::new());
            inputs.insert("EID".to_owned(), "4".to_owned());
            inputs.insert("FIRSTNAME".to_owned(), "Ravi".to_owned());
            inputs.insert("DOB".to_owned(), dob.to_owned());
            inputs.insert("DATE_OF_JOIN".to_owned(), joined.to_owned());
            inputs.insert("PPROFEXP_TO".to_owned(), exp_to.to_owned());
            schema.validate(schema.fields, &inputs, today())
        };
        let fields = |errors: Vec<FieldError>| -> Vec<&'static str> {
            errors.iter().map(|error| error.field).collect()
        };

        assert!(base("1990-01-01", "2015-07-01", "2015-06-30").is_empty());
        assert_eq!(fields(base("2010-01-01", "", "")), vec!["DOB"]);
        assert_eq!(fields(base("1920-01-01", "", "")), vec!["DOB"]);
        assert_eq!(fields(base("1990-01-01", "2007-12-31", "")), vec!["DATE_OF_JOIN"]);
        assert_eq!(fields(base("1990-01-01", "2024-03-02", "")), vec!["DATE_OF_JOIN"]);
        assert_eq!(fields(base("1990-01-01", "", "2024-03-02")), vec!["PPROFEXP_TO"]);
    }

    #[test]
    fn family_birth_dates_are_adult_ages() {
        let schema = EntityKind::Family.schema();
        let mut inputs = schema.inputs_from_display(&Record::new());
        inputs.insert("EID".to_owned(), "4".to_owned());
        inputs.insert("F_DOB".to_owned(), "2015-05-05".to_owned());
        inputs.insert("M_DOB".to_owned(), "1960-05-05".to_owned());
        let errors = schema.validate(schema.fields, &inputs, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "F_DOB");

        inputs.insert("F_DOB".to_owned(), "1958-05-05".to_owned());
        inputs.insert("M_DOB".to_owned(), "1900-05-05".to_owned());
        let errors = schema.validate(schema.fields, &inputs, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "M_DOB");
    }

    #[test]
    fn kind_errors_take_precedence_over_rule_errors_for_same_field() {
        let schema = EntityKind::Leave.schema();
        let mut inputs = schema.inputs_from_display(&Record::new());
        inputs.insert("EID".to_owned(), "abc".to_owned());
        inputs.insert("LTYPE".to_owned(), "CL".to_owned());
        inputs.insert("APPROVAL".to_owned(), "PENDING".to_owned());
        inputs.insert("NO_OF_DAYS".to_owned(), "2".to_owned());
        inputs.insert("FROM_DATE".to_owned(), "2024-01-02".to_owned());
        let errors = schema.validate(schema.fields, &inputs, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "EID");
        assert_eq!(errors[0].message, "must be a whole number");
    }
}
