// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod memory;

pub use memory::MemoryGateway;

use hrdesk_app::date_codec::format_storage_date;
use hrdesk_app::{ATTENDANCE_STATUSES, EntityKind, LEAVE_APPROVALS, LEAVE_TYPES, Record};
use std::collections::BTreeMap;
use time::{Date, Duration, Month, Weekday};

const FIRST_NAMES: [&str; 16] = [
    "Asha", "Ravi", "Meera", "Arjun", "Kavya", "Vikram", "Nisha", "Rahul", "Divya", "Karthik",
    "Lakshmi", "Suresh", "Priya", "Anand", "Deepa", "Naveen",
];
const LAST_NAMES: [&str; 14] = [
    "Iyer", "Reddy", "Nair", "Sharma", "Patel", "Menon", "Rao", "Pillai", "Gupta", "Das",
    "Kumar", "Bose", "Joshi", "Verma",
];
const INITIALS: [&str; 8] = ["A", "K", "M", "R", "S", "T", "V", "N"];

const DESIGNATIONS: [&str; 8] = [
    "Professor",
    "Associate Professor",
    "Assistant Professor",
    "Lab Assistant",
    "Accountant",
    "Librarian",
    "Clerk",
    "Registrar",
];
const EMPLOYEE_TYPES: [&str; 3] = ["Teaching", "Non-Teaching", "Contract"];

const DEPARTMENTS: [&str; 8] = [
    "Computer Science",
    "Mechanical",
    "Electrical",
    "Civil",
    "Physics",
    "Mathematics",
    "Administration",
    "Library",
];

const CITIES: [(&str, &str); 10] = [
    ("Chennai", "Tamil Nadu"),
    ("Coimbatore", "Tamil Nadu"),
    ("Bengaluru", "Karnataka"),
    ("Mysuru", "Karnataka"),
    ("Kochi", "Kerala"),
    ("Thiruvananthapuram", "Kerala"),
    ("Hyderabad", "Telangana"),
    ("Pune", "Maharashtra"),
    ("Mumbai", "Maharashtra"),
    ("Ahmedabad", "Gujarat"),
];

const INSTITUTIONS: [&str; 8] = [
    "Anna University",
    "IIT Madras",
    "NIT Trichy",
    "University of Mysore",
    "Osmania University",
    "University of Pune",
    "Cochin University",
    "Gujarat University",
];
const SPECIALIZATIONS: [&str; 8] = [
    "Computer Science",
    "Thermodynamics",
    "Power Systems",
    "Structural Engineering",
    "Applied Physics",
    "Pure Mathematics",
    "Commerce",
    "Library Science",
];

/// SplitMix64. The same seed yields the same stream on every platform.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Index in `0..len`; zero for empty and single-element ranges.
    fn index(&mut self, len: usize) -> usize {
        match len {
            0 | 1 => 0,
            len => (self.next() % len as u64) as usize,
        }
    }

    /// Inclusive on both ends.
    fn between(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max.abs_diff(min) + 1;
        min.wrapping_add((self.next() % span) as i64)
    }
}

/// Deterministic staff records, all in storage form.
pub struct StaffFaker {
    rng: SplitMix64,
    seed: u64,
}

impl StaffFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: SplitMix64(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn department(&mut self, did: i64) -> Record {
        let name = DEPARTMENTS[(did as usize).saturating_sub(1) % DEPARTMENTS.len()];
        Record::new()
            .with("DID", did)
            .with("DNAME", name)
            .with("DHEAD", self.full_name())
    }

    pub fn employee(&mut self, eid: i64, did: i64) -> Record {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let (city, state) = CITIES[self.rng.index(CITIES.len())];
        let dob = self.date_between(ymd(1965, Month::January, 1), ymd(1996, Month::December, 31));
        let joined = dob
            .checked_add(Duration::days(self.int_range(22 * 365, 26 * 365)))
            .unwrap_or(dob);
        let experience_from = dob + Duration::days(21 * 365);
        Record::new()
            .with("EID", eid)
            .with("INITIAL", self.pick(&INITIALS))
            .with("FIRSTNAME", first)
            .with("MIDDLENAME", "")
            .with("LASTNAME", last)
            .with("DESIGNATION", self.pick(&DESIGNATIONS))
            .with("DOB", format_storage_date(dob))
            .with("DATE_OF_JOIN", format_storage_date(joined))
            .with("FTYPE", self.pick(&EMPLOYEE_TYPES))
            .with("NATIONALITY", "Indian")
            .with("PHONE", format!("9{:09}", self.int_range(0, 999_999_999)))
            .with(
                "EMAIL",
                format!("{}.{}@example.edu", first.to_lowercase(), last.to_lowercase()),
            )
            .with("CASTE", "General")
            .with("DOORNO", self.int_range(1, 240).to_string())
            .with("CITY", city)
            .with("STATE", state)
            .with("PINCODE", self.int_range(110_001, 695_615).to_string())
            .with("GENDER", if self.rng.index(2) == 0 { "F" } else { "M" })
            .with("PROFEXP_DESIGNATION", "Lecturer")
            .with("PPROFEXP_FROM", format_storage_date(experience_from))
            .with("PPROFEXP_TO", format_storage_date(joined))
            .with("LEAVE_ML", self.int_range(0, 10))
            .with("LEAVE_LOP", self.int_range(0, 5))
            .with("LEAVE_RH", self.int_range(0, 3))
            .with("LEAVE_OOD", self.int_range(0, 6))
            .with("LEAVE_CL", self.int_range(0, 12))
            .with("DID", did)
    }

    pub fn attendance(&mut self, eid: i64, date: Date) -> Record {
        let status = self.pick(ATTENDANCE_STATUSES);
        let record = Record::new()
            .with("EID", eid)
            .with("A_DATE", format_storage_date(date))
            .with("STATUS", status);
        if status == "Present" {
            let login = self.int_range(8, 10);
            let logout = self.int_range(16, 18);
            record
                .with("LOGIN", format!("{login:02}:{:02}", self.int_range(0, 59)))
                .with("LOGOUT", format!("{logout:02}:{:02}", self.int_range(0, 59)))
        } else {
            record.with("LOGIN", "").with("LOGOUT", "")
        }
    }

    pub fn leave(&mut self, eid: i64, from: Date) -> Record {
        let days = self.int_range(1, 5);
        Record::new()
            .with("EID", eid)
            .with("LTYPE", self.pick(LEAVE_TYPES))
            .with("APPROVAL", self.pick(LEAVE_APPROVALS))
            .with("NO_OF_DAYS", days)
            .with("FROM_DATE", format_storage_date(from))
            .with("TO_DATE", format_storage_date(from + Duration::days(days - 1)))
    }

    pub fn payroll(&mut self, eid: i64, date: Date) -> Record {
        Record::new()
            .with("EID", eid)
            .with("P_DATE", format_storage_date(date))
            .with("NO_OF_DAYS", self.int_range(18, 26))
            .with("PF", self.money(1_200, 4_800))
            .with("VA", self.money(0, 2_500))
    }

    pub fn salary(&mut self, eid: i64, date: Date) -> Record {
        Record::new()
            .with("EID", eid)
            .with("BASIC_SAL", self.money(25_000, 140_000))
            .with("AGP", self.money(6_000, 10_000))
            .with("ESI", self.money(0, 1_200))
            .with("LOAN", self.money(0, 20_000))
            .with("IT", self.money(0, 18_000))
            .with("SAL_DATE", format_storage_date(date))
    }

    pub fn qualification(&mut self, eid: i64) -> Record {
        Record::new()
            .with("EID", eid)
            .with("INSTITUTION", self.pick(&INSTITUTIONS))
            .with("PERCENTAGE", self.int_range(550, 980) as f64 / 10.0)
            .with("SPECIALIZATION", self.pick(&SPECIALIZATIONS))
            .with("YOG", self.int_range(1985, 2020))
    }

    pub fn family(&mut self, eid: i64) -> Record {
        let member_dob =
            self.date_between(ymd(1950, Month::January, 1), ymd(1985, Month::December, 31));
        let mother_dob =
            self.date_between(ymd(1940, Month::January, 1), ymd(1970, Month::December, 31));
        Record::new()
            .with("EID", eid)
            .with("FNAME", self.full_name())
            .with("F_DOB", format_storage_date(member_dob))
            .with("MNAME", self.full_name())
            .with("M_DOB", format_storage_date(mother_dob))
    }

    pub fn account(&mut self, eid: i64) -> Record {
        Record::new()
            .with("EID", eid)
            .with("BIOMETRIC_CARD_NO", format!("BIO{:05}", eid))
            .with("AADHAR", format!("{:012}", self.int_range(100_000_000_000, 999_999_999_999)))
            .with("BANK_ACC", format!("{:011}", self.int_range(10_000_000_000, 99_999_999_999)))
            .with("PAN", self.pan())
    }

    /// A small, internally consistent organization: departments, employees
    /// and a fortnight of attendance, payroll and leave ending at
    /// [`fixture_today`].
    pub fn organization(&mut self, employees: usize) -> BTreeMap<EntityKind, Vec<Record>> {
        let mut tables: BTreeMap<EntityKind, Vec<Record>> = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, Vec::new()))
            .collect();
        let department_count = employees.div_ceil(4).clamp(1, DEPARTMENTS.len());
        for did in 1..=department_count as i64 {
            push(&mut tables, EntityKind::Department, self.department(did));
        }
        let today = fixture_today();
        let days: Vec<Date> = (0..14)
            .map(|back| today - Duration::days(back))
            .filter(|date| !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday))
            .collect();
        for index in 0..employees {
            let eid = index as i64 + 1;
            let did = (index % department_count) as i64 + 1;
            push(&mut tables, EntityKind::Employee, self.employee(eid, did));
            for date in &days {
                push(&mut tables, EntityKind::Attendance, self.attendance(eid, *date));
            }
            let leave_start = today + Duration::days(self.int_range(3, 40));
            push(&mut tables, EntityKind::Leave, self.leave(eid, leave_start));
            let month_start = ymd(today.year(), today.month(), 1);
            push(&mut tables, EntityKind::Payroll, self.payroll(eid, month_start));
            push(&mut tables, EntityKind::Salary, self.salary(eid, month_start));
            push(&mut tables, EntityKind::Qualification, self.qualification(eid));
            push(&mut tables, EntityKind::Family, self.family(eid));
            push(&mut tables, EntityKind::Account, self.account(eid));
        }
        tables
    }

    fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    fn pan(&mut self) -> String {
        let letters: String = (0..5)
            .map(|_| char::from(b'A' + self.rng.index(26) as u8))
            .collect();
        format!("{letters}{:04}{}", self.int_range(0, 9999), char::from(b'A' + self.rng.index(26) as u8))
    }

    fn money(&mut self, min: i64, max: i64) -> f64 {
        self.int_range(min * 100, max * 100) as f64 / 100.0
    }

    fn date_between(&mut self, start: Date, end: Date) -> Date {
        let span = (end - start).whole_days();
        start + Duration::days(self.int_range(0, span))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.index(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        self.rng.between(min, max)
    }
}

/// Fixed "today" the fixtures are generated around.
pub fn fixture_today() -> Date {
    ymd(2024, Month::June, 28)
}

fn push(tables: &mut BTreeMap<EntityKind, Vec<Record>>, kind: EntityKind, record: Record) {
    tables.entry(kind).or_default().push(record);
}

fn ymd(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN)
}
