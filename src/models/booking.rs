use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::PricingTable;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 13;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCounts {
    pub adult: u32,
    pub student: u32,
    pub child: u32,
}

impl TicketCounts {
    pub fn is_empty(&self) -> bool {
        self.adult == 0 && self.student == 0 && self.child == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Phone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRecord {
    pub adult_tickets: u32,
    pub student_tickets: u32,
    pub child_tickets: u32,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub visit_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    // derived from the counts, whatever the client echoes back
    #[serde(skip_deserializing)]
    pub total_amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_ref: Option<String>,
}

impl BookingRecord {
    pub fn rehydrate(mut self, pricing: &PricingTable) -> Self {
        for field in [&mut self.name, &mut self.email, &mut self.phone, &mut self.booking_ref] {
            if field.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self.recompute_total(pricing);
        self
    }

    pub fn counts(&self) -> TicketCounts {
        TicketCounts {
            adult: self.adult_tickets,
            student: self.student_tickets,
            child: self.child_tickets,
        }
    }

    pub fn set_counts(&mut self, counts: TicketCounts, pricing: &PricingTable) {
        self.adult_tickets = counts.adult;
        self.student_tickets = counts.student;
        self.child_tickets = counts.child;
        self.recompute_total(pricing);
    }

    pub fn recompute_total(&mut self, pricing: &PricingTable) {
        self.total_amount = pricing.compute_total(&self.counts());
    }

    pub fn missing_contact(&self) -> Option<ContactField> {
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Some(ContactField::Name);
        }
        if !self.email.as_deref().is_some_and(is_valid_email) {
            return Some(ContactField::Email);
        }
        if !self.phone.as_deref().is_some_and(is_valid_phone) {
            return Some(ContactField::Phone);
        }
        None
    }

    pub fn issuance_gaps(&self) -> Vec<&'static str> {
        let mut gaps = Vec::new();
        if self.counts().is_empty() {
            gaps.push("ticket counts");
        }
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            gaps.push("name");
        }
        if !self.email.as_deref().is_some_and(is_valid_email) {
            gaps.push("email");
        }
        if !self.phone.as_deref().is_some_and(is_valid_phone) {
            gaps.push("phone");
        }
        if self.visit_date.is_none() {
            gaps.push("visit date");
        }
        gaps
    }
}

// An echoed date that is blank, malformed or not a string counts as absent.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn phone_digits(phone: &str) -> Option<String> {
    let mut digits = String::new();
    for c in phone.trim().chars() {
        match c {
            '0'..='9' => digits.push(c),
            '+' | ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }
    Some(digits)
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_digits(phone)
        .is_some_and(|d| (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&d.len()))
}
