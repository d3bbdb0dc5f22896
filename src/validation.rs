//! Field-level validation for the console's create/edit forms.
//!
//! Every rule runs before a form is submitted, so an invalid form never
//! reaches the network. Failures are collected per field rather than
//! stopping at the first one, matching the inline messages the forms show.

use std::collections::BTreeMap;
use std::fmt;

use jiff::civil::Date;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConsoleError, Result};
use crate::types::{Absence, Appointment, Availability, Clinic, Doctor, ShiftTime};

// ============================================================================
// Constants
// ============================================================================

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_REASON_LENGTH: usize = 250;
pub const MAX_EXPERIENCE_YEARS: u32 = 60;
pub const MAX_FEES: u32 = 100_000;
pub const MAX_PATIENTS_PER_SHIFT: u32 = 200;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
});
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid regex"));

// ============================================================================
// Error collection
// ============================================================================

/// Per-field messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field is kept.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A form that can be checked before submission.
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), ValidationErrors>;
}

/// Gate a submission on `form` being valid.
pub fn ensure_valid<F: Validate>(form: &F) -> Result<()> {
    form.validate().map_err(ConsoleError::Validation)
}

// ============================================================================
// Field rules
// ============================================================================

fn required(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
        return false;
    }
    true
}

fn name_field(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) {
    if required(errors, field, label, value) && value.trim().chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!("{label} must be at most {MAX_NAME_LENGTH} characters"),
        );
    }
}

fn phone_field(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if required(errors, field, "Phone number", value) && !PHONE_RE.is_match(value.trim()) {
        errors.add(field, "Phone number must be 10 digits");
    }
}

fn email_field(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if !EMAIL_RE.is_match(value.trim()) {
        errors.add(field, "Enter a valid email address");
    }
}

fn shift_field(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if required(errors, field, "Shift", value) && value.parse::<ShiftTime>().is_err() {
        errors.add(
            field,
            "Shift must be one of MORNING, AFTERNOON, EVENING, NIGHT",
        );
    }
}

fn time_field(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) -> bool {
    if !required(errors, field, label, value) {
        return false;
    }
    if !TIME_RE.is_match(value.trim()) {
        errors.add(field, format!("{label} must be in HH:MM format"));
        return false;
    }
    true
}

fn date_field(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &str,
) -> Option<Date> {
    if !required(errors, field, label, value) {
        return None;
    }
    match value.trim().parse::<Date>() {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, format!("{label} must be a date (YYYY-MM-DD)"));
            None
        }
    }
}

// ============================================================================
// Forms
// ============================================================================

impl Validate for Clinic {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        name_field(&mut errors, "name", "Clinic name", &self.name);
        required(&mut errors, "address", "Address", &self.address);
        phone_field(&mut errors, "phone", &self.phone);
        if required(&mut errors, "pincode", "Pincode", &self.pincode)
            && !PINCODE_RE.is_match(self.pincode.trim())
        {
            errors.add("pincode", "Pincode must be 6 digits");
        }
        if let Some(email) = self.email.as_deref()
            && !email.trim().is_empty()
        {
            email_field(&mut errors, "email", email);
        }
        errors.into_result()
    }
}

impl Validate for Doctor {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        name_field(&mut errors, "name", "Doctor name", &self.name);
        required(
            &mut errors,
            "specialization",
            "Specialization",
            &self.specialization,
        );
        phone_field(&mut errors, "phone", &self.phone);
        if required(&mut errors, "email", "Email", &self.email) {
            email_field(&mut errors, "email", &self.email);
        }
        if self.experience > MAX_EXPERIENCE_YEARS {
            errors.add(
                "experience",
                format!("Experience must be between 0 and {MAX_EXPERIENCE_YEARS} years"),
            );
        }
        if self.fees > MAX_FEES {
            errors.add("fees", format!("Fees must be between 0 and {MAX_FEES}"));
        }
        for slot in &self.availability {
            if slot.validate().is_err() {
                errors.add("availability", "One or more availability slots are invalid");
                break;
            }
        }
        errors.into_result()
    }
}

impl Validate for Availability {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        shift_field(&mut errors, "shiftTime", &self.shift_time);
        let start_ok = time_field(&mut errors, "startTime", "Start time", &self.start_time);
        let end_ok = time_field(&mut errors, "endTime", "End time", &self.end_time);
        // Zero-padded HH:MM strings order the same as the times they denote.
        if start_ok && end_ok && self.start_time.trim() >= self.end_time.trim() {
            errors.add("endTime", "End time must be after start time");
        }
        if self.max_patients == 0 || self.max_patients > MAX_PATIENTS_PER_SHIFT {
            errors.add(
                "maxPatients",
                format!("Max patients must be between 1 and {MAX_PATIENTS_PER_SHIFT}"),
            );
        }
        errors.into_result()
    }
}

impl Validate for Absence {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "doctorId", "Doctor", &self.doctor_id);
        let from = date_field(&mut errors, "fromDate", "From date", &self.from_date);
        let to = date_field(&mut errors, "toDate", "To date", &self.to_date);
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            errors.add("toDate", "To date cannot be before from date");
        }
        if let Some(reason) = self.reason.as_deref()
            && reason.chars().count() > MAX_REASON_LENGTH
        {
            errors.add(
                "reason",
                format!("Reason must be at most {MAX_REASON_LENGTH} characters"),
            );
        }
        errors.into_result()
    }
}

impl Validate for Appointment {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        name_field(&mut errors, "patientName", "Patient name", &self.patient_name);
        phone_field(&mut errors, "patientPhone", &self.patient_phone);
        required(&mut errors, "doctorId", "Doctor", &self.doctor_id);
        required(&mut errors, "clinicId", "Clinic", &self.clinic_id);
        shift_field(&mut errors, "shiftTime", &self.shift_time);
        errors.into_result()
    }
}
