//! Comparator-based sorting for queue entries.
//!
//! Sorting is stable: entries with equal keys keep their relative order from
//! the input. A field missing from a record sorts as the lowest value, so it
//! comes first ascending and last descending.

use std::cmp::Ordering;

use crate::error::ConsoleError;
use crate::types::QueueEntry;

/// Column a queue table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    #[default]
    PatientName,
    DoctorName,
    ShiftTime,
    QueueNo,
    PatientPhoneNumber,
    PatientReached,
    Time,
}

impl SortField {
    /// All valid string representations of this enum.
    pub const ALL_STRINGS: &[&str] = &[
        "id",
        "patientName",
        "doctorName",
        "shiftTime",
        "queueNo",
        "patientPhoneNumber",
        "patientReached",
        "time",
    ];
}

enum_display_fromstr!(
    SortField,
    ConsoleError::InvalidSortField,
    {
        Id => "id",
        PatientName => "patientName",
        DoctorName => "doctorName",
        ShiftTime => "shiftTime",
        QueueNo => "queueNo",
        PatientPhoneNumber => "patientPhoneNumber",
        PatientReached => "patientReached",
        Time => "time",
    }
);

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flip(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

enum_display_fromstr!(
    SortOrder,
    ConsoleError::InvalidSortOrder,
    {
        Asc => "asc",
        Desc => "desc",
    }
);

/// Comparable projection of one field of an entry.
///
/// Variant order matters: `Missing` sorts below every present value, and
/// numbers sort below text when a field mixes both (only ids can).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Missing,
    Number(i64),
    Text(&'a str),
}

fn text_key(value: Option<&str>) -> SortKey<'_> {
    value.map_or(SortKey::Missing, SortKey::Text)
}

/// Extract the key `field` contributes to ordering.
///
/// Ids that are numeric compare numerically so "9" sorts before "10".
/// Text compares by code point, which keeps the order case-sensitive.
pub fn sort_key(entry: &QueueEntry, field: SortField) -> SortKey<'_> {
    match field {
        SortField::Id => match entry.id.as_number() {
            Some(n) => SortKey::Number(n),
            None if entry.id.as_str().is_empty() => SortKey::Missing,
            None => SortKey::Text(entry.id.as_str()),
        },
        SortField::PatientName => text_key(entry.patient_name.as_deref()),
        SortField::DoctorName => text_key(entry.doctor_name.as_deref()),
        SortField::ShiftTime => entry
            .shift_time
            .map_or(SortKey::Missing, |shift| SortKey::Number(shift as i64)),
        SortField::QueueNo => entry.queue_no.map_or(SortKey::Missing, SortKey::Number),
        SortField::PatientPhoneNumber => text_key(entry.patient_phone_number.as_deref()),
        SortField::PatientReached => SortKey::Number(i64::from(entry.patient_reached)),
        SortField::Time => text_key(entry.time.as_deref()),
    }
}

/// Compare two entries on `field`, honouring `order`.
pub fn compare_entries(
    a: &QueueEntry,
    b: &QueueEntry,
    field: SortField,
    order: SortOrder,
) -> Ordering {
    let ordering = sort_key(a, field).cmp(&sort_key(b, field));
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Sort entries in place. `slice::sort_by` is stable, which the table relies
/// on for equal keys.
pub fn sort_entries(entries: &mut [&QueueEntry], field: SortField, order: SortOrder) {
    entries.sort_by(|a, b| compare_entries(a, b, field, order));
}
