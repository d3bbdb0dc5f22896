//! Records exchanged with the clinic API.
//!
//! Field names follow the API's camelCase JSON. Queue fields the server may
//! omit are optional so a sparse record still loads and sorts predictably.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConsoleError;

/// Server-assigned record identity.
///
/// The API hands out numeric ids on some resources and string ids on others,
/// so both are accepted and kept in their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, when it is one.
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for EntryId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => EntryId(n.to_string()),
            RawId::Text(s) => EntryId(s),
        })
    }
}

/// Coarse time-of-day bucket for queues and doctor availability.
///
/// Variant order is chronological and is the order used when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

enum_display_fromstr!(
    ShiftTime,
    ConsoleError::InvalidShift,
    {
        Morning => "MORNING",
        Afternoon => "AFTERNOON",
        Evening => "EVENING",
        Night => "NIGHT",
    }
);

/// One patient's place in a doctor's queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: EntryId,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub shift_time: Option<ShiftTime>,
    /// Display ordering hint from the server; not authoritative.
    #[serde(default)]
    pub queue_no: Option<i64>,
    #[serde(default)]
    pub patient_phone_number: Option<String>,
    #[serde(default, with = "reached_flag")]
    pub patient_reached: bool,
    #[serde(default)]
    pub time: Option<String>,
}

/// `patientReached` travels as the strings `"true"`/`"false"`.
mod reached_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Text(String),
        }

        Ok(match Option::<Flag>::deserialize(deserializer)? {
            Some(Flag::Bool(b)) => b,
            Some(Flag::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
            None => false,
        })
    }
}

/// Entry of the doctor selector above the queue table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorOption {
    pub doctor_id: EntryId,
    pub doctor_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: String,
    /// Years of practice.
    pub experience: u32,
    /// Consultation fee in whole currency units.
    pub fees: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability: Vec<Availability>,
}

/// A shift a doctor is available for. Times are `HH:MM`, 24-hour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub shift_time: String,
    pub start_time: String,
    pub end_time: String,
    pub max_patients: u32,
}

/// A period during which a doctor does not see patients. Dates are ISO 8601.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub doctor_id: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor_id: String,
    pub clinic_id: String,
    pub shift_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_entry_from_api_json() {
        let json = r#"{
            "id": 42,
            "patientName": "Alice",
            "doctorName": "Dr. Rao",
            "shiftTime": "MORNING",
            "queueNo": 3,
            "patientPhoneNumber": "9876543210",
            "patientReached": "true",
            "time": "09:40 AM"
        }"#;

        let entry: QueueEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, EntryId::from(42));
        assert_eq!(entry.patient_name.as_deref(), Some("Alice"));
        assert_eq!(entry.shift_time, Some(ShiftTime::Morning));
        assert_eq!(entry.queue_no, Some(3));
        assert!(entry.patient_reached);
    }

    #[test]
    fn test_queue_entry_sparse_record() {
        let entry: QueueEntry = serde_json::from_str(r#"{"id": "q-7"}"#).unwrap();
        assert_eq!(entry.id.as_str(), "q-7");
        assert_eq!(entry.patient_name, None);
        assert_eq!(entry.shift_time, None);
        assert!(!entry.patient_reached);
    }

    #[test]
    fn test_patient_reached_accepts_bool_and_null() {
        let entry: QueueEntry =
            serde_json::from_str(r#"{"id": 1, "patientReached": true}"#).unwrap();
        assert!(entry.patient_reached);

        let entry: QueueEntry =
            serde_json::from_str(r#"{"id": 1, "patientReached": null}"#).unwrap();
        assert!(!entry.patient_reached);

        let entry: QueueEntry =
            serde_json::from_str(r#"{"id": 1, "patientReached": "false"}"#).unwrap();
        assert!(!entry.patient_reached);
    }

    #[test]
    fn test_patient_reached_serializes_as_string() {
        let entry = QueueEntry {
            id: EntryId::from(5),
            patient_reached: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["patientReached"], "true");
        assert_eq!(value["id"], "5");
    }

    #[test]
    fn test_shift_time_parse_and_display() {
        assert_eq!("morning".parse::<ShiftTime>().unwrap(), ShiftTime::Morning);
        assert_eq!("NIGHT".parse::<ShiftTime>().unwrap(), ShiftTime::Night);
        assert_eq!(ShiftTime::Evening.to_string(), "EVENING");
        assert!("noon".parse::<ShiftTime>().is_err());
    }

    #[test]
    fn test_shift_time_chronological_order() {
        assert!(ShiftTime::Morning < ShiftTime::Afternoon);
        assert!(ShiftTime::Evening < ShiftTime::Night);
    }

    #[test]
    fn test_entry_id_number() {
        assert_eq!(EntryId::from("17").as_number(), Some(17));
        assert_eq!(EntryId::from("abc").as_number(), None);
    }

    #[test]
    fn test_doctor_option_from_json() {
        let options: Vec<DoctorOption> =
            serde_json::from_str(r#"[{"doctorId": 3, "doctorName": "Dr. Mehta"}]"#).unwrap();
        assert_eq!(options[0].doctor_id, EntryId::from(3));
        assert_eq!(options[0].doctor_name, "Dr. Mehta");
    }
}
