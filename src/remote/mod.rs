//! Client side of the clinic REST API.
//!
//! The queue and auth endpoints sit behind traits so the action controller,
//! the queue store, and the session can run against in-memory fakes. The
//! [`HttpClient`] implements both over `reqwest` and also carries the
//! clinic, doctor, absence, and appointment endpoints used by the forms.

pub mod error;
pub mod http;

use std::fmt;
use std::future::Future;

use secrecy::SecretString;

use crate::error::{ConsoleError, Result};
use crate::session::UserProfile;
use crate::types::{DoctorOption, EntryId, QueueEntry};

pub use error::ApiError;
pub use http::HttpClient;

/// Which queue the table shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueueSource {
    /// `GET /api/queue/details`
    #[default]
    All,
    /// `GET /api/queue/details/{clinicId}/{doctorId}`
    Doctor { clinic_id: EntryId, doctor_id: EntryId },
}

impl QueueSource {
    pub fn path(&self) -> String {
        match self {
            QueueSource::All => "/api/queue/details".to_string(),
            QueueSource::Doctor {
                clinic_id,
                doctor_id,
            } => format!("/api/queue/details/{clinic_id}/{doctor_id}"),
        }
    }
}

/// Contextual action on one queue row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    MarkReached,
    /// Soft-deletes the entry. Bulk delete issues this per id.
    Skip,
    Cancel,
    VisitDone,
}

impl RowAction {
    pub const ALL: [RowAction; 4] = [
        RowAction::MarkReached,
        RowAction::Skip,
        RowAction::Cancel,
        RowAction::VisitDone,
    ];

    /// `PUT` endpoint the action is sent to.
    pub fn path(self, id: &EntryId) -> String {
        match self {
            RowAction::MarkReached => format!("/api/queue/patientReached/{id}"),
            RowAction::Skip => format!("/api/queue/patientDelete/{id}"),
            RowAction::Cancel => format!("/api/queue/cancel/{id}"),
            RowAction::VisitDone => format!("/api/queue/visitDone/{id}"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RowAction::MarkReached => "Patient reached",
            RowAction::Skip => "Skip",
            RowAction::Cancel => "Cancel",
            RowAction::VisitDone => "Visit done",
        }
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowAction::MarkReached => "reached",
            RowAction::Skip => "skip",
            RowAction::Cancel => "cancel",
            RowAction::VisitDone => "done",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for RowAction {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reached" | "patient-reached" => Ok(RowAction::MarkReached),
            "skip" | "delete" => Ok(RowAction::Skip),
            "cancel" => Ok(RowAction::Cancel),
            "done" | "visit-done" => Ok(RowAction::VisitDone),
            _ => Err(ConsoleError::InvalidAction(s.to_string())),
        }
    }
}

/// Queue endpoints consumed by the queue view.
pub trait QueueApi: Send + Sync {
    /// Fetch the raw queue for `source`.
    fn queue_details(
        &self,
        source: &QueueSource,
    ) -> impl Future<Output = Result<Vec<QueueEntry>>> + Send;

    /// Issue the mutation for `action` on entry `id`.
    fn apply_action(
        &self,
        action: RowAction,
        id: &EntryId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Doctors for the selector above the queue.
    fn doctor_options(&self) -> impl Future<Output = Result<Vec<DoctorOption>>> + Send;
}

/// Login and token validation.
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<SecretString>> + Send;

    /// Resolve a token to the user it was issued for.
    fn validate(&self, token: &SecretString) -> impl Future<Output = Result<UserProfile>> + Send;
}
