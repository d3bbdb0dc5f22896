//! The signed-in user's session.
//!
//! A [`Session`] only exists once the API has validated its token, so any
//! code holding one can issue authenticated requests. It is created by
//! [`Session::login`] or [`Session::restore`] and torn down by
//! [`Session::logout`]; nothing global refers to it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::error::{ConsoleError, Result};
use crate::remote::{AuthApi, QueueSource};
use crate::types::EntryId;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    ClinicAdmin,
    Staff,
}

enum_display_fromstr!(
    Role,
    ConsoleError::InvalidRole,
    {
        Admin => "ADMIN",
        ClinicAdmin => "CLINIC_ADMIN",
        Staff => "STAFF",
    }
);

/// Identity returned by the token validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub role: Role,
    /// Clinic the user is confined to. Absent for users who see every clinic.
    #[serde(default)]
    pub clinic_id: Option<EntryId>,
}

/// Console views that are access-controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Clinics,
    Doctors,
    Absences,
    Queue,
    Appointments,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Clinics => "/dashboard/clinics",
            Route::Doctors => "/dashboard/doctors",
            Route::Absences => "/dashboard/absences",
            Route::Queue => "/dashboard/queue",
            Route::Appointments => "/dashboard/appointments",
        }
    }
}

#[derive(Debug)]
pub struct Session {
    token: SecretString,
    user: UserProfile,
}

impl Session {
    /// Sign in with credentials, then validate the issued token.
    pub async fn login<A: AuthApi>(
        auth: &A,
        username: &str,
        password: &SecretString,
    ) -> Result<Self> {
        let mut errors = ValidationErrors::new();
        if username.trim().is_empty() {
            errors.add("username", "Username is required");
        }
        if password.expose_secret().is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()?;

        let token = auth.login(username.trim(), password).await?;
        Self::restore(auth, token).await
    }

    /// Rebuild a session from a stored token. The token is always checked
    /// against the API; a rejected token yields `Unauthorized`.
    pub async fn restore<A: AuthApi>(auth: &A, token: SecretString) -> Result<Self> {
        if token.expose_secret().trim().is_empty() {
            return Err(ConsoleError::NotLoggedIn);
        }

        let user = auth.validate(&token).await?;
        info!(user = %user.username, role = %user.role, "session validated");
        Ok(Self { token, user })
    }

    pub fn bearer(&self) -> &SecretString {
        &self.token
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn clinic_scope(&self) -> Option<&EntryId> {
        self.user.clinic_id.as_ref()
    }

    /// Clinic management is admin-only; every other view is open to any
    /// signed-in user.
    pub fn can_access(&self, route: Route) -> bool {
        match route {
            Route::Clinics => self.user.role == Role::Admin,
            _ => true,
        }
    }

    pub fn require(&self, route: Route) -> Result<()> {
        if self.can_access(route) {
            Ok(())
        } else {
            Err(ConsoleError::Unauthorized(format!(
                "{} cannot open {}",
                self.user.role,
                route.path()
            )))
        }
    }

    /// Queue source for the doctor selector. `clinic` overrides the
    /// session's own clinic scope.
    pub fn doctor_queue(&self, doctor_id: EntryId, clinic: Option<EntryId>) -> Result<QueueSource> {
        let clinic_id = clinic
            .or_else(|| self.clinic_scope().cloned())
            .ok_or_else(|| {
                ConsoleError::Other(
                    "a clinic is required to filter the queue by doctor".to_string(),
                )
            })?;
        Ok(QueueSource::Doctor {
            clinic_id,
            doctor_id,
        })
    }

    /// End the session: forget the stored token and send the user to the
    /// login view.
    pub fn logout(self, config: &mut Config) -> Route {
        info!(user = %self.user.username, "logged out");
        config.clear_token();
        Route::Login
    }
}
