//! `reqwest` implementation of the clinic API client.
//!
//! Every data endpoint requires the bearer token; a client built without one
//! fails those calls with [`ConsoleError::NotLoggedIn`] before any network
//! I/O. Only `/auth/login` goes out unauthenticated. Form submissions are
//! validated locally first and never sent when invalid.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ConsoleError, Result};
use crate::session::{Session, UserProfile};
use crate::types::{
    Absence, Appointment, Availability, Clinic, Doctor, DoctorOption, EntryId, QueueEntry,
};
use crate::validation::ensure_valid;

use super::{ApiError, AuthApi, QueueApi, QueueSource, RowAction};

pub struct HttpClient {
    client: Client,
    base: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim())?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            token: None,
        })
    }

    /// Client for the configured API, carrying the configured token if any.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(&config.api_base_url(), config.request_timeout())?;
        Ok(match config.token() {
            Some(token) => client.with_token(token),
            None => client,
        })
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Client acting for a validated session.
    pub fn for_session(&self, session: &Session) -> Self {
        Self {
            client: self.client.clone(),
            base: self.base.clone(),
            token: Some(SecretString::from(session.bearer().expose_secret().to_string())),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_ref().ok_or(ConsoleError::NotLoggedIn)?;
        let url = self.url(path)?;
        debug!(%method, %url, "api request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token.expose_secret()))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_body(status, &body);
        if error.is_server_error() {
            warn!(%status, message = %error.message, "api server error");
        }
        Err(error.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path)?.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path)?.json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn put_empty(&self, path: &str) -> Result<()> {
        let response = self.request(Method::PUT, path)?.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    // Clinics

    pub async fn list_clinics(&self) -> Result<Vec<Clinic>> {
        self.get_json("/api/clinic").await
    }

    pub async fn get_clinic(&self, id: &EntryId) -> Result<Clinic> {
        self.get_json(&format!("/api/clinic/{id}")).await
    }

    pub async fn create_clinic(&self, clinic: &Clinic) -> Result<Clinic> {
        ensure_valid(clinic)?;
        self.send_json(Method::POST, "/api/clinic", clinic).await
    }

    pub async fn update_clinic(&self, id: &EntryId, clinic: &Clinic) -> Result<Clinic> {
        ensure_valid(clinic)?;
        self.send_json(Method::PUT, &format!("/api/clinic/{id}"), clinic)
            .await
    }

    // Doctors

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.get_json("/api/doctor").await
    }

    pub async fn get_doctor(&self, id: &EntryId) -> Result<Doctor> {
        self.get_json(&format!("/api/doctor/{id}")).await
    }

    pub async fn create_doctor(&self, doctor: &Doctor) -> Result<Doctor> {
        ensure_valid(doctor)?;
        self.send_json(Method::POST, "/api/doctor", doctor).await
    }

    pub async fn update_doctor(&self, id: &EntryId, doctor: &Doctor) -> Result<Doctor> {
        ensure_valid(doctor)?;
        self.send_json(Method::PUT, &format!("/api/doctor/{id}"), doctor)
            .await
    }

    pub async fn set_availability(
        &self,
        doctor_id: &EntryId,
        slots: &[Availability],
    ) -> Result<Doctor> {
        for slot in slots {
            ensure_valid(slot)?;
        }
        self.send_json(
            Method::POST,
            &format!("/api/doctor/{doctor_id}/availability"),
            slots,
        )
        .await
    }

    // Absences and appointments

    pub async fn list_absences(&self) -> Result<Vec<Absence>> {
        self.get_json("/api/doctor-absence").await
    }

    pub async fn create_absence(&self, absence: &Absence) -> Result<Absence> {
        ensure_valid(absence)?;
        self.send_json(Method::POST, "/api/doctor-absence", absence)
            .await
    }

    pub async fn create_appointment(&self, appointment: &Appointment) -> Result<QueueEntry> {
        ensure_valid(appointment)?;
        self.send_json(Method::POST, "/api/appointment", appointment)
            .await
    }
}

impl QueueApi for HttpClient {
    async fn queue_details(&self, source: &QueueSource) -> Result<Vec<QueueEntry>> {
        self.get_json(&source.path()).await
    }

    async fn apply_action(&self, action: RowAction, id: &EntryId) -> Result<()> {
        self.put_empty(&action.path(id)).await
    }

    async fn doctor_options(&self) -> Result<Vec<DoctorOption>> {
        self.get_json("/api/doctor-clinic").await
    }
}

#[derive(serde::Deserialize)]
struct LoginResponse {
    token: String,
}

impl AuthApi for HttpClient {
    async fn login(&self, username: &str, password: &SecretString) -> Result<SecretString> {
        let url = self.url("/auth/login")?;
        debug!(%url, username, "login request");
        let response = self
            .client
            .post(url)
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;
        let body: LoginResponse = Self::check(response).await?.json().await?;
        Ok(SecretString::from(body.token))
    }

    async fn validate(&self, token: &SecretString) -> Result<UserProfile> {
        let url = self.url("/auth/validate")?;
        debug!(%url, "token validation request");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
