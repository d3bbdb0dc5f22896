mod config;
mod directory;
mod queue;
mod serve;
mod session;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use directory::{cmd_absence_add, cmd_absences, cmd_appointment_book, cmd_clinics, cmd_doctors};
pub use queue::{cmd_queue_action, cmd_queue_delete, cmd_queue_doctors, cmd_queue_ls};
pub use serve::cmd_serve;
pub use session::{cmd_login, cmd_logout, cmd_whoami};

use serde_json::Value;

use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{ConsoleError, Result};
use crate::remote::HttpClient;
use crate::session::Session;

/// Result of a command, printable as JSON or as text.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print as JSON when requested or when no text form exists.
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Client and validated session for the stored token.
async fn open_session(config: &Config) -> Result<(HttpClient, Session)> {
    let client = HttpClient::from_config(config)?;
    let token = config.token().ok_or(ConsoleError::NotLoggedIn)?;
    let session = Session::restore(&client, token).await?;
    Ok((client.for_session(&session), session))
}
