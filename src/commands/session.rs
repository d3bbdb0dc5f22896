//! Sign-in commands.

use std::io::{self, BufRead};

use owo_colors::OwoColorize;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use super::{CommandOutput, open_session};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::Result;
use crate::remote::HttpClient;
use crate::session::{Route, Session};

fn read_password() -> Result<SecretString> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Sign in and persist the token
pub async fn cmd_login(username: &str, password: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    let password = match password {
        Some(p) => SecretString::from(p),
        None => read_password()?,
    };

    let client = HttpClient::new(&config.api_base_url(), config.request_timeout())?;
    let session = Session::login(&client, username, &password).await?;

    config.set_token(session.bearer().expose_secret().to_string());
    config.save()?;

    println!(
        "Logged in as {} ({})",
        session.user().username.cyan(),
        session.role()
    );
    Ok(())
}

/// Forget the stored token
pub async fn cmd_logout() -> Result<()> {
    let mut config = Config::load()?;
    if config.stored_token().is_none() {
        println!("Not logged in");
        return Ok(());
    }

    // Validate first so the user is named; a dead token is cleared anyway
    let client = HttpClient::from_config(&config)?;
    let restored = match config.token() {
        Some(token) => Session::restore(&client, token).await.ok(),
        None => None,
    };
    let next = match restored {
        Some(session) => session.logout(&mut config),
        None => {
            config.clear_token();
            Route::Login
        }
    };
    config.save()?;

    println!("Logged out {}", format!("(redirect: {})", next.path()).dimmed());
    Ok(())
}

/// Show the signed-in user
pub async fn cmd_whoami(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (_, session) = open_session(&config).await?;
    let user = session.user();

    let clinic = user
        .clinic_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "all".to_string());

    CommandOutput::new(json!({
        "username": user.username,
        "role": user.role,
        "clinicId": user.clinic_id,
        "api": config.api_base_url(),
    }))
    .with_text(format!(
        "{} ({})\nclinic: {}\napi: {}",
        user.username.cyan(),
        user.role,
        clinic,
        config.api_base_url().dimmed()
    ))
    .print(output)
}
