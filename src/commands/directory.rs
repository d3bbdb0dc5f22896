//! Clinic, doctor, absence, and appointment commands.

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, open_session};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::format_doctor_table;
use crate::error::{ConsoleError, Result};
use crate::session::Route;
use crate::types::{Absence, Appointment, EntryId};

#[derive(Tabled)]
struct ClinicRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Pincode")]
    pincode: String,
}

#[derive(Tabled)]
struct AbsenceRow {
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn id_text(id: &Option<EntryId>) -> String {
    id.as_ref().map(|id| id.to_string()).unwrap_or_default()
}

pub async fn cmd_doctors(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (client, session) = open_session(&config).await?;
    session.require(Route::Doctors)?;

    let doctors = client.list_doctors().await?;
    let text = if doctors.is_empty() {
        "No doctors found.".to_string()
    } else {
        format!(
            "{}\n\n{} doctor(s)",
            format_doctor_table(&doctors),
            doctors.len()
        )
    };

    CommandOutput::new(json!(doctors)).with_text(text).print(output)
}

pub async fn cmd_clinics(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (client, session) = open_session(&config).await?;
    session.require(Route::Clinics)?;

    let clinics = client.list_clinics().await?;
    let rows: Vec<ClinicRow> = clinics
        .iter()
        .map(|c| ClinicRow {
            id: id_text(&c.id),
            name: c.name.clone(),
            address: c.address.clone(),
            phone: c.phone.clone(),
            pincode: c.pincode.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());

    CommandOutput::new(json!(clinics))
        .with_text(format!("{table}\n\n{} clinic(s)", clinics.len()))
        .print(output)
}

pub async fn cmd_absences(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (client, session) = open_session(&config).await?;
    session.require(Route::Absences)?;

    let absences = client.list_absences().await?;
    let rows: Vec<AbsenceRow> = absences
        .iter()
        .map(|a| AbsenceRow {
            doctor: a.doctor_id.clone(),
            from: a.from_date.clone(),
            to: a.to_date.clone(),
            reason: a.reason.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());

    CommandOutput::new(json!(absences))
        .with_text(table.to_string())
        .print(output)
}

/// Record an absence. The form is validated before anything is sent.
pub async fn cmd_absence_add(
    doctor: &str,
    from: &str,
    to: &str,
    reason: Option<String>,
) -> Result<()> {
    let config = Config::load()?;
    let (client, session) = open_session(&config).await?;
    session.require(Route::Absences)?;

    let absence = Absence {
        id: None,
        doctor_id: doctor.trim().to_string(),
        from_date: from.trim().to_string(),
        to_date: to.trim().to_string(),
        reason,
    };
    let created = client.create_absence(&absence).await?;

    println!(
        "Recorded absence {} for doctor {} ({} to {})",
        id_text(&created.id).cyan(),
        created.doctor_id,
        created.from_date,
        created.to_date
    );
    Ok(())
}

pub async fn cmd_appointment_book(
    patient: &str,
    phone: &str,
    doctor: &str,
    clinic: Option<&str>,
    shift: &str,
) -> Result<()> {
    let config = Config::load()?;
    let (client, session) = open_session(&config).await?;
    session.require(Route::Appointments)?;

    let clinic_id = match clinic {
        Some(c) => c.trim().to_string(),
        None => session
            .clinic_scope()
            .map(|id| id.to_string())
            .ok_or_else(|| ConsoleError::Other("--clinic is required".to_string()))?,
    };

    let appointment = Appointment {
        patient_name: patient.trim().to_string(),
        patient_phone: phone.trim().to_string(),
        doctor_id: doctor.trim().to_string(),
        clinic_id,
        shift_time: shift.trim().to_ascii_uppercase(),
    };
    let entry = client.create_appointment(&appointment).await?;

    let queue_no = entry
        .queue_no
        .map(|n| format!(" as #{n}"))
        .unwrap_or_default();
    println!(
        "Booked {}{} (entry {})",
        appointment.patient_name.cyan(),
        queue_no,
        entry.id
    );
    Ok(())
}
