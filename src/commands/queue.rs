//! Queue commands: list the queue and act on its entries.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, open_session};
use crate::cli::{OutputOptions, QueueListArgs};
use crate::config::Config;
use crate::display::format_queue_table;
use crate::error::{ConsoleError, Result};
use crate::query::ROWS_PER_PAGE_OPTIONS;
use crate::queue::QueueScreen;
use crate::remote::{HttpClient, QueueApi, QueueSource, RowAction};
use crate::session::{Route, Session};
use crate::types::{EntryId, QueueEntry};

async fn queue_screen(
    config: &Config,
    source: Option<(&str, Option<&str>)>,
) -> Result<QueueScreen<HttpClient>> {
    let (client, session) = open_session(config).await?;
    session.require(Route::Queue)?;
    let source = resolve_source(&session, source)?;
    Ok(QueueScreen::new(Arc::new(client), source, &config.queue))
}

fn resolve_source(session: &Session, doctor: Option<(&str, Option<&str>)>) -> Result<QueueSource> {
    match doctor {
        Some((doctor, clinic)) => {
            session.doctor_queue(EntryId::new(doctor), clinic.map(EntryId::new))
        }
        None => Ok(QueueSource::All),
    }
}

/// List the queue through the filter, sort, and page pipeline
pub async fn cmd_queue_ls(args: QueueListArgs) -> Result<()> {
    let config = Config::load()?;

    let rows = args.rows.unwrap_or(config.queue.rows_per_page);
    if !ROWS_PER_PAGE_OPTIONS.contains(&rows) {
        return Err(ConsoleError::Config(format!(
            "--rows must be one of {ROWS_PER_PAGE_OPTIONS:?}, got {rows}"
        )));
    }
    if args.page == 0 {
        return Err(ConsoleError::Config("--page starts at 1".to_string()));
    }

    let doctor = args
        .doctor
        .as_deref()
        .map(|d| (d, args.clinic.as_deref()));
    let mut screen = queue_screen(&config, doctor).await?;
    screen.load().await?;

    let state = screen.state_mut();
    state.set_rows_per_page(rows);
    state.set_filter_name(args.filter.as_str());
    state.order_by = args.sort;
    state.order = args.order;
    state.set_page(args.page - 1);

    let entries = screen.store().snapshot();
    let view = screen.view(&entries);

    CommandOutput::new(json!({
        "page": args.page,
        "rowsPerPage": rows,
        "total": view.total_matching(),
        "notFound": view.not_found(),
        "emptyRows": view.empty_rows(),
        "rows": view.rows(),
    }))
    .with_text(format_queue_table(&view, &args.filter))
    .print(args.output)
}

/// Apply one row action and refresh the queue
pub async fn cmd_queue_action(action: RowAction, id: &str) -> Result<()> {
    let config = Config::load()?;
    let screen = queue_screen(&config, None).await?;
    let id = EntryId::new(id);

    screen.perform(action, &id).await?;

    println!("{} {}: {}", "✓".green(), id.cyan(), action.label());
    Ok(())
}

/// Entries to delete. An explicit id names exactly one entry; a patient
/// name goes through the row selection, so it follows `queue.selection_key`.
fn delete_targets<A: QueueApi>(
    screen: &mut QueueScreen<A>,
    entries: &[QueueEntry],
    ids: &[String],
    patients: &[String],
) -> Result<Vec<EntryId>> {
    let mut targets: Vec<EntryId> = Vec::new();
    for id in ids {
        let entry = entries
            .iter()
            .find(|e| e.id.as_str() == id.as_str())
            .ok_or_else(|| ConsoleError::Other(format!("no queue entry with ID '{id}'")))?;
        if !targets.contains(&entry.id) {
            targets.push(entry.id.clone());
        }
    }

    for patient in patients {
        let entry = entries
            .iter()
            .find(|e| e.patient_name.as_deref() == Some(patient.as_str()))
            .ok_or_else(|| ConsoleError::Other(format!("no queue entry for patient '{patient}'")))?;
        screen.select_row(entry);
    }
    for id in screen.selected_ids(entries) {
        if !targets.contains(&id) {
            targets.push(id);
        }
    }
    Ok(targets)
}

/// Soft-delete several entries, selected by id or by patient name
pub async fn cmd_queue_delete(
    ids: &[String],
    patients: &[String],
    output: OutputOptions,
) -> Result<()> {
    if ids.is_empty() && patients.is_empty() {
        return Err(ConsoleError::Other(
            "nothing to delete: pass entry IDs or --patient".to_string(),
        ));
    }

    let config = Config::load()?;
    let mut screen = queue_screen(&config, None).await?;
    screen.load().await?;
    let entries = screen.store().snapshot();

    let targets = delete_targets(&mut screen, &entries, ids, patients)?;
    let report = screen.bulk_delete(&targets).await;

    let mut text = String::new();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => text.push_str(&format!("{} {}\n", "✓".green(), outcome.id.cyan())),
            Err(e) => text.push_str(&format!("{} {}: {}\n", "✗".red(), outcome.id.cyan(), e)),
        }
    }
    if let Err(e) = &report.refresh {
        text.push_str(&format!("{} queue refresh failed: {e}\n", "!".yellow()));
    }

    let failed: Vec<String> = report.failed().map(|o| o.id.to_string()).collect();
    CommandOutput::new(json!({
        "action": "bulk_delete",
        "deleted": report.succeeded().collect::<Vec<_>>(),
        "failed": failed,
        "refreshed": report.refresh.is_ok(),
    }))
    .with_text(text.trim_end().to_string())
    .print(output)?;

    if failed.is_empty() {
        Ok(())
    } else {
        Err(ConsoleError::Other(format!(
            "{} of {} deletes failed",
            failed.len(),
            report.outcomes.len()
        )))
    }
}

/// List the doctors the queue can be narrowed to
pub async fn cmd_queue_doctors(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (client, _session) = open_session(&config).await?;
    let doctors = client.doctor_options().await?;

    let text = if doctors.is_empty() {
        "No doctors available.".dimmed().to_string()
    } else {
        doctors
            .iter()
            .map(|d| format!("{:8} {}", d.doctor_id.to_string().cyan(), d.doctor_name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandOutput::new(json!(doctors)).with_text(text).print(output)
}
