//! Terminal rendering of the queue table.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::query::PageView;
use crate::types::{Doctor, QueueEntry};

/// One rendered queue row
#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Queue No")]
    queue_no: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Shift")]
    shift: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Reached")]
    reached: String,
    #[tabled(rename = "Time")]
    time: String,
}

fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("-").to_string()
}

pub fn format_reached(reached: bool) -> String {
    if reached {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

fn queue_row(entry: &QueueEntry) -> QueueRow {
    QueueRow {
        id: entry.id.to_string(),
        queue_no: entry
            .queue_no
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string()),
        patient: text(&entry.patient_name),
        doctor: text(&entry.doctor_name),
        shift: entry
            .shift_time
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        phone: text(&entry.patient_phone_number),
        reached: format_reached(entry.patient_reached),
        time: text(&entry.time),
    }
}

/// "Rows x–y of n" footer, one-based and inclusive.
pub fn format_footer(view: &PageView<'_>) -> String {
    let range = view.range();
    if range.is_empty() {
        format!("Rows 0 of {}", view.total_matching())
    } else {
        format!(
            "Rows {}–{} of {}",
            range.start + 1,
            range.end,
            view.total_matching()
        )
    }
}

/// Render the visible page, or the not-found / empty message.
pub fn format_queue_table(view: &PageView<'_>, filter_name: &str) -> String {
    if view.not_found() {
        return format!(
            "{}\nNo results found for \"{}\". Try checking for typos or using complete words.",
            "Not found".yellow().bold(),
            filter_name
        );
    }
    if view.total_matching() == 0 {
        return "The queue is empty.".dimmed().to_string();
    }

    let rows: Vec<QueueRow> = view.rows().iter().map(|entry| queue_row(entry)).collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{table}\n{}", format_footer(view).dimmed())
}

#[derive(Tabled)]
struct DoctorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Specialization")]
    specialization: String,
    #[tabled(rename = "Experience")]
    experience: u32,
    #[tabled(rename = "Fees")]
    fees: u32,
    #[tabled(rename = "Shifts")]
    shifts: String,
}

pub fn format_doctor_table(doctors: &[Doctor]) -> String {
    let rows: Vec<DoctorRow> = doctors
        .iter()
        .map(|d| DoctorRow {
            id: d.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            name: d.name.clone(),
            specialization: d.specialization.clone(),
            experience: d.experience,
            fees: d.fees,
            shifts: d
                .availability
                .iter()
                .map(|a| a.shift_time.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{self, FilterSortState};
    use crate::types::EntryId;

    fn entries(n: i64) -> Vec<QueueEntry> {
        (1..=n)
            .map(|i| QueueEntry {
                id: EntryId::from(i),
                patient_name: Some(format!("Patient {i}")),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_footer_is_one_based() {
        let entries = entries(7);
        let mut state = FilterSortState::new(5);
        state.set_page(1);
        let view = query::apply(&entries, &state);
        assert_eq!(format_footer(&view), "Rows 6–7 of 7");
    }

    #[test]
    fn test_not_found_message() {
        let entries = entries(3);
        let mut state = FilterSortState::default();
        state.set_filter_name("zzz");
        let view = query::apply(&entries, &state);
        let out = format_queue_table(&view, "zzz");
        assert!(out.contains("No results found for \"zzz\""));
    }

    #[test]
    fn test_table_lists_page_rows_only() {
        let entries = entries(7);
        let state = FilterSortState::new(5);
        let view = query::apply(&entries, &state);
        let out = format_queue_table(&view, "");
        assert!(out.contains("Patient 5"));
        assert!(!out.contains("Patient 6"));
    }
}
