use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use clinic_console::cli::{
    AbsenceAction, AppointmentAction, Cli, Commands, ConfigAction, QueueAction,
};
use clinic_console::commands::{
    cmd_absence_add, cmd_absences, cmd_appointment_book, cmd_clinics, cmd_config_get,
    cmd_config_set, cmd_config_show, cmd_doctors, cmd_login, cmd_logout, cmd_queue_action,
    cmd_queue_delete, cmd_queue_doctors, cmd_queue_ls, cmd_serve, cmd_whoami,
};
use clinic_console::remote::RowAction;

fn init_tracing(serving: bool) {
    let default = if serving { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Serve { .. }));

    let result = match cli.command {
        Commands::Login { username, password } => cmd_login(&username, password).await,
        Commands::Logout => cmd_logout().await,
        Commands::Whoami { output } => cmd_whoami(output).await,

        Commands::Queue { action, list } => match action {
            None => cmd_queue_ls(list).await,
            Some(QueueAction::Reached { id }) => cmd_queue_action(RowAction::MarkReached, &id).await,
            Some(QueueAction::Skip { id }) => cmd_queue_action(RowAction::Skip, &id).await,
            Some(QueueAction::Cancel { id }) => cmd_queue_action(RowAction::Cancel, &id).await,
            Some(QueueAction::Done { id }) => cmd_queue_action(RowAction::VisitDone, &id).await,
            Some(QueueAction::Delete {
                ids,
                patients,
                output,
            }) => cmd_queue_delete(&ids, &patients, output).await,
            Some(QueueAction::Doctors { output }) => cmd_queue_doctors(output).await,
        },

        Commands::Doctors { output } => cmd_doctors(output).await,
        Commands::Clinics { output } => cmd_clinics(output).await,
        Commands::Absences { output } => cmd_absences(output).await,
        Commands::Absence { action } => match action {
            AbsenceAction::Add {
                doctor,
                from,
                to,
                reason,
            } => cmd_absence_add(&doctor, &from, &to, reason).await,
        },
        Commands::Appointment { action } => match action {
            AppointmentAction::Book {
                patient,
                phone,
                doctor,
                clinic,
                shift,
            } => cmd_appointment_book(&patient, &phone, &doctor, clinic.as_deref(), &shift).await,
        },

        Commands::Config { action } => match action {
            ConfigAction::Show { output } => cmd_config_show(output),
            ConfigAction::Get { key } => cmd_config_get(&key),
            ConfigAction::Set { key, value, output } => cmd_config_set(&key, &value, output),
        },

        Commands::Serve {
            listen,
            static_dir,
            upstream,
        } => cmd_serve(listen, static_dir, upstream).await,
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
