use clap::{Args, Parser, Subcommand};

use crate::query::{SortField, SortOrder};

#[derive(Parser)]
#[command(name = "clinic-console")]
#[command(about = "Clinic management console")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by commands that print records
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the issued token
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Show the signed-in user
    Whoami {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List the patient queue, or act on an entry
    #[command(visible_alias = "q")]
    Queue {
        #[command(subcommand)]
        action: Option<QueueAction>,

        #[command(flatten)]
        list: QueueListArgs,
    },

    /// List doctors
    Doctors {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List clinics (admin only)
    Clinics {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List doctor absences
    Absences {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Record a doctor absence
    Absence {
        #[command(subcommand)]
        action: AbsenceAction,
    },

    /// Book appointments
    Appointment {
        #[command(subcommand)]
        action: AppointmentAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Serve the console assets and proxy API requests
    Serve {
        /// Address to listen on (e.g. 0.0.0.0:3000)
        #[arg(long)]
        listen: Option<String>,

        /// Directory holding the built console and index.html
        #[arg(long)]
        static_dir: Option<std::path::PathBuf>,

        /// API base URL requests are forwarded to
        #[arg(long)]
        upstream: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct QueueListArgs {
    /// Show the queue of one doctor
    #[arg(long)]
    pub doctor: Option<String>,

    /// Clinic of the doctor (defaults to the signed-in user's clinic)
    #[arg(long, requires = "doctor")]
    pub clinic: Option<String>,

    /// Case-insensitive patient name filter
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Sort column: id, patientName, doctorName, shiftTime, queueNo,
    /// patientPhoneNumber, patientReached, time
    #[arg(short, long, default_value = "patientName")]
    pub sort: SortField,

    /// Sort direction: asc or desc
    #[arg(short, long, default_value = "asc")]
    pub order: SortOrder,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page: 5, 10 or 25 (default from config)
    #[arg(long)]
    pub rows: Option<usize>,

    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Subcommand)]
pub enum QueueAction {
    /// Mark the patient as reached
    Reached {
        /// Queue entry ID
        id: String,
    },

    /// Skip the entry (removes it from the queue)
    Skip {
        /// Queue entry ID
        id: String,
    },

    /// Cancel the entry
    Cancel {
        /// Queue entry ID
        id: String,
    },

    /// Mark the visit as done
    Done {
        /// Queue entry ID
        id: String,
    },

    /// Delete several entries at once
    Delete {
        /// Queue entry IDs
        ids: Vec<String>,

        /// Also select every entry of this patient (repeatable)
        #[arg(long = "patient")]
        patients: Vec<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// List the doctors the queue can be filtered by
    Doctors {
        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum AbsenceAction {
    /// Add an absence period
    Add {
        /// Doctor ID
        #[arg(long)]
        doctor: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Reason shown to staff
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AppointmentAction {
    /// Book a patient into a doctor's shift
    Book {
        /// Patient name
        #[arg(long)]
        patient: String,

        /// Patient phone number (10 digits)
        #[arg(long)]
        phone: String,

        /// Doctor ID
        #[arg(long)]
        doctor: String,

        /// Clinic ID (defaults to the signed-in user's clinic)
        #[arg(long)]
        clinic: Option<String>,

        /// Shift: MORNING, AFTERNOON, EVENING or NIGHT
        #[arg(long)]
        shift: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Print one configuration value
    Get {
        /// Configuration key (e.g. queue.rows_per_page)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. api_base_url)
        key: String,

        /// New value
        value: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}
