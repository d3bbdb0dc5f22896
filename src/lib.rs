#[macro_use]
mod macros;

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod query;
pub mod queue;
pub mod remote;
pub mod selection;
pub mod server;
pub mod session;
pub mod types;
pub mod validation;

pub use actions::{BulkDeleteReport, MutationOutcome, Refresh, RowActionController};
pub use config::Config;
pub use error::{ConsoleError, Result};
pub use query::{FilterSortState, PageView, SortField, SortOrder};
pub use queue::{QueueScreen, QueueStore};
pub use remote::{ApiError, AuthApi, HttpClient, QueueApi, QueueSource, RowAction};
pub use selection::{SelectAllScope, SelectionKey, SelectionSet, SelectionState};
pub use session::{Role, Route, Session, UserProfile};
pub use types::{EntryId, QueueEntry, ShiftTime};
