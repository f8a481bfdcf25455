//! Detection history: persistence, date filtering and export.

mod entry;
mod export;
pub(crate) mod query;
mod store;

pub use entry::HistoryEntry;
pub use export::{export, export_file_name};
pub use query::{date_range, filter_by_date};
pub use store::HistoryStore;
