pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod types;

pub use api::{ApiConnection, HttpTicketSource, TicketSource};
pub use cache::TicketCache;
pub use config::Config;
pub use error::{CheckError, Result};
pub use export::{search_export_name, DownloadOutcome, ExportBridge};
pub use filter::{
    group_by_day, matches_date, matches_text, DayBucket, DayKey, FilterController, FilterMode,
    FilterReport, FilterState,
};
pub use types::Ticket;
