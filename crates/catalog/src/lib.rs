#![forbid(unsafe_code)]

mod analytics;
mod config;
mod error;
mod lifecycle;
mod views;

pub use error::CatalogError;
pub use lifecycle::Catalog;
pub use views::{StoredQuestView, SummaryView};

pub use sq_core::metrics::StatsView;
pub use sq_core::normalize_quest;
pub use sq_storage::QuestRow;
