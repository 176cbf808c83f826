#![forbid(unsafe_code)]

pub mod error;
pub mod fields;
pub mod ids;
pub mod metrics;
pub mod model;
pub mod normalize;

pub use error::ValidationError;
pub use ids::{QuestId, QuestIdError};
pub use normalize::normalize_quest;
