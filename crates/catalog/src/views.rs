#![forbid(unsafe_code)]

use serde::Serialize;
use sq_core::model::{AnalyticsSummary, QuestRecord};
use sq_storage::QuestRow;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Response shape for a stored quest: the canonical record plus version
/// counter and audit metadata, timestamps rendered RFC 3339.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuestView {
    #[serde(flatten)]
    pub record: QuestRecord,
    pub version_counter: i64,
    pub created_at: String,
    pub created_by: String,
    pub updated_at: String,
    pub updated_by: String,
}

impl From<QuestRow> for StoredQuestView {
    fn from(row: QuestRow) -> Self {
        Self {
            record: row.record,
            version_counter: row.version,
            created_at: rfc3339(row.created_at_ms),
            created_by: row.created_by,
            updated_at: rfc3339(row.updated_at_ms),
            updated_by: row.updated_by,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
    pub rebuilt_at: String,
}

impl From<AnalyticsSummary> for SummaryView {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            rebuilt_at: rfc3339(summary.rebuilt_at_ms),
            summary,
        }
    }
}

fn rfc3339(ts_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts_ms) * 1_000_000)
        .ok()
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_default()
}
