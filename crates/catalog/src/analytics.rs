#![forbid(unsafe_code)]

use crate::error::CatalogError;
use crate::lifecycle::Catalog;
use sq_core::model::AnalyticsSummary;
use sq_storage::SUMMARY_KEY;

impl Catalog {
    /// Full recompute of the aggregate summary from every stats row. XP is
    /// accumulated by joining each row to its quest record; rows whose
    /// quest no longer exists still contribute their counters. Overwrites
    /// the summary document whole, so readers never see a partial update,
    /// and is idempotent by construction.
    pub fn rebuild_summary(&mut self) -> Result<AnalyticsSummary, CatalogError> {
        let stats = self.store.scan_stats()?;

        let mut total_presented = 0i64;
        let mut total_accepted = 0i64;
        let mut total_completed = 0i64;
        let mut total_xp_awarded = 0f64;
        for row in &stats {
            total_presented += row.presented;
            total_accepted += row.accepted;
            total_completed += row.completed;
            if row.completed > 0
                && let Some(quest) = self.store.get_quest(&row.s_quest_id)?
            {
                total_xp_awarded += row.completed as f64 * quest.record.xp_award.total;
            }
        }

        let summary = AnalyticsSummary {
            total_presented,
            total_accepted,
            total_completed,
            total_xp_awarded,
            rebuilt_at_ms: sq_storage::now_ms(),
        };
        let doc = serde_json::to_value(&summary)?;
        self.store.write_singleton(SUMMARY_KEY, &doc)?;
        Ok(summary)
    }

    pub fn summary(&self) -> Result<Option<AnalyticsSummary>, CatalogError> {
        match self.store.read_singleton(SUMMARY_KEY)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }
}
