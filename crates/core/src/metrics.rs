#![forbid(unsafe_code)]

use crate::model::StatsRecord;
use serde::Serialize;

/// Pure derivations over raw counters. Recomputed on every read; never
/// trusted from stored input.
pub fn xp_total(emotion: f64, clarity: f64, discipline: f64, momentum: f64) -> f64 {
    emotion + clarity + discipline + momentum
}

pub fn acceptance_rate(presented: i64, accepted: i64) -> f64 {
    if presented > 0 {
        accepted as f64 / presented as f64
    } else {
        0.0
    }
}

pub fn completion_rate(presented: i64, completed: i64) -> f64 {
    if presented > 0 {
        completed as f64 / presented as f64
    } else {
        0.0
    }
}

/// `None` when unrated. Zero would falsely imply a rating of zero.
pub fn average_rating(rating_sum: f64, rating_count: i64) -> Option<f64> {
    if rating_count > 0 {
        Some(rating_sum / rating_count as f64)
    } else {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    #[serde(flatten)]
    pub record: StatsRecord,
    pub acceptance_rate: f64,
    pub completion_rate: f64,
    pub average_rating: Option<f64>,
}

pub fn stats_view(record: StatsRecord) -> StatsView {
    StatsView {
        acceptance_rate: acceptance_rate(record.presented, record.accepted),
        completion_rate: completion_rate(record.presented, record.completed),
        average_rating: average_rating(record.rating_sum, record.rating_count),
        record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_presented_yields_zero_rates_and_no_rating() {
        let view = stats_view(StatsRecord::zeroed("q1"));
        assert_eq!(view.acceptance_rate, 0.0);
        assert_eq!(view.completion_rate, 0.0);
        assert_eq!(view.average_rating, None);
    }

    #[test]
    fn rates_stay_in_unit_interval() {
        let record = StatsRecord {
            s_quest_id: "q1".to_string(),
            presented: 10,
            accepted: 7,
            completed: 4,
            rating_sum: 18.0,
            rating_count: 4,
            last_presented_at_ms: Some(1_700_000_000_000),
        };
        let view = stats_view(record);
        assert!((0.0..=1.0).contains(&view.acceptance_rate));
        assert!((0.0..=1.0).contains(&view.completion_rate));
        assert_eq!(view.acceptance_rate, 0.7);
        assert_eq!(view.completion_rate, 0.4);
        assert_eq!(view.average_rating, Some(4.5));
    }

    #[test]
    fn derivation_is_idempotent() {
        let record = StatsRecord {
            s_quest_id: "q1".to_string(),
            presented: 3,
            accepted: 2,
            completed: 1,
            rating_sum: 9.0,
            rating_count: 3,
            last_presented_at_ms: None,
        };
        let first = stats_view(record.clone());
        let second = stats_view(record);
        assert_eq!(first, second);
    }

    #[test]
    fn average_rating_serializes_null_when_unrated() {
        let view = stats_view(StatsRecord::zeroed("q1"));
        let doc = serde_json::to_value(&view).expect("serialize");
        assert!(doc["averageRating"].is_null());
        assert_eq!(doc["acceptanceRate"], 0.0);
    }

    #[test]
    fn xp_total_is_the_component_sum() {
        assert_eq!(xp_total(5.0, 5.0, 5.0, 5.0), 20.0);
        assert_eq!(xp_total(0.0, 0.0, 0.0, 0.0), 0.0);
    }
}
