#![forbid(unsafe_code)]

use serde_json::{Value, json};
use sq_catalog::{Catalog, CatalogError, StoredQuestView, SummaryView};
use sq_core::model::StatsRecord;
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("sq_catalog_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn payload(id: &str, xp_each: f64) -> Value {
    json!({
        "sQuestId": id,
        "title": "Quest",
        "description": "A quest used by the analytics tests.",
        "domain": "clarity",
        "archetype": "reflection",
        "isChaos": false,
        "estimatedDurationMinutes": 15,
        "xpAward": {
            "emotion": xp_each,
            "clarity": xp_each,
            "discipline": xp_each,
            "momentum": xp_each
        },
        "tools": {
            "journal": true,
            "survey": false,
            "photoProof": false,
            "locationTracking": false
        },
        "cooldownHours": 48,
        "repeatable": false,
        "engine": { "weight": 1.0 }
    })
}

fn stats(id: &str, presented: i64, accepted: i64, completed: i64) -> StatsRecord {
    StatsRecord {
        s_quest_id: id.to_string(),
        presented,
        accepted,
        completed,
        rating_sum: 0.0,
        rating_count: 0,
        last_presented_at_ms: None,
    }
}

#[test]
fn stats_view_derives_rates_on_read() {
    let mut catalog = Catalog::open(temp_dir("stats_view_rates")).expect("open");
    catalog.create_quest(&payload("quest-a", 5.0), "admin@test").expect("create");

    let fresh = catalog.stats_view("quest-a").expect("view of seeded stats");
    assert_eq!(fresh.acceptance_rate, 0.0);
    assert_eq!(fresh.completion_rate, 0.0);
    assert_eq!(fresh.average_rating, None);

    let mut counters = stats("quest-a", 20, 10, 5);
    counters.rating_sum = 9.0;
    counters.rating_count = 2;
    catalog.record_stats(&counters).expect("record stats");

    let view = catalog.stats_view("quest-a").expect("view");
    assert_eq!(view.acceptance_rate, 0.5);
    assert_eq!(view.completion_rate, 0.25);
    assert_eq!(view.average_rating, Some(4.5));
}

#[test]
fn record_stats_requires_a_known_quest() {
    let mut catalog = Catalog::open(temp_dir("stats_unknown_quest")).expect("open");
    let err = catalog
        .record_stats(&stats("ghost-quest", 1, 0, 0))
        .expect_err("unknown quest must fail");
    assert!(matches!(err, CatalogError::NotFound(id) if id == "ghost-quest"));
}

#[test]
fn rebuild_sums_counters_and_joins_xp_by_quest() {
    let mut catalog = Catalog::open(temp_dir("rebuild_sums")).expect("open");
    // quest-a: total 20 XP per completion; quest-b: total 4.
    catalog.create_quest(&payload("quest-a", 5.0), "admin@test").expect("create a");
    catalog.create_quest(&payload("quest-b", 1.0), "admin@test").expect("create b");
    catalog.record_stats(&stats("quest-a", 100, 60, 30)).expect("stats a");
    catalog.record_stats(&stats("quest-b", 50, 20, 10)).expect("stats b");

    let summary = catalog.rebuild_summary().expect("rebuild");
    assert_eq!(summary.total_presented, 150);
    assert_eq!(summary.total_accepted, 80);
    assert_eq!(summary.total_completed, 40);
    assert_eq!(summary.total_xp_awarded, 30.0 * 20.0 + 10.0 * 4.0);

    let stored = catalog.summary().expect("read").expect("summary exists");
    assert_eq!(stored, summary);
}

#[test]
fn rebuild_overwrites_a_stale_summary() {
    let mut catalog = Catalog::open(temp_dir("rebuild_overwrite")).expect("open");
    catalog.create_quest(&payload("quest-a", 5.0), "admin@test").expect("create");
    catalog.record_stats(&stats("quest-a", 10, 5, 2)).expect("stats");
    let first = catalog.rebuild_summary().expect("first rebuild");
    assert_eq!(first.total_presented, 10);

    catalog.record_stats(&stats("quest-a", 30, 15, 6)).expect("updated stats");
    let second = catalog.rebuild_summary().expect("second rebuild");
    assert_eq!(second.total_presented, 30);
    assert_eq!(second.total_completed, 6);

    let stored = catalog.summary().expect("read").expect("summary exists");
    assert_eq!(stored.total_presented, 30);
}

#[test]
fn rebuild_is_idempotent() {
    let mut catalog = Catalog::open(temp_dir("rebuild_idempotent")).expect("open");
    catalog.create_quest(&payload("quest-a", 5.0), "admin@test").expect("create");
    catalog.record_stats(&stats("quest-a", 12, 6, 3)).expect("stats");

    let first = catalog.rebuild_summary().expect("first");
    let second = catalog.rebuild_summary().expect("second");
    assert_eq!(first.total_presented, second.total_presented);
    assert_eq!(first.total_accepted, second.total_accepted);
    assert_eq!(first.total_completed, second.total_completed);
    assert_eq!(first.total_xp_awarded, second.total_xp_awarded);
}

#[test]
fn config_defaults_then_overlays_partial_updates() {
    let mut catalog = Catalog::open(temp_dir("config_overlay")).expect("open");

    let defaults = catalog.config().expect("defaults");
    assert!(!defaults.chaos_mode_default);
    assert_eq!(defaults.max_rerolls, 3);

    let updated = catalog
        .update_config(&json!({ "maxRerolls": 5, "generationEnabled": true }))
        .expect("update");
    assert_eq!(updated.max_rerolls, 5);
    assert!(updated.generation_enabled);
    assert_eq!(updated.target_chaos_ratio, defaults.target_chaos_ratio);

    let reread = catalog.config().expect("reread");
    assert_eq!(reread, updated);
}

#[test]
fn config_bounds_are_enforced() {
    let mut catalog = Catalog::open(temp_dir("config_bounds")).expect("open");

    let err = catalog
        .update_config(&json!({ "targetChaosRatio": 1.5 }))
        .expect_err("ratio above 1 must fail");
    match err {
        CatalogError::Validation(err) => {
            assert_eq!(err.field, "targetChaosRatio");
            assert_eq!(err.message, "must be at most 1");
        }
        other => panic!("expected a validation error, got {other}"),
    }

    let err = catalog
        .update_config(&json!({ "maxRerolls": 99 }))
        .expect_err("rerolls above 10 must fail");
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[test]
fn views_render_camel_case_with_rfc3339_timestamps() {
    let mut catalog = Catalog::open(temp_dir("views_render")).expect("open");
    let row = catalog
        .create_quest(&payload("quest-a", 5.0), "admin@test")
        .expect("create");

    let view: StoredQuestView = row.into();
    let doc = serde_json::to_value(&view).expect("serialize");
    assert_eq!(doc["sQuestId"], "quest-a");
    assert_eq!(doc["versionCounter"], 1);
    assert_eq!(doc["createdBy"], "admin@test");
    assert!(doc["createdAt"].as_str().expect("createdAt").ends_with('Z'));

    catalog.record_stats(&stats("quest-a", 4, 2, 1)).expect("stats");
    let summary = catalog.rebuild_summary().expect("rebuild");
    let view: SummaryView = summary.into();
    let doc = serde_json::to_value(&view).expect("serialize");
    assert_eq!(doc["totalPresented"], 4);
    assert!(doc["rebuiltAt"].as_str().expect("rebuiltAt").ends_with('Z'));
}
