#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub const DOMAINS: &[&str] = &[
    "clarity",
    "emotion",
    "discipline",
    "momentum",
    "connection",
    "courage",
];

pub const ARCHETYPES: &[&str] = &[
    "reflection",
    "action",
    "social",
    "creative",
    "chaos",
    "ritual",
];

pub const MAX_TAGS: usize = 16;
pub const MAX_LIST_ITEMS: usize = 64;
pub const MIN_DURATION_MINUTES: i64 = 1;
pub const MAX_DURATION_MINUTES: i64 = 240;
pub const MIN_COOLDOWN_HOURS: i64 = 1;
pub const MAX_COOLDOWN_HOURS: i64 = 168;
pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;

/// Four-component reward. `total` is always the computed sum; a total
/// supplied by a client is ignored, never trusted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub emotion: f64,
    pub clarity: f64,
    pub discipline: f64,
    pub momentum: f64,
    pub total: f64,
}

impl XpAward {
    pub fn from_components(emotion: f64, clarity: f64, discipline: f64, momentum: f64) -> Self {
        Self {
            emotion,
            clarity,
            discipline,
            momentum,
            total: crate::metrics::xp_total(emotion, clarity, discipline, momentum),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsConfig {
    pub journal: bool,
    pub survey: bool,
    pub photo_proof: bool,
    pub location_tracking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompts: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// `requires_daily_quest_completed` is server-enforced: the normalizer
/// forces it to `true` whatever the caller supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prerequisites {
    pub requires_daily_quest_completed: bool,
    pub audience_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Canonical catalog entry. Serialized camelCase so the stored document is
/// the exact shape the mobile runtime reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRecord {
    pub s_quest_id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub archetype: String,
    pub is_chaos: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i64>,
    pub estimated_duration_minutes: i64,
    pub xp_award: XpAward,
    pub tools: ToolsConfig,
    pub tags: Vec<String>,
    pub cooldown_hours: i64,
    pub repeatable: bool,
    pub prerequisites: Prerequisites,
    pub engine: EngineSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRefs>,
    pub is_active: bool,
}

/// Raw usage counters for one quest. Never edited by the admin surface;
/// incremented by product events and read/derived here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub s_quest_id: String,
    pub presented: i64,
    pub accepted: i64,
    pub completed: i64,
    pub rating_sum: f64,
    pub rating_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_presented_at_ms: Option<i64>,
}

impl StatsRecord {
    pub fn zeroed(s_quest_id: impl Into<String>) -> Self {
        Self {
            s_quest_id: s_quest_id.into(),
            presented: 0,
            accepted: 0,
            completed: 0,
            rating_sum: 0.0,
            rating_count: 0,
            last_presented_at_ms: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_presented: i64,
    pub total_accepted: i64,
    pub total_completed: i64,
    pub total_xp_awarded: f64,
    pub rebuilt_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    pub chaos_mode_default: bool,
    pub max_rerolls: i64,
    pub allow_chaos_fallback: bool,
    pub target_chaos_ratio: f64,
    pub baseline_acceptance_rate: f64,
    pub generation_prompt_template: String,
    pub generation_enabled: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            chaos_mode_default: false,
            max_rerolls: 3,
            allow_chaos_fallback: false,
            target_chaos_ratio: 0.25,
            baseline_acceptance_rate: 0.6,
            generation_prompt_template: String::new(),
            generation_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_record_serializes_camel_case() {
        let record = QuestRecord {
            s_quest_id: "demo-quest".to_string(),
            slug: "demo-quest".to_string(),
            title: "Demo".to_string(),
            description: "A demo quest".to_string(),
            domain: "clarity".to_string(),
            archetype: "reflection".to_string(),
            is_chaos: false,
            difficulty: Some(2),
            estimated_duration_minutes: 10,
            xp_award: XpAward::from_components(1.0, 2.0, 3.0, 4.0),
            tools: ToolsConfig {
                journal: true,
                survey: false,
                photo_proof: false,
                location_tracking: false,
                custom_prompts: None,
            },
            tags: vec!["focus".to_string()],
            cooldown_hours: 24,
            repeatable: true,
            prerequisites: Prerequisites {
                requires_daily_quest_completed: true,
                audience_flags: Vec::new(),
                min_level: None,
            },
            engine: EngineSettings {
                weight: 1.0,
                reason_codes: None,
                tags: None,
            },
            media: None,
            is_active: false,
        };

        let doc = serde_json::to_value(&record).expect("serialize");
        assert_eq!(doc["sQuestId"], "demo-quest");
        assert_eq!(doc["estimatedDurationMinutes"], 10);
        assert_eq!(doc["xpAward"]["total"], 10.0);
        assert_eq!(doc["prerequisites"]["requiresDailyQuestCompleted"], true);
        assert!(doc.get("media").is_none());
    }

    #[test]
    fn global_config_parses_partial_docs() {
        let config: GlobalConfig =
            serde_json::from_value(serde_json::json!({ "maxRerolls": 5 })).expect("parse");
        assert_eq!(config.max_rerolls, 5);
        assert_eq!(config.target_chaos_ratio, 0.25);
    }
}
