#![forbid(unsafe_code)]

use crate::error::ValidationError;
use crate::fields::{self, NumberRule, Overflow, RawObject};
use crate::ids::QuestId;
use crate::model::{
    self, EngineSettings, MediaRefs, Prerequisites, QuestRecord, ToolsConfig, XpAward,
};
use serde_json::Value;

/// Builds the canonical quest record from an untyped payload, or fails with
/// the first offending field. Success guarantees every record invariant
/// holds with no further post-processing; nothing is written on failure.
pub fn normalize_quest(raw: &Value) -> Result<QuestRecord, ValidationError> {
    let args = fields::require_object(raw, "payload")?;

    let quest_id = fields::require_identifier(args, "sQuestId")?;
    let slug = match fields::optional_string(args, "slug")? {
        Some(slug) => QuestId::try_new(slug)
            .map_err(|err| ValidationError::new("slug", err.to_string()))?
            .into_string(),
        None => quest_id.as_str().to_string(),
    };

    let title = fields::require_string(args, "title")?;
    let description = fields::require_string(args, "description")?;
    let domain = fields::enum_string(args, "domain", model::DOMAINS)?;
    let archetype = fields::enum_string(args, "archetype", model::ARCHETYPES)?;
    let is_chaos = fields::require_bool(args, "isChaos")?;
    let difficulty =
        fields::optional_int(args, "difficulty", model::MIN_DIFFICULTY, model::MAX_DIFFICULTY)?;
    let estimated_duration_minutes = fields::require_int(
        args,
        "estimatedDurationMinutes",
        model::MIN_DURATION_MINUTES,
        model::MAX_DURATION_MINUTES,
    )?;

    let xp_award = normalize_xp_award(args)?;
    let tools = normalize_tools(args)?;
    let tags = normalize_tags(args)?;
    let cooldown_hours = fields::require_int(
        args,
        "cooldownHours",
        model::MIN_COOLDOWN_HOURS,
        model::MAX_COOLDOWN_HOURS,
    )?;
    let repeatable = fields::require_bool(args, "repeatable")?;
    let prerequisites = normalize_prerequisites(args)?;
    let engine = normalize_engine(args)?;
    let media = normalize_media(args)?;
    let is_active = fields::optional_bool(args, "isActive")?.unwrap_or(false);

    Ok(QuestRecord {
        s_quest_id: quest_id.into_string(),
        slug,
        title,
        description,
        domain,
        archetype,
        is_chaos,
        difficulty,
        estimated_duration_minutes,
        xp_award,
        tools,
        tags,
        cooldown_hours,
        repeatable,
        prerequisites,
        engine,
        media,
        is_active,
    })
}

fn sub_object<'a>(args: &'a RawObject, key: &str) -> Result<&'a RawObject, ValidationError> {
    match args.get(key) {
        Some(Value::Null) | None => Err(ValidationError::new(key, "is required")),
        Some(value) => fields::require_object(value, key),
    }
}

fn optional_sub_object<'a>(
    args: &'a RawObject,
    key: &str,
) -> Result<Option<&'a RawObject>, ValidationError> {
    match args.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => fields::require_object(value, key).map(Some),
    }
}

fn normalize_xp_award(args: &RawObject) -> Result<XpAward, ValidationError> {
    let obj = sub_object(args, "xpAward")?;
    let award = NumberRule::at_least(0.0);
    let emotion = fields::require_number(obj, "emotion", award).map_err(|e| e.within("xpAward"))?;
    let clarity = fields::require_number(obj, "clarity", award).map_err(|e| e.within("xpAward"))?;
    let discipline =
        fields::require_number(obj, "discipline", award).map_err(|e| e.within("xpAward"))?;
    let momentum =
        fields::require_number(obj, "momentum", award).map_err(|e| e.within("xpAward"))?;
    // A client-supplied `total` is ignored; the sum is authoritative.
    Ok(XpAward::from_components(emotion, clarity, discipline, momentum))
}

fn normalize_tools(args: &RawObject) -> Result<ToolsConfig, ValidationError> {
    let obj = sub_object(args, "tools")?;
    let journal = fields::require_bool(obj, "journal").map_err(|e| e.within("tools"))?;
    let survey = fields::require_bool(obj, "survey").map_err(|e| e.within("tools"))?;
    let photo_proof = fields::require_bool(obj, "photoProof").map_err(|e| e.within("tools"))?;
    let location_tracking =
        fields::require_bool(obj, "locationTracking").map_err(|e| e.within("tools"))?;
    let custom_prompts =
        fields::string_array(obj, "customPrompts", model::MAX_LIST_ITEMS, Overflow::Truncate)
            .map_err(|e| e.within("tools"))?;
    Ok(ToolsConfig {
        journal,
        survey,
        photo_proof,
        location_tracking,
        custom_prompts,
    })
}

fn normalize_tags(args: &RawObject) -> Result<Vec<String>, ValidationError> {
    let tags = fields::string_array(args, "tags", model::MAX_TAGS, Overflow::Truncate)?
        .unwrap_or_default();
    Ok(tags
        .into_iter()
        .map(|tag| tag.to_ascii_lowercase())
        .collect())
}

fn normalize_prerequisites(args: &RawObject) -> Result<Prerequisites, ValidationError> {
    let Some(obj) = optional_sub_object(args, "prerequisites")? else {
        return Ok(Prerequisites {
            requires_daily_quest_completed: true,
            audience_flags: Vec::new(),
            min_level: None,
        });
    };
    let audience_flags =
        fields::string_array(obj, "audienceFlags", model::MAX_LIST_ITEMS, Overflow::Truncate)
            .map_err(|e| e.within("prerequisites"))?
            .unwrap_or_default();
    let min_level = fields::optional_number(obj, "minLevel", NumberRule::int_at_least(0))
        .map_err(|e| e.within("prerequisites"))?
        .map(|v| v as i64);
    // Whatever the caller supplied for requiresDailyQuestCompleted is
    // discarded: the daily-quest gate is server-enforced.
    Ok(Prerequisites {
        requires_daily_quest_completed: true,
        audience_flags,
        min_level,
    })
}

fn normalize_engine(args: &RawObject) -> Result<EngineSettings, ValidationError> {
    let obj = sub_object(args, "engine")?;
    let weight = fields::require_number(obj, "weight", NumberRule::at_least(0.0))
        .map_err(|e| e.within("engine"))?;
    let reason_codes =
        fields::string_array(obj, "reasonCodes", model::MAX_LIST_ITEMS, Overflow::Truncate)
            .map_err(|e| e.within("engine"))?;
    let tags = fields::string_array(obj, "tags", model::MAX_LIST_ITEMS, Overflow::Truncate)
        .map_err(|e| e.within("engine"))?;
    Ok(EngineSettings {
        weight,
        reason_codes,
        tags,
    })
}

fn normalize_media(args: &RawObject) -> Result<Option<MediaRefs>, ValidationError> {
    let Some(obj) = optional_sub_object(args, "media")? else {
        return Ok(None);
    };
    let hero_image_url =
        fields::optional_string(obj, "heroImageUrl").map_err(|e| e.within("media"))?;
    let animation_url =
        fields::optional_string(obj, "animationUrl").map_err(|e| e.within("media"))?;
    let video_url = fields::optional_string(obj, "videoUrl").map_err(|e| e.within("media"))?;
    Ok(Some(MediaRefs {
        hero_image_url,
        animation_url,
        video_url,
    }))
}
