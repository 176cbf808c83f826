#![forbid(unsafe_code)]

use crate::error::ValidationError;
use crate::ids::QuestId;
use serde_json::Value;

pub type RawObject = serde_json::Map<String, Value>;

pub fn require_object<'a>(value: &'a Value, field: &str) -> Result<&'a RawObject, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::new(field, "must be an object"))
}

pub fn require_string(args: &RawObject, key: &str) -> Result<String, ValidationError> {
    match args.get(key) {
        Some(Value::String(v)) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(ValidationError::new(key, "must not be empty"))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(Value::Null) | None => Err(ValidationError::new(key, "is required")),
        Some(_) => Err(ValidationError::new(key, "must be a string")),
    }
}

pub fn optional_string(args: &RawObject, key: &str) -> Result<Option<String>, ValidationError> {
    match args.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(Value::String(v)) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(ValidationError::new(key, "must not be empty"))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(ValidationError::new(key, "must be a string")),
    }
}

pub fn require_bool(args: &RawObject, key: &str) -> Result<bool, ValidationError> {
    match args.get(key) {
        Some(Value::Bool(v)) => Ok(*v),
        Some(Value::Null) | None => Err(ValidationError::new(key, "is required")),
        Some(_) => Err(ValidationError::new(key, "must be a boolean")),
    }
}

pub fn optional_bool(args: &RawObject, key: &str) -> Result<Option<bool>, ValidationError> {
    match args.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(Value::Bool(v)) => Ok(Some(*v)),
        Some(_) => Err(ValidationError::new(key, "must be a boolean")),
    }
}

/// Explicit numeric constraints. Each is checked independently and produces
/// a distinct message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
}

impl NumberRule {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn int_range(min: i64, max: i64) -> Self {
        Self {
            min: Some(min as f64),
            max: Some(max as f64),
            integer: true,
        }
    }

    pub fn int_at_least(min: i64) -> Self {
        Self {
            min: Some(min as f64),
            max: None,
            integer: true,
        }
    }

    pub fn unit_interval() -> Self {
        Self {
            min: Some(0.0),
            max: Some(1.0),
            integer: false,
        }
    }
}

fn check_number(raw: f64, key: &str, rule: NumberRule) -> Result<f64, ValidationError> {
    if !raw.is_finite() {
        return Err(ValidationError::new(key, "must be a finite number"));
    }
    if rule.integer && raw.fract() != 0.0 {
        return Err(ValidationError::new(key, "must be an integer"));
    }
    if let Some(min) = rule.min
        && raw < min
    {
        return Err(ValidationError::new(key, format!("must be at least {min}")));
    }
    if let Some(max) = rule.max
        && raw > max
    {
        return Err(ValidationError::new(key, format!("must be at most {max}")));
    }
    Ok(raw)
}

pub fn require_number(args: &RawObject, key: &str, rule: NumberRule) -> Result<f64, ValidationError> {
    match args.get(key) {
        Some(Value::Number(n)) => {
            let raw = n
                .as_f64()
                .ok_or_else(|| ValidationError::new(key, "must be a finite number"))?;
            check_number(raw, key, rule)
        }
        Some(Value::Null) | None => Err(ValidationError::new(key, "is required")),
        Some(_) => Err(ValidationError::new(key, "must be a number")),
    }
}

pub fn optional_number(
    args: &RawObject,
    key: &str,
    rule: NumberRule,
) -> Result<Option<f64>, ValidationError> {
    match args.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(_) => require_number(args, key, rule).map(Some),
    }
}

pub fn require_int(args: &RawObject, key: &str, min: i64, max: i64) -> Result<i64, ValidationError> {
    require_number(args, key, NumberRule::int_range(min, max)).map(|v| v as i64)
}

pub fn optional_int(
    args: &RawObject,
    key: &str,
    min: i64,
    max: i64,
) -> Result<Option<i64>, ValidationError> {
    optional_number(args, key, NumberRule::int_range(min, max)).map(|v| v.map(|v| v as i64))
}

/// Lowercases the value, then checks membership in a fixed allowed set. The
/// failure message lists the allowed values.
pub fn enum_string(args: &RawObject, key: &str, allowed: &[&str]) -> Result<String, ValidationError> {
    let value = require_string(args, key)?.to_ascii_lowercase();
    if allowed.iter().any(|candidate| *candidate == value) {
        Ok(value)
    } else {
        Err(ValidationError::new(
            key,
            format!("must be one of: {}", allowed.join(", ")),
        ))
    }
}

pub fn require_identifier(args: &RawObject, key: &str) -> Result<QuestId, ValidationError> {
    let value = require_string(args, key)?;
    QuestId::try_new(value).map_err(|err| ValidationError::new(key, err.to_string()))
}

/// What to do with an array longer than its cap. Tags truncate at 16; most
/// other lists reject instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    Truncate,
    Reject,
}

pub fn string_array(
    args: &RawObject,
    key: &str,
    cap: usize,
    overflow: Overflow,
) -> Result<Option<Vec<String>>, ValidationError> {
    let value = match args.get(key) {
        Some(Value::Null) | None => return Ok(None),
        Some(value) => value,
    };
    let Some(arr) = value.as_array() else {
        return Err(ValidationError::new(key, "must be an array of strings"));
    };
    if arr.len() > cap && overflow == Overflow::Reject {
        return Err(ValidationError::new(
            key,
            format!("must have at most {cap} items"),
        ));
    }
    let mut out = Vec::with_capacity(arr.len().min(cap));
    for item in arr.iter().take(cap) {
        let Some(s) = item.as_str() else {
            return Err(ValidationError::new(key, "must be an array of strings"));
        };
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::new(key, "must not contain empty strings"));
        }
        out.push(s.to_string());
    }
    Ok(Some(out))
}
