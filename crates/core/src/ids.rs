#![forbid(unsafe_code)]

/// Stable catalog identifier: 3-64 characters, lowercase letters, digits and
/// hyphens, alphanumeric at both ends. Immutable once a record is created and
/// doubles as the slug when none is supplied.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuestId(String);

impl QuestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, QuestIdError> {
        let value = value.into();
        validate_quest_id(&value)?;
        Ok(Self(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestIdError {
    TooShort,
    TooLong,
    InvalidFirstChar,
    InvalidLastChar,
    InvalidChar { ch: char, index: usize },
}

impl std::fmt::Display for QuestIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => write!(f, "must be at least 3 characters"),
            Self::TooLong => write!(f, "must be at most 64 characters"),
            Self::InvalidFirstChar => {
                write!(f, "must start with a lowercase letter or digit")
            }
            Self::InvalidLastChar => write!(f, "must end with a lowercase letter or digit"),
            Self::InvalidChar { ch, index } => {
                write!(f, "invalid character {ch:?} at index {index} (allowed: a-z, 0-9, '-')")
            }
        }
    }
}

impl std::error::Error for QuestIdError {}

fn validate_quest_id(value: &str) -> Result<(), QuestIdError> {
    if value.len() < 3 {
        return Err(QuestIdError::TooShort);
    }
    if value.len() > 64 {
        return Err(QuestIdError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            continue;
        }
        return Err(QuestIdError::InvalidChar { ch, index });
    }
    if value.starts_with('-') {
        return Err(QuestIdError::InvalidFirstChar);
    }
    if value.ends_with('-') {
        return Err(QuestIdError::InvalidLastChar);
    }
    Ok(())
}
