use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::error::ValidationError;

/// Upper bound on task text, counted in characters after trimming.
pub const MAX_TEXT_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Base-36 millisecond timestamp followed by ten random hex digits.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", to_base36(millis), &random[..10]))
    }

    /// Generates ids until one is unused in `tasks`.
    pub fn fresh_for(tasks: &[Task], now: DateTime<Utc>) -> Self {
        loop {
            let id = Self::generate(now);
            if !tasks.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
        if n == 0 { break; }
    }
    out.iter().rev().collect()
}

/// Task category. Values outside the known set are kept verbatim in `Unknown`
/// so records written by other versions survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Personal,
    Work,
    Study,
    Other,
    Unknown(String),
}

impl Category {
    pub const KNOWN: [Category; 4] = [Category::Personal, Category::Work, Category::Study, Category::Other];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "personal" => Self::Personal,
            "work" => Self::Work,
            "study" => Self::Study,
            "other" => Self::Other,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Stored name; also the key for category sorting.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Study => "study",
            Self::Other => "other",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Work => "Work",
            Self::Study => "Study",
            Self::Other => "Other",
            Self::Unknown(_) => "Uncategorized",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Self::Personal => "👤",
            Self::Work => "💼",
            Self::Study => "📚",
            Self::Other => "📌",
            Self::Unknown(_) => "•",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_due_date")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Flips completion and keeps `completed_at` in step with it.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
    }
}

/// Input of the add operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub category: Category,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(text: impl Into<String>, category: Category, due_date: Option<NaiveDate>) -> Self {
        Self { text: text.into(), category, due_date }
    }

    /// Builds the input from raw form fields; an empty date field means no due date.
    pub fn from_form(text: &str, category: &str, due_date: &str) -> Result<Self, ValidationError> {
        let due = due_date.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            Some(due.parse::<NaiveDate>().map_err(|_| ValidationError::InvalidDueDate(due.to_string()))?)
        };
        Ok(Self::new(text, Category::parse(category.trim()), due_date))
    }
}

/// Returns the trimmed text if it satisfies the creation constraints.
pub fn validate_text(raw: &str) -> Result<&str, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(ValidationError::TooLong { len, max: MAX_TEXT_CHARS });
    }
    Ok(text)
}

// Hand-edited or foreign records may carry "" or a full timestamp; neither is fatal.
fn lenient_due_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(Some(date));
    }
    Ok(DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
