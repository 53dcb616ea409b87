//! crates/course_advisor_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Courses travel over HTTP and through the persisted collections, so they carry
//! their camelCase wire representation with them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// The difficulty band of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub const ALL: [CourseLevel; 3] = [
        CourseLevel::Beginner,
        CourseLevel::Intermediate,
        CourseLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "Beginner",
            CourseLevel::Intermediate => "Intermediate",
            CourseLevel::Advanced => "Advanced",
        }
    }

    /// Parses a level, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Some(CourseLevel::Beginner),
            "intermediate" => Some(CourseLevel::Intermediate),
            "advanced" => Some(CourseLevel::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Model output is not consistent about casing ("beginner", "ADVANCED").
impl<'de> Deserialize<'de> for CourseLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CourseLevel::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown course level '{}', expected Beginner, Intermediate or Advanced",
                raw
            ))
        })
    }
}

/// A single recommended course. Immutable value record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub duration: String,
    pub provider: String,
}

impl Course {
    pub fn key(&self) -> CourseKey {
        CourseKey::new(&self.title, &self.provider)
    }
}

/// The `(title, provider)` identity of a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseKey {
    pub title: String,
    pub provider: String,
}

impl CourseKey {
    pub fn new(title: &str, provider: &str) -> Self {
        Self {
            title: title.to_string(),
            provider: provider.to_string(),
        }
    }

    /// The legacy bookmark id: `"{provider}-{title}"`, lowercased, with every
    /// whitespace run replaced by a single hyphen.
    pub fn slug_id(&self) -> String {
        format!("{}-{}", self.provider, self.title)
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Supplementary information about a course, fetched lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    #[serde(default)]
    pub what_you_will_learn: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub career_opportunities: String,
    #[serde(default)]
    pub estimated_study_time: String,
}

impl CourseDetails {
    /// True when the model returned an object with none of the expected fields.
    pub fn is_empty(&self) -> bool {
        self.what_you_will_learn.is_empty()
            && self.prerequisites.is_empty()
            && self.key_topics.is_empty()
            && self.career_opportunities.is_empty()
            && self.estimated_study_time.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A set of courses produced for one user message.
///
/// `request_id` is the id of the user [`Message`] that triggered the request,
/// so two identical queries never share a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendation {
    pub id: Uuid,
    pub request_id: Uuid,
    pub query: String,
    pub courses: Vec<Course>,
    pub timestamp: DateTime<Utc>,
}
