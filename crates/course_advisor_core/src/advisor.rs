//! crates/course_advisor_core/src/advisor.rs
//!
//! The course advisor: prompts the completion service, recovers JSON from its
//! replies and validates the result before handing it to callers.

use crate::domain::{Course, CourseDetails};
use crate::normalizer::{normalize, normalize_with_strategy, JsonShape, NormalizeError};
use crate::ports::{CompletionService, PortError};
use crate::prompts;
use crate::slug::fallback_course_url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// How long the URL enrichment call may take before the fallback is used.
pub const URL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Completion service error: {0}")]
    Port(#[from] PortError),
    #[error("Unparseable completion: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("Completion had an unexpected shape: {0}")]
    Shape(String),
}

/// Model names used for each kind of request.
#[derive(Debug, Clone)]
pub struct AdvisorModels {
    pub recommendation: String,
    pub details: String,
    pub url: String,
    pub insights: String,
}

impl Default for AdvisorModels {
    fn default() -> Self {
        Self {
            recommendation: "gemini-2.0-flash".to_string(),
            details: "gemini-2.0-flash".to_string(),
            url: "gemini-1.5-pro".to_string(),
            insights: "gemini-2.0-flash".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CourseAdvisor {
    completion: Arc<dyn CompletionService>,
    models: AdvisorModels,
}

impl CourseAdvisor {
    pub fn new(completion: Arc<dyn CompletionService>, models: AdvisorModels) -> Self {
        Self { completion, models }
    }

    /// Asks for courses matching a free-text query. One upstream call, no retry.
    pub async fn recommend(&self, query: &str) -> Result<Vec<Course>, AdvisorError> {
        let prompt = prompts::recommendation_prompt(query);
        let text = self
            .completion
            .complete(&self.models.recommendation, &prompt)
            .await?;

        let value = match normalize_with_strategy(&text, JsonShape::Array) {
            Ok((value, strategy)) => {
                debug!(?strategy, "Recovered recommendation JSON");
                value
            }
            Err(e) => {
                error!("Failed to parse JSON response: {}", e);
                error!("Raw response: {}", text);
                return Err(e.into());
            }
        };

        validate_courses(value)
    }

    /// Asks for structured detail about one course.
    pub async fn course_details(
        &self,
        title: &str,
        description: &str,
        level: &str,
        provider: &str,
    ) -> Result<CourseDetails, AdvisorError> {
        let prompt = prompts::details_prompt(title, description, level, provider);
        let text = self.completion.complete(&self.models.details, &prompt).await?;
        let value = normalize(&text, JsonShape::Object)?;
        validate_details(value)
    }

    /// Returns a plausible URL for the course. Never fails: on timeout, upstream
    /// error or a malformed reply the offline fallback is used.
    pub async fn course_url(&self, title: &str, provider: &str) -> String {
        let prompt = prompts::url_prompt(title, provider);
        let call = self.completion.complete(&self.models.url, &prompt);

        match tokio::time::timeout(URL_TIMEOUT, call).await {
            Ok(Ok(text)) => match parse_course_url(&text) {
                Some(url) => return url,
                None => warn!("Generated URL is invalid: {:?}", text),
            },
            Ok(Err(e)) => warn!("URL generation failed: {}", e),
            Err(_) => warn!("URL generation timed out after {:?}", URL_TIMEOUT),
        }

        fallback_course_url(title, provider)
    }

    /// Asks for a short learning-path narrative over the given courses.
    pub async fn insights(
        &self,
        courses: &[Course],
        user_query: &str,
    ) -> Result<String, AdvisorError> {
        let prompt = prompts::insights_prompt(courses, user_query);
        let text = self
            .completion
            .complete(&self.models.insights, &prompt)
            .await?;
        let insights = text.trim();
        if insights.is_empty() {
            return Err(AdvisorError::Shape("empty insights".to_string()));
        }
        Ok(insights.to_string())
    }
}

//=========================================================================================
// Schema validation of recovered values
//=========================================================================================

/// Turns a recovered value into courses. Accepts a bare array or an object with a
/// `courses` array; elements that are not course-shaped are dropped.
pub fn validate_courses(value: Value) -> Result<Vec<Course>, AdvisorError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("courses") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AdvisorError::Shape(
                    "expected a JSON array of courses, got an object".to_string(),
                ))
            }
        },
        other => {
            return Err(AdvisorError::Shape(format!(
                "expected a JSON array of courses, got {}",
                other
            )))
        }
    };

    let total = items.len();
    let courses: Vec<Course> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Course>(item) {
            Ok(course) => Some(course),
            Err(e) => {
                warn!("Dropping malformed course entry: {}", e);
                None
            }
        })
        .collect();

    if total > 0 && courses.is_empty() {
        return Err(AdvisorError::Shape(format!(
            "none of the {} entries were valid courses",
            total
        )));
    }
    Ok(courses)
}

pub fn validate_details(value: Value) -> Result<CourseDetails, AdvisorError> {
    if !value.is_object() {
        return Err(AdvisorError::Shape(format!(
            "expected a course details object, got {}",
            value
        )));
    }
    let details: CourseDetails =
        serde_json::from_value(value).map_err(|e| AdvisorError::Shape(e.to_string()))?;
    if details.is_empty() {
        return Err(AdvisorError::Shape(
            "course details object has none of the expected fields".to_string(),
        ));
    }
    Ok(details)
}

/// Accepts only an absolute http(s) URL, ignoring stray quotes or backticks.
pub fn parse_course_url(text: &str) -> Option<String> {
    let candidate = text
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c == '<' || c == '>')
        .trim();
    let url = Url::parse(candidate).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(candidate.to_string()),
        _ => None,
    }
}
