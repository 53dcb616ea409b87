//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the AI-backed REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{chat, saved, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use course_advisor_core::{Course, CourseLevel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        chat_handler,
        course_details_handler,
        course_url_handler,
        clear_course_url_cache_handler,
        insights_handler,
        saved::list_saved_handler,
        saved::add_saved_handler,
        saved::toggle_saved_handler,
        saved::remove_saved_handler,
        saved::saved_status_handler,
        saved::clear_saved_handler,
        saved::dashboard_handler,
        chat::create_chat_session_handler,
        chat::get_chat_session_handler,
        chat::post_chat_message_handler,
        chat::post_chat_feedback_handler,
        chat::delete_chat_session_handler,
    ),
    components(
        schemas(
            ErrorBody, CourseBody, ChatRequest, ChatResponse, CourseDetailsRequest,
            CourseUrlRequest, CourseUrlResponse, CacheClearedResponse, InsightsRequest,
            InsightsResponse,
            saved::ToggleResponse, saved::StatusResponse, saved::DashboardRequest,
            saved::DashboardResponse,
            chat::ChatMessageRequest, chat::FeedbackRequest,
        )
    ),
    tags(
        (name = "Course Advisor API", description = "AI course recommendations, enrichment and saved courses.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payload Structs and Error Helpers
//=========================================================================================

/// The body of every error response.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn error_response(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Unwraps a JSON body, turning any extractor rejection into a 400.
pub fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid request body: {}", rejection.body_text()),
        )
    })
}

/// A course as sent by the client. Validated into a domain `Course`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseBody {
    pub title: String,
    pub description: String,
    /// One of `Beginner`, `Intermediate`, `Advanced`.
    pub level: String,
    pub duration: String,
    pub provider: String,
}

impl TryFrom<CourseBody> for Course {
    type Error = String;

    fn try_from(body: CourseBody) -> Result<Self, Self::Error> {
        if body.title.trim().is_empty() || body.provider.trim().is_empty() {
            return Err("Course title and provider are required".to_string());
        }
        let level = CourseLevel::parse(&body.level)
            .ok_or_else(|| format!("Invalid course level '{}'", body.level))?;
        Ok(Course {
            title: body.title,
            description: body.description,
            level,
            duration: body.duration,
            provider: body.provider,
        })
    }
}

pub fn into_course(body: CourseBody) -> Result<Course, HandlerError> {
    Course::try_from(body).map_err(|msg| error_response(StatusCode::BAD_REQUEST, &msg))
}

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Optional client-chosen id echoed back so results can be matched to requests.
    #[serde(default)]
    pub request_id: Option<Uuid>,
}

/// Either the recommended courses or an inline error marker.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum CoursesPayload {
    Courses(Vec<Course>),
    Failure { error: String },
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub request_id: Uuid,
    /// An array of courses, or `{"error": "..."}` when generation failed.
    #[schema(value_type = Object)]
    pub courses: CoursesPayload,
}

#[derive(Deserialize, Serialize, Default, ToSchema)]
#[serde(default)]
pub struct CourseDetailsRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<String>,
    pub provider: Option<String>,
}

#[derive(Deserialize, Serialize, Default, ToSchema)]
#[serde(default)]
pub struct CourseUrlRequest {
    pub title: Option<String>,
    pub provider: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CourseUrlResponse {
    pub url: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CacheClearedResponse {
    pub cleared: usize,
}

#[derive(Deserialize, Serialize, Default, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightsRequest {
    pub courses: Option<Vec<CourseBody>>,
    pub user_query: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct InsightsResponse {
    pub insights: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Recommend courses for a free-text learning interest.
///
/// Generation failures are reported inline as `{"courses": {"error": ...}}`.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Courses, or an inline generation error", body = ChatResponse),
        (status = 400, description = "Message is missing", body = ErrorBody)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = parse_body(payload)?;
    let message = non_empty(request.message)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Message is required"))?;
    let request_id = request.request_id.unwrap_or_else(Uuid::new_v4);

    let courses = match app_state.advisor.recommend(&message).await {
        Ok(courses) => {
            info!(%request_id, count = courses.len(), "Generated course recommendations");
            CoursesPayload::Courses(courses)
        }
        Err(e) => {
            error!(%request_id, "Error generating course recommendations: {}", e);
            CoursesPayload::Failure {
                error: "Failed to generate course recommendations".to_string(),
            }
        }
    };

    Ok(Json(ChatResponse {
        request_id,
        courses,
    }))
}

/// Generate structured detail for one course.
#[utoipa::path(
    post,
    path = "/api/course-details",
    request_body = CourseDetailsRequest,
    responses(
        (status = 200, description = "whatYouWillLearn, prerequisites, keyTopics, careerOpportunities, estimatedStudyTime"),
        (status = 400, description = "Course information is missing", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn course_details_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CourseDetailsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = parse_body(payload)?;
    let title = non_empty(request.title).ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, "Course information is required")
    })?;

    let details = app_state
        .advisor
        .course_details(
            &title,
            request.description.as_deref().unwrap_or_default(),
            request.level.as_deref().unwrap_or_default(),
            request.provider.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| {
            error!("Failed to generate course details for '{}': {}", title, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate course details",
            )
        })?;

    Ok(Json(details))
}

/// Find a plausible URL for a course. Falls back to a generated URL, so it
/// always succeeds once title and provider are given.
#[utoipa::path(
    post,
    path = "/api/course-url",
    request_body = CourseUrlRequest,
    responses(
        (status = 200, description = "A course URL", body = CourseUrlResponse),
        (status = 400, description = "Title or provider is missing", body = ErrorBody)
    )
)]
pub async fn course_url_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CourseUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = parse_body(payload)?;
    let (title, provider) = match (non_empty(request.title), non_empty(request.provider)) {
        (Some(title), Some(provider)) => (title, provider),
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Title and provider are required",
            ))
        }
    };

    if let Some(url) = app_state.url_cache.get(&title, &provider) {
        return Ok(Json(CourseUrlResponse { url }));
    }

    let url = app_state.advisor.course_url(&title, &provider).await;
    app_state.url_cache.insert(&title, &provider, url.clone());
    Ok(Json(CourseUrlResponse { url }))
}

/// Forget every cached course URL.
#[utoipa::path(
    delete,
    path = "/api/course-url",
    responses(
        (status = 200, description = "Number of URLs dropped", body = CacheClearedResponse)
    )
)]
pub async fn clear_course_url_cache_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let cleared = app_state.url_cache.clear();
    info!(cleared, "Cleared course URL cache");
    Json(CacheClearedResponse { cleared })
}

/// Generate a short learning-path narrative for a set of courses.
#[utoipa::path(
    post,
    path = "/api/insights",
    request_body = InsightsRequest,
    responses(
        (status = 200, description = "The narrative", body = InsightsResponse),
        (status = 400, description = "No valid courses given", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn insights_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = parse_body(payload)?;
    let bodies = request
        .courses
        .filter(|courses| !courses.is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Valid courses are required"))?;
    let courses = bodies
        .into_iter()
        .map(into_course)
        .collect::<Result<Vec<_>, _>>()?;
    let user_query = request.user_query.unwrap_or_default();

    let insights = app_state
        .advisor
        .insights(&courses, &user_query)
        .await
        .map_err(|e| {
            error!("Error generating insights: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate insights")
        })?;

    Ok(Json(InsightsResponse { insights }))
}
