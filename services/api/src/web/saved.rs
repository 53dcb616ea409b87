//! services/api/src/web/saved.rs
//!
//! Endpoints for the persisted course collections and the dashboard.
//!
//! The same handlers serve both `/api/saved-courses` (exact identity) and
//! `/api/bookmarks` (legacy slug identity); the collection is chosen from the
//! route's [`CollectionKind`].

use crate::web::{
    rest::{error_response, into_course, parse_body, CourseBody, ErrorBody, HandlerError},
    state::{AppState, CollectionStore},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use course_advisor_core::{
    ports::PortError, Course, CourseFilters, DashboardStats, IdentityPolicy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

/// Which persisted collection a route operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    SavedCourses,
    Bookmarks,
}

impl CollectionKind {
    fn store(self, app_state: &AppState) -> &CollectionStore {
        match self {
            CollectionKind::SavedCourses => &app_state.saved_courses,
            CollectionKind::Bookmarks => &app_state.bookmarks,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ToggleResponse {
    pub saved: bool,
    #[schema(value_type = Vec<Object>)]
    pub courses: Vec<Course>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub saved: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[schema(value_type = Object)]
    pub stats: DashboardStats,
    pub active_filters: usize,
    #[schema(value_type = Vec<Object>)]
    pub courses: Vec<Course>,
}

/// Dashboard filters. Every field is optional; a missing filter or `"all"`
/// leaves the collection unconstrained.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardRequest {
    pub search: Option<String>,
    pub level: Option<String>,
    pub provider: Option<String>,
    /// A duration bucket such as `0-5 hours` or `20+ hours`.
    pub duration_max: Option<String>,
    pub bookmarked_only: bool,
}

impl From<DashboardRequest> for CourseFilters {
    fn from(request: DashboardRequest) -> Self {
        let defaults = CourseFilters::default();
        Self {
            search: request.search.unwrap_or(defaults.search),
            level: request.level.unwrap_or(defaults.level),
            provider: request.provider.unwrap_or(defaults.provider),
            duration_max: request.duration_max.unwrap_or(defaults.duration_max),
            bookmarked_only: request.bookmarked_only,
        }
    }
}

fn storage_error(e: PortError) -> HandlerError {
    error!("Course collection storage failed: {:?}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to access saved courses",
    )
}

//=========================================================================================
// Collection Handlers
//=========================================================================================

/// List the courses in the collection.
#[utoipa::path(
    get,
    path = "/api/saved-courses",
    responses(
        (status = 200, description = "The saved courses, in insertion order"),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn list_saved_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(kind): Extension<CollectionKind>,
) -> Result<impl IntoResponse, HandlerError> {
    let courses = kind.store(&app_state).courses().await.map_err(storage_error)?;
    Ok(Json(courses))
}

/// Add a course. A course that is already present is left as is.
#[utoipa::path(
    post,
    path = "/api/saved-courses",
    request_body = CourseBody,
    responses(
        (status = 200, description = "The updated collection"),
        (status = 400, description = "Invalid course", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn add_saved_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(kind): Extension<CollectionKind>,
    payload: Result<Json<CourseBody>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let course = into_course(parse_body(payload)?)?;
    let courses = kind
        .store(&app_state)
        .add(course)
        .await
        .map_err(storage_error)?;
    Ok(Json(courses))
}

/// Save the course if absent, remove it otherwise.
#[utoipa::path(
    post,
    path = "/api/saved-courses/toggle",
    request_body = CourseBody,
    responses(
        (status = 200, description = "Membership after the toggle", body = ToggleResponse),
        (status = 400, description = "Invalid course", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn toggle_saved_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(kind): Extension<CollectionKind>,
    payload: Result<Json<CourseBody>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let course = into_course(parse_body(payload)?)?;
    let (saved, courses) = kind
        .store(&app_state)
        .toggle(course)
        .await
        .map_err(storage_error)?;
    Ok(Json(ToggleResponse { saved, courses }))
}

/// Remove a course from the collection.
#[utoipa::path(
    post,
    path = "/api/saved-courses/remove",
    request_body = CourseBody,
    responses(
        (status = 200, description = "The updated collection"),
        (status = 400, description = "Invalid course", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn remove_saved_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(kind): Extension<CollectionKind>,
    payload: Result<Json<CourseBody>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let course = into_course(parse_body(payload)?)?;
    let courses = kind
        .store(&app_state)
        .remove(&course)
        .await
        .map_err(storage_error)?;
    Ok(Json(courses))
}

/// Check whether a course is in the collection.
#[utoipa::path(
    post,
    path = "/api/saved-courses/status",
    request_body = CourseBody,
    responses(
        (status = 200, description = "Membership", body = StatusResponse),
        (status = 400, description = "Invalid course", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn saved_status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(kind): Extension<CollectionKind>,
    payload: Result<Json<CourseBody>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let course = into_course(parse_body(payload)?)?;
    let saved = kind
        .store(&app_state)
        .is_saved(&course)
        .await
        .map_err(storage_error)?;
    Ok(Json(StatusResponse { saved }))
}

/// Remove every course from the collection.
#[utoipa::path(
    delete,
    path = "/api/saved-courses",
    responses(
        (status = 204, description = "Collection cleared"),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn clear_saved_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(kind): Extension<CollectionKind>,
) -> Result<impl IntoResponse, HandlerError> {
    kind.store(&app_state).clear().await.map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Dashboard
//=========================================================================================

/// Filter the saved courses and summarize the whole collection.
///
/// `bookmarkedOnly` keeps only saved courses that are also in the legacy
/// bookmark collection.
#[utoipa::path(
    post,
    path = "/api/dashboard",
    request_body = DashboardRequest,
    responses(
        (status = 200, description = "Statistics and the filtered courses", body = DashboardResponse),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let filters = CourseFilters::from(parse_body(payload)?);
    let saved = app_state
        .saved_courses
        .courses()
        .await
        .map_err(storage_error)?;

    let mut courses: Vec<Course> = filters.apply(&saved).into_iter().cloned().collect();
    if filters.bookmarked_only {
        let bookmarks = app_state.bookmarks.courses().await.map_err(storage_error)?;
        courses.retain(|course| {
            bookmarks
                .iter()
                .any(|b| IdentityPolicy::Slug.same_course(b, course))
        });
    }

    Ok(Json(DashboardResponse {
        stats: DashboardStats::from_courses(&saved),
        active_filters: filters.active_count(),
        courses,
    }))
}
