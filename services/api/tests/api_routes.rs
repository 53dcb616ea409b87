use api_lib::{
    adapters::SqliteKvStore,
    web::{api_router, rest::ApiDoc, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use course_advisor_core::{
    ports::{CompletionService, PortError, PortResult},
    AdvisorModels,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use utoipa::OpenApi;

/// Replies keyed by model name; a missing reply is an upstream failure.
struct FakeCompletion {
    replies: HashMap<&'static str, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, model: &str, _prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .get(model)
            .cloned()
            .ok_or_else(|| PortError::Upstream(format!("{} unavailable", model)))
    }
}

fn models() -> AdvisorModels {
    AdvisorModels {
        recommendation: "rec".to_string(),
        details: "details".to_string(),
        url: "url".to_string(),
        insights: "insights".to_string(),
    }
}

async fn app_with(replies: &[(&'static str, &str)]) -> (Router, Arc<FakeCompletion>) {
    let completion = Arc::new(FakeCompletion {
        replies: replies
            .iter()
            .map(|(model, reply)| (*model, reply.to_string()))
            .collect(),
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(SqliteKvStore::in_memory().await.expect("in-memory store"));
    let state = Arc::new(AppState::new(completion.clone(), store, models()));
    (api_router(state), completion)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

const COURSES: &str = r#"[
  {"title": "React Fundamentals", "description": "Components and hooks", "level": "Beginner", "duration": "4 weeks", "provider": "Udemy"},
  {"title": "Advanced React Patterns", "description": "Render props, context", "level": "Advanced", "duration": "6 weeks", "provider": "Coursera"}
]"#;

const DETAILS: &str = r#"{"whatYouWillLearn": ["Hooks"], "prerequisites": ["JavaScript"], "keyTopics": ["State"], "careerOpportunities": "Front-end roles", "estimatedStudyTime": "5-7 hours per week"}"#;

fn course(title: &str, provider: &str) -> Value {
    json!({
        "title": title,
        "description": "A course",
        "level": "Beginner",
        "duration": "4 hours",
        "provider": provider
    })
}

//=========================================================================================
// AI endpoints
//=========================================================================================

#[tokio::test]
async fn chat_returns_courses_from_fenced_reply() {
    let fenced = format!("Here you go!\n```json\n{}\n```", COURSES);
    let (app, _) = app_with(&[("rec", fenced.as_str())]).await;
    let request_id = "6a1f0c2e-8d54-4c1b-9d3e-2f1a7b6c5d4e";

    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({"message": "I want to learn React", "requestId": request_id})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestId"], request_id);
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);
    assert_eq!(body["courses"][1]["level"], "Advanced");
}

#[tokio::test]
async fn chat_reports_generation_failure_inline() {
    let (app, _) = app_with(&[("rec", "Sorry, I have no idea.")]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({"message": "I want to learn React"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["courses"]["error"],
        "Failed to generate course recommendations"
    );
}

#[tokio::test]
async fn chat_requires_a_message() {
    let (app, completion) = app_with(&[]).await;

    let (status, body) = send(&app, "POST", "/api/chat", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");

    let (status, _) = send(&app, "POST", "/api/chat", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn course_details_succeed_and_fail_cleanly() {
    let (app, _) = app_with(&[("details", DETAILS)]).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/course-details",
        Some(json!({"title": "React", "description": "d", "level": "Beginner", "provider": "Udemy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estimatedStudyTime"], "5-7 hours per week");
    assert_eq!(body["whatYouWillLearn"][0], "Hooks");

    let (status, body) = send(
        &app,
        "POST",
        "/api/course-details",
        Some(json!({"description": "no title"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Course information is required");

    let (app, _) = app_with(&[("details", "I can't do that")]).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/course-details",
        Some(json!({"title": "React"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate course details");
}

#[tokio::test]
async fn course_url_falls_back_when_upstream_fails() {
    let (app, _) = app_with(&[]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/course-url",
        Some(json!({"title": "React Fundamentals", "provider": "Udemy"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["url"],
        "https://www.udemy.com/course/react-fundamentals/?utm_source=recommender"
    );
}

#[tokio::test]
async fn course_url_is_cached_per_title_and_provider() {
    let (app, completion) =
        app_with(&[("url", "https://www.coursera.org/learn/react-patterns")]).await;
    let body = json!({"title": "Advanced React Patterns", "provider": "Coursera"});

    let (_, first) = send(&app, "POST", "/api/course-url", Some(body.clone())).await;
    let (_, second) = send(&app, "POST", "/api/course-url", Some(body)).await;

    assert_eq!(first["url"], "https://www.coursera.org/learn/react-patterns");
    assert_eq!(first, second);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clearing_the_url_cache_forces_a_new_lookup() {
    let (app, completion) =
        app_with(&[("url", "https://www.coursera.org/learn/react-patterns")]).await;
    let body = json!({"title": "Advanced React Patterns", "provider": "Coursera"});
    send(&app, "POST", "/api/course-url", Some(body.clone())).await;

    let (status, cleared) = send(&app, "DELETE", "/api/course-url", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["cleared"], 1);

    send(&app, "POST", "/api/course-url", Some(body)).await;
    assert_eq!(completion.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn course_url_requires_title_and_provider() {
    let (app, _) = app_with(&[]).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/course-url",
        Some(json!({"title": "React"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and provider are required");
}

#[tokio::test]
async fn insights_validate_input() {
    let (app, _) = app_with(&[("insights", "  Start with fundamentals.  ")]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/insights",
        Some(json!({"courses": [course("React", "Udemy")], "userQuery": "react"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insights"], "Start with fundamentals.");

    let (status, body) = send(
        &app,
        "POST",
        "/api/insights",
        Some(json!({"courses": [], "userQuery": "react"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Valid courses are required");

    let mut bad = course("React", "Udemy");
    bad["level"] = json!("Expert");
    let (status, _) = send(
        &app,
        "POST",
        "/api/insights",
        Some(json!({"courses": [bad], "userQuery": "react"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn insights_upstream_failure_is_a_500() {
    let (app, _) = app_with(&[]).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/insights",
        Some(json!({"courses": [course("React", "Udemy")], "userQuery": "react"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate insights");
}

//=========================================================================================
// Saved courses, bookmarks and dashboard
//=========================================================================================

#[tokio::test]
async fn toggling_twice_restores_saved_courses() {
    let (app, _) = app_with(&[]).await;
    send(&app, "POST", "/api/saved-courses", Some(course("Go", "edX"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/saved-courses/toggle",
        Some(course("Rust", "Udemy")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app,
        "POST",
        "/api/saved-courses/toggle",
        Some(course("Rust", "Udemy")),
    )
    .await;
    assert_eq!(body["saved"], false);

    let (_, body) = send(&app, "GET", "/api/saved-courses", None).await;
    assert_eq!(body, json!([course("Go", "edX")]));
}

#[tokio::test]
async fn adding_twice_keeps_one_entry_and_clear_empties() {
    let (app, _) = app_with(&[]).await;
    send(&app, "POST", "/api/saved-courses", Some(course("Rust", "Udemy"))).await;
    let (_, body) = send(&app, "POST", "/api/saved-courses", Some(course("Rust", "Udemy"))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, status) = send(
        &app,
        "POST",
        "/api/saved-courses/status",
        Some(course("Rust", "Udemy")),
    )
    .await;
    assert_eq!(status["saved"], true);

    let (status, _) = send(&app, "DELETE", "/api/saved-courses", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/api/saved-courses", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn saved_courses_and_bookmarks_use_different_identities() {
    let (app, _) = app_with(&[]).await;

    send(&app, "POST", "/api/saved-courses", Some(course("Intro to Rust", "Udemy"))).await;
    let (_, saved) = send(&app, "POST", "/api/saved-courses", Some(course("intro to rust", "udemy"))).await;
    assert_eq!(saved.as_array().unwrap().len(), 2);

    send(&app, "POST", "/api/bookmarks", Some(course("Intro to Rust", "Udemy"))).await;
    let (_, bookmarks) = send(&app, "POST", "/api/bookmarks", Some(course("intro  to rust", "udemy"))).await;
    assert_eq!(bookmarks.as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        "POST",
        "/api/bookmarks/remove",
        Some(course("INTRO TO RUST", "UDEMY")),
    )
    .await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn saved_course_requires_valid_level() {
    let (app, _) = app_with(&[]).await;
    let mut bad = course("Rust", "Udemy");
    bad["level"] = json!("Guru");
    let (status, body) = send(&app, "POST", "/api/saved-courses", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid course level 'Guru'");
}

#[tokio::test]
async fn dashboard_filters_saved_courses() {
    let (app, _) = app_with(&[]).await;
    send(&app, "POST", "/api/saved-courses", Some(course("Rust", "Udemy"))).await;
    send(&app, "POST", "/api/saved-courses", Some(course("Go", "edX"))).await;
    send(&app, "POST", "/api/bookmarks", Some(course("Go", "edX"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/dashboard",
        Some(json!({"provider": "Udemy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalSaved"], 2);
    assert_eq!(body["stats"]["byLevel"]["Beginner"], 2);
    assert_eq!(body["activeFilters"], 1);
    assert_eq!(body["courses"], json!([course("Rust", "Udemy")]));

    let (_, body) = send(
        &app,
        "POST",
        "/api/dashboard",
        Some(json!({"bookmarkedOnly": true})),
    )
    .await;
    assert_eq!(body["courses"], json!([course("Go", "edX")]));

    let (status, body) = send(&app, "POST", "/api/dashboard", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activeFilters"], 0);
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);
}

#[test]
fn openapi_documents_dashboard_filters() {
    let doc = ApiDoc::openapi();
    let schemas = doc.components.expect("components").schemas;
    assert!(schemas.contains_key("DashboardRequest"));

    let dashboard = doc.paths.paths.get("/api/dashboard").expect("dashboard path");
    let post = dashboard.post.as_ref().expect("dashboard is a POST");
    assert!(post.request_body.is_some());
}

//=========================================================================================
// Chat sessions
//=========================================================================================

#[tokio::test]
async fn chat_session_flow() {
    let (app, completion) = app_with(&[("rec", COURSES)]).await;

    let (status, session) = send(&app, "POST", "/api/chat/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = session["id"].as_str().unwrap().to_string();
    assert_eq!(session["messages"].as_array().unwrap().len(), 1);

    let uri = format!("/api/chat/sessions/{}/messages", id);
    let (_, body) = send(&app, "POST", &uri, Some(json!({"content": "hello there"}))).await;
    assert_eq!(body["outcome"], "declined");
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);

    let (_, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({"content": "I want to learn web development with React"})),
    )
    .await;
    assert_eq!(body["outcome"], "recommended");
    let recommendation = &body["recommendations"][0];
    let user_message = &body["messages"][3];
    assert_eq!(user_message["role"], "user");
    assert_eq!(recommendation["requestId"], user_message["id"]);
    assert_eq!(body["recommendationId"], recommendation["id"]);

    let feedback_uri = format!("/api/chat/sessions/{}/feedback", id);
    let (status, body) = send(
        &app,
        "POST",
        &feedback_uri,
        Some(json!({"recommendationId": recommendation["id"], "positive": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"], json!([]));

    let (status, _) = send(&app, "DELETE", &format!("/api/chat/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/chat/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// A completion service that never answers.
struct StalledCompletion;

#[async_trait]
impl CompletionService for StalledCompletion {
    async fn complete(&self, _model: &str, _prompt: &str) -> PortResult<String> {
        std::future::pending::<PortResult<String>>().await
    }
}

#[tokio::test]
async fn session_stays_readable_while_a_turn_is_pending() {
    let store = Arc::new(SqliteKvStore::in_memory().await.expect("in-memory store"));
    let state = Arc::new(AppState::new(Arc::new(StalledCompletion), store, models()));
    let app = api_router(state);

    let (_, session) = send(&app, "POST", "/api/chat/sessions", None).await;
    let id = session["id"].as_str().unwrap().to_string();

    let turn_app = app.clone();
    let turn_uri = format!("/api/chat/sessions/{}/messages", id);
    let turn = tokio::spawn(async move {
        send(
            &turn_app,
            "POST",
            &turn_uri,
            Some(json!({"content": "I want to learn web development with React"})),
        )
        .await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let read = tokio::time::timeout(
        Duration::from_secs(2),
        send(&app, "GET", &format!("/api/chat/sessions/{}", id), None),
    )
    .await;
    let (status, body) = read.expect("reading the session must not wait for the model");
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["role"], "user");

    assert!(!turn.is_finished());
    turn.abort();
}

#[tokio::test]
async fn unknown_chat_session_is_404() {
    let (app, _) = app_with(&[]).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/chat/sessions/00000000-0000-0000-0000-000000000000/messages",
        Some(json!({"content": "I want to learn web development"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}
