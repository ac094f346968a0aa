//! services/portal/src/web/pages.rs
//!
//! Read-only page handlers. Every handler here sits behind `require_access`, so
//! the signed-in `User` and the matched `Page` are always in the request extensions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use classroom_core::dashboard::{
    filter_assignments, filter_discussions, navigation, paginate, AssignmentTab, DiscussionTab,
    StudentSummary, TeacherSummary, ANNOUNCEMENTS_PER_PAGE,
};
use classroom_core::{CourseId, NotificationSettings, Page, PortError, Profile, User, LOGIN_PATH};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::web::auth::SessionUser;
use crate::web::state::AppState;

//=========================================================================================
// Query Parameters
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AssignmentQuery {
    pub tab: AssignmentTab,
    pub search: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DiscussionQuery {
    pub tab: DiscussionTab,
    pub search: String,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: usize,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1 }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn page(current: Page, user: &User, path: &str, body: Value) -> Json<Value> {
    let mut page = json!({
        "page": current,
        "user": SessionUser::from(user),
        "navigation": navigation(user.role, path),
    });
    if let (Some(page), Value::Object(body)) = (page.as_object_mut(), body) {
        page.extend(body);
    }
    Json(page)
}

fn course_not_found(raw: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Course '{}' not found", raw))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET / - Send the user to the dashboard for their role
pub async fn home_handler(Extension(user): Extension<User>) -> Redirect {
    Redirect::to(user.role.home_path())
}

/// GET /dashboard
pub async fn student_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    let upcoming = filter_assignments(&view, AssignmentTab::Upcoming, "");

    page(
        current,
        &user,
        "/dashboard",
        json!({
            "summary": StudentSummary::from_view(&view),
            "enrolled_courses": view.enrolled_courses().collect::<Vec<_>>(),
            "upcoming_assignments": upcoming,
            "announcements": view.announcements(),
        }),
    )
}

/// GET /teacher-dashboard
pub async fn teacher_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let view = state.catalog.view();

    page(
        current,
        &user,
        "/teacher-dashboard",
        json!({
            "summary": TeacherSummary::from_view(&view),
            "courses": view.courses(),
            "live_classes": view.live_classes(),
        }),
    )
}

/// GET /teacher-dashboard/courses
pub async fn manage_courses_page_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    page(
        current,
        &user,
        "/teacher-dashboard/courses",
        json!({ "version": view.version(), "courses": view.courses() }),
    )
}

/// GET /courses
pub async fn courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    page(current, &user, "/courses", json!({ "courses": view.courses() }))
}

/// GET /courses/{id} and GET /course/{id}
pub async fn course_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = state.catalog.view();
    let course = CourseId::parse(&raw_id)
        .and_then(|id| view.course(id))
        .ok_or_else(|| course_not_found(&raw_id))?;

    let assignments: Vec<_> = view
        .assignments()
        .iter()
        .filter(|a| a.course_id == course.id)
        .collect();

    Ok(page(
        current,
        &user,
        "/courses",
        json!({ "course": course, "assignments": assignments }),
    ))
}

/// GET /course/{id}/continue - Resume an enrolled course
pub async fn continue_learning_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = state.catalog.view();
    let course = CourseId::parse(&raw_id)
        .and_then(|id| view.course(id))
        .filter(|c| view.is_enrolled(c.id))
        .ok_or_else(|| course_not_found(&raw_id))?;

    Ok(page(
        current,
        &user,
        "/courses",
        json!({ "course": course, "progress": course.progress }),
    ))
}

/// GET /assignments?tab=&search=
pub async fn assignments_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
    Query(query): Query<AssignmentQuery>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    let assignments = filter_assignments(&view, query.tab, &query.search);

    page(
        current,
        &user,
        "/assignments",
        json!({ "tab": query.tab, "search": query.search, "assignments": assignments }),
    )
}

/// GET /announcements?page=
pub async fn announcements_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    let announcements = paginate(view.announcements(), query.page, ANNOUNCEMENTS_PER_PAGE);

    page(
        current,
        &user,
        "/announcements",
        json!({ "announcements": announcements }),
    )
}

/// GET /discussion?tab=&search=
pub async fn discussion_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
    Query(query): Query<DiscussionQuery>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    let threads = filter_discussions(&view, query.tab, &query.search, &user);

    page(
        current,
        &user,
        "/discussion",
        json!({ "tab": query.tab, "search": query.search, "threads": threads }),
    )
}

/// GET /live-quizzes
pub async fn live_quizzes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    page(
        current,
        &user,
        "/live-quizzes",
        json!({ "quizzes": view.live_quizzes() }),
    )
}

/// GET /live-classes
pub async fn live_classes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let view = state.catalog.view();
    page(
        current,
        &user,
        "/live-classes",
        json!({ "classes": view.live_classes() }),
    )
}

/// GET /profile
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let profile = Profile::load(state.storage.as_ref(), &user).await;
    page(current, &user, "/profile", json!({ "profile": profile }))
}

/// GET /settings
pub async fn settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(current): Extension<Page>,
) -> impl IntoResponse {
    let settings = NotificationSettings::load(state.storage.as_ref()).await;
    let profile = Profile::load(state.storage.as_ref(), &user).await;
    page(
        current,
        &user,
        "/settings",
        json!({ "notifications": settings, "profile": profile }),
    )
}

/// GET /backend/hello - Round-trip through the backend client
///
/// A rejected token has already signed the user out by the time this returns,
/// so the caller is sent to the login screen.
pub async fn backend_hello_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.backend.hello().await {
        Ok(message) => Json(json!({ "message": message })).into_response(),
        Err(PortError::Unauthorized) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => {
            warn!("Backend call failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": "Connection error" })),
            )
                .into_response()
        }
    }
}
