//! services/portal/src/web/rest.rs
//!
//! Contains the Axum handlers for the state-changing endpoints and the master
//! definition of the OpenAPI document.

use crate::web::auth::{
    AuthResponse, LoginRequest, RegisterRequest, SessionResponse, SessionUser,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use classroom_core::dashboard::TeacherSummary;
use classroom_core::{Course, CourseId, NotificationSettings, ProfileUpdate, Progress, User};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::login_handler,
        crate::web::auth::register_handler,
        crate::web::auth::logout_handler,
        crate::web::auth::session_handler,
        enroll_handler,
        manage_courses_handler,
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            AuthResponse,
            SessionResponse,
            SessionUser,
            EnrollResponse,
            CourseInput,
            ManageCoursesResponse
        )
    ),
    tags(
        (name = "Virtual Classroom Portal", description = "Session, enrollment and course management endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The result of an enrollment attempt.
#[derive(Serialize, ToSchema)]
pub struct EnrollResponse {
    pub course_id: u32,
    pub title: String,
    pub enrolled: bool,
    /// `false` when the course was already enrolled.
    pub changed: bool,
}

/// One course in a full course-list replacement.
#[derive(Deserialize, ToSchema)]
pub struct CourseInput {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub enrolled: bool,
    /// Clamped to 0..=100.
    #[serde(default)]
    pub progress: i64,
}

impl From<CourseInput> for Course {
    fn from(input: CourseInput) -> Self {
        Course {
            id: CourseId(input.id),
            title: input.title,
            description: input.description,
            instructor: input.instructor,
            category: input.category,
            enrolled: input.enrolled,
            progress: Progress::new(input.progress),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ManageCoursesResponse {
    pub total_courses: usize,
    pub enrolled_courses: usize,
    pub live_classes: usize,
    pub live_quizzes: usize,
}

impl From<TeacherSummary> for ManageCoursesResponse {
    fn from(summary: TeacherSummary) -> Self {
        Self {
            total_courses: summary.total_courses,
            enrolled_courses: summary.enrolled_courses,
            live_classes: summary.live_classes,
            live_quizzes: summary.live_quizzes,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Enroll the current student in a course.
///
/// Enrolling twice is not an error; the second call reports `changed: false`.
#[utoipa::path(
    post,
    path = "/courses/{id}/enroll",
    responses(
        (status = 200, description = "Course is enrolled", body = EnrollResponse),
        (status = 404, description = "No such course")
    ),
    params(
        ("id" = u32, Path, description = "The course id.")
    )
)]
pub async fn enroll_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let not_found = || (StatusCode::NOT_FOUND, format!("Course '{}' not found", raw_id));
    let id = CourseId::parse(&raw_id).ok_or_else(not_found)?;

    let changed = state.catalog.enroll(id);
    let view = state.catalog.view();
    let course = view.course(id).ok_or_else(not_found)?;

    Ok(Json(EnrollResponse {
        course_id: course.id.0,
        title: course.title.clone(),
        enrolled: course.enrolled,
        changed,
    }))
}

/// Replace the whole course list.
///
/// Later entries that repeat an id are dropped.
#[utoipa::path(
    put,
    path = "/teacher-dashboard/courses",
    request_body = [CourseInput],
    responses(
        (status = 200, description = "Course list replaced", body = ManageCoursesResponse)
    )
)]
pub async fn manage_courses_handler(
    State(state): State<Arc<AppState>>,
    Json(courses): Json<Vec<CourseInput>>,
) -> impl IntoResponse {
    state
        .catalog
        .set_courses(courses.into_iter().map(Course::from).collect());
    Json(ManageCoursesResponse::from(TeacherSummary::from_view(
        &state.catalog.view(),
    )))
}

/// PUT /settings - Save notification preferences
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<NotificationSettings>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    settings.save(state.storage.as_ref()).await.map_err(|e| {
        error!("Failed to save settings: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save settings".to_string(),
        )
    })?;
    Ok(Json(settings))
}

/// PUT /profile - Validate and save the signed-in user's profile
///
/// Every failing field is reported at once as `{"errors": {field: message}}`.
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(update): Json<ProfileUpdate>,
) -> Response {
    let profile = match update.into_profile(user.id) {
        Ok(profile) => profile,
        Err(errors) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response();
        }
    };

    if let Err(e) = profile.save(state.storage.as_ref()).await {
        error!("Failed to save profile: {:?}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save profile".to_string(),
        )
            .into_response();
    }
    Json(profile).into_response()
}
