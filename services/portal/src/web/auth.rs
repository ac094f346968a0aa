//! services/portal/src/web/auth.rs
//!
//! Sign-in, sign-up and sign-out endpoints, plus the two public screens.
//!
//! There is no credential check: any non-empty email and password signs in, and
//! the role is inferred from the email address.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use classroom_core::domain::UnknownRole;
use classroom_core::{RegistrationRequest, Role, SessionSnapshot, User, LOGIN_PATH};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

const SIGN_IN_FAILED: &str = "Failed to sign in. Please check your credentials.";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Display name; defaults to "Demo User".
    #[serde(default)]
    pub name: Option<String>,
    /// Path to return to after signing in.
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// `student` or `teacher`.
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: SessionUser,
    /// Where the client should navigate next.
    pub redirect_to: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub is_authenticated: bool,
    pub loading: bool,
    pub user: Option<SessionUser>,
}

impl From<&SessionSnapshot> for SessionResponse {
    fn from(session: &SessionSnapshot) -> Self {
        Self {
            is_authenticated: session.is_authenticated(),
            loading: session.loading,
            user: session.user.as_ref().map(SessionUser::from),
        }
    }
}

#[derive(Deserialize)]
pub struct ReturnPath {
    pub from: Option<String>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Emails mentioning "teacher" sign in as teachers, everything else as students.
pub fn infer_role(email: &str) -> Role {
    if email.to_lowercase().contains("teacher") {
        Role::Teacher
    } else {
        Role::Student
    }
}

/// Only same-site absolute paths are followed; anything else goes to the role home.
fn post_login_target(from: Option<String>, role: Role) -> String {
    from.filter(|p| is_local_path(p) && !p.starts_with(LOGIN_PATH))
        .unwrap_or_else(|| role.home_path().to_string())
}

/// Browsers read a backslash as `/` and drop tabs and newlines, so either can
/// turn a path into a protocol-relative URL.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /login - Describe the sign-in screen
pub async fn login_page_handler(Query(query): Query<ReturnPath>) -> impl IntoResponse {
    Json(json!({
        "page": "login",
        "from": query.from,
        "demo_accounts": [
            { "role": "student", "email": "student@example.com", "password": "student123" },
            { "role": "teacher", "email": "teacher@example.com", "password": "teacher123" },
        ],
    }))
}

/// GET /register - Describe the sign-up screen
pub async fn register_page_handler() -> impl IntoResponse {
    Json(json!({
        "page": "register",
        "roles": [Role::Student.as_str(), Role::Teacher.as_str()],
    }))
}

/// POST /auth/login - Sign in
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Email or password missing"),
        (status = 500, description = "The session could not be persisted")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Both fields are required, nothing else is checked
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required".to_string(),
        ));
    }

    // 2. Build the user
    let user = User {
        id: Uuid::new_v4(),
        name: req.name.unwrap_or_else(|| "Demo User".to_string()),
        role: infer_role(&req.email),
        email: req.email.trim().to_string(),
    };
    let token = format!("mock-token-{}", Uuid::new_v4());

    // 3. Persist and publish the session
    let session = state.session.login(user, token).await.map_err(|e| {
        error!("Failed to sign in: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, SIGN_IN_FAILED.to_string())
    })?;

    respond_signed_in(&session, req.from, StatusCode::OK)
}

/// POST /auth/register - Create a local account and sign in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Missing field or unknown role"),
        (status = 500, description = "The session could not be persisted")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let role: Role = req
        .role
        .parse()
        .map_err(|e: UnknownRole| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Name and email are required".to_string(),
        ));
    }

    let session = state
        .session
        .register(RegistrationRequest {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            role,
        })
        .await
        .map_err(|e| {
            error!("Failed to register: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, SIGN_IN_FAILED.to_string())
        })?;

    respond_signed_in(&session, None, StatusCode::CREATED)
}

/// POST /auth/logout - Sign out
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Signed out")
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.logout().await;
    Json(json!({ "redirect_to": LOGIN_PATH }))
}

/// GET /auth/session - The current session, without waiting for the restore
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse)
    )
)]
pub async fn session_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(SessionResponse::from(&state.session.snapshot()))
}

fn respond_signed_in(
    session: &SessionSnapshot,
    from: Option<String>,
    status: StatusCode,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    let user = session.user.as_ref().ok_or_else(|| {
        error!("Session published without a user after sign-in");
        (StatusCode::INTERNAL_SERVER_ERROR, SIGN_IN_FAILED.to_string())
    })?;

    Ok((
        status,
        Json(AuthResponse {
            redirect_to: post_login_target(from, user.role),
            user: SessionUser::from(user),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_inferred_from_the_email() {
        assert_eq!(infer_role("teacher@example.com"), Role::Teacher);
        assert_eq!(infer_role("Head.Teacher@school.edu"), Role::Teacher);
        assert_eq!(infer_role("student@example.com"), Role::Student);
    }

    #[test]
    fn only_local_return_paths_are_followed() {
        assert_eq!(
            post_login_target(Some("/assignments?tab=upcoming".to_string()), Role::Student),
            "/assignments?tab=upcoming"
        );
        assert_eq!(
            post_login_target(Some("https://evil.example".to_string()), Role::Student),
            "/dashboard"
        );
        assert_eq!(
            post_login_target(Some("//evil.example".to_string()), Role::Teacher),
            "/teacher-dashboard"
        );
        assert_eq!(post_login_target(None, Role::Teacher), "/teacher-dashboard");
    }

    #[test]
    fn backslash_and_control_character_paths_are_not_followed() {
        for from in ["/\\evil.example", "\\\\evil.example", "/\\/evil.example", "/\t/evil.example"] {
            assert_eq!(
                post_login_target(Some(from.to_string()), Role::Student),
                "/dashboard",
                "{from:?}"
            );
        }
        assert_eq!(
            post_login_target(Some("/courses/5".to_string()), Role::Student),
            "/courses/5"
        );
    }
}
