pub mod auth;
pub mod middleware;
pub mod pages;
pub mod rest;
pub mod state;

pub use middleware::require_access;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    response::Redirect,
    routing::{get, post, put},
    Router,
};
use classroom_core::LOGIN_PATH;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{rest::ApiDoc, state::AppState};

/// The router with trailing slashes trimmed before routing, so `/profile/`
/// reaches the same handler and guard decision as `/profile`.
pub type PortalService = NormalizePath<Router>;

/// Everything the server exposes: the portal routes plus Swagger UI.
pub fn portal_service(state: Arc<AppState>) -> PortalService {
    let router = app_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    NormalizePath::trim_trailing_slash(router)
}

/// Builds the portal router: public sign-in routes, guarded pages, and a
/// catch-all that sends unknown paths to the login screen.
pub fn app_router(state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/login", get(auth::login_page_handler))
        .route("/register", get(auth::register_page_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/session", get(auth::session_handler));

    // Guarded routes; `route_layer` keeps the guard off unmatched paths
    let guarded_routes = Router::new()
        .route("/", get(pages::home_handler))
        .route("/dashboard", get(pages::student_dashboard_handler))
        .route("/teacher-dashboard", get(pages::teacher_dashboard_handler))
        .route(
            "/teacher-dashboard/courses",
            get(pages::manage_courses_page_handler).put(rest::manage_courses_handler),
        )
        .route("/courses", get(pages::courses_handler))
        .route("/courses/{id}", get(pages::course_detail_handler))
        .route("/courses/{id}/enroll", post(rest::enroll_handler))
        .route("/course/{id}", get(pages::course_detail_handler))
        .route("/course/{id}/continue", get(pages::continue_learning_handler))
        .route("/assignments", get(pages::assignments_handler))
        .route("/announcements", get(pages::announcements_handler))
        .route("/discussion", get(pages::discussion_handler))
        .route("/live-quizzes", get(pages::live_quizzes_handler))
        .route("/live-classes", get(pages::live_classes_handler))
        .route(
            "/profile",
            get(pages::profile_handler).put(rest::update_profile_handler),
        )
        .route(
            "/settings",
            get(pages::settings_handler).put(rest::update_settings_handler),
        )
        .route("/backend/hello", get(pages::backend_hello_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_access,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    Router::new()
        .merge(public_routes)
        .merge(guarded_routes)
        .fallback(|| async { Redirect::to(LOGIN_PATH) })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
