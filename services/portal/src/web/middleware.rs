//! services/portal/src/web/middleware.rs
//!
//! The route guard wrapped around every page.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use classroom_core::{Decision, LOGIN_PATH};
use std::sync::Arc;
use tracing::{debug, info};

use crate::web::state::AppState;

/// Middleware that asks the route table whether the requested page may render.
///
/// Waits for the startup restore first, so nobody is bounced to the login screen
/// while a persisted session is still loading. On `Render` the signed-in `User`
/// and the matched `Page` are inserted into the request extensions.
pub async fn require_access(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    // 1. Requested path, query included, so login can send the user back
    let requested = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    // 2. Current session, once the startup restore has finished
    let session = state.session.ready().await;

    // 3. Decide
    match state.routes.authorize(&session, &requested) {
        Decision::Render => {
            if let Some(user) = session.user {
                req.extensions_mut().insert(user);
            }
            if let Some(matched) = state.routes.resolve(&requested) {
                req.extensions_mut().insert(matched.route.page);
            }
            next.run(req).await
        }
        Decision::RedirectToLogin { from } => {
            let target = match from {
                Some(from) => format!("{}?from={}", LOGIN_PATH, urlencoding::encode(&from)),
                None => LOGIN_PATH.to_string(),
            };
            info!(path = %requested, "Not signed in, redirecting to login");
            Redirect::to(&target).into_response()
        }
        Decision::RedirectToRoleHome(role) => {
            info!(path = %requested, %role, "Role not allowed, redirecting to role home");
            Redirect::to(role.home_path()).into_response()
        }
        Decision::Loading => {
            // `ready()` has returned, so the store cannot be loading any more.
            debug!(path = %requested, "Session still loading");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
