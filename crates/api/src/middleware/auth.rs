//! User-context middleware for protected routes.
//!
//! Authentication happens at the gateway in front of this service; the
//! gateway strips these headers from inbound traffic and re-adds them
//! from the verified session. This middleware only turns them into a
//! [`ReportUserContext`] for handlers.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use sofra_core::report::{ReportRole, ReportUserContext};

/// Verified user id, set by the gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Verified role (`admin` or `branch`), set by the gateway.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Assigned branch for branch-scoped users, set by the gateway.
pub const BRANCH_ID_HEADER: &str = "x-branch-id";

/// Builds the user context from the gateway headers.
fn context_from_headers(headers: &HeaderMap) -> Option<ReportUserContext> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())?;

    let role = match headers.get(USER_ROLE_HEADER)?.to_str().ok()? {
        "admin" => ReportRole::Admin,
        "branch" => ReportRole::Branch,
        _ => return None,
    };

    let branch_id = match headers.get(BRANCH_ID_HEADER) {
        Some(value) => Some(Uuid::parse_str(value.to_str().ok()?).ok()?),
        None => None,
    };

    Some(ReportUserContext {
        user_id,
        role,
        branch_id,
    })
}

/// Middleware that requires a complete user context.
///
/// Stores the context in request extensions for handlers to extract;
/// requests without valid gateway headers are rejected.
pub async fn user_context_middleware(mut request: Request, next: Next) -> Response {
    match context_from_headers(request.headers()) {
        Some(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": "Missing or invalid user context"
            })),
        )
            .into_response(),
    }
}

/// Extractor for the authenticated user context.
///
/// Use this in handlers behind [`user_context_middleware`]:
///
/// ```ignore
/// async fn handler(user: ReportUser) -> impl IntoResponse {
///     let user_id = user.0.user_id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ReportUser(pub ReportUserContext);

impl<S> FromRequestParts<S> for ReportUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ReportUserContext>()
            .cloned()
            .map(ReportUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}
