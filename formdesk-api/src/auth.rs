use crate::error::ApiResult;
use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use formdesk_workspace::WorkspaceService;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Auth middleware - extracts the admin identity from proxy headers
///
/// The session layer in front of formdesk-api sets `x-formdesk-user` once the
/// admin has logged in. `x-forwarded-user` (oauth2-proxy) and the bare
/// `x-user` header are accepted for local development.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let username = req
        .headers()
        .get("x-formdesk-user")
        .or_else(|| req.headers().get("x-forwarded-user"))
        .or_else(|| req.headers().get("x-user"))
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let username = username.ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(AuthenticatedUser { username });

    Ok(next.run(req).await)
}

/// Check that the workspace exists and the authenticated user administers it
///
/// Returns:
/// - ApiError::NotFound if the workspace doesn't exist
/// - ApiError::Forbidden if the workspace exists but belongs to someone else
pub async fn check_workspace_admin(
    service: &WorkspaceService,
    workspace_id: &str,
    user: &AuthenticatedUser,
) -> ApiResult<()> {
    service.check_workspace_exists(workspace_id).await?;
    service
        .verify_workspace_admin(workspace_id, &user.username)
        .await?;

    Ok(())
}
