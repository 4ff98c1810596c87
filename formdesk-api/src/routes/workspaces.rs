use crate::{
    auth::{check_workspace_admin, AuthenticatedUser},
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use formdesk_workspace::{
    DeleteWorkspaceRequest, MoveFormsRequest, UpdateWorkspaceTitleRequest, Workspace,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/workspaces",
            get(list_workspaces).post(create_workspace),
        )
        .route("/api/v1/workspaces/{id}", delete(delete_workspace))
        .route("/api/v1/workspaces/{id}/title", put(update_workspace_title))
        .route("/api/v1/workspaces/{id}/move", post(move_forms))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWorkspaceBody {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateWorkspaceTitleBody {
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteWorkspaceBody {
    #[serde(default)]
    pub should_delete_forms: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveFormsBody {
    /// Empty to take the forms out of every workspace of the caller
    #[serde(default)]
    pub source_workspace_id: String,
    pub form_ids: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces",
    tag = "workspaces",
    responses((status = 200, description = "Workspaces of the caller", body = [Workspace]))
)]
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Workspace>>> {
    let workspaces = state.service.get_workspaces(&user.username).await?;

    Ok(Json(workspaces))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces",
    tag = "workspaces",
    request_body = CreateWorkspaceBody,
    responses(
        (status = 200, description = "Workspace created", body = Workspace),
        (status = 400, description = "Invalid title")
    )
)]
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateWorkspaceBody>,
) -> ApiResult<Json<Workspace>> {
    let workspace = state
        .service
        .create_workspace(&user.username, &body.title)
        .await?;

    Ok(Json(workspace))
}

#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{id}/title",
    tag = "workspaces",
    params(("id" = String, Path, description = "Workspace id")),
    request_body = UpdateWorkspaceTitleBody,
    responses(
        (status = 200, description = "Workspace renamed", body = Workspace),
        (status = 400, description = "Invalid title"),
        (status = 403, description = "Caller is not the workspace admin"),
        (status = 404, description = "Workspace not found")
    )
)]
pub async fn update_workspace_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateWorkspaceTitleBody>,
) -> ApiResult<Json<Workspace>> {
    check_workspace_admin(&state.service, &id, &user).await?;

    let workspace = state
        .service
        .update_workspace_title(UpdateWorkspaceTitleRequest {
            workspace_id: id,
            title: body.title,
            user_id: user.username,
        })
        .await?;

    Ok(Json(workspace))
}

#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}",
    tag = "workspaces",
    params(("id" = String, Path, description = "Workspace id")),
    request_body = DeleteWorkspaceBody,
    responses(
        (status = 200, description = "Workspace deleted"),
        (status = 403, description = "Caller is not the workspace admin"),
        (status = 404, description = "Workspace not found")
    )
)]
pub async fn delete_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Option<Json<DeleteWorkspaceBody>>,
) -> ApiResult<Json<Value>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();

    check_workspace_admin(&state.service, &id, &user).await?;

    state
        .service
        .delete_workspace(DeleteWorkspaceRequest {
            workspace_id: id,
            user_id: user.username,
            should_delete_forms: body.should_delete_forms,
        })
        .await?;

    Ok(Json(json!({ "message": "Workspace deleted" })))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/move",
    tag = "workspaces",
    params(("id" = String, Path, description = "Destination workspace id")),
    request_body = MoveFormsBody,
    responses(
        (status = 200, description = "Destination workspace after the move", body = Workspace),
        (status = 400, description = "No forms given"),
        (status = 403, description = "Caller is not the workspace admin"),
        (status = 404, description = "Workspace not found")
    )
)]
pub async fn move_forms(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<MoveFormsBody>,
) -> ApiResult<Json<Workspace>> {
    let has_blank_id = body.form_ids.iter().any(|form_id| form_id.trim().is_empty());
    if body.form_ids.is_empty() || has_blank_id {
        return Err(ApiError::BadRequest(
            "formIds must be a non-empty list of form ids".to_string(),
        ));
    }

    check_workspace_admin(&state.service, &id, &user).await?;

    let workspace = state
        .service
        .move_forms(MoveFormsRequest {
            user_id: user.username,
            source_workspace_id: body.source_workspace_id,
            dest_workspace_id: id,
            form_ids: body.form_ids,
        })
        .await?;

    Ok(Json(workspace))
}
