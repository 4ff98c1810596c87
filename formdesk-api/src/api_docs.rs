use crate::routes::workspaces::{
    CreateWorkspaceBody, DeleteWorkspaceBody, MoveFormsBody, UpdateWorkspaceTitleBody,
};
use formdesk_workspace::Workspace;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::workspaces::list_workspaces,
        crate::routes::workspaces::create_workspace,
        crate::routes::workspaces::update_workspace_title,
        crate::routes::workspaces::delete_workspace,
        crate::routes::workspaces::move_forms,
    ),
    components(
        schemas(
            Workspace,
            CreateWorkspaceBody,
            UpdateWorkspaceTitleBody,
            DeleteWorkspaceBody,
            MoveFormsBody
        )
    ),
    tags(
        (name = "workspaces", description = "Workspace ownership and form grouping"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;
