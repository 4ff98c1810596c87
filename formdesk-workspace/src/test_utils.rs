use crate::form::{create_form, find_form, Form, FormStatus, NewForm};
use crate::workspace::{MoveFormsRequest, Workspace, WorkspaceService};
use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations applied
pub async fn create_test_db() -> SqlitePool {
    crate::db::create_memory_pool()
        .await
        .expect("Failed to create in-memory database")
}

/// Fixture: a public form owned by `admin`
pub async fn fixture_form(pool: &SqlitePool, title: &str, admin: &str) -> Form {
    create_form(
        pool,
        NewForm {
            title: title.to_string(),
            admin: admin.to_string(),
            status: FormStatus::Public,
        },
    )
    .await
    .expect("Failed to create fixture form")
}

/// Current status of a stored form
pub async fn form_status(pool: &SqlitePool, id: &str) -> FormStatus {
    find_form(pool, id)
        .await
        .expect("Failed to load form")
        .expect("Form missing")
        .status
}

/// Fixture: a workspace owned by `admin` containing `form_ids`
///
/// The forms are placed with the workspace as its own move source, so other
/// workspaces of the same admin keep their memberships.
pub async fn fixture_workspace(
    pool: &SqlitePool,
    title: &str,
    admin: &str,
    form_ids: &[&str],
) -> Workspace {
    let service = WorkspaceService::new(pool.clone());
    let workspace = service
        .create_workspace(admin, title)
        .await
        .expect("Failed to create fixture workspace");

    if form_ids.is_empty() {
        return workspace;
    }

    service
        .move_forms(MoveFormsRequest {
            user_id: admin.to_string(),
            source_workspace_id: workspace.id.clone(),
            dest_workspace_id: workspace.id,
            form_ids: ids(form_ids),
        })
        .await
        .expect("Failed to seed fixture workspace forms")
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
