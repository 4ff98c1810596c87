use crate::error::{Result, WorkspaceError};
use crate::form::{FormArchiver, SqlFormArchiver};
use crate::store::{self, NewWorkspace, WorkspaceFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

pub const WORKSPACE_TITLE_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub title: String,
    pub admin: String,
    pub form_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpdateWorkspaceTitleRequest {
    pub workspace_id: String,
    pub title: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteWorkspaceRequest {
    pub workspace_id: String,
    pub user_id: String,
    pub should_delete_forms: bool,
}

/// Moves `form_ids` into the destination workspace.
///
/// An empty `source_workspace_id` removes the forms from every workspace of
/// the user instead of a single named one.
#[derive(Debug, Clone)]
pub struct MoveFormsRequest {
    pub user_id: String,
    pub source_workspace_id: String,
    pub dest_workspace_id: String,
    pub form_ids: Vec<String>,
}

/// Trim a workspace title and check it against the schema limits.
pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();

    if title.is_empty() {
        return Err(WorkspaceError::Validation(
            "Workspace title must not be empty".to_string(),
        ));
    }

    if title.chars().count() > WORKSPACE_TITLE_MAX_LENGTH {
        return Err(WorkspaceError::Validation(format!(
            "Workspace title must be at most {} characters",
            WORKSPACE_TITLE_MAX_LENGTH
        )));
    }

    if title.chars().any(char::is_control) {
        return Err(WorkspaceError::Validation(
            "Workspace title contains control characters".to_string(),
        ));
    }

    Ok(title.to_string())
}

fn dedup_form_ids(form_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    form_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Workspace ownership operations for one admin at a time.
///
/// Every multi-step mutation runs in a single transaction opened here; the
/// transaction is dropped (rolled back) on any early return.
#[derive(Clone)]
pub struct WorkspaceService {
    pool: SqlitePool,
    archiver: Arc<dyn FormArchiver>,
}

impl WorkspaceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_archiver(pool, Arc::new(SqlFormArchiver))
    }

    pub fn with_archiver(pool: SqlitePool, archiver: Arc<dyn FormArchiver>) -> Self {
        Self { pool, archiver }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// List the workspaces administered by `user_id`
    #[instrument(skip(self))]
    pub async fn get_workspaces(&self, user_id: &str) -> Result<Vec<Workspace>> {
        let mut conn = self.pool.acquire().await?;
        store::list_by_admin(&mut conn, user_id).await
    }

    /// Get a single workspace by ID
    #[instrument(skip(self))]
    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        let mut conn = self.pool.acquire().await?;
        store::find_by_id(&mut conn, workspace_id)
            .await?
            .ok_or_else(|| WorkspaceError::NotFound(workspace_id.to_string()))
    }

    /// Create a new, empty workspace
    #[instrument(skip(self))]
    pub async fn create_workspace(&self, user_id: &str, title: &str) -> Result<Workspace> {
        let title = validate_title(title)?;
        let id = Uuid::new_v4().to_string();

        let mut conn = self.pool.acquire().await?;
        store::insert(
            &mut conn,
            &NewWorkspace {
                id: &id,
                title: &title,
                admin: user_id,
                now: Utc::now(),
            },
        )
        .await?;

        info!("Created workspace {} for {}", id, user_id);

        store::find_by_id(&mut conn, &id)
            .await?
            .ok_or(WorkspaceError::NotFound(id))
    }

    #[instrument(skip(self, req), fields(workspace_id = %req.workspace_id, user_id = %req.user_id))]
    pub async fn update_workspace_title(
        &self,
        req: UpdateWorkspaceTitleRequest,
    ) -> Result<Workspace> {
        let title = validate_title(&req.title)?;

        let mut conn = self.pool.acquire().await?;
        let matched = store::update_title(
            &mut conn,
            &req.workspace_id,
            &req.user_id,
            &title,
            Utc::now(),
        )
        .await?;

        if matched == 0 {
            return Err(WorkspaceError::NotFound(req.workspace_id));
        }

        store::find_by_id(&mut conn, &req.workspace_id)
            .await?
            .ok_or(WorkspaceError::NotFound(req.workspace_id))
    }

    /// Delete a workspace, archiving its forms when asked to.
    ///
    /// The deletion and the archival commit together or not at all.
    #[instrument(
        skip(self, req),
        fields(
            workspace_id = %req.workspace_id,
            user_id = %req.user_id,
            should_delete_forms = req.should_delete_forms
        )
    )]
    pub async fn delete_workspace(&self, req: DeleteWorkspaceRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let workspace = store::find_owned(&mut tx, &req.workspace_id, &req.user_id)
            .await?
            .ok_or_else(|| WorkspaceError::NotFound(req.workspace_id.clone()))?;

        if store::delete_owned(&mut tx, &workspace.id, &req.user_id).await? == 0 {
            return Err(WorkspaceError::NotFound(req.workspace_id));
        }

        if req.should_delete_forms && !workspace.form_ids.is_empty() {
            self.archiver
                .archive_forms(&mut tx, &workspace.form_ids, &req.user_id)
                .await?;
        }

        tx.commit().await?;

        info!(
            "Deleted workspace {} ({} form(s), archived: {})",
            workspace.id,
            workspace.form_ids.len(),
            req.should_delete_forms
        );

        Ok(())
    }

    /// Move forms into the destination workspace and return it refreshed.
    #[instrument(
        skip(self, req),
        fields(
            user_id = %req.user_id,
            source = %req.source_workspace_id,
            dest = %req.dest_workspace_id,
            count = req.form_ids.len()
        )
    )]
    pub async fn move_forms(&self, req: MoveFormsRequest) -> Result<Workspace> {
        let form_ids = dedup_form_ids(&req.form_ids);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let dest_filter = WorkspaceFilter::owned(&req.dest_workspace_id, &req.user_id);
        if !store::exists(&mut tx, &dest_filter).await? {
            return Err(WorkspaceError::NotFound(req.dest_workspace_id));
        }

        if req.source_workspace_id.is_empty() {
            store::remove_form_ids_from_all(&mut tx, &req.user_id, &form_ids, now).await?;
        } else {
            store::remove_form_ids(
                &mut tx,
                &req.source_workspace_id,
                &req.user_id,
                &form_ids,
                now,
            )
            .await?;
        }

        store::add_form_ids(&mut tx, &req.dest_workspace_id, &form_ids, now).await?;

        let dest = store::find_by_id(&mut tx, &req.dest_workspace_id)
            .await?
            .ok_or_else(|| WorkspaceError::NotFound(req.dest_workspace_id.clone()))?;

        tx.commit().await?;

        info!(
            "Moved {} form(s) into workspace {}",
            form_ids.len(),
            dest.id
        );

        Ok(dest)
    }

    /// Succeeds only when `user_id` administers `workspace_id`.
    ///
    /// A missing workspace and a foreign one both yield `Forbidden`.
    #[instrument(skip(self))]
    pub async fn verify_workspace_admin(&self, workspace_id: &str, user_id: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;

        if store::exists(&mut conn, &WorkspaceFilter::owned(workspace_id, user_id)).await? {
            Ok(true)
        } else {
            Err(WorkspaceError::Forbidden(format!(
                "User {} is not the admin of workspace {}",
                user_id, workspace_id
            )))
        }
    }

    #[instrument(skip(self))]
    pub async fn check_workspace_exists(&self, workspace_id: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;

        if store::exists(&mut conn, &WorkspaceFilter::by_id(workspace_id)).await? {
            Ok(true)
        } else {
            Err(WorkspaceError::NotFound(workspace_id.to_string()))
        }
    }
}
