//! Workspace document access
//!
//! Every function takes the connection it runs on, so the caller decides the
//! transaction scope: a pooled connection for single statements, or
//! `&mut *tx` to make several calls commit or roll back together. A scope
//! opened on a connection that is already inside a transaction becomes a
//! savepoint.

use crate::error::Result;
use crate::workspace::Workspace;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use std::collections::HashMap;

/// Match criteria for existence checks.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceFilter {
    pub id: String,
    pub admin: Option<String>,
}

impl WorkspaceFilter {
    pub fn by_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            admin: None,
        }
    }

    pub fn owned(id: &str, admin: &str) -> Self {
        Self {
            id: id.to_string(),
            admin: Some(admin.to_string()),
        }
    }
}

/// Insert payload for a new workspace document.
#[derive(Debug, Clone)]
pub struct NewWorkspace<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub admin: &'a str,
    pub now: DateTime<Utc>,
}

// Internal row type for sqlx
#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: String,
    title: String,
    admin: String,
    created_at: i64,
    updated_at: i64,
}

impl WorkspaceRow {
    fn into_workspace(self, form_ids: Vec<String>) -> Workspace {
        Workspace {
            id: self.id,
            title: self.title,
            admin: self.admin,
            form_ids,
            created_at: DateTime::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

async fn form_ids_of(conn: &mut SqliteConnection, workspace_id: &str) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT form_id FROM workspace_forms WHERE workspace_id = ? ORDER BY seq",
    )
    .bind(workspace_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

async fn hydrate(
    conn: &mut SqliteConnection,
    row: Option<WorkspaceRow>,
) -> Result<Option<Workspace>> {
    match row {
        Some(row) => {
            let form_ids = form_ids_of(conn, &row.id).await?;
            Ok(Some(row.into_workspace(form_ids)))
        }
        None => Ok(None),
    }
}

/// Point lookup by id.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> Result<Option<Workspace>> {
    let row = sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    hydrate(conn, row).await
}

/// Lookup by id restricted to one admin.
pub async fn find_owned(
    conn: &mut SqliteConnection,
    id: &str,
    admin: &str,
) -> Result<Option<Workspace>> {
    let row =
        sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces WHERE id = ? AND admin = ?")
            .bind(id)
            .bind(admin)
            .fetch_optional(&mut *conn)
            .await?;

    hydrate(conn, row).await
}

pub async fn exists(conn: &mut SqliteConnection, filter: &WorkspaceFilter) -> Result<bool> {
    let found = match &filter.admin {
        Some(admin) => {
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM workspaces WHERE id = ? AND admin = ?")
                .bind(&filter.id)
                .bind(admin)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => {
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM workspaces WHERE id = ?")
                .bind(&filter.id)
                .fetch_optional(&mut *conn)
                .await?
        }
    };

    Ok(found.is_some())
}

/// All workspaces of one admin, ordered by title, with their form ids.
pub async fn list_by_admin(conn: &mut SqliteConnection, admin: &str) -> Result<Vec<Workspace>> {
    let rows = sqlx::query_as::<_, WorkspaceRow>(
        "SELECT * FROM workspaces WHERE admin = ? ORDER BY title, created_at, id",
    )
    .bind(admin)
    .fetch_all(&mut *conn)
    .await?;

    let memberships = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT wf.workspace_id, wf.form_id
        FROM workspace_forms wf
        JOIN workspaces w ON w.id = wf.workspace_id
        WHERE w.admin = ?
        ORDER BY wf.seq
        "#,
    )
    .bind(admin)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_workspace: HashMap<String, Vec<String>> = HashMap::new();
    for (workspace_id, form_id) in memberships {
        by_workspace.entry(workspace_id).or_default().push(form_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let form_ids = by_workspace.remove(&row.id).unwrap_or_default();
            row.into_workspace(form_ids)
        })
        .collect())
}

pub async fn insert(conn: &mut SqliteConnection, new: &NewWorkspace<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO workspaces (id, title, admin, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.id)
    .bind(new.title)
    .bind(new.admin)
    .bind(new.now.timestamp())
    .bind(new.now.timestamp())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Returns the number of matched workspaces (0 or 1).
pub async fn update_title(
    conn: &mut SqliteConnection,
    id: &str,
    admin: &str,
    title: &str,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result =
        sqlx::query("UPDATE workspaces SET title = ?, updated_at = ? WHERE id = ? AND admin = ?")
            .bind(title)
            .bind(now.timestamp())
            .bind(id)
            .bind(admin)
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected())
}

/// Deletes the workspace and its membership rows. Returns the number of
/// workspaces removed (0 or 1).
pub async fn delete_owned(conn: &mut SqliteConnection, id: &str, admin: &str) -> Result<u64> {
    sqlx::query(
        r#"
        DELETE FROM workspace_forms
        WHERE workspace_id IN (SELECT id FROM workspaces WHERE id = ? AND admin = ?)
        "#,
    )
    .bind(id)
    .bind(admin)
    .execute(&mut *conn)
    .await?;

    let result = sqlx::query("DELETE FROM workspaces WHERE id = ? AND admin = ?")
        .bind(id)
        .bind(admin)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Adds form ids that are not already members. Returns how many were added.
pub async fn add_form_ids(
    conn: &mut SqliteConnection,
    workspace_id: &str,
    form_ids: &[String],
    now: DateTime<Utc>,
) -> Result<u64> {
    let mut added = 0;
    for form_id in form_ids {
        let result =
            sqlx::query("INSERT OR IGNORE INTO workspace_forms (workspace_id, form_id) VALUES (?, ?)")
                .bind(workspace_id)
                .bind(form_id)
                .execute(&mut *conn)
                .await?;
        added += result.rows_affected();
    }

    if added > 0 {
        touch(conn, workspace_id, now).await?;
    }

    Ok(added)
}

/// Removes form ids from one workspace of `admin`. Returns how many were removed.
pub async fn remove_form_ids(
    conn: &mut SqliteConnection,
    workspace_id: &str,
    admin: &str,
    form_ids: &[String],
    now: DateTime<Utc>,
) -> Result<u64> {
    let mut removed = 0;
    for form_id in form_ids {
        let result = sqlx::query(
            r#"
            DELETE FROM workspace_forms
            WHERE workspace_id = ? AND form_id = ?
              AND workspace_id IN (SELECT id FROM workspaces WHERE admin = ?)
            "#,
        )
        .bind(workspace_id)
        .bind(form_id)
        .bind(admin)
        .execute(&mut *conn)
        .await?;
        removed += result.rows_affected();
    }

    if removed > 0 {
        touch(conn, workspace_id, now).await?;
    }

    Ok(removed)
}

/// Removes form ids from every workspace of `admin`. Returns how many
/// memberships were removed.
pub async fn remove_form_ids_from_all(
    conn: &mut SqliteConnection,
    admin: &str,
    form_ids: &[String],
    now: DateTime<Utc>,
) -> Result<u64> {
    let mut removed = 0;
    for form_id in form_ids {
        sqlx::query(
            r#"
            UPDATE workspaces SET updated_at = ?
            WHERE admin = ?
              AND id IN (SELECT workspace_id FROM workspace_forms WHERE form_id = ?)
            "#,
        )
        .bind(now.timestamp())
        .bind(admin)
        .bind(form_id)
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM workspace_forms
            WHERE form_id = ?
              AND workspace_id IN (SELECT id FROM workspaces WHERE admin = ?)
            "#,
        )
        .bind(form_id)
        .bind(admin)
        .execute(&mut *conn)
        .await?;
        removed += result.rows_affected();
    }

    Ok(removed)
}

async fn touch(conn: &mut SqliteConnection, workspace_id: &str, now: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE workspaces SET updated_at = ? WHERE id = ?")
        .bind(now.timestamp())
        .bind(workspace_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
