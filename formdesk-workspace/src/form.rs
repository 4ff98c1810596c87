//! Forms referenced by workspaces, and their archival.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub title: String,
    pub admin: String,
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Private,
    Public,
    Archived,
}

/// Marks forms archived on behalf of a workspace operation.
///
/// Implementations write through `conn` so the archival commits or rolls
/// back together with the caller's transaction, and must return every
/// failure so that transaction aborts.
#[async_trait]
pub trait FormArchiver: Send + Sync {
    async fn archive_forms(
        &self,
        conn: &mut SqliteConnection,
        form_ids: &[String],
        user_id: &str,
    ) -> Result<()>;
}

/// Archives forms in the `forms` table. Only forms owned by `user_id` change;
/// unknown ids are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFormArchiver;

#[async_trait]
impl FormArchiver for SqlFormArchiver {
    #[instrument(skip(self, conn, form_ids), fields(count = form_ids.len()))]
    async fn archive_forms(
        &self,
        conn: &mut SqliteConnection,
        form_ids: &[String],
        user_id: &str,
    ) -> Result<()> {
        let now = Utc::now().timestamp();
        let mut savepoint = conn.begin().await?;

        let mut archived = 0;
        for form_id in form_ids {
            let result = sqlx::query(
                "UPDATE forms SET status = ?, updated_at = ? WHERE id = ? AND admin = ? AND status != ?",
            )
            .bind(FormStatus::Archived)
            .bind(now)
            .bind(form_id)
            .bind(user_id)
            .bind(FormStatus::Archived)
            .execute(&mut *savepoint)
            .await?;
            archived += result.rows_affected();
        }

        savepoint.commit().await?;
        debug!("Archived {} form(s)", archived);

        Ok(())
    }
}

/// Insert payload for seeding a form.
#[derive(Debug, Clone)]
pub struct NewForm {
    pub title: String,
    pub admin: String,
    pub status: FormStatus,
}

pub async fn create_form(pool: &SqlitePool, new: NewForm) -> Result<Form> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO forms (id, title, admin, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.admin)
    .bind(new.status)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_form(pool, &id)
        .await?
        .ok_or_else(|| crate::WorkspaceError::Database(format!("form {} vanished after insert", id)))
}

pub async fn find_form(pool: &SqlitePool, id: &str) -> Result<Option<Form>> {
    let row = sqlx::query_as::<_, FormRow>("SELECT * FROM forms WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Into::into))
}

#[derive(sqlx::FromRow)]
struct FormRow {
    id: String,
    title: String,
    admin: String,
    status: FormStatus,
    created_at: i64,
    updated_at: i64,
}

impl From<FormRow> for Form {
    fn from(row: FormRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            admin: row.admin,
            status: row.status,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
        }
    }
}
