//! Repository for the `revisions` table.
//!
//! Revisions are immutable snapshots written on every page save. Authors are
//! resolved in a second, explicit step through [`UserRepo::find_by_ids`].

use std::collections::HashMap;

use pagelog_core::revision_history::{group_edit_sessions, EditSession};
use pagelog_core::types::DbId;
use sqlx::PgPool;

use crate::models::revision::{CreateRevision, Revision, RevisionWithAuthor, UpdateRevisionList};
use crate::repositories::UserRepo;

/// Column list for revisions queries.
const COLUMNS: &str = "id, path, body, format, author_id, created_at";

/// Newest first; `id` breaks ties between revisions saved in the same instant.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// Provides create, read, and path-rename operations for page revisions.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Persist a prepared revision, returning the stored row.
    pub async fn create(pool: &PgPool, input: &CreateRevision) -> Result<Revision, sqlx::Error> {
        let query = format!(
            "INSERT INTO revisions (path, body, format, author_id, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let revision = sqlx::query_as::<_, Revision>(&query)
            .bind(&input.path)
            .bind(&input.body)
            .bind(&input.format)
            .bind(input.author_id)
            .bind(input.created_at)
            .fetch_one(pool)
            .await?;

        tracing::debug!(id = revision.id, path = %revision.path, "Revision created");
        Ok(revision)
    }

    /// The most recent revision of a path, without author resolution.
    pub async fn find_latest(pool: &PgPool, path: &str) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE path = $1
             {NEWEST_FIRST}
             LIMIT 1"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(path)
            .fetch_optional(pool)
            .await
    }

    /// Find a revision by id with its author resolved.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RevisionWithAuthor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM revisions WHERE id = $1");
        let revision = sqlx::query_as::<_, Revision>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match revision {
            Some(revision) => Ok(Self::attach_authors(pool, vec![revision]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Find every revision whose id is in `ids`, newest first, authors resolved.
    ///
    /// Unknown ids are skipped. Callers holding untyped input should parse it
    /// with [`pagelog_core::revision::parse_revision_ids`] first.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<RevisionWithAuthor>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE id = ANY($1)
             {NEWEST_FIRST}"
        );
        let revisions = sqlx::query_as::<_, Revision>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Self::attach_authors(pool, revisions).await
    }

    /// Full history of a path, newest first, authors resolved.
    pub async fn list_by_path(
        pool: &PgPool,
        path: &str,
    ) -> Result<Vec<RevisionWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE path = $1
             {NEWEST_FIRST}"
        );
        let revisions = sqlx::query_as::<_, Revision>(&query)
            .bind(path)
            .fetch_all(pool)
            .await?;

        tracing::debug!(path, count = revisions.len(), "Loaded revision history");
        Self::attach_authors(pool, revisions).await
    }

    /// Full history of a path folded into edit sessions.
    pub async fn list_grouped_by_path(
        pool: &PgPool,
        path: &str,
    ) -> Result<Vec<EditSession<RevisionWithAuthor>>, sqlx::Error> {
        let revisions = Self::list_by_path(pool, path).await?;
        let sessions = group_edit_sessions(revisions);
        tracing::debug!(path, sessions = sessions.len(), "Grouped revision history");
        Ok(sessions)
    }

    /// Number of revisions stored for a path.
    pub async fn count_by_path(pool: &PgPool, path: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM revisions WHERE path = $1")
            .bind(path)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Apply `update` to every revision of `path`. Returns the rows affected.
    ///
    /// Used when a page is renamed. Not coordinated with concurrent readers:
    /// the rename is a single statement, nothing more.
    pub async fn update_list_by_path(
        pool: &PgPool,
        path: &str,
        update: &UpdateRevisionList,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE revisions SET
                path = COALESCE($2, path)
             WHERE path = $1",
        )
        .bind(path)
        .bind(update.path.as_deref())
        .execute(pool)
        .await?;

        let rows_affected = result.rows_affected();
        tracing::debug!(path, new_path = ?update.path, rows_affected, "Revisions updated by path");
        Ok(rows_affected)
    }

    /// Placeholder for migrating revisions to a new path layout.
    ///
    /// Performs no store access; callers must not rely on it.
    pub async fn update_path(_pool: &PgPool, path: &str) -> Result<(), sqlx::Error> {
        tracing::debug!(path, "Revision path migration is not implemented, skipping");
        Ok(())
    }

    /// Resolve each revision's author with one batched directory lookup.
    async fn attach_authors(
        pool: &PgPool,
        revisions: Vec<Revision>,
    ) -> Result<Vec<RevisionWithAuthor>, sqlx::Error> {
        let mut author_ids: Vec<DbId> = revisions.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let users: HashMap<DbId, _> = UserRepo::find_by_ids(pool, &author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(revisions
            .into_iter()
            .map(|revision| {
                let author = users.get(&revision.author_id).cloned();
                RevisionWithAuthor { revision, author }
            })
            .collect())
    }
}
