//! Page revision model and DTOs.
//!
//! Revisions are immutable snapshots of page content, created on every save.

use chrono::Utc;
use pagelog_core::error::CoreError;
use pagelog_core::revision::{
    require_author, resolve_format, validate_body, validate_path, RevisionOptions,
};
use pagelog_core::revision_history::SessionEntry;
use pagelog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::User;

/// A row from the `revisions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Revision {
    pub id: DbId,
    pub path: String,
    pub body: String,
    pub format: String,
    pub author_id: DbId,
    pub created_at: Timestamp,
}

/// A revision with its author resolved from the user directory.
///
/// `author` is `None` only when the directory no longer holds `author_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionWithAuthor {
    #[serde(flatten)]
    pub revision: Revision,
    pub author: Option<User>,
}

impl SessionEntry for RevisionWithAuthor {
    fn author_id(&self) -> DbId {
        self.revision.author_id
    }

    fn created_at(&self) -> Timestamp {
        self.revision.created_at
    }
}

/// DTO for creating a new revision.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRevision {
    pub path: String,
    pub body: String,
    pub format: String,
    pub author_id: DbId,
    pub created_at: Timestamp,
}

impl CreateRevision {
    /// Build (without persisting) the next revision of a page.
    ///
    /// Stamps `created_at` with the current time and falls back to the
    /// default format when `options.format` is empty. Fails with
    /// [`CoreError::Validation`] when the acting user has no id or when a
    /// required field is empty.
    pub fn prepare(
        page_path: &str,
        body: &str,
        author_id: Option<DbId>,
        options: &RevisionOptions,
    ) -> Result<Self, CoreError> {
        let author_id = require_author(author_id)?;
        validate_path(page_path)?;
        validate_body(body)?;

        Ok(Self {
            path: page_path.to_string(),
            body: body.to_string(),
            format: resolve_format(&options.format).to_string(),
            author_id,
            created_at: Utc::now(),
        })
    }
}

/// DTO for bulk-updating every revision of a path.
///
/// Only `path` may change after a revision is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRevisionList {
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn prepare_stamps_fields() {
        let before = Utc::now();
        let options = RevisionOptions::default();
        let rev = CreateRevision::prepare("/a/page", "# Hello", Some(4), &options).unwrap();
        assert_eq!(rev.path, "/a/page");
        assert_eq!(rev.body, "# Hello");
        assert_eq!(rev.format, "markdown");
        assert_eq!(rev.author_id, 4);
        assert!(rev.created_at >= before);
    }

    #[test]
    fn prepare_uses_requested_format() {
        let rev = CreateRevision::prepare(
            "/a/page",
            "plain words",
            Some(4),
            &RevisionOptions::with_format("plain"),
        )
        .unwrap();
        assert_eq!(rev.format, "plain");
    }

    #[test]
    fn prepare_empty_format_defaults_to_markdown() {
        let options = RevisionOptions::with_format("");
        let rev = CreateRevision::prepare("/a/page", "body", Some(4), &options).unwrap();
        assert_eq!(rev.format, "markdown");
    }

    #[test]
    fn prepare_accepts_media_type_format() {
        let options = RevisionOptions::with_format("text/plain");
        let rev = CreateRevision::prepare("/a/page", "body", Some(4), &options).unwrap();
        assert_eq!(rev.format, "text/plain");
    }

    #[test]
    fn prepare_accepts_whitespace_path() {
        let options = RevisionOptions::default();
        let rev = CreateRevision::prepare(" ", "body", Some(4), &options).unwrap();
        assert_eq!(rev.path, " ");
    }

    #[test]
    fn prepare_without_user_id_fails() {
        assert_matches!(
            CreateRevision::prepare("/a/page", "body", None, &RevisionOptions::default()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn prepare_empty_body_fails() {
        assert_matches!(
            CreateRevision::prepare("/a/page", "", Some(1), &RevisionOptions::default()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn revision_with_author_serializes_flat() {
        let now = Utc::now();
        let row = RevisionWithAuthor {
            revision: Revision {
                id: 9,
                path: "/p".into(),
                body: "b".into(),
                format: "markdown".into(),
                author_id: 2,
                created_at: now,
            },
            author: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["author_id"], 2);
        assert!(json["author"].is_null());
    }
}
