//! Revision validation, creation options, and id-list parsing.
//!
//! Everything here runs before the store is touched: a failure from any of
//! these functions means no query was issued.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

pub const FORMAT_MARKDOWN: &str = "markdown";

/// Format stamped on a revision when the caller does not name one.
pub const DEFAULT_FORMAT: &str = FORMAT_MARKDOWN;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Recognised options when preparing a new revision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RevisionOptions {
    /// Content encoding hint (default: `"markdown"`).
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for RevisionOptions {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl RevisionOptions {
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a page path (required, non-empty).
pub fn validate_path(path: &str) -> Result<(), CoreError> {
    if path.is_empty() {
        return Err(CoreError::Validation("Path must not be empty".into()));
    }
    Ok(())
}

/// Validate a revision body (required, non-empty).
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.is_empty() {
        return Err(CoreError::Validation("Body must not be empty".into()));
    }
    Ok(())
}

/// The format to stamp on a revision: the requested one, or
/// [`DEFAULT_FORMAT`] when none was given.
pub fn resolve_format(format: &str) -> &str {
    if format.is_empty() {
        DEFAULT_FORMAT
    } else {
        format
    }
}

/// Require that the acting user carries an identifier.
pub fn require_author(author_id: Option<DbId>) -> Result<DbId, CoreError> {
    author_id.ok_or_else(|| CoreError::Validation("User should have an id".into()))
}

// ---------------------------------------------------------------------------
// Id lists
// ---------------------------------------------------------------------------

/// Parse a list of revision ids from untyped caller input.
///
/// The input must be a JSON array of integers. Anything else, including a
/// single bare id, is rejected with [`CoreError::InvalidArgument`].
pub fn parse_revision_ids(value: &serde_json::Value) -> Result<Vec<DbId>, CoreError> {
    let items = value
        .as_array()
        .ok_or_else(|| CoreError::InvalidArgument("The argument was not an array".into()))?;

    items
        .iter()
        .map(|item| {
            item.as_i64().ok_or_else(|| {
                CoreError::InvalidArgument(format!("Revision id must be an integer, got {item}"))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    // -- RevisionOptions -----------------------------------------------------

    #[test]
    fn options_default_to_markdown() {
        assert_eq!(RevisionOptions::default().format, "markdown");
    }

    #[test]
    fn options_missing_format_deserializes_to_default() {
        let opts: RevisionOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(opts, RevisionOptions::default());
    }

    #[test]
    fn options_explicit_format_kept() {
        let opts: RevisionOptions = serde_json::from_value(json!({ "format": "plain" })).unwrap();
        assert_eq!(opts.format, "plain");
    }

    // -- validate_path / validate_body ---------------------------------------

    #[test]
    fn path_valid() {
        assert!(validate_path("/user/alice/memo").is_ok());
    }

    #[test]
    fn path_empty_rejected() {
        assert!(validate_path("").is_err());
    }

    #[test]
    fn path_whitespace_accepted() {
        assert!(validate_path("  ").is_ok());
    }

    #[test]
    fn body_empty_rejected() {
        assert_matches!(validate_body(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn body_whitespace_accepted() {
        assert!(validate_body("\n").is_ok());
    }

    // -- resolve_format ------------------------------------------------------

    #[test]
    fn format_empty_falls_back_to_markdown() {
        assert_eq!(resolve_format(""), "markdown");
    }

    #[test]
    fn format_any_name_kept() {
        assert_eq!(resolve_format("text/plain"), "text/plain");
        assert_eq!(resolve_format("Markdown"), "Markdown");
    }

    // -- require_author ------------------------------------------------------

    #[test]
    fn author_present() {
        assert_eq!(require_author(Some(7)).unwrap(), 7);
    }

    #[test]
    fn author_missing_is_validation_error() {
        assert_matches!(require_author(None), Err(CoreError::Validation(_)));
    }

    // -- parse_revision_ids --------------------------------------------------

    #[test]
    fn ids_from_array() {
        assert_eq!(parse_revision_ids(&json!([3, 1, 2])).unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn ids_empty_array() {
        assert!(parse_revision_ids(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn ids_single_value_rejected() {
        assert_matches!(
            parse_revision_ids(&json!(42)),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn ids_object_rejected() {
        assert_matches!(
            parse_revision_ids(&json!({ "id": 1 })),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn ids_non_integer_element_rejected() {
        assert_matches!(
            parse_revision_ids(&json!([1, "two"])),
            Err(CoreError::InvalidArgument(_))
        );
    }
}
