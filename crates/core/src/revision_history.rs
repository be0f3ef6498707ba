//! Edit-session grouping for page histories.
//!
//! A page history is read newest first. Consecutive revisions by the same
//! author with less than [`SESSION_GAP_MS`] between them are folded into one
//! [`EditSession`], represented by its most recent revision (`parent`) and
//! the older revisions of the same burst (`children`).

use chrono::Duration;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Gap between two revisions that always starts a new session (3 minutes).
pub const SESSION_GAP_MS: i64 = 180_000;

/// Anything that can be placed in an edit session.
pub trait SessionEntry {
    fn author_id(&self) -> DbId;
    fn created_at(&self) -> Timestamp;
}

/// One continuous editing burst by a single author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditSession<T> {
    /// Most recent revision of the burst.
    pub parent: T,
    /// Remaining revisions of the burst, newest first. May be empty.
    pub children: Vec<T>,
}

impl<T> EditSession<T> {
    /// Close a run: the first element becomes the parent.
    fn from_run(mut run: Vec<T>) -> Option<Self> {
        if run.is_empty() {
            return None;
        }
        let parent = run.remove(0);
        Some(Self {
            parent,
            children: run,
        })
    }

    /// Number of revisions in the session, parent included.
    pub fn revision_count(&self) -> usize {
        1 + self.children.len()
    }

    /// Iterate the session's revisions, parent first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.parent).chain(self.children.iter())
    }
}

/// Group a newest-first history using the default [`SESSION_GAP_MS`].
pub fn group_edit_sessions<T: SessionEntry>(revisions: Vec<T>) -> Vec<EditSession<T>> {
    group_edit_sessions_with_gap(revisions, Duration::milliseconds(SESSION_GAP_MS))
}

/// Group a newest-first history, splitting on author changes and on gaps of
/// at least `gap` between neighbours.
///
/// Single pass, no reordering: concatenating every session's parent and
/// children in order reproduces the input.
pub fn group_edit_sessions_with_gap<T: SessionEntry>(
    revisions: Vec<T>,
    gap: Duration,
) -> Vec<EditSession<T>> {
    let mut sessions = Vec::new();
    let mut run: Vec<T> = Vec::new();
    let mut previous: Option<(DbId, Timestamp)> = None;

    for revision in revisions {
        let author_id = revision.author_id();
        let created_at = revision.created_at();

        if let Some((previous_author, previous_time)) = previous {
            if previous_author != author_id || previous_time - created_at >= gap {
                sessions.extend(EditSession::from_run(std::mem::take(&mut run)));
            }
        }

        run.push(revision);
        previous = Some((author_id, created_at));
    }

    sessions.extend(EditSession::from_run(run));
    sessions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
