//! Subcommand implementations. Results are printed as pretty JSON on stdout.

use std::io::Read;

use anyhow::Context;
use chrono::Duration;
use serde::Serialize;

use pagelog_core::error::CoreError;
use pagelog_core::revision::{parse_revision_ids, RevisionOptions};
use pagelog_core::revision_history::group_edit_sessions_with_gap;
use pagelog_db::models::revision::{CreateRevision, UpdateRevisionList};
use pagelog_db::repositories::RevisionRepo;
use pagelog_db::DbPool;

use super::Command;

pub(crate) async fn run(pool: &DbPool, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Migrate => {
            pagelog_db::run_migrations(pool).await?;
            tracing::info!("Database migrations applied");
        }

        Command::Save {
            path,
            author,
            format,
            file,
        } => {
            let body = match file {
                Some(file) => std::fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?,
                None => {
                    let mut body = String::new();
                    std::io::stdin().read_to_string(&mut body)?;
                    body
                }
            };
            let options = format.map(RevisionOptions::with_format).unwrap_or_default();

            let input = CreateRevision::prepare(&path, &body, author, &options)?;
            let revision = RevisionRepo::create(pool, &input).await?;
            tracing::info!(id = revision.id, path = %revision.path, "Revision saved");
            print_json(&revision)?;
        }

        Command::Latest { path } => {
            let revision = RevisionRepo::find_latest(pool, &path)
                .await?
                .with_context(|| format!("no revisions for {path}"))?;
            print_json(&revision)?;
        }

        Command::Show { id } => {
            let revision = RevisionRepo::find_by_id(pool, id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Revision",
                    id,
                })?;
            print_json(&revision)?;
        }

        Command::Many { ids } => {
            let value: serde_json::Value =
                serde_json::from_str(&ids).context("ids must be JSON")?;
            let ids = parse_revision_ids(&value)?;
            let revisions = RevisionRepo::find_by_ids(pool, &ids).await?;
            print_json(&revisions)?;
        }

        Command::History {
            path,
            grouped: false,
            ..
        } => {
            let revisions = RevisionRepo::list_by_path(pool, &path).await?;
            print_json(&revisions)?;
        }

        Command::History {
            path,
            grouped: true,
            gap_ms,
        } => {
            let sessions = match gap_ms {
                Some(gap_ms) => {
                    let revisions = RevisionRepo::list_by_path(pool, &path).await?;
                    group_edit_sessions_with_gap(revisions, Duration::milliseconds(gap_ms))
                }
                None => RevisionRepo::list_grouped_by_path(pool, &path).await?,
            };
            print_json(&sessions)?;
        }

        Command::Rename { from, to } => {
            pagelog_core::revision::validate_path(&to)?;
            let update = UpdateRevisionList { path: Some(to) };
            let rows_affected = RevisionRepo::update_list_by_path(pool, &from, &update).await?;
            tracing::info!(from = %from, rows_affected, "Revisions moved");
            print_json(&serde_json::json!({ "rows_affected": rows_affected }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
