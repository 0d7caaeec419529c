//! Ordered schema migrations for the dashboard store.
//!
//! # Invariants
//! - Versions are contiguous from 1 and applied in order inside one
//!   transaction; the last applied version is written to `PRAGMA user_version`.
//! - Widget-owned tables reference `widgets(id)` without `ON DELETE CASCADE`;
//!   dependents are removed explicitly before their widget.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One forward-only schema step.
#[derive(Debug, Clone, Copy)]
pub struct SchemaStep {
    pub version: u32,
    pub name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "users_projects",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "widgets_layouts",
        sql: include_str!("0002_widgets.sql"),
    },
    SchemaStep {
        version: 3,
        name: "todo_data",
        sql: include_str!("0003_todo_data.sql"),
    },
];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Steps newer than `applied`, oldest first.
pub fn pending_steps(applied: u32) -> impl Iterator<Item = &'static SchemaStep> {
    STEPS.iter().filter(move |step| step.version > applied)
}

/// Brings the connection up to [`latest_version`].
///
/// A database written by a newer build is refused rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let applied = current_user_version(conn)?;
    let latest = latest_version();
    if applied > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: applied,
            latest_supported: latest,
        });
    }

    let tx = conn.transaction()?;
    let mut ran = 0usize;
    for step in pending_steps(applied) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
        ran += 1;
    }
    tx.commit()?;

    if ran > 0 {
        info!(
            "event=db_migrate module=db status=done from={} to={} steps={}",
            applied, latest, ran
        );
    }
    Ok(())
}

/// Reads the applied schema version from `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
