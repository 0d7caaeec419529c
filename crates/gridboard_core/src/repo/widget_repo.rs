//! Widget and layout repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read project widgets and their layout entries.
//! - Provide the atomic multi-statement writes the grid engine relies on.
//!
//! # Invariants
//! - `create_widget_with_layout` never leaves a widget without its layout.
//! - `bulk_update_layout` applies every entry or none.
//! - `delete_widget_cascade` removes dependents before the widget row.

use crate::model::grid::GridRect;
use crate::model::widget::{LayoutEntry, NewWidget, ProjectId, Widget, WidgetId};
use crate::registry::descriptor::WidgetTypeDescriptor;
use crate::repo::widget_data_repo::{SqliteWidgetDataRepository, WidgetDataRepository};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const WIDGET_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    name,
    widget_type
FROM widgets";

/// Repository interface for widgets and their layout entries.
pub trait WidgetRepository {
    /// Lists widgets of one project in creation order.
    fn get_project_widgets(&self, project_id: ProjectId) -> RepoResult<Vec<Widget>>;
    /// Loads one widget by id.
    fn get_widget(&self, widget_id: WidgetId) -> RepoResult<Option<Widget>>;
    /// Finds the widget holding this `(name, widget_type)` pair in a project.
    fn find_widget_by_name_and_type(
        &self,
        project_id: ProjectId,
        name: &str,
        widget_type: &str,
    ) -> RepoResult<Option<Widget>>;
    /// Loads layout entries for the given widget ids. Ids without an entry
    /// are skipped.
    fn get_widget_layouts(&self, widget_ids: &[WidgetId]) -> RepoResult<Vec<LayoutEntry>>;
    /// Inserts one widget row and returns its generated id.
    fn create_widget(&self, widget: &NewWidget) -> RepoResult<WidgetId>;
    /// Inserts one layout entry for an existing widget.
    fn create_layout_entry(&self, entry: &LayoutEntry) -> RepoResult<()>;
    /// Inserts a widget and its layout entry in one transaction.
    fn create_widget_with_layout(&self, widget: &NewWidget, rect: GridRect)
        -> RepoResult<Widget>;
    /// Rewrites many layout entries in one transaction.
    fn bulk_update_layout(&self, entries: &[LayoutEntry]) -> RepoResult<()>;
    /// Deletes one widget row. Dependents must already be gone.
    fn delete_widget(&self, widget_id: WidgetId) -> RepoResult<()>;
    /// Deletes the layout entry of one widget, if present.
    fn delete_layout_entry(&self, widget_id: WidgetId) -> RepoResult<()>;
    /// Deletes layout, data rows and the widget row in one transaction.
    fn delete_widget_cascade(
        &self,
        widget_id: WidgetId,
        descriptor: &WidgetTypeDescriptor,
    ) -> RepoResult<()>;
    /// Lists widgets of one project that have no layout entry.
    fn find_orphaned_widgets(&self, project_id: ProjectId) -> RepoResult<Vec<Widget>>;
}

/// SQLite-backed widget repository.
pub struct SqliteWidgetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWidgetRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("widgets", &["id", "project_id", "name", "widget_type"]),
                ("widget_layouts", &["widget_id", "x", "y", "w", "h"]),
            ],
        )?;
        Ok(Self { conn })
    }

    /// Underlying connection, for callers that pair this repository with a
    /// data repository on the same handle.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

impl WidgetRepository for SqliteWidgetRepository<'_> {
    fn get_project_widgets(&self, project_id: ProjectId) -> RepoResult<Vec<Widget>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WIDGET_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;

        let mut widgets = Vec::new();
        while let Some(row) = rows.next()? {
            widgets.push(parse_widget_row(row)?);
        }
        Ok(widgets)
    }

    fn get_widget(&self, widget_id: WidgetId) -> RepoResult<Option<Widget>> {
        load_widget(self.conn, widget_id)
    }

    fn find_widget_by_name_and_type(
        &self,
        project_id: ProjectId,
        name: &str,
        widget_type: &str,
    ) -> RepoResult<Option<Widget>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WIDGET_SELECT_SQL}
             WHERE project_id = ?1 AND name = ?2 AND widget_type = ?3
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![project_id.to_string(), name, widget_type])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_widget_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_widget_layouts(&self, widget_ids: &[WidgetId]) -> RepoResult<Vec<LayoutEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT widget_id, x, y, w, h
             FROM widget_layouts
             WHERE widget_id = ?1;",
        )?;

        let mut entries = Vec::with_capacity(widget_ids.len());
        for widget_id in widget_ids {
            let entry = stmt
                .query_row([widget_id.to_string()], parse_layout_row)
                .optional()?;
            if let Some(entry) = entry {
                entries.push(entry?);
            }
        }
        Ok(entries)
    }

    fn create_widget(&self, widget: &NewWidget) -> RepoResult<WidgetId> {
        insert_widget(self.conn, widget)
    }

    fn create_layout_entry(&self, entry: &LayoutEntry) -> RepoResult<()> {
        insert_layout_entry(self.conn, entry)
    }

    fn create_widget_with_layout(
        &self,
        widget: &NewWidget,
        rect: GridRect,
    ) -> RepoResult<Widget> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let widget_id = insert_widget(&tx, widget)?;
        insert_layout_entry(&tx, &LayoutEntry::new(widget_id, rect))?;
        tx.commit()?;

        Ok(Widget {
            id: widget_id,
            project_id: widget.project_id,
            name: widget.name.clone(),
            widget_type: widget.widget_type.clone(),
        })
    }

    fn bulk_update_layout(&self, entries: &[LayoutEntry]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "UPDATE widget_layouts
                 SET x = ?1,
                     y = ?2,
                     w = ?3,
                     h = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE widget_id = ?5;",
            )?;
            for entry in entries {
                let changed = stmt.execute(params![
                    entry.rect.x,
                    entry.rect.y,
                    entry.rect.w,
                    entry.rect.h,
                    entry.widget_id.to_string(),
                ])?;
                if changed == 0 {
                    // Dropping `tx` without commit rolls back earlier rows.
                    return Err(RepoError::not_found("layout entry", entry.widget_id));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_widget(&self, widget_id: WidgetId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM widgets WHERE id = ?1;",
            [widget_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("widget", widget_id));
        }
        Ok(())
    }

    fn delete_layout_entry(&self, widget_id: WidgetId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM widget_layouts WHERE widget_id = ?1;",
            [widget_id.to_string()],
        )?;
        Ok(())
    }

    fn delete_widget_cascade(
        &self,
        widget_id: WidgetId,
        descriptor: &WidgetTypeDescriptor,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_widget(&tx, widget_id)?.is_none() {
            return Err(RepoError::not_found("widget", widget_id));
        }

        tx.execute(
            "DELETE FROM widget_layouts WHERE widget_id = ?1;",
            [widget_id.to_string()],
        )?;
        SqliteWidgetDataRepository::new(&tx).delete_all_rows(descriptor, widget_id)?;
        tx.execute(
            "DELETE FROM widgets WHERE id = ?1;",
            [widget_id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn find_orphaned_widgets(&self, project_id: ProjectId) -> RepoResult<Vec<Widget>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.id, w.project_id, w.name, w.widget_type
             FROM widgets w
             LEFT JOIN widget_layouts l ON l.widget_id = w.id
             WHERE w.project_id = ?1 AND l.widget_id IS NULL
             ORDER BY w.created_at ASC, w.rowid ASC;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;

        let mut widgets = Vec::new();
        while let Some(row) = rows.next()? {
            widgets.push(parse_widget_row(row)?);
        }
        Ok(widgets)
    }
}

fn load_widget(conn: &Connection, widget_id: WidgetId) -> RepoResult<Option<Widget>> {
    let mut stmt = conn.prepare(&format!("{WIDGET_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([widget_id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_widget_row(row)?)),
        None => Ok(None),
    }
}

fn insert_widget(conn: &Connection, widget: &NewWidget) -> RepoResult<WidgetId> {
    let widget_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO widgets (id, project_id, name, widget_type)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            widget_id.to_string(),
            widget.project_id.to_string(),
            widget.name,
            widget.widget_type,
        ],
    )?;
    Ok(widget_id)
}

fn insert_layout_entry(conn: &Connection, entry: &LayoutEntry) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO widget_layouts (widget_id, x, y, w, h)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            entry.widget_id.to_string(),
            entry.rect.x,
            entry.rect.y,
            entry.rect.w,
            entry.rect.h,
        ],
    )?;
    Ok(())
}

fn parse_widget_row(row: &Row<'_>) -> RepoResult<Widget> {
    let id: String = row.get("id")?;
    let project_id: String = row.get("project_id")?;
    Ok(Widget {
        id: parse_uuid(&id, "widgets.id")?,
        project_id: parse_uuid(&project_id, "widgets.project_id")?,
        name: row.get("name")?,
        widget_type: row.get("widget_type")?,
    })
}

fn parse_layout_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<LayoutEntry>> {
    let widget_id: String = row.get("widget_id")?;
    let rect = GridRect::new(row.get("x")?, row.get("y")?, row.get("w")?, row.get("h")?);
    Ok(parse_uuid(&widget_id, "widget_layouts.widget_id").map(|id| LayoutEntry::new(id, rect)))
}
