//! Schema introspection helpers shared by repositories and the type registry.

use rusqlite::Connection;

/// Returns whether a table with this exact name exists.
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns whether `table` declares `column`.
///
/// `table` is interpolated into a PRAGMA and must be a validated identifier.
pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns the first of `columns` missing from `table`, if any.
pub fn first_missing_column<'a>(
    conn: &Connection,
    table: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> rusqlite::Result<Option<&'a str>> {
    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Ok(Some(column));
        }
    }
    Ok(None)
}
