//! Type-specific widget data repository.
//!
//! Every call is parameterized by a [`WidgetTypeDescriptor`], which carries
//! the prebuilt statements for one data table. Values arrive already
//! validated and in positional order.

use crate::model::widget::WidgetId;
use crate::model::widget_data::{DataRowId, FieldValue, WidgetDataFields, WidgetDataRow};
use crate::registry::descriptor::WidgetTypeDescriptor;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

/// Repository interface for widget data rows.
pub trait WidgetDataRepository {
    /// Inserts one row and returns its generated id.
    fn insert_row(
        &self,
        descriptor: &WidgetTypeDescriptor,
        widget_id: WidgetId,
        values: &[FieldValue],
    ) -> RepoResult<DataRowId>;
    /// Lists rows of one widget in insertion order.
    fn list_rows(
        &self,
        descriptor: &WidgetTypeDescriptor,
        widget_id: WidgetId,
    ) -> RepoResult<Vec<WidgetDataRow>>;
    /// Replaces all fields of one row of `widget_id`. Fails with `NotFound`
    /// when no row of that widget matches.
    fn update_row(
        &self,
        descriptor: &WidgetTypeDescriptor,
        row_id: DataRowId,
        widget_id: WidgetId,
        values: &[FieldValue],
    ) -> RepoResult<()>;
    /// Deletes one row. Returns whether a row was removed.
    fn delete_row(
        &self,
        descriptor: &WidgetTypeDescriptor,
        row_id: DataRowId,
        widget_id: WidgetId,
    ) -> RepoResult<bool>;
    /// Deletes every row of one widget. Returns the removed count.
    fn delete_all_rows(
        &self,
        descriptor: &WidgetTypeDescriptor,
        widget_id: WidgetId,
    ) -> RepoResult<usize>;
}

/// SQLite-backed widget data repository.
///
/// Table presence is checked by `WidgetTypeRegistry::verify_schema`, not here.
pub struct SqliteWidgetDataRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWidgetDataRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl WidgetDataRepository for SqliteWidgetDataRepository<'_> {
    fn insert_row(
        &self,
        descriptor: &WidgetTypeDescriptor,
        widget_id: WidgetId,
        values: &[FieldValue],
    ) -> RepoResult<DataRowId> {
        ensure_arity(descriptor, values)?;
        let row_id = Uuid::new_v4();
        let bound = [
            Value::Text(row_id.to_string()),
            Value::Text(widget_id.to_string()),
        ]
        .into_iter()
        .chain(values.iter().map(to_sql_value));

        self.conn
            .execute(&descriptor.statements().insert, params_from_iter(bound))?;
        Ok(row_id)
    }

    fn list_rows(
        &self,
        descriptor: &WidgetTypeDescriptor,
        widget_id: WidgetId,
    ) -> RepoResult<Vec<WidgetDataRow>> {
        let mut stmt = self.conn.prepare(&descriptor.statements().select_for_widget)?;
        let mut rows = stmt.query([widget_id.to_string()])?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(parse_data_row(descriptor, row)?);
        }
        Ok(result)
    }

    fn update_row(
        &self,
        descriptor: &WidgetTypeDescriptor,
        row_id: DataRowId,
        widget_id: WidgetId,
        values: &[FieldValue],
    ) -> RepoResult<()> {
        ensure_arity(descriptor, values)?;
        let bound = values.iter().map(to_sql_value).chain([
            Value::Text(row_id.to_string()),
            Value::Text(widget_id.to_string()),
        ]);

        let changed = self
            .conn
            .execute(&descriptor.statements().update_by_id, params_from_iter(bound))?;
        if changed == 0 {
            return Err(RepoError::not_found("widget data row", row_id));
        }
        Ok(())
    }

    fn delete_row(
        &self,
        descriptor: &WidgetTypeDescriptor,
        row_id: DataRowId,
        widget_id: WidgetId,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            &descriptor.statements().delete_by_id,
            [row_id.to_string(), widget_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn delete_all_rows(
        &self,
        descriptor: &WidgetTypeDescriptor,
        widget_id: WidgetId,
    ) -> RepoResult<usize> {
        let changed = self.conn.execute(
            &descriptor.statements().delete_for_widget,
            [widget_id.to_string()],
        )?;
        Ok(changed)
    }
}

fn ensure_arity(descriptor: &WidgetTypeDescriptor, values: &[FieldValue]) -> RepoResult<()> {
    let expected = descriptor.fields().len();
    if values.len() != expected {
        return Err(RepoError::InvalidData(format!(
            "`{}` expects {expected} values, got {}",
            descriptor.type_name(),
            values.len()
        )));
    }
    Ok(())
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(number) => Value::Integer(*number),
        FieldValue::Text(text) => Value::Text(text.clone()),
    }
}

fn parse_data_row(descriptor: &WidgetTypeDescriptor, row: &Row<'_>) -> RepoResult<WidgetDataRow> {
    let id: String = row.get("id")?;
    let widget_id: String = row.get("widget_id")?;

    let mut fields = WidgetDataFields::new();
    for name in descriptor.field_names() {
        let value = match row.get_ref(name)? {
            ValueRef::Integer(number) => FieldValue::Integer(number),
            ValueRef::Text(bytes) => FieldValue::Text(
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| RepoError::InvalidData(format!("non-utf8 text in `{name}`")))?,
            ),
            other => {
                return Err(RepoError::InvalidData(format!(
                    "unsupported {:?} value in `{name}`",
                    other.data_type()
                )))
            }
        };
        fields.insert(name.to_string(), value);
    }

    Ok(WidgetDataRow {
        id: parse_uuid(&id, "data.id")?,
        widget_id: parse_uuid(&widget_id, "data.widget_id")?,
        fields,
    })
}
