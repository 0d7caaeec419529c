//! Widget type descriptors: ordered field schema, validation rules and the
//! storage statements bound to one data table.
//!
//! # Invariants
//! - Table and field identifiers are validated once, at construction.
//! - Statements are built from validated identifiers only; payload values are
//!   always bound as parameters.
//! - Positional order of values equals `fields` declaration order.

use crate::model::widget_data::{FieldValue, WidgetDataFields};
use crate::registry::RegistryError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,62}$").expect("valid identifier regex"));

/// Columns every data table carries besides its type fields.
pub const RESERVED_DATA_COLUMNS: &[&str] = &["id", "widget_id"];

/// Validation rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Text bounded by character count after trim.
    Text { min_chars: usize, max_chars: usize },
    /// Integer restricted to `0` or `1`.
    Flag,
}

/// Ordered field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub fn text(name: &str, min_chars: usize, max_chars: usize) -> Self {
        Self {
            name: name.to_string(),
            rule: FieldRule::Text {
                min_chars,
                max_chars,
            },
        }
    }

    pub fn flag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rule: FieldRule::Flag,
        }
    }
}

/// Field-level payload violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    pub field: String,
    pub reason: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl Display for FieldValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid field `{}`: {}", self.field, self.reason)
    }
}

impl Error for FieldValidationError {}

/// Prebuilt SQL for the five data operations of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStatements {
    /// Binds `id, widget_id, <fields...>`.
    pub insert: String,
    /// Binds `widget_id`; selects `id, widget_id, <fields...>`.
    pub select_for_widget: String,
    /// Binds `<fields...>, id, widget_id`.
    pub update_by_id: String,
    /// Binds `id, widget_id`.
    pub delete_by_id: String,
    /// Binds `widget_id`.
    pub delete_for_widget: String,
}

/// Static schema and operation set for one widget category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetTypeDescriptor {
    type_name: String,
    table: String,
    fields: Vec<FieldSpec>,
    statements: DataStatements,
}

impl WidgetTypeDescriptor {
    /// Builds a descriptor after validating every identifier.
    pub fn new(
        type_name: &str,
        table: &str,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, RegistryError> {
        ensure_identifier(type_name)?;
        ensure_identifier(table)?;
        if fields.is_empty() {
            return Err(RegistryError::NoFields(type_name.to_string()));
        }

        let mut seen = BTreeSet::new();
        for field in &fields {
            ensure_identifier(&field.name)?;
            if RESERVED_DATA_COLUMNS.contains(&field.name.as_str()) {
                return Err(RegistryError::ReservedField(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(RegistryError::DuplicateField(field.name.clone()));
            }
        }

        let statements = build_statements(table, &fields);
        Ok(Self {
            type_name: type_name.to_string(),
            table: table.to_string(),
            fields,
            statements,
        })
    }

    /// The `todo` type: a task name and a completion flag.
    pub fn todo() -> Self {
        let fields = vec![FieldSpec::text("name", 3, 20), FieldSpec::flag("is_completed")];
        let statements = build_statements("todo_data", &fields);
        Self {
            type_name: "todo".to_string(),
            table: "todo_data".to_string(),
            fields,
            statements,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn statements(&self) -> &DataStatements {
        &self.statements
    }

    /// Field names in positional order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Validates a full data object and returns its values in positional
    /// order.
    ///
    /// Every declared field must be present; undeclared keys are rejected.
    pub fn to_positional(
        &self,
        payload: &WidgetDataFields,
    ) -> Result<Vec<FieldValue>, FieldValidationError> {
        if let Some(unknown) = payload
            .keys()
            .find(|key| !self.fields.iter().any(|field| &field.name == *key))
        {
            return Err(FieldValidationError::new(unknown.as_str(), "unknown field"));
        }

        self.fields
            .iter()
            .map(|field| {
                let value = payload
                    .get(&field.name)
                    .ok_or_else(|| FieldValidationError::new(field.name.as_str(), "missing"))?;
                validate_value(field, value)
            })
            .collect()
    }
}

fn validate_value(field: &FieldSpec, value: &FieldValue) -> Result<FieldValue, FieldValidationError> {
    match field.rule {
        FieldRule::Text {
            min_chars,
            max_chars,
        } => {
            let text = value
                .as_text()
                .ok_or_else(|| FieldValidationError::new(field.name.as_str(), "expected text"))?;
            let trimmed = text.trim();
            let chars = trimmed.chars().count();
            if !(min_chars..=max_chars).contains(&chars) {
                return Err(FieldValidationError::new(
                    field.name.as_str(),
                    format!("must be between {min_chars} and {max_chars} characters"),
                ));
            }
            Ok(FieldValue::Text(trimmed.to_string()))
        }
        FieldRule::Flag => match value.as_integer() {
            Some(flag @ (0 | 1)) => Ok(FieldValue::Integer(flag)),
            _ => Err(FieldValidationError::new(
                field.name.as_str(),
                "expected 0 or 1",
            )),
        },
    }
}

fn ensure_identifier(value: &str) -> Result<(), RegistryError> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(())
    } else {
        Err(RegistryError::InvalidIdentifier(value.to_string()))
    }
}

fn build_statements(table: &str, fields: &[FieldSpec]) -> DataStatements {
    let names: Vec<&str> = fields.iter().map(|field| field.name.as_str()).collect();
    let field_count = names.len();

    let insert_params = (1..=field_count + 2)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let assignments = names
        .iter()
        .enumerate()
        .map(|(index, name)| format!("{name} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let column_list = names.join(", ");

    DataStatements {
        insert: format!(
            "INSERT INTO {table} (id, widget_id, {column_list}) VALUES ({insert_params});"
        ),
        select_for_widget: format!(
            "SELECT id, widget_id, {column_list} FROM {table} WHERE widget_id = ?1 ORDER BY rowid ASC;"
        ),
        update_by_id: format!(
            "UPDATE {table} SET {assignments} WHERE id = ?{} AND widget_id = ?{};",
            field_count + 1,
            field_count + 2
        ),
        delete_by_id: format!("DELETE FROM {table} WHERE id = ?1 AND widget_id = ?2;"),
        delete_for_widget: format!("DELETE FROM {table} WHERE widget_id = ?1;"),
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldSpec, FieldValidationError, WidgetTypeDescriptor};
    use crate::model::widget_data::{fields, FieldValue};
    use crate::registry::RegistryError;

    #[test]
    fn todo_statements_bind_id_and_owner_last_on_update() {
        let todo = WidgetTypeDescriptor::todo();
        let statements = todo.statements();
        assert_eq!(
            statements.update_by_id,
            "UPDATE todo_data SET name = ?1, is_completed = ?2 WHERE id = ?3 AND widget_id = ?4;"
        );
        assert_eq!(
            statements.insert,
            "INSERT INTO todo_data (id, widget_id, name, is_completed) VALUES (?1, ?2, ?3, ?4);"
        );
    }

    #[test]
    fn todo_builtin_matches_validated_constructor() {
        let built = WidgetTypeDescriptor::new(
            "todo",
            "todo_data",
            vec![FieldSpec::text("name", 3, 20), FieldSpec::flag("is_completed")],
        )
        .unwrap();
        assert_eq!(built, WidgetTypeDescriptor::todo());
    }

    #[test]
    fn positional_values_follow_declaration_order() {
        let todo = WidgetTypeDescriptor::todo();
        let values = todo
            .to_positional(&fields([
                ("is_completed", FieldValue::Integer(1)),
                ("name", FieldValue::from(" Buy milk ")),
            ]))
            .unwrap();
        assert_eq!(
            values,
            vec![FieldValue::from("Buy milk"), FieldValue::Integer(1)]
        );
    }

    #[test]
    fn payload_violations_name_the_field() {
        let todo = WidgetTypeDescriptor::todo();

        let short = todo
            .to_positional(&fields([
                ("name", FieldValue::from("ab")),
                ("is_completed", FieldValue::Integer(0)),
            ]))
            .unwrap_err();
        assert_eq!(short.field, "name");

        let flag = todo
            .to_positional(&fields([
                ("name", FieldValue::from("abc")),
                ("is_completed", FieldValue::Integer(2)),
            ]))
            .unwrap_err();
        assert_eq!(flag, FieldValidationError::new("is_completed", "expected 0 or 1"));

        let missing = todo
            .to_positional(&fields([("name", FieldValue::from("abc"))]))
            .unwrap_err();
        assert_eq!(missing, FieldValidationError::new("is_completed", "missing"));

        let unknown = todo
            .to_positional(&fields([
                ("name", FieldValue::from("abc")),
                ("is_completed", FieldValue::Integer(0)),
                ("priority", FieldValue::Integer(3)),
            ]))
            .unwrap_err();
        assert_eq!(unknown, FieldValidationError::new("priority", "unknown field"));
    }

    #[test]
    fn constructor_rejects_unsafe_identifiers() {
        let err = WidgetTypeDescriptor::new(
            "notes",
            "notes; DROP TABLE widgets",
            vec![FieldSpec::flag("done")],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidIdentifier(_)));

        let err = WidgetTypeDescriptor::new("notes", "note_data", vec![FieldSpec::flag("id")])
            .unwrap_err();
        assert_eq!(err, RegistryError::ReservedField("id".to_string()));

        let err = WidgetTypeDescriptor::new(
            "notes",
            "note_data",
            vec![FieldSpec::flag("done"), FieldSpec::flag("done")],
        )
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateField("done".to_string()));
    }
}
