//! Type-specific widget data rows.
//!
//! Rows are schema-less at this layer: a field map whose keys and value kinds
//! are checked against the widget type descriptor before any storage call.

use crate::model::widget::WidgetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier of one widget data row.
pub type DataRowId = Uuid;

/// Scalar value of one widget data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Structured data object keyed by field name.
pub type WidgetDataFields = BTreeMap<String, FieldValue>;

/// One persisted data row owned by a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetDataRow {
    pub id: DataRowId,
    pub widget_id: WidgetId,
    #[serde(flatten)]
    pub fields: WidgetDataFields,
}

/// Builds a field map from `(name, value)` pairs.
pub fn fields<I, K, V>(pairs: I) -> WidgetDataFields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
