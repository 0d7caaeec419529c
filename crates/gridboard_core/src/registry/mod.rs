//! Static widget type registry.
//!
//! # Responsibility
//! - Map a widget type name to its descriptor (schema, rules, statements).
//! - Reject unknown type names loudly instead of producing empty operations.
//! - Verify at startup that every registered table exists in storage.
//!
//! # Invariants
//! - Registration happens before the registry is shared; it is not mutated at
//!   runtime afterwards.
//! - Type names and table identities are unique across the registry.

pub mod descriptor;

use crate::db::schema::{first_missing_column, table_exists};
use crate::db::DbError;
use descriptor::{WidgetTypeDescriptor, RESERVED_DATA_COLUMNS};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registration, lookup and schema verification errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidIdentifier(String),
    NoFields(String),
    DuplicateField(String),
    ReservedField(String),
    DuplicateType(String),
    DuplicateTable(String),
    UnknownWidgetType(String),
    MissingTable {
        type_name: String,
        table: String,
    },
    MissingColumn {
        table: String,
        column: String,
    },
    Storage(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "invalid identifier: `{value}`"),
            Self::NoFields(type_name) => {
                write!(f, "widget type `{type_name}` declares no fields")
            }
            Self::DuplicateField(name) => write!(f, "field declared twice: `{name}`"),
            Self::ReservedField(name) => write!(f, "field name is reserved: `{name}`"),
            Self::DuplicateType(name) => write!(f, "widget type already registered: `{name}`"),
            Self::DuplicateTable(name) => {
                write!(f, "data table already bound to another type: `{name}`")
            }
            Self::UnknownWidgetType(name) => write!(f, "unknown widget type: `{name}`"),
            Self::MissingTable { type_name, table } => write!(
                f,
                "widget type `{type_name}` requires table `{table}`"
            ),
            Self::MissingColumn { table, column } => {
                write!(f, "table `{table}` requires column `{column}`")
            }
            Self::Storage(message) => write!(f, "schema verification failed: {message}"),
        }
    }
}

impl Error for RegistryError {}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value).to_string())
    }
}

/// Registry of widget type descriptors keyed by type name.
#[derive(Debug, Default)]
pub struct WidgetTypeRegistry {
    types: BTreeMap<String, WidgetTypeDescriptor>,
}

impl WidgetTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in type (`todo`).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .types
            .insert("todo".to_string(), WidgetTypeDescriptor::todo());
        registry
    }

    /// Registers one descriptor.
    pub fn register(&mut self, descriptor: WidgetTypeDescriptor) -> Result<(), RegistryError> {
        let type_name = descriptor.type_name().to_string();
        if self.types.contains_key(type_name.as_str()) {
            return Err(RegistryError::DuplicateType(type_name));
        }
        if self
            .types
            .values()
            .any(|existing| existing.table() == descriptor.table())
        {
            return Err(RegistryError::DuplicateTable(descriptor.table().to_string()));
        }

        self.types.insert(type_name, descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns sorted type names.
    pub fn type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn get(&self, type_name: &str) -> Option<&WidgetTypeDescriptor> {
        self.types.get(type_name)
    }

    /// Returns a descriptor or fails with `UnknownWidgetType`.
    pub fn require(&self, type_name: &str) -> Result<&WidgetTypeDescriptor, RegistryError> {
        self.get(type_name)
            .ok_or_else(|| RegistryError::UnknownWidgetType(type_name.to_string()))
    }

    /// Checks that every registered data table and column exists.
    pub fn verify_schema(&self, conn: &Connection) -> Result<(), RegistryError> {
        for descriptor in self.types.values() {
            if !table_exists(conn, descriptor.table())? {
                return Err(RegistryError::MissingTable {
                    type_name: descriptor.type_name().to_string(),
                    table: descriptor.table().to_string(),
                });
            }

            let columns = RESERVED_DATA_COLUMNS
                .iter()
                .copied()
                .chain(descriptor.field_names());
            if let Some(column) = first_missing_column(conn, descriptor.table(), columns)? {
                return Err(RegistryError::MissingColumn {
                    table: descriptor.table().to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}
