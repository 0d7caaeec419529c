//! Project, widget and layout domain records.
//!
//! # Responsibility
//! - Define the persisted shapes shared by repositories and the grid engine.
//! - Own the widget name rule used by the staging draggability gate.
//!
//! # Invariants
//! - Every committed widget has exactly one layout entry keyed by `widget_id`.
//! - `widget_type` is immutable after creation.

use crate::model::grid::GridRect;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;
/// Stable widget identifier.
pub type WidgetId = Uuid;

/// Minimum widget name length in characters (after trim).
pub const WIDGET_NAME_MIN_CHARS: usize = 3;
/// Maximum widget name length in characters (after trim).
pub const WIDGET_NAME_MAX_CHARS: usize = 20;

/// Project owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner: String,
    pub name: String,
}

/// Committed dashboard widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub project_id: ProjectId,
    pub name: String,
    pub widget_type: String,
}

/// Insert request for one widget row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWidget {
    pub project_id: ProjectId,
    pub name: String,
    pub widget_type: String,
}

/// Persisted rectangle of one committed widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub widget_id: WidgetId,
    #[serde(flatten)]
    pub rect: GridRect,
}

impl LayoutEntry {
    pub fn new(widget_id: WidgetId, rect: GridRect) -> Self {
        Self { widget_id, rect }
    }
}

/// Widget name rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetNameError {
    Empty,
    Length { chars: usize },
}

impl Display for WidgetNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "widget name must not be blank"),
            Self::Length { chars } => write!(
                f,
                "widget name must be between {WIDGET_NAME_MIN_CHARS} and {WIDGET_NAME_MAX_CHARS} characters, got {chars}"
            ),
        }
    }
}

impl Error for WidgetNameError {}

/// Trims a widget name and checks its length bounds.
pub fn normalize_widget_name(value: &str) -> Result<String, WidgetNameError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WidgetNameError::Empty);
    }
    let chars = trimmed.chars().count();
    if !(WIDGET_NAME_MIN_CHARS..=WIDGET_NAME_MAX_CHARS).contains(&chars) {
        return Err(WidgetNameError::Length { chars });
    }
    Ok(trimmed.to_string())
}
