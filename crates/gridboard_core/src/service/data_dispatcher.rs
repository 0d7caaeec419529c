//! Polymorphic widget data dispatcher.
//!
//! # Responsibility
//! - Route data operations to the descriptor of the widget's type.
//! - Validate payloads before any storage call.
//!
//! # Invariants
//! - An unknown widget type fails loudly; it never yields an empty result.
//! - Update is a full-row replace and fails with `NotFound` on zero matches.
//! - Single-row delete is idempotent.
//! - A service scoped to a project treats other projects' widgets as missing.

use crate::model::widget::{ProjectId, WidgetId};
use crate::model::widget_data::{DataRowId, WidgetDataFields, WidgetDataRow};
use crate::registry::descriptor::FieldValidationError;
use crate::registry::WidgetTypeRegistry;
use crate::repo::widget_data_repo::WidgetDataRepository;
use crate::repo::widget_repo::WidgetRepository;
use crate::repo::RepoError;
use crate::service::grid_engine::ErrorKind;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// One data operation against a widget type's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOperation {
    Create {
        widget_id: WidgetId,
        fields: WidgetDataFields,
    },
    ReadAll {
        widget_id: WidgetId,
    },
    Update {
        row_id: DataRowId,
        widget_id: WidgetId,
        fields: WidgetDataFields,
    },
    Delete {
        row_id: DataRowId,
        widget_id: WidgetId,
    },
    /// Clears one widget's rows. Widget deletion reaches the same repository
    /// call from inside its cascade transaction.
    DeleteAll {
        widget_id: WidgetId,
    },
}

impl DataOperation {
    fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::ReadAll { .. } => "read_all",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::DeleteAll { .. } => "delete_all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOutcome {
    Created(DataRowId),
    Rows(Vec<WidgetDataRow>),
    Updated,
    Deleted { removed: usize },
}

#[derive(Debug)]
pub enum DispatchError {
    UnknownWidgetType(String),
    Validation(FieldValidationError),
    /// Data row does not exist.
    NotFound(DataRowId),
    WidgetNotFound(WidgetId),
    Repo(RepoError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownWidgetType(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) | Self::WidgetNotFound(_) => ErrorKind::NotFound,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownWidgetType(name) => write!(f, "unknown widget type: `{name}`"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "widget data row not found: {id}"),
            Self::WidgetNotFound(id) => write!(f, "widget not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DispatchError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<FieldValidationError> for DispatchError {
    fn from(value: FieldValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Routes data operations by widget type.
pub struct WidgetDataDispatcher<R: WidgetDataRepository> {
    repo: R,
    registry: Arc<WidgetTypeRegistry>,
}

impl<R: WidgetDataRepository> WidgetDataDispatcher<R> {
    pub fn new(repo: R, registry: Arc<WidgetTypeRegistry>) -> Self {
        Self { repo, registry }
    }

    /// Runs `operation` against the table of `widget_type`.
    ///
    /// The caller is responsible for confirming the widget exists.
    pub fn dispatch(
        &self,
        widget_type: &str,
        operation: DataOperation,
    ) -> Result<DataOutcome, DispatchError> {
        let op_name = operation.name();
        let descriptor = self.registry.require(widget_type).map_err(|_| {
            error!(
                "event=data_dispatch module=dispatcher status=error op={} reason=unknown_type",
                op_name
            );
            DispatchError::UnknownWidgetType(widget_type.to_string())
        })?;

        let result = match operation {
            DataOperation::Create { widget_id, fields } => {
                let values = descriptor.to_positional(&fields)?;
                self.repo
                    .insert_row(descriptor, widget_id, &values)
                    .map(DataOutcome::Created)
            }
            DataOperation::ReadAll { widget_id } => self
                .repo
                .list_rows(descriptor, widget_id)
                .map(DataOutcome::Rows),
            DataOperation::Update {
                row_id,
                widget_id,
                fields,
            } => {
                let values = descriptor.to_positional(&fields)?;
                self.repo
                    .update_row(descriptor, row_id, widget_id, &values)
                    .map(|()| DataOutcome::Updated)
            }
            DataOperation::Delete { row_id, widget_id } => self
                .repo
                .delete_row(descriptor, row_id, widget_id)
                .map(|removed| DataOutcome::Deleted {
                    removed: usize::from(removed),
                }),
            DataOperation::DeleteAll { widget_id } => self
                .repo
                .delete_all_rows(descriptor, widget_id)
                .map(|removed| DataOutcome::Deleted { removed }),
        };

        match result {
            Ok(outcome) => {
                info!(
                    "event=data_dispatch module=dispatcher status=ok op={} widget_type={}",
                    op_name, widget_type
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=data_dispatch module=dispatcher status=error op={} widget_type={} error={}",
                    op_name, widget_type, err
                );
                Err(err.into())
            }
        }
    }
}

/// Widget-scoped data API: looks the widget up, then dispatches with the
/// widget's own type.
pub struct WidgetDataService<W: WidgetRepository, R: WidgetDataRepository> {
    widgets: W,
    dispatcher: WidgetDataDispatcher<R>,
    project: Option<ProjectId>,
}

impl<W: WidgetRepository, R: WidgetDataRepository> WidgetDataService<W, R> {
    pub fn new(widgets: W, dispatcher: WidgetDataDispatcher<R>) -> Self {
        Self {
            widgets,
            dispatcher,
            project: None,
        }
    }

    /// Restricts every call to widgets of `project_id`.
    pub fn scoped_to(mut self, project_id: ProjectId) -> Self {
        self.project = Some(project_id);
        self
    }

    /// Rows of one widget in insertion order.
    pub fn get_widget_data(&self, widget_id: WidgetId) -> Result<Vec<WidgetDataRow>, DispatchError> {
        let widget_type = self.widget_type(widget_id)?;
        match self
            .dispatcher
            .dispatch(&widget_type, DataOperation::ReadAll { widget_id })?
        {
            DataOutcome::Rows(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    pub fn create_widget_data(
        &self,
        widget_id: WidgetId,
        fields: WidgetDataFields,
    ) -> Result<DataRowId, DispatchError> {
        let widget_type = self.widget_type(widget_id)?;
        match self
            .dispatcher
            .dispatch(&widget_type, DataOperation::Create { widget_id, fields })?
        {
            DataOutcome::Created(row_id) => Ok(row_id),
            other => Err(DispatchError::Repo(RepoError::InvalidData(format!(
                "unexpected create outcome: {other:?}"
            )))),
        }
    }

    /// Full-row replace of one data row owned by `widget_id`.
    pub fn update_widget_data(
        &self,
        widget_id: WidgetId,
        row_id: DataRowId,
        fields: WidgetDataFields,
    ) -> Result<(), DispatchError> {
        let widget_type = self.widget_type(widget_id)?;
        self.dispatcher
            .dispatch(
                &widget_type,
                DataOperation::Update {
                    row_id,
                    widget_id,
                    fields,
                },
            )?;
        Ok(())
    }

    /// Deletes one row. Returns `0` when it was already gone.
    pub fn delete_widget_data(
        &self,
        widget_id: WidgetId,
        row_id: DataRowId,
    ) -> Result<usize, DispatchError> {
        let widget_type = self.widget_type(widget_id)?;
        match self
            .dispatcher
            .dispatch(&widget_type, DataOperation::Delete { row_id, widget_id })?
        {
            DataOutcome::Deleted { removed } => Ok(removed),
            _ => Ok(0),
        }
    }

    fn widget_type(&self, widget_id: WidgetId) -> Result<String, DispatchError> {
        self.widgets
            .get_widget(widget_id)
            .map_err(DispatchError::Repo)?
            .filter(|widget| {
                self.project
                    .map_or(true, |project| widget.project_id == project)
            })
            .map(|widget| widget.widget_type)
            .ok_or(DispatchError::WidgetNotFound(widget_id))
    }
}
