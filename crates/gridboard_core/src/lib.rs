//! Core domain logic for GridBoard.
//! This crate is the single source of truth for grid placement and widget
//! lifecycle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::grid::{find_overlaps, render_occupancy, GridConfig, GridRect, PlacementError};
pub use model::session::{Session, SessionContext, SessionError};
pub use model::widget::{LayoutEntry, NewWidget, Project, ProjectId, Widget, WidgetId};
pub use model::widget_data::{DataRowId, FieldValue, WidgetDataFields, WidgetDataRow};
pub use registry::descriptor::{FieldSpec, FieldValidationError, WidgetTypeDescriptor};
pub use registry::{RegistryError, WidgetTypeRegistry};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::widget_data_repo::{SqliteWidgetDataRepository, WidgetDataRepository};
pub use repo::widget_repo::{SqliteWidgetRepository, WidgetRepository};
pub use repo::{RepoError, RepoResult};
pub use service::data_dispatcher::{
    DataOperation, DataOutcome, DispatchError, WidgetDataDispatcher, WidgetDataService,
};
pub use service::grid_engine::{
    BoardState, EngineError, ErrorKind, GestureOrigin, GestureOutcome, GridEngine, GridItem,
    GridKey, Notice, NoticeSeverity,
};
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use service::staging::{StagedWidget, StagingMachine, StagingState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
