//! FFI use-case API for the dashboard screen.
//!
//! # Responsibility
//! - Expose board, staging and widget data operations to Dart via FRB.
//! - Hold the session and board state between calls.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every failure resolves to an envelope with `ok = false`, an error kind
//!   (`validation|not_found|storage|configuration`) and a message.
//! - A storage connection is opened per call; board state outlives it.

use gridboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, BoardState, DispatchError, EngineError, ErrorKind, GestureOrigin,
    GridConfig, GridEngine, GridItem, GridKey, GridRect, Notice, NoticeSeverity, Project,
    ProjectService, ProjectServiceError, SessionContext, SqliteProjectRepository,
    SqliteWidgetDataRepository, SqliteWidgetRepository, StagingState, WidgetDataDispatcher,
    WidgetDataFields, WidgetDataService, WidgetTypeRegistry,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

const DB_FILE_NAME: &str = "gridboard.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REGISTRY: OnceLock<Arc<WidgetTypeRegistry>> = OnceLock::new();
static SCREEN: OnceLock<Mutex<ScreenState>> = OnceLock::new();
static SCHEMA_VERIFIED: OnceLock<()> = OnceLock::new();

#[derive(Default)]
struct ScreenState {
    session: SessionContext,
    board: BoardState,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
/// Repeating the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// `None` on success.
    pub error_kind: Option<String>,
    pub message: String,
    /// Created or affected id, when the call produces one.
    pub id: Option<String>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            error_kind: None,
            message: message.into(),
            id,
        }
    }

    fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_kind: Some(kind.as_str().to_string()),
            message: message.into(),
            id: None,
        }
    }
}

/// One cell of the rendered board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// `staging`, `staged`, or a widget id.
    pub key: String,
    pub name: Option<String>,
    pub widget_type: Option<String>,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Cell position reported by a layout gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCellInput {
    pub key: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Board snapshot envelope. Cells are present on failure too, reflecting the
/// state after any corrective re-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub project_id: Option<String>,
    /// `empty|staging|staged`.
    pub staging: String,
    /// Whether the staged cell may leave the reserved strip.
    pub staged_draggable: bool,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectsResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub items: Vec<ProjectItem>,
}

/// Widget data rows as a JSON array of flat objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDataResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub rows_json: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    /// `info|warning|error`.
    pub severity: String,
    pub code: String,
    pub message: String,
}

/// Starts a session for a username the credential check accepted.
#[flutter_rust_bridge::frb(sync)]
pub fn begin_session(username: String) -> ActionResponse {
    let mut screen = lock_screen();
    match screen.session.begin(&username) {
        Ok(session) => {
            let name = session.username.clone();
            screen.board = BoardState::default();
            ActionResponse::success("Session started.", Some(name))
        }
        Err(err) => ActionResponse::failure(ErrorKind::Validation, err.to_string()),
    }
}

/// Ends the session and closes the board.
#[flutter_rust_bridge::frb(sync)]
pub fn end_session() -> ActionResponse {
    let mut screen = lock_screen();
    screen.board = BoardState::default();
    match screen.session.end() {
        Some(_) => ActionResponse::success("Session ended.", None),
        None => ActionResponse::success("No active session.", None),
    }
}

/// Lists projects of the session user.
#[flutter_rust_bridge::frb(sync)]
pub fn list_projects() -> ProjectsResponse {
    let screen = lock_screen();
    match load_projects(&screen.session) {
        Ok(projects) => ProjectsResponse {
            ok: true,
            error_kind: None,
            message: format!("Found {} project(s).", projects.len()),
            items: projects
                .into_iter()
                .map(|project| ProjectItem {
                    id: project.id.to_string(),
                    name: project.name,
                })
                .collect(),
        },
        Err((kind, message)) => ProjectsResponse {
            ok: false,
            error_kind: Some(kind.as_str().to_string()),
            message,
            items: Vec::new(),
        },
    }
}

fn load_projects(session: &SessionContext) -> Result<Vec<Project>, (ErrorKind, String)> {
    let session = session
        .require()
        .map_err(|err| (ErrorKind::Validation, err.to_string()))?;
    let conn = open_connection("list_projects")?;
    let repo = SqliteProjectRepository::try_new(&conn)
        .map_err(|err| (ErrorKind::Storage, err.to_string()))?;
    ProjectService::new(repo)
        .list_projects(session)
        .map_err(project_failure)
}

/// Opens one project of the session user and loads its board.
#[flutter_rust_bridge::frb(sync)]
pub fn select_project(project_id: String) -> BoardResponse {
    let project_id = match parse_id(&project_id) {
        Ok(id) => id,
        Err(message) => return BoardResponse::rejected(ErrorKind::Validation, message),
    };
    let mut screen = lock_screen();
    let ScreenState { session, board } = &mut *screen;

    let session = match session.require() {
        Ok(session) => session.clone(),
        Err(err) => return BoardResponse::rejected(ErrorKind::Validation, err.to_string()),
    };
    let conn = match open_connection("select_project") {
        Ok(conn) => conn,
        Err((kind, message)) => return BoardResponse::rejected(kind, message),
    };
    let project = match SqliteProjectRepository::try_new(&conn)
        .map_err(ProjectServiceError::Repo)
        .and_then(|repo| ProjectService::new(repo).open_project(&session, project_id))
    {
        Ok(project) => project,
        Err(err) => {
            let (kind, message) = project_failure(err);
            return BoardResponse::rejected(kind, message);
        }
    };

    run_engine(&conn, board, |engine| {
        engine.select_project(project)?;
        Ok("Project opened.".to_string())
    })
}

/// Closes the board; staging is reset.
#[flutter_rust_bridge::frb(sync)]
pub fn deselect_project() -> BoardResponse {
    with_engine("deselect_project", |engine| {
        engine.deselect_project();
        Ok("Project closed.".to_string())
    })
}

/// Reloads the board of the selected project.
#[flutter_rust_bridge::frb(sync)]
pub fn fetch_widgets() -> BoardResponse {
    with_engine("fetch_widgets", |engine| {
        engine.fetch_widgets()?;
        Ok("Board loaded.".to_string())
    })
}

/// Turns the staging placeholder into a staged widget.
#[flutter_rust_bridge::frb(sync)]
pub fn stage_new_widget() -> BoardResponse {
    with_engine("stage_new_widget", |engine| {
        Ok(if engine.stage_new_widget() {
            "Widget staged.".to_string()
        } else {
            "Nothing to stage.".to_string()
        })
    })
}

/// Discards the staged widget.
#[flutter_rust_bridge::frb(sync)]
pub fn cancel_staging() -> BoardResponse {
    with_engine("cancel_staging", |engine| {
        Ok(if engine.cancel_staging() {
            "Staging cancelled.".to_string()
        } else {
            "Nothing staged.".to_string()
        })
    })
}

/// Updates the staged widget's name and type input.
#[flutter_rust_bridge::frb(sync)]
pub fn set_staged_fields(name: String, widget_type: Option<String>) -> BoardResponse {
    with_engine("set_staged_fields", |engine| {
        let widget_type = widget_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        Ok(if engine.set_staged_fields(&name, widget_type)? {
            "Staged widget updated.".to_string()
        } else {
            "Nothing staged.".to_string()
        })
    })
}

/// Applies a layout change. `user_initiated = false` marks a programmatic
/// recomputation, which is ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn on_layout_gesture(items: Vec<GridCellInput>, user_initiated: bool) -> BoardResponse {
    let items = match items.iter().map(to_grid_item).collect::<Result<Vec<_>, _>>() {
        Ok(items) => items,
        Err(message) => return BoardResponse::rejected(ErrorKind::Validation, message),
    };
    let origin = if user_initiated {
        GestureOrigin::User
    } else {
        GestureOrigin::Programmatic
    };
    with_engine("on_layout_gesture", |engine| {
        let outcome = engine.on_layout_gesture(&items, origin)?;
        Ok(format!("{outcome:?}"))
    })
}

/// Deletes a widget with its layout entry and data rows.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_widget(widget_id: String) -> BoardResponse {
    let widget_id = match parse_id(&widget_id) {
        Ok(id) => id,
        Err(message) => return BoardResponse::rejected(ErrorKind::Validation, message),
    };
    with_engine("delete_widget", |engine| {
        engine.delete_widget(widget_id)?;
        Ok("Widget deleted.".to_string())
    })
}

/// Marks a widget as open in the data editor.
#[flutter_rust_bridge::frb(sync)]
pub fn begin_editing(widget_id: String) -> BoardResponse {
    let widget_id = match parse_id(&widget_id) {
        Ok(id) => id,
        Err(message) => return BoardResponse::rejected(ErrorKind::Validation, message),
    };
    with_engine("begin_editing", |engine| {
        engine.begin_editing(widget_id)?;
        Ok("Editing.".to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn end_editing() -> BoardResponse {
    with_engine("end_editing", |engine| {
        engine.end_editing();
        Ok("Editing closed.".to_string())
    })
}

/// Sorted names of selectable widget types.
#[flutter_rust_bridge::frb(sync)]
pub fn list_widget_types() -> Vec<String> {
    registry().type_names()
}

/// Reads all data rows of one widget.
#[flutter_rust_bridge::frb(sync)]
pub fn get_widget_data(widget_id: String) -> WidgetDataResponse {
    let result = parse_id(&widget_id)
        .map_err(|message| (ErrorKind::Validation, message))
        .and_then(|widget_id| {
            with_data_service("get_widget_data", |service| {
                service.get_widget_data(widget_id)
            })
        })
        .and_then(|rows| {
            serde_json::to_string(&rows).map_err(|err| (ErrorKind::Storage, err.to_string()))
        });

    match result {
        Ok(rows_json) => WidgetDataResponse {
            ok: true,
            error_kind: None,
            message: "Loaded.".to_string(),
            rows_json,
        },
        Err((kind, message)) => WidgetDataResponse {
            ok: false,
            error_kind: Some(kind.as_str().to_string()),
            message,
            rows_json: "[]".to_string(),
        },
    }
}

/// Creates one data row from a JSON object.
#[flutter_rust_bridge::frb(sync)]
pub fn create_widget_data(widget_id: String, fields_json: String) -> ActionResponse {
    let result = parse_id(&widget_id)
        .and_then(|widget_id| parse_fields(&fields_json).map(|fields| (widget_id, fields)))
        .map_err(|message| (ErrorKind::Validation, message))
        .and_then(|(widget_id, fields)| {
            with_data_service("create_widget_data", |service| {
                service.create_widget_data(widget_id, fields)
            })
        });
    match result {
        Ok(row_id) => ActionResponse::success("Row created.", Some(row_id.to_string())),
        Err((kind, message)) => ActionResponse::failure(kind, message),
    }
}

/// Replaces all fields of one data row from a JSON object.
#[flutter_rust_bridge::frb(sync)]
pub fn update_widget_data(widget_id: String, row_id: String, fields_json: String) -> ActionResponse {
    let result = parse_id(&widget_id)
        .and_then(|widget_id| parse_id(&row_id).map(|row_id| (widget_id, row_id)))
        .and_then(|ids| parse_fields(&fields_json).map(|fields| (ids, fields)))
        .map_err(|message| (ErrorKind::Validation, message))
        .and_then(|((widget_id, row_id), fields)| {
            with_data_service("update_widget_data", |service| {
                service
                    .update_widget_data(widget_id, row_id, fields)
                    .map(|()| row_id)
            })
        });
    match result {
        Ok(row_id) => ActionResponse::success("Row updated.", Some(row_id.to_string())),
        Err((kind, message)) => ActionResponse::failure(kind, message),
    }
}

/// Deletes one data row. Succeeds when the row is already gone.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_widget_data(widget_id: String, row_id: String) -> ActionResponse {
    let result = parse_id(&widget_id)
        .and_then(|widget_id| parse_id(&row_id).map(|row_id| (widget_id, row_id)))
        .map_err(|message| (ErrorKind::Validation, message))
        .and_then(|(widget_id, row_id)| {
            with_data_service("delete_widget_data", |service| {
                service.delete_widget_data(widget_id, row_id)
            })
        });
    match result {
        Ok(0) => ActionResponse::success("Row already removed.", None),
        Ok(_) => ActionResponse::success("Row deleted.", Some(row_id)),
        Err((kind, message)) => ActionResponse::failure(kind, message),
    }
}

/// Takes queued user notifications.
#[flutter_rust_bridge::frb(sync)]
pub fn drain_notices() -> Vec<NoticeItem> {
    lock_screen()
        .board
        .take_notices()
        .into_iter()
        .map(to_notice_item)
        .collect()
}

impl BoardResponse {
    fn rejected(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_kind: Some(kind.as_str().to_string()),
            message: message.into(),
            project_id: None,
            staging: "empty".to_string(),
            staged_draggable: false,
            cells: Vec::new(),
        }
    }
}

fn with_engine(
    op: &'static str,
    f: impl FnOnce(&mut GridEngine<SqliteWidgetRepository<'_>>) -> Result<String, EngineError>,
) -> BoardResponse {
    let mut screen = lock_screen();
    let conn = match open_connection(op) {
        Ok(conn) => conn,
        Err((kind, message)) => return BoardResponse::rejected(kind, message),
    };
    run_engine(&conn, &mut screen.board, f)
}

fn run_engine(
    conn: &Connection,
    board: &mut BoardState,
    f: impl FnOnce(&mut GridEngine<SqliteWidgetRepository<'_>>) -> Result<String, EngineError>,
) -> BoardResponse {
    let repo = match SqliteWidgetRepository::try_new(conn) {
        Ok(repo) => repo,
        Err(err) => return BoardResponse::rejected(ErrorKind::Storage, err.to_string()),
    };
    let mut engine = match GridEngine::with_state(
        repo,
        registry(),
        GridConfig::default(),
        std::mem::take(board),
    ) {
        Ok(engine) => engine,
        Err(err) => return BoardResponse::rejected(err.kind(), err.to_string()),
    };

    let result = f(&mut engine);
    let mut response = snapshot(&engine);
    match result {
        Ok(message) => response.message = message,
        Err(err) => {
            response.ok = false;
            response.error_kind = Some(err.kind().as_str().to_string());
            response.message = err.to_string();
        }
    }
    *board = engine.into_state();
    response
}

fn snapshot(engine: &GridEngine<SqliteWidgetRepository<'_>>) -> BoardResponse {
    let state = engine.state();
    let cells = engine
        .layout()
        .into_iter()
        .map(|item| {
            let widget = match item.key {
                GridKey::Widget(id) => state.widgets().iter().find(|widget| widget.id == id),
                _ => None,
            };
            GridCell {
                key: grid_key_label(item.key),
                name: widget.map(|widget| widget.name.clone()),
                widget_type: widget.map(|widget| widget.widget_type.clone()),
                x: item.rect.x,
                y: item.rect.y,
                w: item.rect.w,
                h: item.rect.h,
            }
        })
        .collect();
    let (staging, staged_draggable) = match state.staging() {
        StagingState::Empty => ("empty", false),
        StagingState::Staging => ("staging", false),
        StagingState::Staged(staged) => ("staged", staged.is_draggable()),
    };

    BoardResponse {
        ok: true,
        error_kind: None,
        message: String::new(),
        project_id: state.project().map(|project| project.id.to_string()),
        staging: staging.to_string(),
        staged_draggable,
        cells,
    }
}

fn with_data_service<T>(
    op: &'static str,
    f: impl FnOnce(
        &WidgetDataService<SqliteWidgetRepository<'_>, SqliteWidgetDataRepository<'_>>,
    ) -> Result<T, DispatchError>,
) -> Result<T, (ErrorKind, String)> {
    // Data calls only reach widgets of the board on screen.
    let project_id = match lock_screen().board.project() {
        Some(project) => project.id,
        None => {
            let err = EngineError::NoProjectSelected;
            return Err((err.kind(), err.to_string()));
        }
    };
    let conn = open_connection(op)?;
    let widgets =
        SqliteWidgetRepository::try_new(&conn).map_err(|err| (ErrorKind::Storage, err.to_string()))?;
    let dispatcher = WidgetDataDispatcher::new(SqliteWidgetDataRepository::new(&conn), registry());
    let service = WidgetDataService::new(widgets, dispatcher).scoped_to(project_id);
    f(&service).map_err(|err| (err.kind(), err.to_string()))
}

fn open_connection(op: &'static str) -> Result<Connection, (ErrorKind, String)> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!(
            "event=ffi_call module=ffi status=error op={} reason=db_open",
            op
        );
        (ErrorKind::Storage, format!("{op} failed: {err}"))
    })?;

    // Registered types must match the migrated tables before any dispatch.
    if SCHEMA_VERIFIED.get().is_none() {
        registry().verify_schema(&conn).map_err(|err| {
            warn!(
                "event=ffi_call module=ffi status=error op={} reason=schema_mismatch",
                op
            );
            (ErrorKind::Configuration, err.to_string())
        })?;
        let _ = SCHEMA_VERIFIED.set(());
    }
    Ok(conn)
}

fn project_failure(err: ProjectServiceError) -> (ErrorKind, String) {
    let kind = match err {
        ProjectServiceError::ProjectNotFound(_) => ErrorKind::NotFound,
        ProjectServiceError::Repo(_) => ErrorKind::Storage,
    };
    (kind, err.to_string())
}

fn lock_screen() -> MutexGuard<'static, ScreenState> {
    SCREEN
        .get_or_init(|| Mutex::new(ScreenState::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn registry() -> Arc<WidgetTypeRegistry> {
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(WidgetTypeRegistry::builtin())))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("GRIDBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid id: `{value}`"))
}

fn parse_fields(fields_json: &str) -> Result<WidgetDataFields, String> {
    serde_json::from_str(fields_json)
        .map_err(|err| format!("fields must be a JSON object of text or integer values: {err}"))
}

fn to_grid_item(input: &GridCellInput) -> Result<GridItem, String> {
    let key = match input.key.as_str() {
        "staging" => GridKey::Staging,
        "staged" => GridKey::Staged,
        other => GridKey::Widget(parse_id(other)?),
    };
    Ok(GridItem::new(
        key,
        GridRect::new(input.x, input.y, input.w, input.h),
    ))
}

fn grid_key_label(key: GridKey) -> String {
    match key {
        GridKey::Staging => "staging".to_string(),
        GridKey::Staged => "staged".to_string(),
        GridKey::Widget(id) => id.to_string(),
    }
}

fn to_notice_item(notice: Notice) -> NoticeItem {
    let severity = match notice.severity {
        NoticeSeverity::Info => "info",
        NoticeSeverity::Warning => "warning",
        NoticeSeverity::Error => "error",
    };
    NoticeItem {
        severity: severity.to_string(),
        code: notice.code,
        message: notice.message,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        begin_session, cancel_staging, core_version, create_widget_data, delete_widget,
        delete_widget_data, end_session, get_widget_data, init_logging, list_projects,
        list_widget_types, on_layout_gesture, ping, select_project, set_staged_fields,
        stage_new_widget, GridCellInput,
    };
    use gridboard_core::db::open_db;
    use gridboard_core::{
        GridRect, NewWidget, ProjectRepository, SqliteProjectRepository, SqliteWidgetRepository,
        WidgetRepository,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn widget_types_list_builtin_todo() {
        assert_eq!(list_widget_types(), vec!["todo".to_string()]);
    }

    #[test]
    fn gesture_with_malformed_key_is_rejected_before_storage() {
        let response = on_layout_gesture(
            vec![GridCellInput {
                key: "not-a-widget".to_string(),
                x: 2,
                y: 0,
                w: 1,
                h: 1,
            }],
            true,
        );
        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("validation"));
    }

    #[test]
    fn board_flow_from_session_to_widget_data() {
        let username = unique_token("ffi-user");
        let (project_id, foreign_key) = {
            let conn = open_db(super::resolve_db_path()).expect("open db");
            let repo = SqliteProjectRepository::try_new(&conn).expect("project repo");
            repo.ensure_user(&username, "Test", "User").unwrap();
            let home = repo.create_project(&username, "Home").unwrap();
            let work = repo.create_project(&username, "Work").unwrap();
            let foreign = SqliteWidgetRepository::try_new(&conn)
                .expect("widget repo")
                .create_widget_with_layout(
                    &NewWidget {
                        project_id: work.id,
                        name: "Standup".to_string(),
                        widget_type: "todo".to_string(),
                    },
                    GridRect::new(2, 0, 1, 1),
                )
                .unwrap();
            (home.id.to_string(), foreign.id.to_string())
        };

        assert!(begin_session(username.clone()).ok);
        let projects = list_projects();
        assert!(projects.ok, "{}", projects.message);
        assert_eq!(projects.items.len(), 2);

        let board = select_project(project_id);
        assert!(board.ok, "{}", board.message);
        assert_eq!(board.staging, "staging");

        assert_eq!(stage_new_widget().staging, "staged");
        assert!(cancel_staging().ok);
        assert_eq!(stage_new_widget().staging, "staged");
        let staged = set_staged_fields("Groceries".to_string(), Some("todo".to_string()));
        assert!(staged.staged_draggable, "{}", staged.message);

        let committed = on_layout_gesture(
            vec![GridCellInput {
                key: "staged".to_string(),
                x: 2,
                y: 0,
                w: 1,
                h: 1,
            }],
            true,
        );
        assert!(committed.ok, "{}", committed.message);
        assert_eq!(committed.staging, "staging");
        let cell = committed
            .cells
            .iter()
            .find(|cell| cell.name.as_deref() == Some("Groceries"))
            .expect("committed widget on board")
            .clone();
        assert_eq!((cell.x, cell.y, cell.w, cell.h), (2, 0, 1, 1));

        let created = create_widget_data(
            cell.key.clone(),
            r#"{"name":"Buy milk","is_completed":0}"#.to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let rejected = create_widget_data(
            cell.key.clone(),
            r#"{"name":"ab","is_completed":0}"#.to_string(),
        );
        assert_eq!(rejected.error_kind.as_deref(), Some("validation"));

        let foreign_write = create_widget_data(
            foreign_key.clone(),
            r#"{"name":"Review","is_completed":0}"#.to_string(),
        );
        assert_eq!(foreign_write.error_kind.as_deref(), Some("not_found"));
        assert_eq!(
            get_widget_data(foreign_key.clone()).error_kind.as_deref(),
            Some("not_found")
        );
        let foreign_delete = delete_widget(foreign_key.clone());
        assert_eq!(foreign_delete.error_kind.as_deref(), Some("not_found"));

        let rows = get_widget_data(cell.key.clone());
        let parsed: serde_json::Value = serde_json::from_str(&rows.rows_json).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
        assert_eq!(parsed[0]["name"], "Buy milk");

        let row_id = created.id.expect("created row id");
        assert!(delete_widget_data(cell.key.clone(), row_id.clone()).ok);
        let again = delete_widget_data(cell.key.clone(), row_id);
        assert!(again.ok);
        assert_eq!(again.message, "Row already removed.");

        let after_delete = delete_widget(cell.key.clone());
        assert!(after_delete.ok, "{}", after_delete.message);
        assert!(after_delete.cells.iter().all(|item| item.key != cell.key));

        assert!(end_session().ok);
        assert!(!list_projects().ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
