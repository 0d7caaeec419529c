use gridboard_core::db::open_db_in_memory;
use gridboard_core::{
    EngineError, ErrorKind, GestureOrigin, GestureOutcome, GridConfig, GridEngine, GridItem,
    GridKey, GridRect, LayoutEntry, NewWidget, Notice, PlacementError, Project,
    ProjectRepository, SqliteProjectRepository, SqliteWidgetRepository, StagingState, Widget,
    WidgetRepository, WidgetTypeDescriptor, WidgetTypeRegistry,
};
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

type Engine<'conn> = GridEngine<SqliteWidgetRepository<'conn>>;

#[test]
fn selecting_a_project_admits_the_staging_placeholder() {
    let conn = open_db_in_memory().unwrap();
    let engine = open_board(&conn);

    assert_eq!(engine.state().staging(), &StagingState::Staging);
    assert_eq!(
        engine.layout(),
        vec![GridItem::new(GridKey::Staging, GridRect::new(0, 0, 2, 2))]
    );
}

#[test]
fn dragging_a_named_staged_widget_out_commits_it() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);

    let widget = commit(&mut engine, "Buy milk", GridRect::new(2, 0, 1, 1));

    assert_eq!(widget.name, "Buy milk");
    assert_eq!(widget.widget_type, "todo");
    assert_eq!(engine.state().staging(), &StagingState::Staging);
    assert_eq!(
        engine.state().entries(),
        &[LayoutEntry::new(widget.id, GridRect::new(2, 0, 1, 1))]
    );

    let repo = SqliteWidgetRepository::try_new(&conn).unwrap();
    assert_eq!(
        repo.get_widget_layouts(&[widget.id]).unwrap(),
        vec![LayoutEntry::new(widget.id, GridRect::new(2, 0, 1, 1))]
    );
    assert_eq!(
        engine.occupancy(),
        vec![
            "ssa.....", "ss......", "........", "........", "........", "........",
            "........", "........",
        ]
    );
}

#[test]
fn committed_name_is_trimmed() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);

    let widget = commit(&mut engine, "  Groceries  ", GridRect::new(4, 2, 2, 2));

    assert_eq!(widget.name, "Groceries");
}

#[test]
fn out_of_bounds_gesture_is_rejected_and_board_reloaded() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));

    let err = engine
        .on_layout_gesture(
            &[GridItem::new(GridKey::Widget(widget.id), GridRect::new(7, 7, 2, 2))],
            GestureOrigin::User,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::InvalidPlacement(PlacementError::ExceedsColumns { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(notice_codes(&mut engine), vec!["invalid_placement"]);
    assert_eq!(engine.state().entries()[0].rect, GridRect::new(2, 0, 1, 1));
    assert_eq!(stored_rect(&conn, widget.id), GridRect::new(2, 0, 1, 1));
}

#[test]
fn gesture_into_reserved_columns_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));

    let err = engine
        .on_layout_gesture(
            &[GridItem::new(GridKey::Widget(widget.id), GridRect::new(1, 4, 1, 1))],
            GestureOrigin::User,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::InvalidPlacement(PlacementError::ReservedColumns { .. })
    ));
    assert_eq!(stored_rect(&conn, widget.id), GridRect::new(2, 0, 1, 1));
}

#[test]
fn valid_gesture_persists_the_whole_layout() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let first = commit(&mut engine, "First", GridRect::new(2, 0, 1, 1));
    let second = commit(&mut engine, "Second", GridRect::new(3, 0, 1, 1));

    let outcome = engine
        .on_layout_gesture(
            &[
                GridItem::new(GridKey::Staging, GridRect::new(0, 0, 2, 2)),
                GridItem::new(GridKey::Widget(first.id), GridRect::new(5, 5, 3, 3)),
                GridItem::new(GridKey::Widget(second.id), GridRect::new(3, 0, 1, 1)),
            ],
            GestureOrigin::User,
        )
        .unwrap();

    assert_eq!(outcome, GestureOutcome::Persisted { entries: 2 });
    assert_eq!(stored_rect(&conn, first.id), GridRect::new(5, 5, 3, 3));
    assert_eq!(stored_rect(&conn, second.id), GridRect::new(3, 0, 1, 1));
    assert!(engine.drain_notices().is_empty());
}

#[test]
fn layout_batch_outside_the_grid_is_rejected_whole() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let first = commit(&mut engine, "First", GridRect::new(2, 0, 1, 1));
    let second = commit(&mut engine, "Second", GridRect::new(4, 0, 1, 1));

    let err = engine
        .persist_layout_batch(vec![LayoutEntry::new(first.id, GridRect::new(7, 7, 2, 2))])
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::InvalidPlacement(PlacementError::ExceedsColumns { .. })
    ));
    assert_eq!(notice_codes(&mut engine), vec!["invalid_placement"]);
    assert_eq!(
        engine.state().entries(),
        &[
            LayoutEntry::new(first.id, GridRect::new(2, 0, 1, 1)),
            LayoutEntry::new(second.id, GridRect::new(4, 0, 1, 1)),
        ]
    );
    assert_eq!(stored_rect(&conn, first.id), GridRect::new(2, 0, 1, 1));
}

#[test]
fn partial_layout_batch_keeps_the_other_widgets() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let first = commit(&mut engine, "First", GridRect::new(2, 0, 1, 1));
    let second = commit(&mut engine, "Second", GridRect::new(4, 0, 1, 1));

    let stored = engine
        .persist_layout_batch(vec![LayoutEntry::new(first.id, GridRect::new(5, 5, 1, 1))])
        .unwrap();

    assert_eq!(stored, 2);
    assert_eq!(
        engine.state().entries(),
        &[
            LayoutEntry::new(first.id, GridRect::new(5, 5, 1, 1)),
            LayoutEntry::new(second.id, GridRect::new(4, 0, 1, 1)),
        ]
    );
    assert_eq!(stored_rect(&conn, first.id), GridRect::new(5, 5, 1, 1));
    assert_eq!(stored_rect(&conn, second.id), GridRect::new(4, 0, 1, 1));
    assert!(engine.drain_notices().is_empty());
}

#[test]
fn layout_batch_naming_a_widget_off_the_board_is_stale() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));
    let ghost = Uuid::new_v4();

    let err = engine
        .persist_layout_batch(vec![
            LayoutEntry::new(widget.id, GridRect::new(3, 0, 1, 1)),
            LayoutEntry::new(ghost, GridRect::new(4, 0, 1, 1)),
        ])
        .unwrap_err();

    assert!(matches!(err, EngineError::StaleLayout(id) if id == ghost));
    assert_eq!(notice_codes(&mut engine), vec!["stale_layout"]);
    assert_eq!(stored_rect(&conn, widget.id), GridRect::new(2, 0, 1, 1));
}

#[test]
fn overlapping_placement_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let first = commit(&mut engine, "First", GridRect::new(2, 0, 2, 2));
    let second = commit(&mut engine, "Second", GridRect::new(5, 0, 1, 1));

    engine
        .on_layout_gesture(
            &[GridItem::new(GridKey::Widget(second.id), GridRect::new(3, 1, 2, 2))],
            GestureOrigin::User,
        )
        .unwrap();

    assert_eq!(stored_rect(&conn, first.id), GridRect::new(2, 0, 2, 2));
    assert_eq!(stored_rect(&conn, second.id), GridRect::new(3, 1, 2, 2));
    assert_eq!(engine.occupancy()[1], "ssa#b...");
}

#[test]
fn programmatic_changes_are_ignored() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));

    let outcome = engine
        .on_layout_gesture(
            &[GridItem::new(GridKey::Widget(widget.id), GridRect::new(7, 7, 2, 2))],
            GestureOrigin::Programmatic,
        )
        .unwrap();

    assert_eq!(outcome, GestureOutcome::Ignored);
    assert!(engine.drain_notices().is_empty());
    assert_eq!(stored_rect(&conn, widget.id), GridRect::new(2, 0, 1, 1));
}

#[test]
fn duplicate_name_and_type_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));

    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();
    let err = engine
        .on_layout_gesture(&[staged_at(GridRect::new(4, 0, 1, 1))], GestureOrigin::User)
        .unwrap_err();

    assert!(matches!(
        &err,
        EngineError::DuplicateWidget { name, widget_type } if name == "Groceries" && widget_type == "todo"
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(notice_codes(&mut engine), vec!["duplicate_widget"]);
    assert!(matches!(engine.state().staging(), StagingState::Staged(_)));
    assert_eq!(engine.state().widgets().len(), 1);
}

#[test]
fn staged_widget_without_valid_input_reverts() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());

    engine.set_staged_fields("ab", Some("todo")).unwrap();
    let outcome = engine
        .on_layout_gesture(&[staged_at(GridRect::new(2, 0, 1, 1))], GestureOrigin::User)
        .unwrap();
    assert_eq!(outcome, GestureOutcome::StagedReverted(GridRect::new(0, 0, 2, 2)));

    engine.set_staged_fields("Groceries", None).unwrap();
    let outcome = engine
        .on_layout_gesture(&[staged_at(GridRect::new(3, 3, 2, 2))], GestureOrigin::User)
        .unwrap();
    assert_eq!(outcome, GestureOutcome::StagedReverted(GridRect::new(0, 0, 2, 2)));
    assert!(engine.state().widgets().is_empty());
}

#[test]
fn partial_move_into_reserved_strip_snaps_to_column_zero() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();

    let outcome = engine
        .on_layout_gesture(&[staged_at(GridRect::new(1, 3, 2, 2))], GestureOrigin::User)
        .unwrap();

    assert_eq!(outcome, GestureOutcome::StagedSnapped(GridRect::new(0, 3, 2, 2)));
    assert_eq!(
        engine.layout()[0],
        GridItem::new(GridKey::Staged, GridRect::new(0, 3, 2, 2))
    );
}

#[test]
fn widening_the_staged_widget_past_the_reserved_strip_reverts() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();

    let outcome = engine
        .on_layout_gesture(&[staged_at(GridRect::new(0, 0, 7, 2))], GestureOrigin::User)
        .unwrap();

    assert_eq!(outcome, GestureOutcome::StagedReverted(GridRect::new(0, 0, 2, 2)));
    assert_eq!(engine.occupancy()[0], "ss......");
    assert!(engine.state().widgets().is_empty());
}

#[test]
fn cancel_discards_staged_input() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    assert!(!engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();

    assert!(engine.cancel_staging());
    assert!(!engine.cancel_staging());
    assert_eq!(engine.state().staging(), &StagingState::Staging);
    assert!(matches!(
        engine.set_staged_fields("Groceries", Some("todo")),
        Ok(false)
    ));
}

#[test]
fn unknown_widget_type_cannot_be_selected() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());

    let err = engine
        .set_staged_fields("Groceries", Some("calendar"))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownWidgetType(name) if name == "calendar"));
    assert_eq!(engine.list_widget_types(), vec!["todo".to_string()]);
}

#[test]
fn refetch_keeps_the_staged_widget() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();

    engine.fetch_widgets().unwrap();

    let StagingState::Staged(staged) = engine.state().staging() else {
        panic!("staged widget was dropped by refetch");
    };
    assert_eq!(staged.name, "Groceries");
}

#[test]
fn storage_failure_on_commit_keeps_staged_input() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_layout_insert BEFORE INSERT ON widget_layouts
         BEGIN SELECT RAISE(ABORT, 'forced layout failure'); END;",
    )
    .unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();

    let err = engine
        .on_layout_gesture(&[staged_at(GridRect::new(2, 0, 1, 1))], GestureOrigin::User)
        .unwrap_err();

    assert!(matches!(err, EngineError::Storage(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(notice_codes(&mut engine), vec!["storage_failure"]);
    let StagingState::Staged(staged) = engine.state().staging() else {
        panic!("staged input was lost");
    };
    assert_eq!(staged.name, "Groceries");
    let widgets: i64 = conn
        .query_row("SELECT COUNT(*) FROM widgets;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(widgets, 0);
}

#[test]
fn staged_commit_outside_the_grid_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();

    let err = engine
        .on_layout_gesture(&[staged_at(GridRect::new(7, 7, 2, 2))], GestureOrigin::User)
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidPlacement(_)));
    assert_eq!(notice_codes(&mut engine), vec!["invalid_placement"]);
    assert!(engine.state().widgets().is_empty());
    assert!(matches!(engine.state().staging(), StagingState::Staged(_)));
}

#[test]
fn deleting_the_edited_widget_resets_the_board() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));
    engine.begin_editing(widget.id).unwrap();
    assert!(engine.stage_new_widget());

    engine.delete_widget(widget.id).unwrap();

    assert_eq!(engine.state().editing(), None);
    assert_eq!(engine.state().staging(), &StagingState::Staging);
    assert!(engine.state().widgets().is_empty());
    assert!(SqliteWidgetRepository::try_new(&conn)
        .unwrap()
        .get_widget(widget.id)
        .unwrap()
        .is_none());
}

#[test]
fn deleting_another_widget_keeps_staged_input() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));
    assert!(engine.stage_new_widget());

    engine.delete_widget(widget.id).unwrap();

    assert!(matches!(engine.state().staging(), StagingState::Staged(_)));
    assert!(engine.state().entries().is_empty());
}

#[test]
fn deleting_a_missing_widget_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let ghost = Uuid::new_v4();

    let err = engine.delete_widget(ghost).unwrap_err();

    assert!(matches!(err, EngineError::WidgetNotFound(id) if id == ghost));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(notice_codes(&mut engine), vec!["widget_not_found"]);
    assert!(matches!(
        engine.begin_editing(ghost),
        Err(EngineError::WidgetNotFound(_))
    ));
}

#[test]
fn deleting_a_widget_of_another_project_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let work = SqliteProjectRepository::try_new(&conn)
        .unwrap()
        .create_project("ada", "Work")
        .unwrap();
    let repo = SqliteWidgetRepository::try_new(&conn).unwrap();
    let foreign = repo
        .create_widget_with_layout(
            &NewWidget {
                project_id: work.id,
                name: "Standup".to_string(),
                widget_type: "todo".to_string(),
            },
            GridRect::new(2, 0, 1, 1),
        )
        .unwrap();

    let err = engine.delete_widget(foreign.id).unwrap_err();

    assert!(matches!(err, EngineError::WidgetNotFound(id) if id == foreign.id));
    assert_eq!(notice_codes(&mut engine), vec!["widget_not_found"]);
    assert!(repo.get_widget(foreign.id).unwrap().is_some());
    assert_eq!(stored_rect(&conn, foreign.id), GridRect::new(2, 0, 1, 1));
}

#[test]
fn gesture_for_unknown_widget_is_stale() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let ghost = Uuid::new_v4();

    let err = engine
        .on_layout_gesture(
            &[GridItem::new(GridKey::Widget(ghost), GridRect::new(2, 0, 1, 1))],
            GestureOrigin::User,
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::StaleLayout(id) if id == ghost));
    assert_eq!(notice_codes(&mut engine), vec!["stale_layout"]);
}

#[test]
fn batch_against_widget_deleted_elsewhere_reloads_the_board() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    let widget = commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));
    SqliteWidgetRepository::try_new(&conn)
        .unwrap()
        .delete_widget_cascade(widget.id, &WidgetTypeDescriptor::todo())
        .unwrap();

    let err = engine
        .on_layout_gesture(
            &[GridItem::new(GridKey::Widget(widget.id), GridRect::new(4, 4, 1, 1))],
            GestureOrigin::User,
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::StaleLayout(id) if id == widget.id));
    assert_eq!(notice_codes(&mut engine), vec!["stale_layout"]);
    assert!(engine.state().entries().is_empty());
}

#[test]
fn orphaned_widgets_stay_off_the_board_until_repaired() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let orphan = SqliteWidgetRepository::try_new(&conn)
        .unwrap()
        .create_widget(&NewWidget {
            project_id: project.id,
            name: "Lost".to_string(),
            widget_type: "todo".to_string(),
        })
        .unwrap();

    let mut engine = engine(&conn);
    engine.select_project(project).unwrap();
    assert!(engine.state().widgets().is_empty());

    assert_eq!(engine.repair_orphans().unwrap(), 1);
    assert!(SqliteWidgetRepository::try_new(&conn)
        .unwrap()
        .get_widget(orphan)
        .unwrap()
        .is_none());
    assert_eq!(engine.repair_orphans().unwrap(), 0);
}

#[test]
fn operations_require_a_selected_project() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = engine(&conn);

    assert!(matches!(
        engine.fetch_widgets(),
        Err(EngineError::NoProjectSelected)
    ));
    assert!(matches!(
        engine.on_layout_gesture(&[], GestureOrigin::User),
        Err(EngineError::NoProjectSelected)
    ));
    assert!(!engine.stage_new_widget());
    assert_eq!(engine.state().staging(), &StagingState::Empty);
    assert!(engine.layout().is_empty());
}

#[test]
fn deselecting_clears_the_board() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    commit(&mut engine, "Groceries", GridRect::new(2, 0, 1, 1));

    engine.deselect_project();

    assert!(engine.state().project().is_none());
    assert_eq!(engine.state().staging(), &StagingState::Empty);
    assert!(engine.layout().is_empty());
}

#[test]
fn detached_state_survives_a_new_connection_handle() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open_board(&conn);
    assert!(engine.stage_new_widget());
    engine.set_staged_fields("Groceries", Some("todo")).unwrap();
    let state = engine.into_state();

    let mut engine = GridEngine::with_state(
        SqliteWidgetRepository::try_new(&conn).unwrap(),
        Arc::new(WidgetTypeRegistry::builtin()),
        GridConfig::default(),
        state,
    )
    .unwrap();
    let outcome = engine
        .on_layout_gesture(&[staged_at(GridRect::new(2, 0, 1, 1))], GestureOrigin::User)
        .unwrap();

    assert!(matches!(outcome, GestureOutcome::Committed(widget) if widget.name == "Groceries"));
}

#[test]
fn invalid_grid_config_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let config = GridConfig {
        num_cols: 2,
        num_rows: 8,
        new_widget_size: 2,
    };

    let err = GridEngine::new(
        SqliteWidgetRepository::try_new(&conn).unwrap(),
        Arc::new(WidgetTypeRegistry::builtin()),
        config,
    )
    .err()
    .expect("two columns leave nothing placeable");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

fn engine(conn: &Connection) -> Engine<'_> {
    GridEngine::new(
        SqliteWidgetRepository::try_new(conn).unwrap(),
        Arc::new(WidgetTypeRegistry::builtin()),
        GridConfig::default(),
    )
    .unwrap()
}

fn open_board(conn: &Connection) -> Engine<'_> {
    let project = seed_project(conn);
    let mut engine = engine(conn);
    engine.select_project(project).unwrap();
    engine
}

fn seed_project(conn: &Connection) -> Project {
    let projects = SqliteProjectRepository::try_new(conn).unwrap();
    projects.ensure_user("ada", "Ada", "Lovelace").unwrap();
    projects.create_project("ada", "Home").unwrap()
}

fn commit(engine: &mut Engine<'_>, name: &str, rect: GridRect) -> Widget {
    assert!(engine.stage_new_widget());
    assert!(engine.set_staged_fields(name, Some("todo")).unwrap());
    match engine
        .on_layout_gesture(&[staged_at(rect)], GestureOrigin::User)
        .unwrap()
    {
        GestureOutcome::Committed(widget) => widget,
        other => panic!("expected commit, got {other:?}"),
    }
}

fn staged_at(rect: GridRect) -> GridItem {
    GridItem::new(GridKey::Staged, rect)
}

fn stored_rect(conn: &Connection, widget_id: Uuid) -> GridRect {
    SqliteWidgetRepository::try_new(conn)
        .unwrap()
        .get_widget_layouts(&[widget_id])
        .unwrap()[0]
        .rect
}

fn notice_codes(engine: &mut Engine<'_>) -> Vec<String> {
    engine
        .drain_notices()
        .into_iter()
        .map(|notice: Notice| notice.code)
        .collect()
}
