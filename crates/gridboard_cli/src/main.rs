//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `gridboard_core` linkage with a deterministic ping/version probe.
//! - Print the derived occupancy map of one stored project board.
//!
//! Usage: `gridboard_cli [<db_path> <project_id>]`

use gridboard_core::{
    open_db, GridConfig, GridEngine, ProjectRepository, SqliteProjectRepository,
    SqliteWidgetRepository, WidgetTypeRegistry,
};
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

fn main() -> ExitCode {
    println!("gridboard_core ping={}", gridboard_core::ping());
    println!("gridboard_core version={}", gridboard_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => ExitCode::SUCCESS,
        [db_path, project_id] => match print_board(db_path, project_id) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("error: {message}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("usage: gridboard_cli [<db_path> <project_id>]");
            ExitCode::from(2)
        }
    }
}

fn print_board(db_path: &str, project_id: &str) -> Result<(), String> {
    let project_id =
        Uuid::parse_str(project_id).map_err(|_| format!("invalid project id `{project_id}`"))?;
    let conn = open_db(db_path).map_err(|err| err.to_string())?;

    let project = SqliteProjectRepository::try_new(&conn)
        .and_then(|repo| repo.get_project(project_id))
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("project not found: {project_id}"))?;

    let registry = Arc::new(WidgetTypeRegistry::builtin());
    registry.verify_schema(&conn).map_err(|err| err.to_string())?;
    let repo = SqliteWidgetRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let mut engine = GridEngine::new(repo, registry, GridConfig::default())
        .map_err(|err| err.to_string())?;
    engine.select_project(project).map_err(|err| err.to_string())?;

    let state = engine.state();
    println!(
        "project={} widgets={}",
        project_id,
        state.widgets().len()
    );
    for row in engine.occupancy() {
        println!("{row}");
    }
    Ok(())
}
