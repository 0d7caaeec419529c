//! Project and user repository.
//!
//! Projects are owned by exactly one user. Credentials are not stored here;
//! only the identity rows projects reference.

use crate::model::widget::{Project, ProjectId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Repository interface for project lookup and bootstrap.
pub trait ProjectRepository {
    /// Inserts the user row if it does not exist yet.
    fn ensure_user(&self, username: &str, first_name: &str, last_name: &str) -> RepoResult<()>;
    /// Creates one project owned by `owner`.
    fn create_project(&self, owner: &str, name: &str) -> RepoResult<Project>;
    /// Loads one project by id.
    fn get_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists projects owned by `owner`, ordered by name.
    fn list_projects(&self, owner: &str) -> RepoResult<Vec<Project>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("users", &["username", "first_name", "last_name"]),
                ("projects", &["id", "owner", "name"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn ensure_user(&self, username: &str, first_name: &str, last_name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (username, first_name, last_name)
             VALUES (?1, ?2, ?3);",
            params![username, first_name, last_name],
        )?;
        Ok(())
    }

    fn create_project(&self, owner: &str, name: &str) -> RepoResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name: name.to_string(),
        };
        self.conn.execute(
            "INSERT INTO projects (id, owner, name) VALUES (?1, ?2, ?3);",
            params![project.id.to_string(), project.owner, project.name],
        )?;
        Ok(project)
    }

    fn get_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, owner, name FROM projects WHERE id = ?1;",
                [project_id.to_string()],
                read_project_columns,
            )
            .optional()?;
        row.map(into_project).transpose()
    }

    fn list_projects(&self, owner: &str) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name
             FROM projects
             WHERE owner = ?1
             ORDER BY name ASC, id ASC;",
        )?;
        let rows = stmt.query_map([owner], read_project_columns)?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(into_project(row?)?);
        }
        Ok(projects)
    }
}

fn read_project_columns(row: &Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get("id")?, row.get("owner")?, row.get("name")?))
}

fn into_project((id, owner, name): (String, String, String)) -> RepoResult<Project> {
    Ok(Project {
        id: parse_uuid(&id, "projects.id")?,
        owner,
        name,
    })
}
