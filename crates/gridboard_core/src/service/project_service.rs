//! Project use-case service scoped by an explicit session.

use crate::model::session::Session;
use crate::model::widget::{Project, ProjectId};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProjectServiceError {
    /// Project is missing or owned by another user.
    ProjectNotFound(ProjectId),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Project lookups for the session user.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Projects owned by the session user, ordered by name.
    pub fn list_projects(&self, session: &Session) -> Result<Vec<Project>, ProjectServiceError> {
        Ok(self.repo.list_projects(&session.username)?)
    }

    /// Loads one project the session user owns.
    ///
    /// Projects of other users are reported as missing.
    pub fn open_project(
        &self,
        session: &Session,
        project_id: ProjectId,
    ) -> Result<Project, ProjectServiceError> {
        self.repo
            .get_project(project_id)?
            .filter(|project| project.owner == session.username)
            .ok_or(ProjectServiceError::ProjectNotFound(project_id))
    }
}
