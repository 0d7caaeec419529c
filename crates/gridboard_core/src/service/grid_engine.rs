//! Grid engine: layout synchronizer and staging orchestration for one board.
//!
//! # Responsibility
//! - Keep the working layout consistent with storage after fetch, gesture,
//!   commit and deletion.
//! - Drive the staging machine and persist commits atomically.
//! - Convert every failure into a typed error plus a queued [`Notice`].
//!
//! # Invariants
//! - Only user-originated gestures are validated and persisted.
//! - A rejected gesture never reaches storage and is followed by a re-fetch.
//! - Layout persistence is one atomic batch; on failure the last known-good
//!   entries stay in place.
//! - Occupancy is derived from the working layout, never stored.

use crate::model::grid::{
    find_overlaps, render_occupancy, GridConfig, GridConfigError, GridRect, PlacementError,
};
use crate::model::widget::{normalize_widget_name, LayoutEntry, NewWidget, Project, Widget, WidgetId};
use crate::registry::WidgetTypeRegistry;
use crate::repo::widget_repo::WidgetRepository;
use crate::repo::RepoError;
use crate::service::staging::{StagedMove, StagingMachine, StagingState};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Who produced a layout change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureOrigin {
    /// Drag or resize by the user.
    User,
    /// Layout recomputation by the presentation layer itself.
    Programmatic,
}

/// Identity of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKey {
    /// Non-interactive staging placeholder.
    Staging,
    /// The staged widget awaiting commit.
    Staged,
    Widget(WidgetId),
}

/// One cell of the working layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem {
    pub key: GridKey,
    #[serde(flatten)]
    pub rect: GridRect,
}

impl GridItem {
    pub fn new(key: GridKey, rect: GridRect) -> Self {
        Self { key, rect }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeSeverity {
    Info,
    Warning,
    Error,
}

/// User-visible notification queued by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: NoticeSeverity,
    /// Stable machine-readable code.
    pub code: String,
    pub message: String,
}

/// Coarse error classes for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad input; recoverable locally, never reached storage.
    Validation,
    /// Widget or row missing; the board was refreshed.
    NotFound,
    /// Driver or transport failure.
    Storage,
    /// Defect in registry or grid setup.
    Configuration,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Storage => "storage",
            Self::Configuration => "configuration",
        }
    }
}

/// Engine operation failure.
#[derive(Debug)]
pub enum EngineError {
    InvalidField(String),
    InvalidPlacement(PlacementError),
    DuplicateWidget { name: String, widget_type: String },
    NoProjectSelected,
    WidgetNotFound(WidgetId),
    /// Gesture referenced a widget that is no longer on the board.
    StaleLayout(WidgetId),
    UnknownWidgetType(String),
    InvalidConfig(GridConfigError),
    Storage(RepoError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField(_)
            | Self::InvalidPlacement(_)
            | Self::DuplicateWidget { .. }
            | Self::NoProjectSelected => ErrorKind::Validation,
            Self::WidgetNotFound(_) | Self::StaleLayout(_) => ErrorKind::NotFound,
            Self::UnknownWidgetType(_) | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField(message) => write!(f, "{message}"),
            Self::InvalidPlacement(err) => write!(f, "invalid placement: {err}"),
            Self::DuplicateWidget { name, widget_type } => write!(
                f,
                "a `{widget_type}` widget named `{name}` already exists in this project"
            ),
            Self::NoProjectSelected => write!(f, "no project selected"),
            Self::WidgetNotFound(id) => write!(f, "widget not found: {id}"),
            Self::StaleLayout(id) => write!(f, "layout references unknown widget: {id}"),
            Self::UnknownWidgetType(name) => write!(f, "unknown widget type: `{name}`"),
            Self::InvalidConfig(err) => write!(f, "invalid grid configuration: {err}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPlacement(err) => Some(err),
            Self::InvalidConfig(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "layout entry",
                id,
            } => Self::StaleLayout(id),
            RepoError::NotFound { id, .. } => Self::WidgetNotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<PlacementError> for EngineError {
    fn from(value: PlacementError) -> Self {
        Self::InvalidPlacement(value)
    }
}

/// Result of one layout gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Programmatic change; nothing validated or stored.
    Ignored,
    /// Staged cell move was refused and the cell put back.
    StagedReverted(GridRect),
    /// Staged cell snapped back to column zero.
    StagedSnapped(GridRect),
    /// Staged cell moved within the reserved strip.
    StagedMoved(GridRect),
    /// Staged widget was committed.
    Committed(Widget),
    /// Committed entries were stored in one batch.
    Persisted { entries: usize },
}

/// Board state of the open project, detachable from the engine so callers
/// can keep it between short-lived storage handles.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    project: Option<Project>,
    widgets: Vec<Widget>,
    entries: Vec<LayoutEntry>,
    staging: StagingMachine,
    editing: Option<WidgetId>,
    notices: Vec<Notice>,
}

impl BoardState {
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Widgets with a layout entry, in creation order.
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn staging(&self) -> &StagingState {
        self.staging.state()
    }

    pub fn editing(&self) -> Option<WidgetId> {
        self.editing
    }

    pub fn pending_notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Removes and returns queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn clear_board(&mut self) {
        self.widgets.clear();
        self.entries.clear();
        self.staging.reset();
        self.editing = None;
    }
}

/// Layout synchronizer for one board.
pub struct GridEngine<R: WidgetRepository> {
    repo: R,
    registry: Arc<WidgetTypeRegistry>,
    config: GridConfig,
    state: BoardState,
}

impl<R: WidgetRepository> GridEngine<R> {
    /// Creates an engine with an empty board.
    pub fn new(
        repo: R,
        registry: Arc<WidgetTypeRegistry>,
        config: GridConfig,
    ) -> Result<Self, EngineError> {
        Self::with_state(repo, registry, config, BoardState::default())
    }

    /// Creates an engine around previously detached board state.
    pub fn with_state(
        repo: R,
        registry: Arc<WidgetTypeRegistry>,
        config: GridConfig,
        state: BoardState,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self {
            repo,
            registry,
            config,
            state,
        })
    }

    /// Detaches the board state.
    pub fn into_state(self) -> BoardState {
        self.state
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Sorted names of registered widget types.
    pub fn list_widget_types(&self) -> Vec<String> {
        self.registry.type_names()
    }

    /// Opens a project board and admits the staging placeholder.
    pub fn select_project(&mut self, project: Project) -> Result<(), EngineError> {
        self.state.clear_board();
        info!(
            "event=project_select module=engine status=ok project_id={}",
            project.id
        );
        self.state.project = Some(project);
        self.fetch_widgets()
    }

    /// Closes the board. Staging and layout are reset to `Empty`.
    pub fn deselect_project(&mut self) {
        self.state.clear_board();
        self.state.project = None;
    }

    /// Reloads widgets and layout entries of the selected project.
    ///
    /// A local staged cell survives the refresh. Widgets without a layout
    /// entry are logged and left off the board. On failure the previous
    /// board is kept.
    pub fn fetch_widgets(&mut self) -> Result<(), EngineError> {
        let project_id = self.require_project()?.id;

        let loaded = self.repo.get_project_widgets(project_id).and_then(|widgets| {
            let ids: Vec<WidgetId> = widgets.iter().map(|widget| widget.id).collect();
            let layouts = self.repo.get_widget_layouts(&ids)?;
            Ok((widgets, layouts))
        });
        let (widgets, layouts) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(
                    "event=widget_fetch module=engine status=error project_id={} error={}",
                    project_id, err
                );
                self.notify(
                    NoticeSeverity::Error,
                    "storage_failure",
                    "Could not load widgets; showing the last known board.",
                );
                return Err(err.into());
            }
        };

        let by_widget: BTreeMap<WidgetId, GridRect> = layouts
            .into_iter()
            .map(|entry| (entry.widget_id, entry.rect))
            .collect();
        let mut kept = Vec::with_capacity(widgets.len());
        let mut entries = Vec::with_capacity(widgets.len());
        for widget in widgets {
            match by_widget.get(&widget.id) {
                Some(rect) => {
                    entries.push(LayoutEntry::new(widget.id, *rect));
                    kept.push(widget);
                }
                None => warn!(
                    "event=widget_orphan module=engine status=error project_id={} widget_id={}",
                    project_id, widget.id
                ),
            }
        }

        self.state.widgets = kept;
        self.state.entries = entries;
        if let Some(editing) = self.state.editing {
            if !self.state.widgets.iter().any(|widget| widget.id == editing) {
                self.state.editing = None;
            }
        }
        self.state.staging.admit();
        self.log_overlaps();
        info!(
            "event=widget_fetch module=engine status=ok project_id={} widgets={}",
            project_id,
            self.state.entries.len()
        );
        Ok(())
    }

    /// `Staging -> Staged`. Returns `false` when already staged or no
    /// project is selected.
    pub fn stage_new_widget(&mut self) -> bool {
        if self.state.project.is_none() {
            return false;
        }
        self.state.staging.stage(&self.config)
    }

    /// Discards staged input and restores the placeholder.
    pub fn cancel_staging(&mut self) -> bool {
        self.state.staging.cancel().is_some()
    }

    /// Updates staged name and type input.
    ///
    /// Returns `Ok(false)` when nothing is staged.
    pub fn set_staged_fields(
        &mut self,
        name: &str,
        widget_type: Option<&str>,
    ) -> Result<bool, EngineError> {
        if let Some(type_name) = widget_type {
            if self.registry.get(type_name).is_none() {
                return Err(EngineError::UnknownWidgetType(type_name.to_string()));
            }
        }
        Ok(self
            .state
            .staging
            .set_fields(name, widget_type.map(str::to_string)))
    }

    /// Applies one layout change reported by the presentation layer.
    pub fn on_layout_gesture(
        &mut self,
        items: &[GridItem],
        origin: GestureOrigin,
    ) -> Result<GestureOutcome, EngineError> {
        if origin == GestureOrigin::Programmatic {
            return Ok(GestureOutcome::Ignored);
        }
        self.require_project()?;

        let staged_move = match self.state.staging.staged() {
            Some(staged) => items
                .iter()
                .find(|item| item.key == GridKey::Staged && item.rect != staged.rect)
                .map(|item| item.rect),
            None => None,
        };
        if let Some(proposed) = staged_move {
            return self.move_staged(proposed);
        }

        self.apply_committed_gesture(items)
    }

    /// Persists committed entries as one atomic batch.
    ///
    /// Every entry must name a widget on the board and pass committed
    /// placement checks. Entries are merged over the working layout by
    /// widget id, and the whole merged layout is written. Returns the number
    /// of entries stored. On failure the previous entries are kept.
    pub fn persist_layout_batch(&mut self, entries: Vec<LayoutEntry>) -> Result<usize, EngineError> {
        let mut proposed: BTreeMap<WidgetId, GridRect> = BTreeMap::new();
        for entry in &entries {
            self.check_committed_move(entry.widget_id, entry.rect)?;
            proposed.insert(entry.widget_id, entry.rect);
        }

        let merged: Vec<LayoutEntry> = self
            .state
            .entries
            .iter()
            .map(|entry| {
                let rect = proposed.get(&entry.widget_id).copied().unwrap_or(entry.rect);
                LayoutEntry::new(entry.widget_id, rect)
            })
            .collect();
        let count = merged.len();
        if count == 0 {
            return Ok(0);
        }

        if let Err(err) = self.repo.bulk_update_layout(&merged) {
            error!(
                "event=layout_batch module=engine status=error entries={} error={}",
                count, err
            );
            let err = EngineError::from(err);
            if err.kind() == ErrorKind::NotFound {
                self.notify(
                    NoticeSeverity::Warning,
                    "stale_layout",
                    "The board changed elsewhere and was reloaded.",
                );
                self.refetch();
            } else {
                self.notify(
                    NoticeSeverity::Error,
                    "storage_failure",
                    "Could not save the layout.",
                );
            }
            return Err(err);
        }

        self.state.entries = merged;
        info!(
            "event=layout_batch module=engine status=ok entries={} changed={}",
            count,
            proposed.len()
        );
        self.log_overlaps();
        Ok(count)
    }

    /// Deletes a widget with its layout entry and data rows.
    pub fn delete_widget(&mut self, widget_id: WidgetId) -> Result<(), EngineError> {
        let project_id = self.require_project()?.id;
        let widget = match self.repo.get_widget(widget_id) {
            Ok(Some(widget)) if widget.project_id == project_id => widget,
            Ok(_) => {
                self.notify(
                    NoticeSeverity::Warning,
                    "widget_not_found",
                    "That widget no longer exists.",
                );
                self.refetch();
                return Err(EngineError::WidgetNotFound(widget_id));
            }
            Err(err) => return Err(self.storage_failure("widget_delete", err)),
        };
        let descriptor = self
            .registry
            .require(&widget.widget_type)
            .map_err(|_| EngineError::UnknownWidgetType(widget.widget_type.clone()))?;

        if let Err(err) = self.repo.delete_widget_cascade(widget_id, descriptor) {
            return Err(self.storage_failure("widget_delete", err));
        }
        info!(
            "event=widget_delete module=engine status=ok widget_id={}",
            widget_id
        );

        if self.state.editing == Some(widget_id) {
            self.state.clear_board();
        }
        self.refetch();
        Ok(())
    }

    /// Marks a widget as open for data editing.
    pub fn begin_editing(&mut self, widget_id: WidgetId) -> Result<(), EngineError> {
        if !self.state.widgets.iter().any(|widget| widget.id == widget_id) {
            return Err(EngineError::WidgetNotFound(widget_id));
        }
        self.state.editing = Some(widget_id);
        Ok(())
    }

    pub fn end_editing(&mut self) {
        self.state.editing = None;
    }

    /// Deletes widgets of the selected project that lost their layout entry.
    pub fn repair_orphans(&mut self) -> Result<usize, EngineError> {
        let project_id = self.require_project()?.id;
        let orphans = self.repo.find_orphaned_widgets(project_id)?;
        for orphan in &orphans {
            let descriptor = self
                .registry
                .require(&orphan.widget_type)
                .map_err(|_| EngineError::UnknownWidgetType(orphan.widget_type.clone()))?;
            self.repo.delete_widget_cascade(orphan.id, descriptor)?;
            info!(
                "event=widget_orphan_repair module=engine status=ok widget_id={}",
                orphan.id
            );
        }
        self.fetch_widgets()?;
        Ok(orphans.len())
    }

    /// Working layout: staging cell first, then committed widgets.
    pub fn layout(&self) -> Vec<GridItem> {
        let mut items = Vec::with_capacity(self.state.entries.len() + 1);
        match self.state.staging.state() {
            StagingState::Empty => {}
            StagingState::Staging => {
                items.push(GridItem::new(GridKey::Staging, self.config.staging_rect()))
            }
            StagingState::Staged(staged) => items.push(GridItem::new(GridKey::Staged, staged.rect)),
        }
        items.extend(
            self.state
                .entries
                .iter()
                .map(|entry| GridItem::new(GridKey::Widget(entry.widget_id), entry.rect)),
        );
        items
    }

    /// Derived occupancy map. Staging cells draw as `s`, widgets as `a..z`.
    pub fn occupancy(&self) -> Vec<String> {
        let mut next_glyph = (b'a'..=b'z').cycle();
        let cells: Vec<(GridRect, char)> = self
            .layout()
            .into_iter()
            .map(|item| {
                let glyph = match item.key {
                    GridKey::Staging | GridKey::Staged => 's',
                    GridKey::Widget(_) => char::from(next_glyph.next().unwrap_or(b'w')),
                };
                (item.rect, glyph)
            })
            .collect();
        render_occupancy(&self.config, &cells)
    }

    /// Takes queued notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.state.take_notices()
    }

    fn move_staged(&mut self, proposed: GridRect) -> Result<GestureOutcome, EngineError> {
        match self.state.staging.propose_move(&self.config, proposed) {
            Some(StagedMove::Reverted(rect)) => Ok(GestureOutcome::StagedReverted(rect)),
            Some(StagedMove::Snapped(rect)) => Ok(GestureOutcome::StagedSnapped(rect)),
            Some(StagedMove::Moved(rect)) => Ok(GestureOutcome::StagedMoved(rect)),
            Some(StagedMove::CommitRequested(rect)) => self.commit_staged(rect),
            None => Ok(GestureOutcome::Ignored),
        }
    }

    fn commit_staged(&mut self, rect: GridRect) -> Result<GestureOutcome, EngineError> {
        let project_id = self.require_project()?.id;
        let Some(staged) = self.state.staging.staged().cloned() else {
            return Ok(GestureOutcome::Ignored);
        };

        let name = normalize_widget_name(&staged.name)
            .map_err(|err| EngineError::InvalidField(err.to_string()))?;
        let widget_type = staged
            .widget_type
            .ok_or_else(|| EngineError::InvalidField("widget type must be selected".to_string()))?;
        if self.registry.get(&widget_type).is_none() {
            return Err(EngineError::UnknownWidgetType(widget_type));
        }

        match self
            .repo
            .find_widget_by_name_and_type(project_id, &name, &widget_type)
        {
            Ok(Some(_)) => return Err(self.duplicate(name, widget_type)),
            Ok(None) => {}
            Err(err) => return Err(self.storage_failure("widget_commit", err)),
        }

        if let Err(err) = self.config.validate_committed(rect) {
            warn!(
                "event=layout_gesture_rejected module=engine status=error target=staged reason={}",
                err
            );
            self.notify(NoticeSeverity::Warning, "invalid_placement", err.to_string());
            return Err(err.into());
        }

        let new_widget = NewWidget {
            project_id,
            name,
            widget_type,
        };
        let widget = match self.repo.create_widget_with_layout(&new_widget, rect) {
            Ok(widget) => widget,
            Err(RepoError::Db(err)) if err.is_unique_violation() => {
                return Err(self.duplicate(new_widget.name, new_widget.widget_type));
            }
            Err(err) => return Err(self.storage_failure("widget_commit", err)),
        };
        info!(
            "event=widget_commit module=engine status=ok project_id={} widget_id={}",
            project_id, widget.id
        );

        self.state.staging.complete_commit();
        self.state.widgets.push(widget.clone());
        self.state.entries.push(LayoutEntry::new(widget.id, rect));
        self.refetch();
        Ok(GestureOutcome::Committed(widget))
    }

    fn apply_committed_gesture(&mut self, items: &[GridItem]) -> Result<GestureOutcome, EngineError> {
        let entries: Vec<LayoutEntry> = items
            .iter()
            .filter_map(|item| match item.key {
                GridKey::Widget(widget_id) => Some(LayoutEntry::new(widget_id, item.rect)),
                GridKey::Staging | GridKey::Staged => None,
            })
            .collect();
        let count = self.persist_layout_batch(entries)?;
        Ok(GestureOutcome::Persisted { entries: count })
    }

    /// Rejects a committed move for a widget off the board or a rectangle
    /// outside the placeable area. Both reload the board.
    fn check_committed_move(
        &mut self,
        widget_id: WidgetId,
        rect: GridRect,
    ) -> Result<(), EngineError> {
        if !self
            .state
            .entries
            .iter()
            .any(|entry| entry.widget_id == widget_id)
        {
            warn!(
                "event=layout_gesture_rejected module=engine status=error reason=stale widget_id={}",
                widget_id
            );
            self.notify(
                NoticeSeverity::Warning,
                "stale_layout",
                "The board changed elsewhere and was reloaded.",
            );
            self.refetch();
            return Err(EngineError::StaleLayout(widget_id));
        }
        if let Err(err) = self.config.validate_committed(rect) {
            warn!(
                "event=layout_gesture_rejected module=engine status=error widget_id={} reason={}",
                widget_id, err
            );
            self.notify(NoticeSeverity::Warning, "invalid_placement", err.to_string());
            self.refetch();
            return Err(err.into());
        }
        Ok(())
    }

    fn require_project(&self) -> Result<&Project, EngineError> {
        self.state
            .project
            .as_ref()
            .ok_or(EngineError::NoProjectSelected)
    }

    fn refetch(&mut self) {
        // Failures already queued a notice.
        let _ = self.fetch_widgets();
    }

    fn duplicate(&mut self, name: String, widget_type: String) -> EngineError {
        self.notify(
            NoticeSeverity::Warning,
            "duplicate_widget",
            format!("A {widget_type} widget with this name already exists."),
        );
        EngineError::DuplicateWidget { name, widget_type }
    }

    fn storage_failure(&mut self, event: &str, err: RepoError) -> EngineError {
        error!("event={} module=engine status=error error={}", event, err);
        let err = EngineError::from(err);
        match err.kind() {
            ErrorKind::NotFound => self.notify(
                NoticeSeverity::Warning,
                "widget_not_found",
                "That widget no longer exists.",
            ),
            _ => self.notify(
                NoticeSeverity::Error,
                "storage_failure",
                "Something went wrong while saving. Please try again.",
            ),
        }
        err
    }

    fn notify(&mut self, severity: NoticeSeverity, code: &str, message: impl Into<String>) {
        self.state.notices.push(Notice {
            severity,
            code: code.to_string(),
            message: message.into(),
        });
    }

    fn log_overlaps(&self) {
        let rects: Vec<GridRect> = self.state.entries.iter().map(|entry| entry.rect).collect();
        for (left, right) in find_overlaps(&rects) {
            warn!(
                "event=layout_overlap module=engine status=ok left={} right={}",
                self.state.entries[left].widget_id, self.state.entries[right].widget_id
            );
        }
    }
}
