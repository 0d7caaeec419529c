//! Staging state machine for widget creation.
//!
//! # Responsibility
//! - Track the placeholder and the single staged widget of the open board.
//! - Decide what a proposed move of the staged cell means: revert, snap,
//!   plain move, or a commit request.
//!
//! # Invariants
//! - At most one staged widget exists at a time.
//! - A staged widget is draggable only with a valid name and a selected type.
//! - The machine never persists anything; commit requests are handed back to
//!   the caller, which reports the outcome through [`StagingMachine::complete_commit`].

use crate::model::grid::{GridConfig, GridRect};
use crate::model::widget::normalize_widget_name;
use serde::{Deserialize, Serialize};

/// Widget pending name/type input, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedWidget {
    /// Raw user input; trimmed and checked on commit.
    pub name: String,
    pub widget_type: Option<String>,
    pub rect: GridRect,
}

impl StagedWidget {
    fn fresh(config: &GridConfig) -> Self {
        Self {
            name: String::new(),
            widget_type: None,
            rect: config.staging_rect(),
        }
    }

    /// Returns whether the cell may leave the reserved strip.
    pub fn is_draggable(&self) -> bool {
        normalize_widget_name(&self.name).is_ok() && self.widget_type.is_some()
    }
}

/// Current staging state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StagingState {
    /// Nothing on the board; no project selected or state was reset.
    #[default]
    Empty,
    /// Placeholder occupies the reserved strip.
    Staging,
    Staged(StagedWidget),
}

/// Interpretation of a user move of the staged cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedMove {
    /// Move refused; the cell is back at this rectangle.
    Reverted(GridRect),
    /// Partial move into the reserved strip; the cell snapped to `x = 0`.
    Snapped(GridRect),
    /// Move stayed inside the reserved strip.
    Moved(GridRect),
    /// Cell reached the placeable area; the caller must attempt a commit.
    CommitRequested(GridRect),
}

/// Explicit state machine for the staged widget lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingMachine {
    state: StagingState,
}

impl StagingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &StagingState {
        &self.state
    }

    pub fn staged(&self) -> Option<&StagedWidget> {
        match &self.state {
            StagingState::Staged(staged) => Some(staged),
            _ => None,
        }
    }

    /// `Empty -> Staging`. Returns whether the state changed.
    pub fn admit(&mut self) -> bool {
        if self.state == StagingState::Empty {
            self.state = StagingState::Staging;
            return true;
        }
        false
    }

    /// `Staging -> Staged`. No-op unless a placeholder is present.
    pub fn stage(&mut self, config: &GridConfig) -> bool {
        if self.state != StagingState::Staging {
            return false;
        }
        self.state = StagingState::Staged(StagedWidget::fresh(config));
        true
    }

    /// `Staged -> Staged` with new name and type input.
    ///
    /// When the edit makes the cell non-draggable it is pulled back to the
    /// reserved corner.
    pub fn set_fields(&mut self, name: &str, widget_type: Option<String>) -> bool {
        let StagingState::Staged(staged) = &mut self.state else {
            return false;
        };
        staged.name = name.to_string();
        staged.widget_type = widget_type;
        if !staged.is_draggable() {
            staged.rect = staged.rect.moved_to(0, 0);
        }
        true
    }

    /// `Staged -> Cancelled -> Staging`. Returns the discarded input.
    pub fn cancel(&mut self) -> Option<StagedWidget> {
        if !matches!(self.state, StagingState::Staged(_)) {
            return None;
        }
        match std::mem::replace(&mut self.state, StagingState::Staging) {
            StagingState::Staged(staged) => Some(staged),
            _ => None,
        }
    }

    /// Any state `-> Empty`.
    pub fn reset(&mut self) {
        self.state = StagingState::Empty;
    }

    /// Classifies a user move of the staged cell and applies any local
    /// change. Returns `None` when nothing is staged.
    ///
    /// `CommitRequested` leaves the cell at its previous rectangle until the
    /// caller reports a successful commit. A resize wider than the reserved
    /// columns is reverted.
    pub fn propose_move(&mut self, config: &GridConfig, proposed: GridRect) -> Option<StagedMove> {
        let StagingState::Staged(staged) = &mut self.state else {
            return None;
        };

        if !staged.is_draggable() {
            staged.rect = staged.rect.moved_to(0, 0);
            return Some(StagedMove::Reverted(staged.rect));
        }

        let reserved = config.reserved_cols();
        if proposed.x >= reserved {
            return Some(StagedMove::CommitRequested(proposed));
        }

        let candidate = proposed.moved_to(0, proposed.y);
        if candidate.right() > u64::from(reserved) || config.validate_bounds(candidate).is_err() {
            return Some(StagedMove::Reverted(staged.rect));
        }
        staged.rect = candidate;
        if proposed.x > 0 {
            Some(StagedMove::Snapped(candidate))
        } else {
            Some(StagedMove::Moved(candidate))
        }
    }

    /// `Staged -> Committed -> Empty -> Staging`. Returns the committed input.
    pub fn complete_commit(&mut self) -> Option<StagedWidget> {
        if !matches!(self.state, StagingState::Staged(_)) {
            return None;
        }
        let committed = match std::mem::replace(&mut self.state, StagingState::Empty) {
            StagingState::Staged(staged) => Some(staged),
            _ => None,
        };
        self.admit();
        committed
    }
}
