//! Grid placement model.
//!
//! # Responsibility
//! - Define grid dimensions and the reserved staging strip.
//! - Validate proposed rectangles against grid bounds.
//! - Derive cell occupancy from a set of rectangles.
//!
//! # Invariants
//! - A committed rectangle satisfies `x >= reserved_cols`,
//!   `x + w <= num_cols` and `y + h <= num_rows`, with `w, h >= 1`.
//! - Overlap between committed rectangles is reported, never rejected.
//! - Occupancy is always recomputed, never stored.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default grid column count.
pub const DEFAULT_NUM_COLS: u32 = 8;
/// Default grid row count.
pub const DEFAULT_NUM_ROWS: u32 = 8;
/// Default edge length of a freshly staged widget, which is also the width of
/// the reserved strip.
pub const DEFAULT_NEW_WIDGET_SIZE: u32 = 2;

/// Rectangle in grid cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridRect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.h)
    }

    /// Returns the same size anchored at `(x, y)`.
    pub fn moved_to(&self, x: u32, y: u32) -> Self {
        Self { x, y, ..*self }
    }

    /// Returns whether two rectangles share at least one cell.
    pub fn overlaps(&self, other: &GridRect) -> bool {
        u64::from(self.x) < other.right()
            && u64::from(other.x) < self.right()
            && u64::from(self.y) < other.bottom()
            && u64::from(other.y) < self.bottom()
    }
}

/// Placement violations detected by [`GridConfig::validate_committed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Width or height is zero.
    EmptyRect(GridRect),
    /// Rectangle starts inside the reserved staging strip.
    ReservedColumns { rect: GridRect, reserved_cols: u32 },
    /// `x + w` exceeds the column count.
    ExceedsColumns { rect: GridRect, num_cols: u32 },
    /// `y + h` exceeds the row count.
    ExceedsRows { rect: GridRect, num_rows: u32 },
}

impl Display for PlacementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRect(rect) => {
                write!(f, "widget at ({}, {}) has an empty size", rect.x, rect.y)
            }
            Self::ReservedColumns {
                rect,
                reserved_cols,
            } => write!(
                f,
                "x={} lies inside the reserved staging columns (x must be >= {reserved_cols})",
                rect.x
            ),
            Self::ExceedsColumns { rect, num_cols } => write!(
                f,
                "x+w={} exceeds the grid width {num_cols}",
                rect.right()
            ),
            Self::ExceedsRows { rect, num_rows } => write!(
                f,
                "y+h={} exceeds the grid height {num_rows}",
                rect.bottom()
            ),
        }
    }
}

impl Error for PlacementError {}

/// Invalid grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridConfigError {
    ZeroDimension,
    NoPlaceableColumns { num_cols: u32, reserved_cols: u32 },
    StagingTallerThanGrid { new_widget_size: u32, num_rows: u32 },
}

impl Display for GridConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "grid dimensions must be non-zero"),
            Self::NoPlaceableColumns {
                num_cols,
                reserved_cols,
            } => write!(
                f,
                "{reserved_cols} reserved columns leave no placeable column in a {num_cols}-column grid"
            ),
            Self::StagingTallerThanGrid {
                new_widget_size,
                num_rows,
            } => write!(
                f,
                "staging size {new_widget_size} does not fit in {num_rows} rows"
            ),
        }
    }
}

impl Error for GridConfigError {}

/// Grid dimensions and staging strip width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub num_cols: u32,
    pub num_rows: u32,
    pub new_widget_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            num_cols: DEFAULT_NUM_COLS,
            num_rows: DEFAULT_NUM_ROWS,
            new_widget_size: DEFAULT_NEW_WIDGET_SIZE,
        }
    }
}

impl GridConfig {
    /// Width of the left-hand strip excluded from committed placement.
    pub fn reserved_cols(&self) -> u32 {
        self.new_widget_size
    }

    /// Checks that the configuration leaves room for committed widgets.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if self.num_cols == 0 || self.num_rows == 0 || self.new_widget_size == 0 {
            return Err(GridConfigError::ZeroDimension);
        }
        if self.reserved_cols() >= self.num_cols {
            return Err(GridConfigError::NoPlaceableColumns {
                num_cols: self.num_cols,
                reserved_cols: self.reserved_cols(),
            });
        }
        if self.new_widget_size > self.num_rows {
            return Err(GridConfigError::StagingTallerThanGrid {
                new_widget_size: self.new_widget_size,
                num_rows: self.num_rows,
            });
        }
        Ok(())
    }

    /// Rectangle of the staging placeholder and of a freshly staged widget.
    pub fn staging_rect(&self) -> GridRect {
        GridRect::new(0, 0, self.new_widget_size, self.new_widget_size)
    }

    /// Validates a rectangle against grid bounds only.
    pub fn validate_bounds(&self, rect: GridRect) -> Result<(), PlacementError> {
        if rect.w == 0 || rect.h == 0 {
            return Err(PlacementError::EmptyRect(rect));
        }
        if rect.right() > u64::from(self.num_cols) {
            return Err(PlacementError::ExceedsColumns {
                rect,
                num_cols: self.num_cols,
            });
        }
        if rect.bottom() > u64::from(self.num_rows) {
            return Err(PlacementError::ExceedsRows {
                rect,
                num_rows: self.num_rows,
            });
        }
        Ok(())
    }

    /// Validates a rectangle for a committed widget: grid bounds plus the
    /// reserved staging strip.
    pub fn validate_committed(&self, rect: GridRect) -> Result<(), PlacementError> {
        self.validate_bounds(rect)?;
        if rect.x < self.reserved_cols() {
            return Err(PlacementError::ReservedColumns {
                rect,
                reserved_cols: self.reserved_cols(),
            });
        }
        Ok(())
    }
}

/// Returns index pairs `(i, j)` with `i < j` whose rectangles overlap.
pub fn find_overlaps(rects: &[GridRect]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, left) in rects.iter().enumerate() {
        for (offset, right) in rects[i + 1..].iter().enumerate() {
            if left.overlaps(right) {
                pairs.push((i, i + 1 + offset));
            }
        }
    }
    pairs
}

/// Renders derived occupancy as one string per row.
///
/// Each rectangle is drawn with its paired glyph; cells claimed by more than
/// one rectangle show `#`, free cells show `.`. Cells outside the grid are
/// clipped.
pub fn render_occupancy(config: &GridConfig, cells: &[(GridRect, char)]) -> Vec<String> {
    let cols = config.num_cols as usize;
    let rows = config.num_rows as usize;
    let mut canvas = vec![vec!['.'; cols]; rows];

    for (rect, glyph) in cells {
        let y_end = (rect.bottom() as usize).min(rows);
        let x_end = (rect.right() as usize).min(cols);
        for row in canvas.iter_mut().take(y_end).skip(rect.y as usize) {
            for cell in row.iter_mut().take(x_end).skip(rect.x as usize) {
                *cell = if *cell == '.' { *glyph } else { '#' };
            }
        }
    }

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect())
        .collect()
}
