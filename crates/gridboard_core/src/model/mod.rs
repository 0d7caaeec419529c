//! Dashboard domain model.
//!
//! # Responsibility
//! - Define grid geometry and placement validation.
//! - Define persisted project/widget/layout/data shapes.
//! - Define the explicit session context.
//!
//! # Invariants
//! - Grid occupancy is derived from layout entries and never stored.
//! - Every committed widget has exactly one layout entry.

pub mod grid;
pub mod session;
pub mod widget;
pub mod widget_data;
