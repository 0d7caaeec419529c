//! Flutter-facing bindings for the GridBoard core.

pub mod api;
