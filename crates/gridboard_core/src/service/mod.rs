//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into board and data level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod data_dispatcher;
pub mod grid_engine;
pub mod project_service;
pub mod staging;
