//! Core module - fundamental types and utilities

pub mod codes;
pub mod config;
pub mod context;
pub mod entity;
pub mod identity;
pub mod project;

pub use config::Config;
pub use context::RegisterContext;
pub use entity::Record;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
