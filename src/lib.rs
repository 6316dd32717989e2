//! Question-bank navigator core.
//!
//! Builds the category tree, lazily caches per-category course lists, drives
//! the category/course selection flow, and runs bulk tag actions over a
//! question selection. All persistent state lives behind the [`api::Backend`]
//! and [`prefs::PreferenceStore`] collaborators.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod prefs;
pub mod selection;
pub mod tagging;
pub mod tree;

pub use api::{Backend, HostEvents, HttpBackend, NoopHost};
pub use cache::{CacheEntry, LazyChildCache, Resolution};
pub use errors::AppError;
pub use selection::{Panel, SelectionCoordinator, SelectionState};
pub use tagging::{intersect, BulkTagController};
pub use tree::{build_tree, find_node};
