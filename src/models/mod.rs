//! Data models for the question-bank navigator.
//!
//! Records mirror the backend payloads but are decoded leniently, so unknown
//! or missing fields fall back to defaults instead of failing the whole list.

mod category;
mod course;
mod filter;
pub(crate) mod lenient;
mod status;
mod tag;

pub use category::*;
pub use course::*;
pub use filter::*;
pub use status::*;
pub use tag::*;
