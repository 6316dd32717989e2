//! Tag intersection and bulk tagging over a question selection.

mod bulk;
mod intersection;

pub use bulk::*;
pub use intersection::*;
