//! Filter emitted to the host when a course selection is committed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    pub category_ids: Vec<i64>,
    pub course_id: i64,
    pub course_name: String,
}
