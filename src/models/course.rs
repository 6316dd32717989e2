//! Course model.

use serde::{Deserialize, Serialize};

use super::lenient;

/// A course belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawCourse")]
pub struct CourseRecord {
    pub id: i64,
    pub name: String,
    pub shortname: String,
    pub category_id: i64,
    pub visible: bool,
    pub enrolled_users: i64,
}

/// Wire shape of a course. Backends disagree on key names and some send
/// several spellings at once, so each spelling gets its own slot.
#[derive(Deserialize)]
struct RawCourse {
    #[serde(deserialize_with = "lenient::id")]
    id: i64,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    fullname: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    shortname: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    short_name: Option<String>,
    #[serde(default, rename = "categoryId", deserialize_with = "lenient::opt_id")]
    category_id_camel: Option<i64>,
    #[serde(default, rename = "category_id", deserialize_with = "lenient::opt_id")]
    category_id_snake: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    categoryid: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    category: Option<i64>,
    #[serde(default = "lenient::default_true", deserialize_with = "lenient::flag")]
    visible: bool,
    #[serde(default, rename = "enrolledUsers", deserialize_with = "lenient::opt_id")]
    enrolled_users_camel: Option<i64>,
    #[serde(default, rename = "enrolled_users", deserialize_with = "lenient::opt_id")]
    enrolled_users_snake: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    enrolledusercount: Option<i64>,
}

impl From<RawCourse> for CourseRecord {
    fn from(raw: RawCourse) -> Self {
        Self {
            id: raw.id,
            name: lenient::first_text([raw.name, raw.fullname]),
            shortname: lenient::first_text([raw.shortname, raw.short_name]),
            category_id: raw
                .category_id_camel
                .or(raw.category_id_snake)
                .or(raw.categoryid)
                .or(raw.category)
                .unwrap_or(0),
            visible: raw.visible,
            enrolled_users: raw
                .enrolled_users_camel
                .or(raw.enrolled_users_snake)
                .or(raw.enrolledusercount)
                .unwrap_or(0),
        }
    }
}

impl CourseRecord {
    pub fn new(id: i64, name: impl Into<String>, category_id: i64) -> Self {
        let name = name.into();
        Self {
            id,
            shortname: name.clone(),
            name,
            category_id,
            visible: true,
            enrolled_users: 0,
        }
    }

    /// Name shown in pickers; falls back to the short name.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.shortname
        } else {
            &self.name
        }
    }
}
