//! Tag references and bulk tagging payloads.

use serde::{Deserialize, Serialize};

use super::lenient;

/// A tag attached to questions. Identity is the `id`; the name is display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

impl TagRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Whether a bulk action adds or removes a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    #[default]
    Add,
    Remove,
}

impl TagMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMode::Add => "add",
            TagMode::Remove => "remove",
        }
    }
}

/// Request body for a batched tag update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagRequest {
    pub question_ids: Vec<i64>,
    pub tag_id: i64,
    pub action: TagMode,
}

/// Backend answer to a batched tag update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient::id_or_zero")]
    pub affected_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bulk_request_wire_shape() {
        let request = BulkTagRequest {
            question_ids: vec![10, 11],
            tag_id: 6,
            action: TagMode::Remove,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "questionIds": [10, 11], "tagId": 6, "action": "remove" })
        );
    }

    #[test]
    fn test_bulk_result_tolerates_missing_count() {
        let result: BulkTagResult = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(result.success);
        assert_eq!(result.affected_count, 0);
    }
}
