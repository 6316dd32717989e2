//! Category records as fetched and the tree nodes derived from them.

use serde::{Deserialize, Serialize};

use super::lenient;

/// A flat category record. `parent_id == 0` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawCategory")]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub parent_id: i64,
}

/// Wire shape of a category; each parent spelling is decoded separately.
#[derive(Deserialize)]
struct RawCategory {
    #[serde(deserialize_with = "lenient::id")]
    id: i64,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(default, rename = "parentId", deserialize_with = "lenient::opt_id")]
    parent_id_camel: Option<i64>,
    #[serde(default, rename = "parent_id", deserialize_with = "lenient::opt_id")]
    parent_id_snake: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    parent: Option<i64>,
}

impl From<RawCategory> for CategoryRecord {
    fn from(raw: RawCategory) -> Self {
        Self {
            id: raw.id,
            name: lenient::first_text([raw.name]),
            parent_id: raw
                .parent_id_camel
                .or(raw.parent_id_snake)
                .or(raw.parent)
                .unwrap_or(0),
        }
    }
}

impl CategoryRecord {
    pub fn new(id: i64, name: impl Into<String>, parent_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }
}

/// A category placed in the tree. Children keep the input's relative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    pub level: u32,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }

    /// Ids of every descendant in depth-first pre-order, excluding `self`.
    pub fn descendant_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut stack: Vec<&CategoryNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        ids
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
