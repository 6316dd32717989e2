//! Normalization of backend payloads into canonical records.
//!
//! The question-bank API answers list requests in several shapes: a bare
//! array, or an object wrapping the array under `data`, `courses`,
//! `categories` or `tags` (possibly nested once under `data`). Everything is
//! mapped here so the rest of the crate only sees typed records.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{BulkTagResult, CategoryRecord, CourseRecord, TagRef};

/// Object keys that may wrap a list payload, in lookup order.
const LIST_KEYS: &[&str] = &["data", "courses", "categories", "tags", "items"];

/// Pull the element array out of any supported list shape.
pub fn extract_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in LIST_KEYS {
                match map.remove(*key) {
                    Some(Value::Array(items)) => return items,
                    Some(nested @ Value::Object(_)) if *key == "data" => {
                        return extract_list(nested)
                    }
                    _ => {}
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Decode each element, skipping the ones that do not fit `T`.
pub fn decode_list<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    extract_list(value)
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping {} at position {}: {}", what, position, e);
                None
            }
        })
        .collect()
}

pub fn categories(value: Value) -> Vec<CategoryRecord> {
    decode_list(value, "category")
}

pub fn courses(value: Value) -> Vec<CourseRecord> {
    decode_list(value, "course")
}

/// Courses for one category. Records reporting no category are attributed
/// to the requested one.
pub fn courses_for_category(value: Value, category_id: i64) -> Vec<CourseRecord> {
    courses(value)
        .into_iter()
        .map(|mut course| {
            if course.category_id == 0 {
                course.category_id = category_id;
            }
            course
        })
        .collect()
}

pub fn tags(value: Value) -> Vec<TagRef> {
    decode_list(value, "tag")
}

/// Bulk tag answer, bare or wrapped under `data`.
pub fn bulk_result(value: Value) -> Result<BulkTagResult, AppError> {
    let body = match value {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(body)?)
}

/// Human-readable message from an error body, if it carries one.
pub fn error_message(value: &Value) -> Option<String> {
    let candidate = value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .or_else(|| value.get("error"));
    match candidate {
        Some(Value::String(message)) if !message.trim().is_empty() => Some(message.clone()),
        _ => None,
    }
}
