//! Field decoders that tolerate the loose typing of the question-bank API.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Required integer id; accepts numbers and numeric strings.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    as_i64(&value).ok_or_else(|| de::Error::custom(format!("expected integer id, got {}", value)))
}

/// Optional integer; anything unusable becomes 0.
pub(crate) fn id_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_i64(&value).unwrap_or(0))
}

/// String field; null becomes empty, numbers are rendered.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Boolean flag; accepts `true`, `1`, `"1"`, `"true"`. Null keeps the flag set.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !matches!(s.trim(), "0" | "false" | "no" | ""),
        _ => true,
    })
}

/// Optional string that remembers whether the key was present at all.
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    text(deserializer).map(Some)
}

/// Optional integer; present but unusable values become `None`.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_i64(&value))
}

/// First non-empty text among keys listed in precedence order.
pub(crate) fn first_text(candidates: impl IntoIterator<Item = Option<String>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

pub(crate) fn default_true() -> bool {
    true
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
