//! Durable user preferences.
//!
//! The navigator remembers the last committed category and course under
//! well-known keys so the next session can pre-select them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::errors::AppError;

/// Key of the last committed category id.
pub const CATEGORY_KEY: &str = "question_bank.category_id";
/// Key of the last committed course id.
pub const COURSE_KEY: &str = "question_bank.course_id";

/// Key-value preference storage.
#[allow(async_fn_in_trait)]
pub trait PreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<T: PreferenceStore> PreferenceStore for &T {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value).await
    }
}

/// Read an integer preference; unparsable values count as absent.
pub async fn get_id<P: PreferenceStore>(store: &P, key: &str) -> Result<Option<i64>, AppError> {
    let value = store.get(key).await?;
    Ok(value.and_then(|raw| match raw.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring non-numeric preference");
            None
        }
    }))
}

/// Process-local store, for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemoryPreferences::new();
        assert_eq!(store.get(CATEGORY_KEY).await.unwrap(), None);

        store.set(CATEGORY_KEY, "12").await.unwrap();
        store.set(CATEGORY_KEY, "13").await.unwrap();

        assert_eq!(store.get(CATEGORY_KEY).await.unwrap().as_deref(), Some("13"));
        assert_eq!(get_id(&store, CATEGORY_KEY).await.unwrap(), Some(13));
    }

    #[tokio::test]
    async fn test_get_id_ignores_garbage() {
        let store = MemoryPreferences::with_values([(COURSE_KEY, "not-a-number")]);
        assert_eq!(get_id(&store, COURSE_KEY).await.unwrap(), None);
    }
}
