//! Lazily resolved, per-category course cache.
//!
//! Each category's course list is fetched at most once until it is
//! invalidated. A concurrent `resolve` for a key that is already loading does
//! not join the pending fetch: it returns [`Resolution::AlreadyLoading`] and
//! the caller re-reads the cache once the first fetch settles.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::CourseRecord;

/// A resolved course list for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub category_id: i64,
    pub courses: Vec<CourseRecord>,
    pub loaded_at: DateTime<Utc>,
    /// The fetch failed; `courses` is the empty placeholder.
    pub failed: bool,
}

/// Outcome of a successful [`LazyChildCache::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the cache without fetching.
    Cached(Vec<CourseRecord>),
    /// Fetched from the backend and stored.
    Fetched(Vec<CourseRecord>),
    /// Another resolve for the same key is in flight; nothing was fetched.
    AlreadyLoading,
}

impl Resolution {
    /// The course list, if this resolution carries one.
    pub fn courses(&self) -> Option<&[CourseRecord]> {
        match self {
            Resolution::Cached(courses) | Resolution::Fetched(courses) => Some(courses),
            Resolution::AlreadyLoading => None,
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<i64, CacheEntry>,
    loading: HashSet<i64>,
}

/// Keyed course cache with in-flight tracking.
///
/// The lock is only taken between suspension points, never across an
/// `.await`, so the cache can be shared as `Arc<LazyChildCache>`.
#[derive(Default)]
pub struct LazyChildCache {
    state: Mutex<CacheState>,
}

/// Removes a key from the loading set when dropped, whether the fetch
/// succeeded, failed or the resolve future was abandoned.
struct LoadingGuard<'a> {
    cache: &'a LazyChildCache,
    category_id: i64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.cache.state().loading.remove(&self.category_id);
    }
}

impl LazyChildCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True iff a resolved (possibly empty) entry exists.
    pub fn has(&self, category_id: i64) -> bool {
        self.state().entries.contains_key(&category_id)
    }

    /// Cached courses, or an empty list. Never fetches.
    pub fn get(&self, category_id: i64) -> Vec<CourseRecord> {
        self.state()
            .entries
            .get(&category_id)
            .map(|entry| entry.courses.clone())
            .unwrap_or_default()
    }

    pub fn entry(&self, category_id: i64) -> Option<CacheEntry> {
        self.state().entries.get(&category_id).cloned()
    }

    /// True iff the entry for `category_id` records a failed fetch.
    pub fn has_failed(&self, category_id: i64) -> bool {
        self.state()
            .entries
            .get(&category_id)
            .is_some_and(|entry| entry.failed)
    }

    pub fn is_loading(&self, category_id: i64) -> bool {
        self.state().loading.contains(&category_id)
    }

    /// Keys currently being fetched, sorted.
    pub fn loading_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.state().loading.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Drop the entry so the next `resolve` fetches again.
    pub fn invalidate(&self, category_id: i64) {
        if self.state().entries.remove(&category_id).is_some() {
            tracing::debug!(category_id, "Invalidated course cache entry");
        }
    }

    pub fn clear(&self) {
        self.state().entries.clear();
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the courses of `category_id`, fetching only when needed.
    ///
    /// On fetch failure the key is stored with an empty list and marked as
    /// failed, so nothing retries on its own, and the error is returned for
    /// display. A later forced resolve replaces the failed entry.
    pub async fn resolve<F, Fut>(
        &self,
        category_id: i64,
        fetcher: F,
        force_reload: bool,
    ) -> Result<Resolution, AppError>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<Vec<CourseRecord>, AppError>>,
    {
        let _guard = {
            let mut state = self.state();
            if !force_reload {
                if let Some(entry) = state.entries.get(&category_id) {
                    tracing::debug!(category_id, "Course cache hit");
                    return Ok(Resolution::Cached(entry.courses.clone()));
                }
            }
            if !state.loading.insert(category_id) {
                tracing::debug!(category_id, "Courses already loading, skipping fetch");
                return Ok(Resolution::AlreadyLoading);
            }
            LoadingGuard {
                cache: self,
                category_id,
            }
        };

        tracing::debug!(category_id, force_reload, "Fetching courses");
        let result = fetcher(category_id).await;

        let (courses, failed, outcome) = match result {
            Ok(courses) => (courses.clone(), false, Ok(Resolution::Fetched(courses))),
            Err(e) => {
                tracing::warn!(category_id, "Failed to load courses: {}", e);
                (Vec::new(), true, Err(e))
            }
        };

        self.state().entries.insert(
            category_id,
            CacheEntry {
                category_id,
                courses,
                loaded_at: Utc::now(),
                failed,
            },
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn courses_for(category_id: i64) -> Vec<CourseRecord> {
        vec![
            CourseRecord::new(category_id * 10 + 1, "Intro", category_id),
            CourseRecord::new(category_id * 10 + 2, "Advanced", category_id),
        ]
    }

    #[tokio::test]
    async fn test_sequential_resolves_fetch_once() {
        let cache = LazyChildCache::new();
        let calls = AtomicUsize::new(0);
        let fetch = |id: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(courses_for(id)) }
        };

        let first = cache.resolve(4, fetch, false).await.unwrap();
        assert!(matches!(first, Resolution::Fetched(_)));
        assert!(cache.has(4));

        let second = cache.resolve(4, fetch, false).await.unwrap();
        assert_eq!(second, Resolution::Cached(courses_for(4)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(4).len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_dedupe() {
        let cache = LazyChildCache::new();
        let calls = AtomicUsize::new(0);
        let fetch = |id: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::task::yield_now().await;
                Ok(courses_for(id))
            }
        };

        let (first, second) = tokio::join!(
            cache.resolve(8, fetch, false),
            cache.resolve(8, fetch, false)
        );

        assert!(matches!(first.unwrap(), Resolution::Fetched(_)));
        assert_eq!(second.unwrap(), Resolution::AlreadyLoading);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_loading(8));
        assert_eq!(cache.get(8), courses_for(8));
    }

    #[tokio::test]
    async fn test_loading_set_during_fetch() {
        let cache = LazyChildCache::new();
        let observed = cache
            .resolve(
                2,
                |id| {
                    let loading = cache.loading_ids();
                    async move {
                        assert_eq!(loading, vec![2]);
                        Ok(courses_for(id))
                    }
                },
                false,
            )
            .await;
        assert!(observed.is_ok());
        assert!(cache.loading_ids().is_empty());
    }

    #[tokio::test]
    async fn test_force_reload_always_fetches() {
        let cache = LazyChildCache::new();
        let calls = AtomicUsize::new(0);
        let fetch = |id: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(courses_for(id)) }
        };

        cache.resolve(1, fetch, false).await.unwrap();
        let reloaded = cache.resolve(1, fetch, true).await.unwrap();
        assert!(matches!(reloaded, Resolution::Fetched(_)));
        cache.resolve(1, fetch, true).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failure_caches_empty_and_clears_loading() {
        let cache = LazyChildCache::new();
        let calls = AtomicUsize::new(0);
        let failing = |_id: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Network("connection refused".to_string())) }
        };

        let err = cache.resolve(3, failing, false).await.unwrap_err();
        assert!(err.is_fetch_error());
        assert!(cache.has(3));
        assert!(cache.has_failed(3));
        assert!(cache.get(3).is_empty());
        assert!(!cache.is_loading(3));

        // No automatic retry: the empty entry is served from the cache.
        let again = cache.resolve(3, failing, false).await.unwrap();
        assert_eq!(again, Resolution::Cached(Vec::new()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forced_resolve_clears_failure() {
        let cache = LazyChildCache::new();
        let failing = |_id: i64| async { Err(AppError::Network("timeout".to_string())) };
        cache.resolve(6, failing, false).await.unwrap_err();
        assert!(cache.has_failed(6));

        let fetched = cache
            .resolve(6, |id| async move { Ok(courses_for(id)) }, true)
            .await
            .unwrap();

        assert_eq!(fetched.courses().map(<[_]>::len), Some(2));
        assert!(!cache.has_failed(6));
        assert_eq!(cache.entry(6).map(|e| e.failed), Some(false));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = LazyChildCache::new();
        let calls = AtomicUsize::new(0);
        let fetch = |id: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(courses_for(id)) }
        };

        cache.resolve(5, fetch, false).await.unwrap();
        cache.invalidate(5);
        assert!(!cache.has(5));
        assert!(cache.get(5).is_empty());

        cache.resolve(5, fetch, false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.entry(5).is_some());
    }

    #[tokio::test]
    async fn test_dropped_resolve_clears_loading() {
        let cache = LazyChildCache::new();
        {
            let pending = cache.resolve(
                9,
                |_id| std::future::pending::<Result<Vec<CourseRecord>, AppError>>(),
                false,
            );
            let timed_out =
                tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;
            assert!(timed_out.is_err());
        }
        assert!(!cache.is_loading(9));
        assert!(!cache.has(9));
    }

    #[test]
    fn test_get_on_empty_cache() {
        let cache = LazyChildCache::new();
        assert!(!cache.has(1));
        assert!(cache.get(1).is_empty());
        assert!(cache.is_empty());
    }
}
