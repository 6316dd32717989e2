//! Collaborator interfaces of the navigator.
//!
//! [`Backend`] is everything the navigator asks of the question-bank API,
//! [`HostEvents`] is everything it tells the embedding UI. [`HttpBackend`]
//! is the REST implementation of `Backend`.

mod client;
pub mod normalize;

pub use client::*;

use crate::errors::AppError;
use crate::models::{BulkTagResult, CategoryRecord, CourseRecord, FilterDescriptor, TagMode, TagRef};

/// Remote source of categories, courses and tags.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, AppError>;

    async fn fetch_courses_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CourseRecord>, AppError>;

    async fn fetch_tags_for_item(&self, item_id: i64) -> Result<Vec<TagRef>, AppError>;

    async fn fetch_all_known_tags(&self) -> Result<Vec<TagRef>, AppError>;

    /// One batched call for the whole selection.
    async fn apply_bulk_tag(
        &self,
        item_ids: &[i64],
        tag_id: i64,
        mode: TagMode,
    ) -> Result<BulkTagResult, AppError>;
}

impl<T: Backend> Backend for &T {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, AppError> {
        (**self).fetch_categories().await
    }

    async fn fetch_courses_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CourseRecord>, AppError> {
        (**self).fetch_courses_for_category(category_id).await
    }

    async fn fetch_tags_for_item(&self, item_id: i64) -> Result<Vec<TagRef>, AppError> {
        (**self).fetch_tags_for_item(item_id).await
    }

    async fn fetch_all_known_tags(&self) -> Result<Vec<TagRef>, AppError> {
        (**self).fetch_all_known_tags().await
    }

    async fn apply_bulk_tag(
        &self,
        item_ids: &[i64],
        tag_id: i64,
        mode: TagMode,
    ) -> Result<BulkTagResult, AppError> {
        (**self).apply_bulk_tag(item_ids, tag_id, mode).await
    }
}

/// Outputs emitted to the embedding UI.
pub trait HostEvents {
    fn on_filter_committed(&self, _filter: &FilterDescriptor) {}

    fn on_tags_changed(&self, _item_id: i64, _tags: &[TagRef]) {}
}

impl<T: HostEvents> HostEvents for &T {
    fn on_filter_committed(&self, filter: &FilterDescriptor) {
        (**self).on_filter_committed(filter)
    }

    fn on_tags_changed(&self, item_id: i64, tags: &[TagRef]) {
        (**self).on_tags_changed(item_id, tags)
    }
}

/// Host that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl HostEvents for NoopHost {}
