//! REST implementation of [`Backend`] on top of `reqwest`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::{normalize, Backend};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{BulkTagRequest, BulkTagResult, CategoryRecord, CourseRecord, TagMode, TagRef};

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Question-bank API client.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, AppError> {
        let request = self.authorized(self.client.get(self.url(path)));
        Self::read_json(request).await
    }

    async fn read_json(request: RequestBuilder) -> Result<Value, AppError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| normalize::error_message(&value))
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Backend request failed: {}", message);
            return Err(AppError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Backend for HttpBackend {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, AppError> {
        let body = self.get_json("/api/categories").await?;
        let categories = normalize::categories(body);
        tracing::debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    async fn fetch_courses_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CourseRecord>, AppError> {
        let body = self
            .get_json(&format!("/api/categories/{}/courses", category_id))
            .await?;
        let courses = normalize::courses_for_category(body, category_id);
        tracing::debug!(category_id, count = courses.len(), "Fetched courses");
        Ok(courses)
    }

    async fn fetch_tags_for_item(&self, item_id: i64) -> Result<Vec<TagRef>, AppError> {
        let body = self
            .get_json(&format!("/api/questions/{}/tags", item_id))
            .await?;
        Ok(normalize::tags(body))
    }

    async fn fetch_all_known_tags(&self) -> Result<Vec<TagRef>, AppError> {
        let body = self.get_json("/api/tags").await?;
        Ok(normalize::tags(body))
    }

    async fn apply_bulk_tag(
        &self,
        item_ids: &[i64],
        tag_id: i64,
        mode: TagMode,
    ) -> Result<BulkTagResult, AppError> {
        let payload = BulkTagRequest {
            question_ids: item_ids.to_vec(),
            tag_id,
            action: mode,
        };
        let request = self
            .authorized(self.client.post(self.url("/api/questions/tags/bulk")))
            .json(&payload);
        let body = Self::read_json(request).await?;
        normalize::bulk_result(body)
    }
}
