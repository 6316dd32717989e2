//! Bulk add/remove of a tag across the selected questions.

use std::collections::{HashMap, HashSet};

use super::intersect;
use crate::api::{Backend, HostEvents};
use crate::errors::AppError;
use crate::models::{BulkTagResult, StatusMessage, TagMode, TagRef};

/// Drives the bulk tag panel for a host-owned question selection.
///
/// Candidate tags are computed lazily and discarded whenever the mode or the
/// selection changes. Local tag membership is patched only after the backend
/// accepted the whole batch.
pub struct BulkTagController<B, H> {
    backend: B,
    host: H,
    mode: TagMode,
    selected: Vec<i64>,
    candidates: Option<Vec<TagRef>>,
    item_tags: HashMap<i64, Vec<TagRef>>,
    status: Option<StatusMessage>,
}

impl<B: Backend, H: HostEvents> BulkTagController<B, H> {
    pub fn new(backend: B, host: H) -> Self {
        Self {
            backend,
            host,
            mode: TagMode::Add,
            selected: Vec::new(),
            candidates: None,
            item_tags: HashMap::new(),
            status: None,
        }
    }

    pub fn mode(&self) -> TagMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TagMode) {
        if self.mode != mode {
            self.mode = mode;
            self.candidates = None;
        }
    }

    pub fn selected(&self) -> &[i64] {
        &self.selected
    }

    /// Replace the selection. Duplicate ids are ignored.
    pub fn set_selection<I: IntoIterator<Item = i64>>(&mut self, item_ids: I) {
        let mut seen = HashSet::new();
        let selection: Vec<i64> = item_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if selection != self.selected {
            self.selected = selection;
            self.candidates = None;
        }
    }

    /// Register tags the host already knows for an item.
    pub fn seed_item_tags(&mut self, item_id: i64, tags: Vec<TagRef>) {
        self.item_tags.insert(item_id, tags);
    }

    /// Locally known tags of an item.
    pub fn tags_of(&self, item_id: i64) -> &[TagRef] {
        self.item_tags
            .get(&item_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Candidates computed for the current mode and selection, if any.
    pub fn candidates(&self) -> Option<&[TagRef]> {
        self.candidates.as_deref()
    }

    /// The action needs a selection, and removal needs a common tag.
    pub fn is_enabled(&self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        match (self.mode, &self.candidates) {
            (TagMode::Remove, Some(candidates)) => !candidates.is_empty(),
            _ => true,
        }
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Compute the tags offered for the current mode, fetching as needed.
    pub async fn load_candidates(&mut self) -> Result<&[TagRef], AppError> {
        if self.candidates.is_none() {
            match self.compute_candidates().await {
                Ok(list) => self.candidates = Some(list),
                Err(e) => {
                    self.status = Some(e.to_status("Loading tags"));
                    return Err(e);
                }
            }
        }
        Ok(self.candidates.as_deref().unwrap_or_default())
    }

    async fn compute_candidates(&mut self) -> Result<Vec<TagRef>, AppError> {
        match self.mode {
            TagMode::Add => self.backend.fetch_all_known_tags().await,
            TagMode::Remove => {
                if self.selected.is_empty() {
                    return Ok(Vec::new());
                }
                for &item_id in &self.selected {
                    let tags = self.backend.fetch_tags_for_item(item_id).await?;
                    self.item_tags.insert(item_id, tags);
                }
                let item_tags = &self.item_tags;
                Ok(intersect(&self.selected, |id| {
                    item_tags.get(&id).cloned().unwrap_or_default()
                }))
            }
        }
    }

    /// Apply `tag_id` to the whole selection in one backend call.
    pub async fn apply_tag(&mut self, tag_id: i64) -> Result<BulkTagResult, AppError> {
        if let Err(e) = self.validate(tag_id) {
            self.status = Some(e.to_status("Bulk tagging"));
            return Err(e);
        }

        let tag = self
            .load_candidates()
            .await?
            .iter()
            .find(|tag| tag.id == tag_id)
            .cloned();
        let Some(tag) = tag else {
            let e = AppError::Validation(format!(
                "Tag {} cannot be {} for the selected questions",
                tag_id,
                match self.mode {
                    TagMode::Add => "added",
                    TagMode::Remove => "removed",
                }
            ));
            self.status = Some(e.to_status("Bulk tagging"));
            return Err(e);
        };

        let result = match self
            .backend
            .apply_bulk_tag(&self.selected, tag_id, self.mode)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                self.status = Some(e.to_status("Bulk tagging"));
                return Err(e);
            }
        };

        if !result.success {
            tracing::warn!(tag_id, mode = self.mode.as_str(), "Bulk tag update rejected");
            self.status = Some(StatusMessage::error(format!(
                "Could not {} tag '{}'",
                self.mode.as_str(),
                tag.name
            )));
            return Ok(result);
        }

        let selected = self.selected.clone();
        for item_id in selected {
            if !self.item_tags.contains_key(&item_id) {
                match self.backend.fetch_tags_for_item(item_id).await {
                    Ok(fetched) => {
                        self.item_tags.insert(item_id, fetched);
                    }
                    Err(e) => {
                        tracing::warn!(item_id, "Skipping local tag update: {}", e);
                        continue;
                    }
                }
            }
            let Some(tags) = self.item_tags.get_mut(&item_id) else {
                continue;
            };
            match self.mode {
                TagMode::Add => {
                    if !tags.iter().any(|t| t.id == tag.id) {
                        tags.push(tag.clone());
                    }
                }
                TagMode::Remove => tags.retain(|t| t.id != tag.id),
            }
            self.host.on_tags_changed(item_id, tags);
        }
        self.candidates = None;

        tracing::info!(
            tag_id,
            mode = self.mode.as_str(),
            affected = result.affected_count,
            "Applied bulk tag"
        );
        self.status = Some(StatusMessage::success(format!(
            "Tag '{}' {} {} question(s)",
            tag.name,
            match self.mode {
                TagMode::Add => "added to",
                TagMode::Remove => "removed from",
            },
            result.affected_count
        )));

        Ok(result)
    }

    fn validate(&self, tag_id: i64) -> Result<(), AppError> {
        if self.selected.is_empty() {
            return Err(AppError::Validation(
                "Select at least one question".to_string(),
            ));
        }
        if tag_id <= 0 {
            return Err(AppError::Validation("Choose a tag first".to_string()));
        }
        Ok(())
    }
}
