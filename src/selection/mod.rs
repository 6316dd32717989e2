//! Category and course selection flow.
//!
//! The coordinator owns the category tree for one fetch cycle and drives the
//! selection through explicit states:
//!
//! ```text
//! Idle --select--> CategorySelected --(not cached)--> CoursesLoading --> CategorySelected
//! CategorySelected --select same--> Idle
//! CategorySelected --select_course--> CourseConfirmPending --cancel--> CategorySelected
//! CourseConfirmPending --confirm--> (commit, emit filter) --> Idle
//! ```
//!
//! Committing is transient: the filter is emitted, the choice is remembered
//! as a preference, and the coordinator is back to `Idle`.

use std::sync::Arc;

use crate::api::{Backend, HostEvents};
use crate::cache::{LazyChildCache, Resolution};
use crate::errors::AppError;
use crate::models::{CategoryNode, CategoryRecord, CourseRecord, FilterDescriptor, StatusMessage};
use crate::prefs::{self, PreferenceStore, CATEGORY_KEY, COURSE_KEY};
use crate::tree;

/// Where the selection flow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    CategorySelected { category_id: i64 },
    CoursesLoading { category_id: i64 },
    CourseConfirmPending { category_id: i64, course: CourseRecord },
}

impl SelectionState {
    pub fn category_id(&self) -> Option<i64> {
        match self {
            SelectionState::Idle => None,
            SelectionState::CategorySelected { category_id }
            | SelectionState::CoursesLoading { category_id }
            | SelectionState::CourseConfirmPending { category_id, .. } => Some(*category_id),
        }
    }
}

/// Downstream panel the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    None,
    Courses,
    Questions,
}

pub struct SelectionCoordinator<B, P, H> {
    backend: B,
    prefs: P,
    host: H,
    cache: Arc<LazyChildCache>,
    roots: Vec<CategoryNode>,
    records: Vec<CategoryRecord>,
    state: SelectionState,
    selected_course: Option<CourseRecord>,
    preferred_course_id: Option<i64>,
    include_subcategories: bool,
    restored: bool,
    status: Option<StatusMessage>,
}

impl<B, P, H> SelectionCoordinator<B, P, H>
where
    B: Backend,
    P: PreferenceStore,
    H: HostEvents,
{
    pub fn new(backend: B, prefs: P, host: H, cache: Arc<LazyChildCache>) -> Self {
        Self {
            backend,
            prefs,
            host,
            cache,
            roots: Vec::new(),
            records: Vec::new(),
            state: SelectionState::Idle,
            selected_course: None,
            preferred_course_id: None,
            include_subcategories: false,
            restored: false,
            status: None,
        }
    }

    /// Make committed filters cover the selected category's whole subtree.
    pub fn with_subcategories(mut self, include: bool) -> Self {
        self.include_subcategories = include;
        self
    }

    pub fn tree(&self) -> &[CategoryNode] {
        &self.roots
    }

    pub fn records(&self) -> &[CategoryRecord] {
        &self.records
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn cache(&self) -> &Arc<LazyChildCache> {
        &self.cache
    }

    pub fn selected_category_id(&self) -> Option<i64> {
        self.state.category_id()
    }

    pub fn selected_category(&self) -> Option<&CategoryNode> {
        self.selected_category_id()
            .and_then(|id| tree::find_node(&self.roots, id))
    }

    /// Root-to-selection path for breadcrumbs.
    pub fn breadcrumb(&self) -> Vec<&CategoryNode> {
        self.selected_category_id()
            .map(|id| tree::path_to(&self.roots, id))
            .unwrap_or_default()
    }

    /// Last committed course.
    pub fn selected_course(&self) -> Option<&CourseRecord> {
        self.selected_course.as_ref()
    }

    pub fn pending_course(&self) -> Option<&CourseRecord> {
        match &self.state {
            SelectionState::CourseConfirmPending { course, .. } => Some(course),
            _ => None,
        }
    }

    /// Remembered course id, for highlighting once its category is loaded.
    pub fn preferred_course_id(&self) -> Option<i64> {
        self.preferred_course_id
    }

    /// Courses of the selected category, from the cache only.
    pub fn courses(&self) -> Vec<CourseRecord> {
        self.selected_category_id()
            .map(|id| self.cache.get(id))
            .unwrap_or_default()
    }

    /// Whether the selected category's courses are being fetched.
    ///
    /// Reads the shared cache's loading set, so a fetch started by another
    /// coordinator on the same cache is visible here too.
    pub fn is_loading_courses(&self) -> bool {
        self.selected_category_id()
            .is_some_and(|id| self.cache.is_loading(id))
    }

    pub fn visible_panel(&self) -> Panel {
        match self.state {
            SelectionState::Idle if self.selected_course.is_some() => Panel::Questions,
            SelectionState::Idle => Panel::None,
            _ => Panel::Courses,
        }
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Fetch categories and rebuild the tree.
    ///
    /// On the first successful load, a remembered category present in the
    /// fresh tree is pre-selected. Its courses are not resolved and nothing is
    /// committed.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let records = match self.backend.fetch_categories().await {
            Ok(records) => records,
            Err(e) => return Err(self.fail("Loading categories", e)),
        };
        let roots = match tree::build_tree(&records) {
            Ok(roots) => roots,
            Err(e) => return Err(self.fail("Building category tree", e)),
        };

        tracing::info!(categories = records.len(), "Loaded category tree");
        self.records = records;
        self.roots = roots;

        if let Some(current) = self.state.category_id() {
            if tree::find_node(&self.roots, current).is_none() {
                tracing::debug!(category_id = current, "Selected category disappeared");
                self.state = SelectionState::Idle;
            }
        }

        if !self.restored {
            self.restored = true;
            if self.state == SelectionState::Idle {
                self.restore_preferences().await;
            }
        }
        Ok(())
    }

    async fn restore_preferences(&mut self) {
        let category_id = match prefs::get_id(&self.prefs, CATEGORY_KEY).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to read category preference: {}", e);
                return;
            }
        };
        let Some(category_id) = category_id else {
            return;
        };
        if tree::find_node(&self.roots, category_id).is_none() {
            tracing::debug!(category_id, "Remembered category not in tree");
            return;
        }

        self.state = SelectionState::CategorySelected { category_id };
        self.preferred_course_id = match prefs::get_id(&self.prefs, COURSE_KEY).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to read course preference: {}", e);
                None
            }
        };
        tracing::debug!(category_id, "Pre-selected remembered category");
    }

    /// Select a category, or deselect it when it is already selected.
    ///
    /// A newly selected category has its courses resolved unless cached. A
    /// fetch failure keeps the category selected and is reported; selecting
    /// that category again retries the fetch.
    pub async fn select_category(&mut self, category_id: i64) -> Result<(), AppError> {
        if tree::find_node(&self.roots, category_id).is_none() {
            let e = AppError::Validation(format!("Unknown category {}", category_id));
            return Err(self.fail("Selecting category", e));
        }

        if let SelectionState::CategorySelected { category_id: current } = self.state {
            if current == category_id {
                tracing::debug!(category_id, "Deselected category");
                self.state = SelectionState::Idle;
                self.selected_course = None;
                return Ok(());
            }
        }

        let retry = self.cache.has_failed(category_id);
        tracing::debug!(category_id, retry, "Selected category");
        self.state = SelectionState::CategorySelected { category_id };
        self.resolve_courses(retry).await
    }

    /// Resolve the selected category's courses unless cached, e.g. after a
    /// remembered category was pre-selected.
    pub async fn load_courses(&mut self) -> Result<(), AppError> {
        self.resolve_courses(false).await
    }

    /// Refetch the selected category's courses even if cached.
    pub async fn reload_courses(&mut self) -> Result<(), AppError> {
        self.resolve_courses(true).await
    }

    async fn resolve_courses(&mut self, force_reload: bool) -> Result<(), AppError> {
        let SelectionState::CategorySelected { category_id } = self.state else {
            let e = AppError::Validation("No category selected".to_string());
            return Err(self.fail("Loading courses", e));
        };
        if !force_reload && self.cache.has(category_id) {
            return Ok(());
        }

        self.state = SelectionState::CoursesLoading { category_id };
        let backend = &self.backend;
        let result = self
            .cache
            .resolve(
                category_id,
                move |id| backend.fetch_courses_for_category(id),
                force_reload,
            )
            .await;
        self.state = SelectionState::CategorySelected { category_id };

        match result {
            Ok(Resolution::AlreadyLoading) => {
                self.status = Some(StatusMessage::info("Courses are still loading"));
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(self.fail("Loading courses", e)),
        }
    }

    /// Open the confirmation step for a course of the selected category.
    pub fn select_course(&mut self, course_id: i64) -> Result<(), AppError> {
        let SelectionState::CategorySelected { category_id } = self.state else {
            let e = AppError::Validation("Select a category first".to_string());
            return Err(self.fail("Selecting course", e));
        };
        let Some(course) = self
            .cache
            .get(category_id)
            .into_iter()
            .find(|course| course.id == course_id)
        else {
            let e = AppError::Validation(format!(
                "Course {} is not in category {}",
                course_id, category_id
            ));
            return Err(self.fail("Selecting course", e));
        };

        self.state = SelectionState::CourseConfirmPending {
            category_id,
            course,
        };
        Ok(())
    }

    /// Discard the pending course. No-op outside the confirmation step.
    pub fn cancel(&mut self) {
        if let SelectionState::CourseConfirmPending { category_id, .. } = self.state {
            self.state = SelectionState::CategorySelected { category_id };
        }
    }

    /// Commit the pending course: remember it, emit the filter, return to idle.
    ///
    /// A preference write failure is reported but does not block the commit.
    pub async fn confirm(&mut self) -> Result<FilterDescriptor, AppError> {
        let (category_id, course) = match std::mem::replace(&mut self.state, SelectionState::Idle)
        {
            SelectionState::CourseConfirmPending {
                category_id,
                course,
            } => (category_id, course),
            other => {
                self.state = other;
                let e = AppError::Validation("No course awaiting confirmation".to_string());
                return Err(self.fail("Confirming course", e));
            }
        };

        let mut category_ids = vec![category_id];
        if self.include_subcategories {
            if let Some(node) = tree::find_node(&self.roots, category_id) {
                category_ids.extend(node.descendant_ids());
            }
        }
        let filter = FilterDescriptor {
            category_ids,
            course_id: course.id,
            course_name: course.display_name().to_string(),
        };

        let saved = match self
            .prefs
            .set(CATEGORY_KEY, &category_id.to_string())
            .await
        {
            Ok(()) => self.prefs.set(COURSE_KEY, &course.id.to_string()).await,
            Err(e) => Err(e),
        };

        self.host.on_filter_committed(&filter);
        tracing::info!(category_id, course_id = course.id, "Committed course selection");

        self.status = Some(match saved {
            Ok(()) => {
                StatusMessage::success(format!("Showing questions for {}", filter.course_name))
            }
            Err(e) => {
                tracing::warn!("Failed to remember selection: {}", e);
                e.to_status("Saving selection")
            }
        });
        self.preferred_course_id = Some(course.id);
        self.selected_course = Some(course);

        Ok(filter)
    }

    fn fail(&mut self, context: &str, error: AppError) -> AppError {
        tracing::warn!("{} failed: {}", context, error);
        self.status = Some(error.to_status(context));
        error
    }
}
