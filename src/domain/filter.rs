//! Filter criteria and the visible-task filter

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::task::{Category, Priority, Task};

/// Current board filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against title and description
    pub search: String,

    /// Exact category match, if set
    #[serde(deserialize_with = "blank_as_none")]
    pub category: Option<Category>,

    /// Exact priority match, if set
    #[serde(deserialize_with = "blank_as_none")]
    pub priority: Option<Priority>,
}

impl FilterCriteria {
    /// Returns true if no filter is active
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_none() && self.priority.is_none()
    }

    /// Returns true if the task passes every active filter
    pub fn matches(&self, task: &Task) -> bool {
        Matcher::new(self).matches(task)
    }

    /// Merges the fields set in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("search=\"{}\"", self.search));
        }
        if let Some(category) = self.category {
            parts.push(format!("category={}", category));
        }
        if let Some(priority) = self.priority {
            parts.push(format!("priority={}", priority));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Partial update of [`FilterCriteria`]
///
/// `None` leaves a field unchanged; `Some(None)` clears an optional filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub category: Option<Option<Category>>,
    pub priority: Option<Option<Priority>>,
}

impl FilterPatch {
    /// A patch that resets every filter
    pub fn clear_all() -> Self {
        Self {
            search: Some(String::new()),
            category: Some(None),
            priority: Some(None),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none() && self.priority.is_none()
    }
}

/// Criteria with the search needle lowered once
pub(crate) struct Matcher<'a> {
    criteria: &'a FilterCriteria,
    needle: String,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            needle: criteria.search.to_lowercase(),
        }
    }

    pub(crate) fn matches(&self, task: &Task) -> bool {
        let search_ok = self.needle.is_empty()
            || task.title.to_lowercase().contains(&self.needle)
            || task.description.to_lowercase().contains(&self.needle);

        let category_ok = self.criteria.category.map_or(true, |c| c == task.category);
        let priority_ok = self.criteria.priority.map_or(true, |p| p == task.priority);

        search_ok && category_ok && priority_ok
    }
}

/// Returns the tasks passing `criteria`, in input order
pub fn visible_tasks<'a, I>(tasks: I, criteria: &FilterCriteria) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let matcher = Matcher::new(criteria);
    tasks.into_iter().filter(|t| matcher.matches(t)).collect()
}

/// Reads `null`, a missing value or `""` as no filter
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => label.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
