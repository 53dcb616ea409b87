//! crates/course_advisor_core/src/dashboard.rs
//!
//! Filtering and summary statistics over the saved-course collection.

use crate::domain::{Course, CourseLevel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// The value that disables a filter.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseFilters {
    pub search: String,
    pub level: String,
    pub provider: String,
    /// A duration bucket such as `"0-5 hours"` or `"20+ hours"`.
    pub duration_max: String,
    pub bookmarked_only: bool,
}

impl Default for CourseFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            level: ALL.to_string(),
            provider: ALL.to_string(),
            duration_max: ALL.to_string(),
            bookmarked_only: false,
        }
    }
}

fn first_number(text: &str) -> Option<u32> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"\d+").expect("number pattern is valid"))
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

impl CourseFilters {
    /// Number of filters that currently constrain the result.
    pub fn active_count(&self) -> usize {
        [
            !self.search.is_empty(),
            self.level != ALL,
            self.provider != ALL,
            self.duration_max != ALL,
            self.bookmarked_only,
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// Upper bound in hours for the selected duration bucket.
    fn max_duration(&self) -> Option<u32> {
        if self.duration_max == ALL {
            return None;
        }
        if self.duration_max.starts_with("20+") {
            return Some(100);
        }
        self.duration_max
            .split('-')
            .nth(1)
            .and_then(first_number)
    }

    pub fn matches(&self, course: &Course) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            if !course.title.to_lowercase().contains(&needle)
                && !course.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if self.level != ALL && course.level.as_str() != self.level {
            return false;
        }

        if self.provider != ALL && course.provider != self.provider {
            return false;
        }

        // Courses whose duration has no number are never filtered out.
        if let (Some(max), Some(duration)) = (self.max_duration(), first_number(&course.duration))
        {
            if duration > max {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, courses: &'a [Course]) -> Vec<&'a Course> {
        courses.iter().filter(|course| self.matches(course)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_saved: usize,
    pub by_level: BTreeMap<String, usize>,
    pub by_provider: BTreeMap<String, usize>,
}

impl DashboardStats {
    pub fn from_courses(courses: &[Course]) -> Self {
        let mut by_level: BTreeMap<String, usize> = CourseLevel::ALL
            .iter()
            .map(|level| (level.to_string(), 0))
            .collect();
        let mut by_provider = BTreeMap::new();

        for course in courses {
            *by_level.entry(course.level.to_string()).or_default() += 1;
            *by_provider.entry(course.provider.clone()).or_default() += 1;
        }

        Self {
            total_saved: courses.len(),
            by_level,
            by_provider,
        }
    }
}
