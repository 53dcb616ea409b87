//! crates/course_advisor_core/src/collection.rs
//!
//! An ordered set of courses keyed by `(title, provider)`.

use crate::domain::Course;

/// How two courses are compared for membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Exact, case-sensitive match on title and provider.
    Exact,
    /// Match on the normalized slug id (`CourseKey::slug_id`).
    Slug,
}

impl IdentityPolicy {
    pub fn same_course(self, a: &Course, b: &Course) -> bool {
        match self {
            IdentityPolicy::Exact => a.title == b.title && a.provider == b.provider,
            IdentityPolicy::Slug => a.key().slug_id() == b.key().slug_id(),
        }
    }
}

/// A list of courses that never holds two entries with the same identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCollection {
    policy: IdentityPolicy,
    courses: Vec<Course>,
}

impl CourseCollection {
    pub fn new(policy: IdentityPolicy) -> Self {
        Self {
            policy,
            courses: Vec::new(),
        }
    }

    /// Rebuilds a collection from persisted courses, dropping later duplicates.
    pub fn from_courses(policy: IdentityPolicy, courses: Vec<Course>) -> Self {
        let mut collection = Self::new(policy);
        for course in courses {
            collection.add(course);
        }
        collection
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn into_courses(self) -> Vec<Course> {
        self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn is_saved(&self, course: &Course) -> bool {
        self.courses
            .iter()
            .any(|saved| self.policy.same_course(saved, course))
    }

    /// Adds the course unless an entry with the same identity is present.
    pub fn add(&mut self, course: Course) {
        if !self.is_saved(&course) {
            self.courses.push(course);
        }
    }

    pub fn remove(&mut self, course: &Course) {
        let policy = self.policy;
        self.courses.retain(|saved| !policy.same_course(saved, course));
    }

    /// Removes the course if present, adds it otherwise. Returns whether it is
    /// saved afterwards.
    pub fn toggle(&mut self, course: Course) -> bool {
        if self.is_saved(&course) {
            self.remove(&course);
            false
        } else {
            self.courses.push(course);
            true
        }
    }

    pub fn clear(&mut self) {
        self.courses.clear();
    }
}
