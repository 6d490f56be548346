//! Course model

use serde::{Deserialize, Serialize};

/// A registerable course (module) in the curriculum catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course id (e.g., "CS1010")
    pub id: String,

    /// Credit value
    pub credits: u32,

    /// Courses that must be passed before this one may be taken
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Course that must have been attempted (any grade but W/U) before this one
    #[serde(default)]
    pub prior_exposure: Option<String>,

    /// Course that must be taken in the same term (or already passed alongside)
    #[serde(default)]
    pub co_module: Option<String>,

    /// Timeslot tags this course occupies
    #[serde(default)]
    pub timeslots: Vec<String>,

    /// Whether the course is offered in the target term
    pub offered_this_term: bool,
}

impl Course {
    /// Create a new course offered this term with no rules attached
    ///
    /// # Arguments
    /// * `id` - Course id
    /// * `credits` - Credit value
    #[must_use]
    pub const fn new(id: String, credits: u32) -> Self {
        Self {
            id,
            credits,
            prerequisites: Vec::new(),
            prior_exposure: None,
            co_module: None,
            timeslots: Vec::new(),
            offered_this_term: true,
        }
    }

    /// Add a prerequisite by course id
    pub fn add_prerequisite(&mut self, prereq_id: String) {
        if !self.prerequisites.contains(&prereq_id) {
            self.prerequisites.push(prereq_id);
        }
    }

    /// Add a timeslot tag
    pub fn add_timeslot(&mut self, tag: String) {
        if !self.timeslots.contains(&tag) {
            self.timeslots.push(tag);
        }
    }

    /// Set the prior-exposure course
    pub fn set_prior_exposure(&mut self, course_id: String) {
        self.prior_exposure = Some(course_id);
    }

    /// Set the co-module course
    pub fn set_co_module(&mut self, course_id: String) {
        self.co_module = Some(course_id);
    }

    /// Mark whether the course runs in the target term
    pub fn set_offered(&mut self, offered: bool) {
        self.offered_this_term = offered;
    }

    /// Whether this course shares at least one timeslot tag with `other`
    #[must_use]
    pub fn clashes_with(&self, other: &Self) -> bool {
        self.timeslots.iter().any(|tag| other.timeslots.contains(tag))
    }
}
