//! Student record model
//!
//! A [`StudentRecord`] is built once per planning request from a raw
//! course → grade mapping. Every catalog course gets a `passed` and a
//! `studied` flag; a course with no grade counts as not attempted.

use super::Catalog;
use crate::core::error::InputError;
use crate::warn;
use serde::{Deserialize, Serialize};

/// Largest accepted number of completed terms
pub const MAX_TERMS_STUDIED: u32 = 16;

/// Minor value meaning "no minor chosen"
pub const NO_MINOR: &str = "no minor";

/// Outcome class of a recorded grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    /// Withdrawal (`W`)
    Withdrawn,
    /// Unsatisfactory (`U`)
    Unsatisfactory,
    /// Fail (`F`)
    Failed,
    /// Any other grade
    Passed,
}

impl Grade {
    /// Classify a raw grade string (trimmed, case-insensitive)
    ///
    /// # Returns
    /// `None` for an empty grade
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let grade = raw.trim();
        if grade.is_empty() {
            return None;
        }
        Some(match grade.to_ascii_uppercase().as_str() {
            "W" => Self::Withdrawn,
            "U" => Self::Unsatisfactory,
            "F" => Self::Failed,
            _ => Self::Passed,
        })
    }

    /// Whether the grade satisfies prerequisites
    #[must_use]
    pub const fn counts_as_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Whether the grade counts as an attempt (failing included)
    #[must_use]
    pub const fn counts_as_studied(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

/// A planning request as received from the outside world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningRequest {
    /// Completed terms
    pub terms_studied: u32,
    /// Chosen minor (case-insensitive); `None` or "no minor" means none
    #[serde(default)]
    pub minor: Option<String>,
    /// Raw (course id, grade) entries; a later entry for the same course wins
    #[serde(default)]
    pub grades: Vec<(String, String)>,
}

impl Default for PlanningRequest {
    fn default() -> Self {
        Self {
            terms_studied: 1,
            minor: None,
            grades: Vec::new(),
        }
    }
}

impl PlanningRequest {
    /// Create a request for a student with the given progress
    #[must_use]
    pub fn new(terms_studied: u32) -> Self {
        Self {
            terms_studied,
            ..Self::default()
        }
    }

    /// Set the chosen minor
    #[must_use]
    pub fn with_minor(mut self, minor: &str) -> Self {
        self.minor = Some(minor.to_string());
        self
    }

    /// Record a grade
    #[must_use]
    pub fn with_grade(mut self, course_id: &str, grade: &str) -> Self {
        self.grades.push((course_id.to_string(), grade.to_string()));
        self
    }
}

/// Per-request snapshot of a student's history against one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    passed: Vec<bool>,
    studied: Vec<bool>,
    terms_studied: u32,
    chosen_minor: Option<String>,
    catalog_fingerprint: u64,
}

impl StudentRecord {
    /// Build the record for `request` against `catalog`
    ///
    /// # Errors
    /// Returns [`InputError`] when a grade names an unknown course, a grade is
    /// empty, or the term count exceeds [`MAX_TERMS_STUDIED`].
    pub fn from_request(catalog: &Catalog, request: &PlanningRequest) -> Result<Self, InputError> {
        if request.terms_studied > MAX_TERMS_STUDIED {
            return Err(InputError::TermsOutOfRange {
                value: request.terms_studied,
                max: MAX_TERMS_STUDIED,
            });
        }

        let mut passed = vec![false; catalog.len()];
        let mut studied = vec![false; catalog.len()];
        for (course_id, raw_grade) in &request.grades {
            let idx = catalog
                .index_of(course_id.trim())
                .ok_or_else(|| InputError::UnknownCourse(course_id.clone()))?;
            let grade =
                Grade::parse(raw_grade).ok_or_else(|| InputError::EmptyGrade(course_id.clone()))?;
            passed[idx] = grade.counts_as_passed();
            studied[idx] = grade.counts_as_studied();
        }

        Ok(Self {
            passed,
            studied,
            terms_studied: request.terms_studied,
            chosen_minor: resolve_minor(catalog, request.minor.as_deref()),
            catalog_fingerprint: catalog.fingerprint(),
        })
    }

    /// Whether the course at catalog position `idx` has been passed
    #[must_use]
    pub fn passed(&self, idx: usize) -> bool {
        self.passed[idx]
    }

    /// Whether the course at catalog position `idx` has been attempted
    #[must_use]
    pub fn studied(&self, idx: usize) -> bool {
        self.studied[idx]
    }

    /// Completed terms
    #[must_use]
    pub const fn terms_studied(&self) -> u32 {
        self.terms_studied
    }

    /// Chosen minor, spelled as in the catalog when it matched one
    #[must_use]
    pub fn chosen_minor(&self) -> Option<&str> {
        self.chosen_minor.as_deref()
    }

    /// Whether the record was built against `catalog` (or one with the same course ids)
    #[must_use]
    pub fn belongs_to(&self, catalog: &Catalog) -> bool {
        self.catalog_fingerprint == catalog.fingerprint() && self.len() == catalog.len()
    }

    /// Number of courses covered by the record
    #[must_use]
    pub fn len(&self) -> usize {
        self.passed.len()
    }

    /// Whether the record covers no courses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passed.is_empty()
    }

    /// Ids of passed courses in catalog order
    #[must_use]
    pub fn passed_ids<'a>(&self, catalog: &'a Catalog) -> Vec<&'a str> {
        catalog
            .courses()
            .iter()
            .zip(&self.passed)
            .filter(|(_, passed)| **passed)
            .map(|(course, _)| course.id.as_str())
            .collect()
    }
}

fn resolve_minor(catalog: &Catalog, minor: Option<&str>) -> Option<String> {
    let name = minor.map(str::trim).filter(|m| !m.is_empty())?;
    if name.eq_ignore_ascii_case(NO_MINOR) {
        return None;
    }
    if let Some(known) = catalog.find_minor(name) {
        return Some(known.name.clone());
    }
    warn!("Minor '{name}' is not in the catalog; minor rules will not apply");
    Some(name.to_ascii_lowercase())
}
