//! Curriculum catalog model
//!
//! A [`Catalog`] is assembled through a [`CatalogBuilder`] and validated once.
//! After [`CatalogBuilder::build`] succeeds every course reference is known to
//! resolve, and the catalog keeps index-stable lookups so planners never hash
//! course ids inside their constraint loops.

use super::Course;
use crate::core::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Institution-wide credit requirements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Total credits needed to graduate (objective anchor only)
    pub credit_requirement: u32,
    /// Inclusive lower bound on credits taken this term
    pub min_credits_per_term: u32,
    /// Inclusive upper bound on credits taken this term
    pub max_credits_per_term: u32,
}

/// A minor and the courses that belong to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minor {
    /// Minor name as written in the catalog source
    pub name: String,
    /// Course ids belonging to the minor
    pub courses: Vec<String>,
}

/// Unvalidated catalog contents
///
/// This is also the on-disk shape of the catalog cache; loading a snapshot
/// goes back through [`build`](Self::build) so cached data is revalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBuilder {
    /// Credit requirements
    pub requirements: Requirements,
    /// Courses in source order
    pub courses: Vec<Course>,
    /// Minors in source order
    #[serde(default)]
    pub minors: Vec<Minor>,
    /// Courses under the general-education cap
    #[serde(default)]
    pub general_education_group: Vec<String>,
    /// Pairs of which at most one course may ever be taken
    #[serde(default)]
    pub general_education_pairs: Vec<(String, String)>,
    /// Project courses (progress-gated)
    #[serde(default)]
    pub project_modules: Vec<String>,
    /// Free-elective courses (progress-gated)
    #[serde(default)]
    pub free_elective_modules: Vec<String>,
}

impl CatalogBuilder {
    /// Start a builder with the given credit requirements
    #[must_use]
    pub fn new(requirements: Requirements) -> Self {
        Self {
            requirements,
            ..Self::default()
        }
    }

    /// Append a course
    #[must_use]
    pub fn course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Append a minor
    #[must_use]
    pub fn minor(mut self, name: &str, courses: &[&str]) -> Self {
        self.minors.push(Minor {
            name: name.to_string(),
            courses: to_owned_ids(courses),
        });
        self
    }

    /// Add courses to the general-education group
    #[must_use]
    pub fn general_education(mut self, courses: &[&str]) -> Self {
        self.general_education_group.extend(to_owned_ids(courses));
        self
    }

    /// Add a general-education pair
    #[must_use]
    pub fn general_education_pair(mut self, first: &str, second: &str) -> Self {
        self.general_education_pairs
            .push((first.to_string(), second.to_string()));
        self
    }

    /// Add project courses
    #[must_use]
    pub fn projects(mut self, courses: &[&str]) -> Self {
        self.project_modules.extend(to_owned_ids(courses));
        self
    }

    /// Add free-elective courses
    #[must_use]
    pub fn free_electives(mut self, courses: &[&str]) -> Self {
        self.free_elective_modules.extend(to_owned_ids(courses));
        self
    }

    /// Validate the contents and freeze them into a [`Catalog`]
    ///
    /// # Errors
    /// Returns [`CatalogError`] for inverted credit bounds, a course worth zero
    /// credits, duplicate course ids, or any reference to a course id that is
    /// not in the course table.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let Requirements {
            min_credits_per_term: min,
            max_credits_per_term: max,
            ..
        } = self.requirements;
        if min > max {
            return Err(CatalogError::InvalidCreditBounds { min, max });
        }

        let mut index = HashMap::with_capacity(self.courses.len());
        for (idx, course) in self.courses.iter().enumerate() {
            if course.credits == 0 {
                return Err(CatalogError::ZeroCredits(course.id.clone()));
            }
            if index.insert(course.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateCourse(course.id.clone()));
            }
        }

        let resolve = |context: &dyn Fn() -> String, id: &str| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| CatalogError::UnknownCourse {
                    context: context(),
                    course: id.to_string(),
                })
        };

        let mut links = Vec::with_capacity(self.courses.len());
        for course in &self.courses {
            let prerequisites = course
                .prerequisites
                .iter()
                .map(|p| resolve(&|| format!("prerequisite of {}", course.id), p.as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            let prior_exposure = course
                .prior_exposure
                .as_deref()
                .map(|p| resolve(&|| format!("prior exposure of {}", course.id), p))
                .transpose()?;
            let co_module = course
                .co_module
                .as_deref()
                .map(|m| resolve(&|| format!("co-module of {}", course.id), m))
                .transpose()?;
            links.push(CourseLinks {
                prerequisites: dedup(prerequisites),
                prior_exposure,
                co_module,
            });
        }

        let minors = self
            .minors
            .iter()
            .map(|minor| {
                resolve_list(&minor.courses, |id| {
                    resolve(&|| format!("minor '{}'", minor.name), id)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let general_education_group = resolve_list(&self.general_education_group, |id| {
            resolve(&|| "general education group".to_string(), id)
        })?;
        let general_education_pairs = self
            .general_education_pairs
            .iter()
            .enumerate()
            .map(|(i, (a, b))| {
                let context = || format!("general education pair {i}");
                Ok((resolve(&context, a.as_str())?, resolve(&context, b.as_str())?))
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        let project_modules = resolve_list(&self.project_modules, |id| {
            resolve(&|| "project modules".to_string(), id)
        })?;
        let free_elective_modules = resolve_list(&self.free_elective_modules, |id| {
            resolve(&|| "free electives".to_string(), id)
        })?;

        let resolved = Resolved {
            links,
            minors,
            general_education_group,
            general_education_pairs,
            project_modules,
            free_elective_modules,
        };

        let fingerprint = fingerprint(&self.courses);
        Ok(Catalog {
            source: self,
            index,
            resolved,
            fingerprint,
        })
    }
}

/// Resolved course references for one course
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CourseLinks {
    pub(crate) prerequisites: Vec<usize>,
    pub(crate) prior_exposure: Option<usize>,
    pub(crate) co_module: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    links: Vec<CourseLinks>,
    minors: Vec<Vec<usize>>,
    general_education_group: Vec<usize>,
    general_education_pairs: Vec<(usize, usize)>,
    project_modules: Vec<usize>,
    free_elective_modules: Vec<usize>,
}

/// Immutable, validated curriculum catalog
///
/// Courses keep their source order; that order is the variable order of every
/// model built from this catalog and the order of every recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    source: CatalogBuilder,
    index: HashMap<String, usize>,
    resolved: Resolved,
    fingerprint: u64,
}

impl Catalog {
    /// Credit requirements
    #[must_use]
    pub const fn requirements(&self) -> Requirements {
        self.source.requirements
    }

    /// Total credits needed to graduate
    #[must_use]
    pub const fn credit_requirement(&self) -> u32 {
        self.source.requirements.credit_requirement
    }

    /// Minimum credits per term (inclusive)
    #[must_use]
    pub const fn min_credits_per_term(&self) -> u32 {
        self.source.requirements.min_credits_per_term
    }

    /// Maximum credits per term (inclusive)
    #[must_use]
    pub const fn max_credits_per_term(&self) -> u32 {
        self.source.requirements.max_credits_per_term
    }

    /// All courses in catalog order
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.source.courses
    }

    /// Number of courses
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.courses.len()
    }

    /// Whether the catalog has no courses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.courses.is_empty()
    }

    /// Look up a course by id
    #[must_use]
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.index_of(id).map(|idx| &self.source.courses[idx])
    }

    /// Position of a course in catalog order
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Minors in source order
    #[must_use]
    pub fn minors(&self) -> &[Minor] {
        &self.source.minors
    }

    /// Find a minor by name, ignoring ASCII case
    #[must_use]
    pub fn find_minor(&self, name: &str) -> Option<&Minor> {
        self.minor_position(name).map(|pos| &self.source.minors[pos])
    }

    /// General-education group course ids
    #[must_use]
    pub fn general_education_group(&self) -> &[String] {
        &self.source.general_education_group
    }

    /// General-education pairs
    #[must_use]
    pub fn general_education_pairs(&self) -> &[(String, String)] {
        &self.source.general_education_pairs
    }

    /// Project course ids
    #[must_use]
    pub fn project_modules(&self) -> &[String] {
        &self.source.project_modules
    }

    /// Free-elective course ids
    #[must_use]
    pub fn free_elective_modules(&self) -> &[String] {
        &self.source.free_elective_modules
    }

    /// Hash of the course ids in catalog order
    ///
    /// Two catalogs with the same fingerprint index their courses the same way,
    /// so per-course vectors built against one line up with the other.
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Copy the catalog contents back into a builder (used by the cache)
    #[must_use]
    pub fn to_builder(&self) -> CatalogBuilder {
        self.source.clone()
    }

    pub(crate) fn minor_position(&self, name: &str) -> Option<usize> {
        self.source
            .minors
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    pub(crate) fn links(&self, idx: usize) -> &CourseLinks {
        &self.resolved.links[idx]
    }

    pub(crate) fn minor_indices(&self) -> &[Vec<usize>] {
        &self.resolved.minors
    }

    pub(crate) fn general_education_group_indices(&self) -> &[usize] {
        &self.resolved.general_education_group
    }

    pub(crate) fn general_education_pair_indices(&self) -> &[(usize, usize)] {
        &self.resolved.general_education_pairs
    }

    pub(crate) fn project_indices(&self) -> &[usize] {
        &self.resolved.project_modules
    }

    pub(crate) fn free_elective_indices(&self) -> &[usize] {
        &self.resolved.free_elective_modules
    }
}

fn fingerprint(courses: &[Course]) -> u64 {
    let mut hasher = DefaultHasher::new();
    courses.len().hash(&mut hasher);
    for course in courses {
        course.id.hash(&mut hasher);
    }
    hasher.finish()
}

fn to_owned_ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

fn resolve_list<F>(ids: &[String], mut resolve: F) -> Result<Vec<usize>, CatalogError>
where
    F: FnMut(&str) -> Result<usize, CatalogError>,
{
    let resolved = ids
        .iter()
        .map(|id| resolve(id.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dedup(resolved))
}

/// Drop repeated indices while keeping first-seen order
fn dedup(indices: Vec<usize>) -> Vec<usize> {
    let mut out = Vec::with_capacity(indices.len());
    for idx in indices {
        if !out.contains(&idx) {
            out.push(idx);
        }
    }
    out
}
