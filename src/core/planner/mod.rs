//! Term planner: formulation, solving, and extraction
//!
//! `plan_term` runs the whole pipeline for one request:
//! catalog + student record → [`PlanModel`] → [`PlanSolver`] → [`Recommendation`].

pub mod extractor;
pub mod formulator;
pub mod model;
pub mod solver;

pub use extractor::{extract, Recommendation};
pub use formulator::formulate;
pub use model::{LinearConstraint, Objective, PlanModel, Relation, Rule};
pub use solver::{CancelToken, LinearSolver, PlanSolver, SolveOptions, SolveOutcome, SolveStatus};

use crate::core::error::{InputError, PlanError};
use crate::core::models::{Catalog, StudentRecord};
use crate::{debug, info};
use serde::Serialize;
use std::time::Instant;

/// Recommend this term's courses for one student
///
/// # Errors
/// Returns [`PlanError`] when the record does not belong to `catalog`.
/// Infeasible and inconclusive solves are reported through the
/// recommendation's status, not as errors.
pub fn plan_term<S: PlanSolver + ?Sized>(
    catalog: &Catalog,
    record: &StudentRecord,
    solver: &S,
    options: &SolveOptions,
) -> Result<Recommendation, PlanError> {
    let started = Instant::now();
    let model = formulate(catalog, record)?;
    debug!(
        "plan: formulated in {:.3}ms",
        started.elapsed().as_secs_f64() * 1000.0
    );

    let outcome = solver.solve(&model, options);
    let recommendation = extract(catalog, &model, &outcome);
    info!(
        "plan: {} with {} course(s), {} credit(s)",
        recommendation.status,
        recommendation.courses.len(),
        recommendation.total_credits
    );
    Ok(recommendation)
}

/// One rule broken by a proposed selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Rule that was broken
    pub rule: Rule,
    /// Courses the rule was about
    pub subject: String,
}

/// Verdict on a caller-proposed selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionReport {
    /// Proposed course ids, in catalog order
    pub courses: Vec<String>,
    /// Credits of the proposed courses
    pub total_credits: i64,
    /// Every broken rule, in assertion order
    pub violations: Vec<Violation>,
}

impl SelectionReport {
    /// Whether the selection breaks no rule
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check a proposed selection against every planning rule
///
/// # Errors
/// Returns [`PlanError`] when a proposed id is not in the catalog or the record
/// does not belong to `catalog`.
pub fn check_selection<I, S>(
    catalog: &Catalog,
    record: &StudentRecord,
    selection: I,
) -> Result<SelectionReport, PlanError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let model = formulate(catalog, record)?;
    let mut assignment = vec![false; catalog.len()];
    for id in selection {
        let id = id.as_ref().trim();
        let idx = catalog
            .index_of(id)
            .ok_or_else(|| InputError::UnknownCourse(id.to_string()))?;
        assignment[idx] = true;
    }

    let violations = model
        .violations(&assignment)
        .into_iter()
        .map(|c| Violation {
            rule: c.rule(),
            subject: c.label().to_string(),
        })
        .collect();
    let courses = catalog
        .courses()
        .iter()
        .zip(&assignment)
        .filter(|(_, selected)| **selected)
        .map(|(course, _)| course.id.clone())
        .collect();

    Ok(SelectionReport {
        courses,
        total_credits: model.objective().credits_taken(&assignment),
        violations,
    })
}
