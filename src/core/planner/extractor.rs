//! Map a solver outcome back to course ids

use super::model::PlanModel;
use super::solver::{SolveOutcome, SolveStatus};
use crate::core::models::Catalog;
use serde::Serialize;

/// Recommended registration for one term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// How the solve ended
    pub status: SolveStatus,
    /// Recommended course ids in catalog order (empty unless optimal/feasible)
    pub courses: Vec<String>,
    /// Credits of the recommended courses
    pub total_credits: i64,
    /// `credit_requirement - total_credits`, when a plan exists
    pub objective_value: Option<i64>,
}

impl Recommendation {
    /// Whether a plan was produced
    #[must_use]
    pub const fn is_planned(&self) -> bool {
        self.status.has_solution()
    }
}

/// Build the recommendation for `outcome`
///
/// Optimal and feasible outcomes are treated alike. Any other status yields an
/// empty course list that keeps the status.
#[must_use]
pub fn extract(catalog: &Catalog, model: &PlanModel, outcome: &SolveOutcome) -> Recommendation {
    let assignment = match (&outcome.assignment, outcome.status.has_solution()) {
        (Some(assignment), true) => assignment,
        _ => {
            return Recommendation {
                status: outcome.status,
                courses: Vec::new(),
                total_credits: 0,
                objective_value: None,
            }
        }
    };

    let courses = catalog
        .courses()
        .iter()
        .zip(assignment)
        .filter(|(_, selected)| **selected)
        .map(|(course, _)| course.id.clone())
        .collect();

    Recommendation {
        status: outcome.status,
        courses,
        total_credits: model.objective().credits_taken(assignment),
        objective_value: Some(model.objective().value(assignment)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CatalogBuilder, Course, PlanningRequest, Requirements, StudentRecord};
    use crate::core::planner::formulate;
    use std::time::Duration;

    fn fixture() -> (Catalog, PlanModel) {
        let catalog = CatalogBuilder::new(Requirements {
            credit_requirement: 40,
            min_credits_per_term: 0,
            max_credits_per_term: 12,
        })
        .course(Course::new("A".to_string(), 3))
        .course(Course::new("B".to_string(), 4))
        .course(Course::new("C".to_string(), 2))
        .build()
        .unwrap();
        let record = StudentRecord::from_request(&catalog, &PlanningRequest::new(1)).unwrap();
        let model = formulate(&catalog, &record).unwrap();
        (catalog, model)
    }

    #[test]
    fn test_extract_preserves_catalog_order() {
        let (catalog, model) = fixture();
        for status in [SolveStatus::Optimal, SolveStatus::Feasible] {
            let outcome = SolveOutcome {
                status,
                assignment: Some(vec![true, false, true]),
                elapsed: Duration::ZERO,
            };
            let rec = extract(&catalog, &model, &outcome);
            assert_eq!(rec.courses, vec!["A", "C"]);
            assert_eq!(rec.total_credits, 5);
            assert_eq!(rec.objective_value, Some(35));
            assert!(rec.is_planned());
        }
    }

    #[test]
    fn test_infeasible_and_unknown_stay_distinct() {
        let (catalog, model) = fixture();
        let infeasible = extract(
            &catalog,
            &model,
            &SolveOutcome::without_solution(SolveStatus::Infeasible, Duration::ZERO),
        );
        let unknown = extract(
            &catalog,
            &model,
            &SolveOutcome::without_solution(SolveStatus::Unknown, Duration::ZERO),
        );

        assert!(infeasible.courses.is_empty() && unknown.courses.is_empty());
        assert_eq!(infeasible.status, SolveStatus::Infeasible);
        assert_eq!(unknown.status, SolveStatus::Unknown);
        assert_ne!(infeasible, unknown);
        assert!(infeasible.objective_value.is_none());
    }
}
