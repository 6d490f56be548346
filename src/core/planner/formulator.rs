//! Translate a catalog and a student record into a [`PlanModel`]
//!
//! Constraints are asserted in a fixed rule order so two formulations of the
//! same inputs are identical, constraint for constraint.

use super::model::{LinearConstraint, Objective, PlanModel, Relation, Rule};
use crate::core::error::InputError;
use crate::core::models::{Catalog, StudentRecord};
use crate::debug;

/// Completed terms after which minor rules apply
pub const MINOR_RULES_FROM_TERM: u32 = 6;
/// Most courses a student may take from the chosen minor
pub const MINOR_COURSE_CAP: i64 = 5;
/// Most courses a student may take from the general-education group
pub const GEN_ED_GROUP_CAP: i64 = 2;
/// Completed terms required before project courses open
pub const PROJECTS_FROM_TERM: u32 = 4;
/// Last term count at which free electives are still closed
pub const FREE_ELECTIVES_CLOSED_THROUGH_TERM: u32 = 5;

/// Build the planning model for one student against one catalog
///
/// # Errors
/// Returns [`InputError::RecordMismatch`] when the record was built for a
/// catalog with different course ids.
pub fn formulate(catalog: &Catalog, record: &StudentRecord) -> Result<PlanModel, InputError> {
    if !record.belongs_to(catalog) {
        return Err(InputError::RecordMismatch {
            record: record.len(),
            catalog: catalog.len(),
        });
    }

    let mut formulation = Formulation::new(catalog, record);
    formulation.prerequisites();
    formulation.credit_bounds();
    formulation.term_availability();
    formulation.no_retake();
    formulation.timeslot_clashes();
    formulation.co_modules();
    formulation.prior_exposure();
    formulation.minor_cap();
    formulation.general_education_pairs();
    formulation.general_education_group();
    formulation.minor_lock_in();
    formulation.project_gate();
    formulation.free_elective_gate();

    let model = formulation.model;
    for (rule, count) in model.rule_counts() {
        debug!("formulate: {count} constraint(s) for {rule:?}");
    }
    debug!(
        "formulate: {} variables, {} constraints",
        model.variables().len(),
        model.constraints().len()
    );
    Ok(model)
}

struct Formulation<'a> {
    catalog: &'a Catalog,
    record: &'a StudentRecord,
    model: PlanModel,
}

impl<'a> Formulation<'a> {
    fn new(catalog: &'a Catalog, record: &'a StudentRecord) -> Self {
        let variables = catalog
            .courses()
            .iter()
            .map(|c| format!("study_{}", c.id))
            .collect();
        let objective = Objective {
            offset: i64::from(catalog.credit_requirement()),
            credits: catalog
                .courses()
                .iter()
                .map(|c| i64::from(c.credits))
                .collect(),
        };
        Self {
            catalog,
            record,
            model: PlanModel::new(variables, objective),
        }
    }

    fn id(&self, idx: usize) -> &str {
        &self.catalog.courses()[idx].id
    }

    fn passed(&self, idx: usize) -> i64 {
        i64::from(self.record.passed(idx))
    }

    fn passed_total(&self, indices: &[usize]) -> i64 {
        indices.iter().map(|&idx| self.passed(idx)).sum()
    }

    fn add(
        &mut self,
        rule: Rule,
        label: String,
        terms: Vec<(usize, i64)>,
        relation: Relation,
        rhs: i64,
    ) {
        self.model
            .add_constraint(LinearConstraint::new(rule, label, terms, relation, rhs));
    }

    fn force_off(&mut self, rule: Rule, idx: usize) {
        let label = self.id(idx).to_string();
        self.add(rule, label, vec![(idx, 1)], Relation::Equal, 0);
    }

    fn minor_rules_apply(&self) -> Option<usize> {
        if self.record.terms_studied() < MINOR_RULES_FROM_TERM {
            return None;
        }
        self.record
            .chosen_minor()
            .and_then(|name| self.catalog.minor_position(name))
    }

    /// `|prereqs| * var[c] <= sum(passed[p])`
    fn prerequisites(&mut self) {
        for idx in 0..self.catalog.len() {
            let prereqs = &self.catalog.links(idx).prerequisites;
            if prereqs.is_empty() {
                continue;
            }
            let needed = i64::try_from(prereqs.len()).unwrap_or(i64::MAX);
            let have = self.passed_total(prereqs);
            let label = format!(
                "{} needs {}",
                self.id(idx),
                self.catalog.courses()[idx].prerequisites.join(", ")
            );
            self.add(Rule::Prerequisite, label, vec![(idx, needed)], Relation::LessEq, have);
        }
    }

    fn credit_bounds(&mut self) {
        let terms: Vec<(usize, i64)> = self
            .model
            .objective()
            .credits
            .iter()
            .copied()
            .enumerate()
            .collect();
        let min = i64::from(self.catalog.min_credits_per_term());
        let max = i64::from(self.catalog.max_credits_per_term());
        self.add(
            Rule::CreditMinimum,
            format!("at least {min} credits"),
            terms.clone(),
            Relation::GreaterEq,
            min,
        );
        self.add(
            Rule::CreditMaximum,
            format!("at most {max} credits"),
            terms,
            Relation::LessEq,
            max,
        );
    }

    fn term_availability(&mut self) {
        for idx in 0..self.catalog.len() {
            if !self.catalog.courses()[idx].offered_this_term {
                self.force_off(Rule::TermAvailability, idx);
            }
        }
    }

    /// `var[c] <= 1 - passed[c]`
    fn no_retake(&mut self) {
        for idx in 0..self.catalog.len() {
            let rhs = 1 - self.passed(idx);
            let label = self.id(idx).to_string();
            self.add(Rule::NoRetake, label, vec![(idx, 1)], Relation::LessEq, rhs);
        }
    }

    /// One `var[a] + var[b] <= 1` per clashing unordered pair
    fn timeslot_clashes(&mut self) {
        let courses = self.catalog.courses();
        for a in 0..courses.len() {
            for b in (a + 1)..courses.len() {
                if courses[a].clashes_with(&courses[b]) {
                    let label = format!("{} / {}", courses[a].id, courses[b].id);
                    self.add(
                        Rule::TimeslotClash,
                        label,
                        vec![(a, 1), (b, 1)],
                        Relation::LessEq,
                        1,
                    );
                }
            }
        }
    }

    /// `var[c] - var[m] == passed[m] - passed[c]`
    fn co_modules(&mut self) {
        for idx in 0..self.catalog.len() {
            let Some(co) = self.catalog.links(idx).co_module else {
                continue;
            };
            let rhs = self.passed(co) - self.passed(idx);
            let label = format!("{} with {}", self.id(idx), self.id(co));
            self.add(Rule::CoModule, label, vec![(idx, 1), (co, -1)], Relation::Equal, rhs);
        }
    }

    /// `var[c] <= studied[p]`
    fn prior_exposure(&mut self) {
        for idx in 0..self.catalog.len() {
            let Some(prior) = self.catalog.links(idx).prior_exposure else {
                continue;
            };
            let rhs = i64::from(self.record.studied(prior));
            let label = format!("{} after attempting {}", self.id(idx), self.id(prior));
            self.add(Rule::PriorExposure, label, vec![(idx, 1)], Relation::LessEq, rhs);
        }
    }

    /// `sum(var[m] + passed[m]) <= 5` over the chosen minor
    fn minor_cap(&mut self) {
        let Some(pos) = self.minor_rules_apply() else {
            return;
        };
        let members = self.catalog.minor_indices()[pos].clone();
        let rhs = MINOR_COURSE_CAP - self.passed_total(&members);
        let label = format!("minor '{}'", self.catalog.minors()[pos].name);
        let terms = members.iter().map(|&idx| (idx, 1)).collect();
        self.add(Rule::MinorCap, label, terms, Relation::LessEq, rhs);
    }

    fn general_education_pairs(&mut self) {
        for &(a, b) in self.catalog.general_education_pair_indices() {
            let rhs = 1 - self.passed(a) - self.passed(b);
            let label = format!("{} / {}", self.id(a), self.id(b));
            self.add(Rule::GenEdPair, label, vec![(a, 1), (b, 1)], Relation::LessEq, rhs);
        }
    }

    fn general_education_group(&mut self) {
        let group = self.catalog.general_education_group_indices();
        let rhs = GEN_ED_GROUP_CAP - self.passed_total(group);
        let terms = group.iter().map(|&idx| (idx, 1)).collect();
        self.add(
            Rule::GenEdGroupCap,
            "general education group".to_string(),
            terms,
            Relation::LessEq,
            rhs,
        );
    }

    fn minor_lock_in(&mut self) {
        let Some(chosen) = self.minor_rules_apply() else {
            return;
        };
        let catalog = self.catalog;
        for (pos, members) in catalog.minor_indices().iter().enumerate() {
            if pos == chosen {
                continue;
            }
            for &idx in members {
                self.force_off(Rule::MinorLockIn, idx);
            }
        }
    }

    fn project_gate(&mut self) {
        if self.record.terms_studied() >= PROJECTS_FROM_TERM {
            return;
        }
        let catalog = self.catalog;
        for &idx in catalog.project_indices() {
            self.force_off(Rule::ProjectGate, idx);
        }
    }

    fn free_elective_gate(&mut self) {
        if self.record.terms_studied() > FREE_ELECTIVES_CLOSED_THROUGH_TERM {
            return;
        }
        let catalog = self.catalog;
        for &idx in catalog.free_elective_indices() {
            self.force_off(Rule::FreeElectiveGate, idx);
        }
    }
}
