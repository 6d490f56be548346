//! Linear 0/1 model produced by the formulator and consumed by solvers
//!
//! Variables are addressed by their position in catalog order. Constants that
//! depend on the student record (e.g. `passed[c]`) are folded into the
//! right-hand side when a constraint is built, so every term is a variable.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Curriculum rule a constraint was generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// All prerequisites must already be passed
    Prerequisite,
    /// Term credits must reach the minimum
    CreditMinimum,
    /// Term credits must not exceed the maximum
    CreditMaximum,
    /// Course must be offered this term
    TermAvailability,
    /// Passed courses are not taken again
    NoRetake,
    /// Two courses sharing a timeslot cannot both be taken
    TimeslotClash,
    /// A course and its co-module move together
    CoModule,
    /// The prior-exposure course must have been attempted
    PriorExposure,
    /// At most five courses from the chosen minor
    MinorCap,
    /// At most one course from a general-education pair
    GenEdPair,
    /// At most two courses from the general-education group
    GenEdGroupCap,
    /// No courses from minors other than the chosen one
    MinorLockIn,
    /// Projects need four completed terms
    ProjectGate,
    /// Free electives need six completed terms
    FreeElectiveGate,
}

impl Rule {
    /// Short human-readable description
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Prerequisite => "prerequisites not yet passed",
            Self::CreditMinimum => "below the minimum credit load",
            Self::CreditMaximum => "above the maximum credit load",
            Self::TermAvailability => "not offered this term",
            Self::NoRetake => "already passed",
            Self::TimeslotClash => "timeslot clash",
            Self::CoModule => "co-module must be taken in the same term",
            Self::PriorExposure => "prior exposure course not attempted",
            Self::MinorCap => "minor course cap reached",
            Self::GenEdPair => "only one course of this general education pair",
            Self::GenEdGroupCap => "general education cap reached",
            Self::MinorLockIn => "belongs to a minor other than the chosen one",
            Self::ProjectGate => "projects open after four terms",
            Self::FreeElectiveGate => "free electives open after five terms",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Comparison between a constraint's left-hand side and its constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relation {
    /// `lhs <= rhs`
    LessEq,
    /// `lhs >= rhs`
    GreaterEq,
    /// `lhs == rhs`
    Equal,
}

impl Relation {
    /// Whether `lhs <relation> rhs` holds
    #[must_use]
    pub const fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::LessEq => lhs <= rhs,
            Self::GreaterEq => lhs >= rhs,
            Self::Equal => lhs == rhs,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::Equal => "==",
        }
    }
}

/// `sum(coeff * var) <relation> rhs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinearConstraint {
    rule: Rule,
    label: String,
    terms: Vec<(usize, i64)>,
    relation: Relation,
    rhs: i64,
}

impl LinearConstraint {
    /// Build a constraint, merging repeated variables and dropping zero terms
    #[must_use]
    pub fn new(
        rule: Rule,
        label: String,
        terms: impl IntoIterator<Item = (usize, i64)>,
        relation: Relation,
        rhs: i64,
    ) -> Self {
        let mut merged: Vec<(usize, i64)> = Vec::new();
        for (var, coeff) in terms {
            match merged.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coeff,
                None => merged.push((var, coeff)),
            }
        }
        merged.retain(|(_, c)| *c != 0);
        Self {
            rule,
            label,
            terms: merged,
            relation,
            rhs,
        }
    }

    /// Rule this constraint enforces
    #[must_use]
    pub const fn rule(&self) -> Rule {
        self.rule
    }

    /// Which courses the constraint is about (e.g. "CS2040 needs CS1010")
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// `(variable index, coefficient)` pairs
    #[must_use]
    pub fn terms(&self) -> &[(usize, i64)] {
        &self.terms
    }

    /// Comparison
    #[must_use]
    pub const fn relation(&self) -> Relation {
        self.relation
    }

    /// Right-hand constant
    #[must_use]
    pub const fn rhs(&self) -> i64 {
        self.rhs
    }

    /// Whether no variable is involved (the constraint is a plain fact)
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Left-hand side under `assignment`
    #[must_use]
    pub fn evaluate(&self, assignment: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(var, _)| assignment[*var])
            .map(|(_, coeff)| coeff)
            .sum()
    }

    /// Whether `assignment` satisfies the constraint
    #[must_use]
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.relation.holds(self.evaluate(assignment), self.rhs)
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] ", self.rule)?;
        if self.terms.is_empty() {
            write!(f, "0")?;
        }
        for (i, (var, coeff)) in self.terms.iter().enumerate() {
            let sign = if *coeff < 0 { "-" } else if i > 0 { "+" } else { "" };
            let sep = if i > 0 { " " } else { "" };
            write!(f, "{sep}{sign}{}*x{var}", coeff.abs())?;
        }
        write!(f, " {} {}", self.relation.symbol(), self.rhs)
    }
}

/// Linear objective `offset - sum(credit[c] * var[c])`, to be minimized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Objective {
    /// Constant offset (the graduation credit requirement)
    pub offset: i64,
    /// Credits gained per variable
    pub credits: Vec<i64>,
}

impl Objective {
    /// Credits selected under `assignment`
    #[must_use]
    pub fn credits_taken(&self, assignment: &[bool]) -> i64 {
        self.credits
            .iter()
            .zip(assignment)
            .filter(|(_, on)| **on)
            .map(|(credits, _)| credits)
            .sum()
    }

    /// Objective value under `assignment`
    #[must_use]
    pub fn value(&self, assignment: &[bool]) -> i64 {
        self.offset - self.credits_taken(assignment)
    }
}

/// A complete 0/1 planning model for one student and one term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanModel {
    variables: Vec<String>,
    constraints: Vec<LinearConstraint>,
    objective: Objective,
}

impl PlanModel {
    /// Create a model with one boolean variable per name
    #[must_use]
    pub fn new(variables: Vec<String>, objective: Objective) -> Self {
        Self {
            variables,
            constraints: Vec::new(),
            objective,
        }
    }

    /// Append a constraint
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Variable names in index order
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Constraints in assertion order
    #[must_use]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective
    #[must_use]
    pub const fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Constraints generated by one rule
    pub fn constraints_for(&self, rule: Rule) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().filter(move |c| c.rule == rule)
    }

    /// Number of constraints per rule, in rule order
    #[must_use]
    pub fn rule_counts(&self) -> BTreeMap<Rule, usize> {
        let mut counts = BTreeMap::new();
        for constraint in &self.constraints {
            *counts.entry(constraint.rule).or_insert(0) += 1;
        }
        counts
    }

    /// Constraints that `assignment` violates
    ///
    /// # Panics
    /// Panics if `assignment` is shorter than the variable list.
    #[must_use]
    pub fn violations(&self, assignment: &[bool]) -> Vec<&LinearConstraint> {
        assert!(
            assignment.len() >= self.variables.len(),
            "assignment covers {} of {} variables",
            assignment.len(),
            self.variables.len()
        );
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(assignment))
            .collect()
    }
}
