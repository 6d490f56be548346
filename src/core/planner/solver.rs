//! Solver interface and the `good_lp` backed implementation
//!
//! The [`PlanSolver`] trait is the seam between the formulated model and
//! whatever optimization backend resolves it. [`LinearSolver`] hands the model
//! to `good_lp`'s pure-Rust `microlp` backend on a worker thread so the caller
//! can enforce a time budget and cancellation.

use super::model::{PlanModel, Relation};
use crate::{debug, error, warn};
use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a waiting caller checks its cancellation token
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Status of the solver after execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal assignment found
    Optimal,
    /// Feasible (not proven optimal) assignment found
    Feasible,
    /// No assignment satisfies the model
    Infeasible,
    /// The search ended without a definitive answer (time limit, cancellation, backend failure)
    Unknown,
}

impl SolveStatus {
    /// Whether the status carries a usable assignment
    #[must_use]
    pub const fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Cooperative cancellation flag shared between a caller and a running solve
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-solve options
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Wall-clock budget; `None` waits for the backend to finish
    pub time_limit: Option<Duration>,
    /// Optional cancellation token
    pub cancel: Option<CancelToken>,
}

impl SolveOptions {
    /// Options with a time budget
    #[must_use]
    pub const fn with_time_limit(time_limit: Duration) -> Self {
        Self {
            time_limit: Some(time_limit),
            cancel: None,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Result of one solve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    /// Terminal status
    pub status: SolveStatus,
    /// One value per model variable; present only for optimal/feasible outcomes
    pub assignment: Option<Vec<bool>>,
    /// Time spent
    pub elapsed: Duration,
}

impl SolveOutcome {
    /// Outcome without an assignment
    #[must_use]
    pub const fn without_solution(status: SolveStatus, elapsed: Duration) -> Self {
        Self {
            status,
            assignment: None,
            elapsed,
        }
    }
}

/// A backend able to resolve a [`PlanModel`]
pub trait PlanSolver {
    /// Solve `model`, honouring the time budget and cancellation in `options`
    fn solve(&self, model: &PlanModel, options: &SolveOptions) -> SolveOutcome;
}

/// Solves plan models with `good_lp` and the `microlp` backend
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSolver;

impl LinearSolver {
    /// Create the solver
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PlanSolver for LinearSolver {
    fn solve(&self, model: &PlanModel, options: &SolveOptions) -> SolveOutcome {
        let started = Instant::now();

        if options.is_cancelled() {
            return SolveOutcome::without_solution(SolveStatus::Unknown, started.elapsed());
        }

        // Constraints without variables are facts about the student; a false one
        // settles the outcome before any search.
        if let Some(fact) = model
            .constraints()
            .iter()
            .find(|c| c.is_constant() && !c.is_satisfied_by(&[]))
        {
            debug!("solve: constant constraint is false: {fact}");
            return SolveOutcome::without_solution(SolveStatus::Infeasible, started.elapsed());
        }

        if model.variables().is_empty() {
            return SolveOutcome {
                status: SolveStatus::Optimal,
                assignment: Some(Vec::new()),
                elapsed: started.elapsed(),
            };
        }

        let (tx, rx) = mpsc::channel();
        let owned = model.clone();
        let spawned = thread::Builder::new()
            .name("plan-solver".to_string())
            .spawn(move || {
                // The receiver may have given up already; nothing to report then.
                let _ = tx.send(run_microlp(&owned));
            });
        if let Err(e) = spawned {
            error!("solve: failed to start solver thread: {e}");
            return SolveOutcome::without_solution(SolveStatus::Unknown, started.elapsed());
        }

        let deadline = options.time_limit.map(|limit| started + limit);
        loop {
            // A result that lands after the budget or the cancellation is discarded.
            if options.is_cancelled() {
                warn!("solve: cancelled after {:.3}s", started.elapsed().as_secs_f64());
                return SolveOutcome::without_solution(SolveStatus::Unknown, started.elapsed());
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    "solve: time limit reached after {:.3}s",
                    started.elapsed().as_secs_f64()
                );
                return SolveOutcome::without_solution(SolveStatus::Unknown, started.elapsed());
            }

            let wait = deadline.map_or(POLL_INTERVAL, |d| {
                d.saturating_duration_since(Instant::now()).min(POLL_INTERVAL)
            });
            match rx.recv_timeout(wait) {
                Ok(raw) => {
                    let outcome = raw.into_outcome(started.elapsed());
                    debug!(
                        "solve: {} in {:.3}s",
                        outcome.status,
                        outcome.elapsed.as_secs_f64()
                    );
                    return outcome;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    error!("solve: solver thread exited without a result");
                    return SolveOutcome::without_solution(SolveStatus::Unknown, started.elapsed());
                }
            }
        }
    }
}

/// Backend result before timing is attached
enum RawOutcome {
    Solved(Vec<bool>),
    Infeasible,
    Failed(String),
}

impl RawOutcome {
    fn into_outcome(self, elapsed: Duration) -> SolveOutcome {
        match self {
            Self::Solved(assignment) => SolveOutcome {
                status: SolveStatus::Optimal,
                assignment: Some(assignment),
                elapsed,
            },
            Self::Infeasible => SolveOutcome::without_solution(SolveStatus::Infeasible, elapsed),
            Self::Failed(reason) => {
                error!("solve: backend failed: {reason}");
                SolveOutcome::without_solution(SolveStatus::Unknown, elapsed)
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn linear_expression(terms: &[(usize, i64)], vars: &[Variable]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for &(idx, coeff) in terms {
        expr.add_mul(coeff as f64, vars[idx]);
    }
    expr
}

#[allow(clippy::cast_precision_loss)]
fn run_microlp(model: &PlanModel) -> RawOutcome {
    let mut problem_vars = ProblemVariables::new();
    let vars: Vec<Variable> = model
        .variables()
        .iter()
        .map(|name| problem_vars.add(variable().binary().name(name.clone())))
        .collect();

    // Maximizing credits minimizes `offset - credits`; the offset is reported separately.
    let credit_terms: Vec<(usize, i64)> = model
        .objective()
        .credits
        .iter()
        .copied()
        .enumerate()
        .collect();
    let objective = linear_expression(&credit_terms, &vars);

    let mut problem = problem_vars.maximise(objective).using(microlp);
    for c in model.constraints().iter().filter(|c| !c.is_constant()) {
        let lhs = linear_expression(c.terms(), &vars);
        let rhs = c.rhs() as f64;
        let built = match c.relation() {
            Relation::LessEq => constraint::leq(lhs, rhs),
            Relation::GreaterEq => constraint::geq(lhs, rhs),
            Relation::Equal => constraint::eq(lhs, rhs),
        };
        problem.add_constraint(built);
    }

    match problem.solve() {
        Ok(solution) => {
            RawOutcome::Solved(vars.iter().map(|&v| solution.value(v) > 0.5).collect())
        }
        Err(ResolutionError::Infeasible) => RawOutcome::Infeasible,
        Err(other) => RawOutcome::Failed(other.to_string()),
    }
}
