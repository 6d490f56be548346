//! Plan and check command handlers

use super::{current_catalog, planning_request};
use crate::args::{OutputFormat, StudentArgs};
use nu_planner::config::Config;
use nu_planner::core::models::{Catalog, StudentRecord};
use nu_planner::core::planner::{
    check_selection, plan_term, LinearSolver, Recommendation, SelectionReport, SolveOptions,
    SolveStatus,
};
use nu_planner::error;

fn prepare(student: &StudentArgs, config: &Config) -> Result<(Catalog, StudentRecord), String> {
    let catalog = current_catalog(config)?;
    let request = planning_request(student)?;
    let record = StudentRecord::from_request(&catalog, &request).map_err(|e| {
        error!("Rejected planning request: {e}");
        format!("✗ {e}")
    })?;
    Ok((catalog, record))
}

/// Recommend this term's courses
pub fn run_plan(
    student: &StudentArgs,
    format: OutputFormat,
    config: &Config,
    verbose: bool,
) -> Result<(), String> {
    let (catalog, record) = prepare(student, config)?;
    if verbose {
        println!(
            "✓ Catalog ready: {} course(s); planning after {} term(s)",
            catalog.len(),
            record.terms_studied()
        );
    }

    let options = SolveOptions {
        time_limit: config.time_limit(),
        ..SolveOptions::default()
    };
    let recommendation =
        plan_term(&catalog, &record, &LinearSolver, &options).map_err(|e| format!("✗ {e}"))?;

    match format {
        OutputFormat::Text => print!("{}", render_recommendation(&catalog, &recommendation)),
        OutputFormat::Json => println!("{}", to_json(&recommendation)?),
    }
    Ok(())
}

/// Report which rules a proposed selection breaks
pub fn run_check(
    courses: &[String],
    student: &StudentArgs,
    format: OutputFormat,
    config: &Config,
) -> Result<(), String> {
    let (catalog, record) = prepare(student, config)?;
    let report = check_selection(&catalog, &record, courses).map_err(|e| format!("✗ {e}"))?;

    match format {
        OutputFormat::Text => print!("{}", render_report(&report)),
        OutputFormat::Json => println!("{}", to_json(&report)?),
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("✗ Failed to encode JSON: {e}"))
}

fn render_recommendation(catalog: &Catalog, rec: &Recommendation) -> String {
    match rec.status {
        SolveStatus::Infeasible => {
            return "✗ No registration satisfies every rule this term (infeasible)\n".to_string()
        }
        SolveStatus::Unknown => {
            return "✗ The solver stopped before reaching an answer (unknown)\n".to_string()
        }
        SolveStatus::Optimal | SolveStatus::Feasible => {}
    }

    let mut out = format!("✓ Recommended courses ({}):\n", rec.status);
    if rec.courses.is_empty() {
        out.push_str("  (none)\n");
    }
    for id in &rec.courses {
        let credits = catalog.course(id).map_or(0, |c| c.credits);
        out.push_str(&format!("  {id:<12} {credits:>3} cr\n"));
    }
    out.push_str(&format!("Total credits: {}\n", rec.total_credits));
    if let Some(objective) = rec.objective_value {
        out.push_str(&format!(
            "Objective (credit requirement minus this term): {objective}\n"
        ));
    }
    out
}

fn render_report(report: &SelectionReport) -> String {
    let mut out = String::new();
    if report.is_valid() {
        out.push_str(&format!(
            "✓ Selection is allowed ({} credit(s))\n",
            report.total_credits
        ));
        return out;
    }

    out.push_str(&format!(
        "✗ Selection breaks {} rule(s) ({} credit(s)):\n",
        report.violations.len(),
        report.total_credits
    ));
    for violation in &report.violations {
        out.push_str(&format!(
            "  - {}: {}\n",
            violation.rule.describe(),
            violation.subject
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nu_planner::core::models::{CatalogBuilder, Course, Requirements};
    use nu_planner::core::planner::{Rule, Violation};

    #[test]
    fn test_render_statuses() {
        let catalog = CatalogBuilder::new(Requirements {
            credit_requirement: 10,
            min_credits_per_term: 0,
            max_credits_per_term: 10,
        })
        .course(Course::new("A".to_string(), 3))
        .build()
        .unwrap();

        let planned = Recommendation {
            status: SolveStatus::Optimal,
            courses: vec!["A".to_string()],
            total_credits: 3,
            objective_value: Some(7),
        };
        let text = render_recommendation(&catalog, &planned);
        assert!(text.starts_with("✓ Recommended courses (optimal)"));
        assert!(text.contains("Total credits: 3"));
        assert!(text.contains("Objective (credit requirement minus this term): 7"));
        assert!(!text.contains("still required"));

        let infeasible = Recommendation {
            status: SolveStatus::Infeasible,
            courses: Vec::new(),
            total_credits: 0,
            objective_value: None,
        };
        assert!(render_recommendation(&catalog, &infeasible).contains("infeasible"));
    }

    #[test]
    fn test_render_report() {
        let ok = SelectionReport {
            courses: vec!["A".to_string()],
            total_credits: 3,
            violations: Vec::new(),
        };
        assert!(render_report(&ok).starts_with("✓"));

        let bad = SelectionReport {
            courses: vec!["C".to_string()],
            total_credits: 4,
            violations: vec![Violation {
                rule: Rule::Prerequisite,
                subject: "C needs A, B".to_string(),
            }],
        };
        let text = render_report(&bad);
        assert!(text.contains("breaks 1 rule(s)"));
        assert!(text.contains("C needs A, B"));
    }
}
