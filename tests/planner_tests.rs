//! End-to-end planning tests: formulate, solve, extract

use nu_planner::core::ingest::load_catalog_dir;
use nu_planner::core::models::{
    Catalog, CatalogBuilder, Course, PlanningRequest, Requirements, StudentRecord,
};
use nu_planner::core::planner::{
    check_selection, formulate, plan_term, CancelToken, LinearSolver, PlanModel, PlanSolver,
    Recommendation, Rule, SolveOptions, SolveStatus,
};
use proptest::prelude::*;
use std::time::Duration;

const SAMPLE_CATALOG: &str = "samples/catalog";

fn band(min: u32, max: u32) -> Requirements {
    Requirements {
        credit_requirement: 40,
        min_credits_per_term: min,
        max_credits_per_term: max,
    }
}

fn course(id: &str, credits: u32, prereqs: &[&str]) -> Course {
    let mut course = Course::new(id.to_string(), credits);
    for p in prereqs {
        course.add_prerequisite((*p).to_string());
    }
    course
}

/// A:3, B:3 (needs A), C:4 (needs A and B), 3 to 6 credits per term
fn chain() -> Catalog {
    CatalogBuilder::new(band(3, 6))
        .course(course("A", 3, &[]))
        .course(course("B", 3, &["A"]))
        .course(course("C", 4, &["A", "B"]))
        .build()
        .unwrap()
}

fn plan(catalog: &Catalog, request: &PlanningRequest) -> Recommendation {
    let record = StudentRecord::from_request(catalog, request).unwrap();
    plan_term(catalog, &record, &LinearSolver, &SolveOptions::default()).unwrap()
}

fn sample() -> Catalog {
    load_catalog_dir(SAMPLE_CATALOG).expect("sample catalog should load")
}

#[test]
fn test_chain_first_term_recommends_a() {
    let rec = plan(&chain(), &PlanningRequest::new(1));
    assert!(rec.is_planned());
    assert_eq!(rec.courses, vec!["A"]);
    assert_eq!(rec.total_credits, 3);
    assert_eq!(rec.objective_value, Some(37));
}

#[test]
fn test_chain_after_a_recommends_b() {
    let rec = plan(&chain(), &PlanningRequest::new(2).with_grade("A", "A"));
    assert_eq!(rec.courses, vec!["B"]);
}

#[test]
fn test_chain_forcing_c_without_prerequisites_fails() {
    let catalog = chain();
    let record = StudentRecord::from_request(&catalog, &PlanningRequest::new(1)).unwrap();

    let report = check_selection(&catalog, &record, ["C"]).unwrap();
    assert!(!report.is_valid());
    assert!(report
        .violations
        .iter()
        .any(|v| v.rule == Rule::Prerequisite && v.subject == "C needs A, B"));

    let passed = PlanningRequest::new(3)
        .with_grade("A", "B")
        .with_grade("B", "C");
    let record = StudentRecord::from_request(&catalog, &passed).unwrap();
    let report = check_selection(&catalog, &record, ["C"]).unwrap();
    assert!(report.is_valid(), "{:?}", report.violations);
    assert_eq!(plan(&catalog, &passed).courses, vec!["C"]);
}

#[test]
fn test_unknown_course_in_selection_is_rejected() {
    let catalog = chain();
    let record = StudentRecord::from_request(&catalog, &PlanningRequest::new(1)).unwrap();
    assert!(check_selection(&catalog, &record, ["ZZZ"]).is_err());
}

#[test]
fn test_no_candidates_within_band_is_infeasible() {
    // only A is open and it is below the minimum load
    let catalog = CatalogBuilder::new(band(5, 6))
        .course(course("A", 3, &[]))
        .course(course("B", 3, &["A"]))
        .build()
        .unwrap();
    let rec = plan(&catalog, &PlanningRequest::new(1));
    assert_eq!(rec.status, SolveStatus::Infeasible);
    assert!(rec.courses.is_empty());
    assert!(rec.objective_value.is_none());
}

#[test]
fn test_free_electives_open_after_fifth_term() {
    let mut elective = Course::new("FE".to_string(), 4);
    elective.add_timeslot("FRI".to_string());
    let catalog = CatalogBuilder::new(band(0, 10))
        .course(course("CORE", 3, &[]))
        .course(elective)
        .free_electives(&["FE"])
        .build()
        .unwrap();

    let fifth = plan(&catalog, &PlanningRequest::new(5));
    assert_eq!(fifth.courses, vec!["CORE"]);

    let sixth = plan(&catalog, &PlanningRequest::new(6));
    assert_eq!(sixth.courses, vec!["CORE", "FE"]);
}

#[test]
fn test_projects_open_from_fourth_term() {
    let catalog = CatalogBuilder::new(band(0, 10))
        .course(course("P", 4, &[]))
        .projects(&["P"])
        .build()
        .unwrap();

    assert!(plan(&catalog, &PlanningRequest::new(3)).courses.is_empty());
    assert_eq!(plan(&catalog, &PlanningRequest::new(4)).courses, vec!["P"]);
}

#[test]
fn test_minor_cap_counts_passed_courses() {
    let ids = ["M1", "M2", "M3", "M4", "M5", "M6", "M7"];
    let catalog = ids
        .iter()
        .fold(CatalogBuilder::new(band(0, 40)), |b, id| {
            b.course(course(id, 3, &[]))
        })
        .minor("Maths", &ids)
        .build()
        .unwrap();

    let request = ids[..4]
        .iter()
        .fold(PlanningRequest::new(6).with_minor("maths"), |r, id| {
            r.with_grade(id, "A")
        });
    let rec = plan(&catalog, &request);
    assert_eq!(rec.courses.len(), 1);

    // before the sixth term the cap does not apply
    let early = ids[..4]
        .iter()
        .fold(PlanningRequest::new(5).with_minor("maths"), |r, id| {
            r.with_grade(id, "A")
        });
    assert_eq!(plan(&catalog, &early).courses.len(), 3);
}

#[test]
fn test_sample_first_term_respects_gates_and_band() {
    let catalog = sample();
    let rec = plan(&catalog, &PlanningRequest::new(1));

    assert!(rec.is_planned());
    let total = u32::try_from(rec.total_credits).unwrap();
    assert!(total >= catalog.min_credits_per_term());
    assert!(total <= catalog.max_credits_per_term());
    for id in &rec.courses {
        assert!(!catalog.project_modules().contains(id), "project {id} selected");
        assert!(
            !catalog.free_elective_modules().contains(id),
            "free elective {id} selected"
        );
    }

    let gen_ed = rec
        .courses
        .iter()
        .filter(|id| catalog.general_education_group().contains(id))
        .count();
    assert!(gen_ed <= 2);
    assert!(!(rec.courses.contains(&"GESS1001".to_string())
        && rec.courses.contains(&"GEC1001".to_string())));
}

#[test]
fn test_sample_planning_is_idempotent() {
    let catalog = sample();
    let request = PlanningRequest::new(2)
        .with_grade("CS1010", "A")
        .with_grade("CS1231", "B+")
        .with_grade("MA1521", "C");

    let first = plan(&catalog, &request);
    let second = plan(&catalog, &request);
    assert_eq!(first.objective_value, second.objective_value);
    assert_eq!(first, second);
}

#[test]
fn test_sample_co_modules_move_together() {
    let catalog = sample();
    let request = PlanningRequest::new(2)
        .with_grade("CS1010", "A")
        .with_grade("CS2040", "A");
    let rec = plan(&catalog, &request);

    let lecture = rec.courses.contains(&"CS2113".to_string());
    let tutorial = rec.courses.contains(&"CS2101".to_string());
    assert_eq!(lecture, tutorial);

    let record = StudentRecord::from_request(&catalog, &request).unwrap();
    let report = check_selection(&catalog, &record, ["CS2113"]).unwrap();
    assert!(report.violations.iter().any(|v| v.rule == Rule::CoModule));
}

#[test]
fn test_sample_prior_exposure_accepts_a_failed_attempt() {
    let catalog = sample();

    let fresh = StudentRecord::from_request(&catalog, &PlanningRequest::new(2)).unwrap();
    let report = check_selection(&catalog, &fresh, ["CS3216"]).unwrap();
    assert!(report
        .violations
        .iter()
        .any(|v| v.rule == Rule::PriorExposure));

    let attempted = StudentRecord::from_request(
        &catalog,
        &PlanningRequest::new(2).with_grade("CS2030", "F"),
    )
    .unwrap();
    let report = check_selection(&catalog, &attempted, ["CS3216"]).unwrap();
    assert!(!report
        .violations
        .iter()
        .any(|v| v.rule == Rule::PriorExposure));
}

#[test]
fn test_sample_minor_lock_in_blocks_other_minors() {
    let catalog = sample();
    let record = StudentRecord::from_request(
        &catalog,
        &PlanningRequest::new(6).with_minor("MATHEMATICS"),
    )
    .unwrap();
    assert_eq!(record.chosen_minor(), Some("Mathematics"));

    let report = check_selection(&catalog, &record, ["EC1101E"]).unwrap();
    assert!(report
        .violations
        .iter()
        .any(|v| v.rule == Rule::MinorLockIn && v.subject == "EC1101E"));
}

#[test]
fn test_cancelled_solve_is_unknown() {
    let catalog = chain();
    let record = StudentRecord::from_request(&catalog, &PlanningRequest::new(1)).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let options = SolveOptions {
        time_limit: Some(Duration::from_secs(5)),
        cancel: Some(cancel),
    };

    let rec = plan_term(&catalog, &record, &LinearSolver, &options).unwrap();
    assert_eq!(rec.status, SolveStatus::Unknown);
    assert!(rec.courses.is_empty());
}

#[test]
fn test_expired_time_budget_is_unknown() {
    let catalog = sample();
    let record = StudentRecord::from_request(&catalog, &PlanningRequest::new(1)).unwrap();
    let options = SolveOptions::with_time_limit(Duration::ZERO);

    for _ in 0..20 {
        let rec = plan_term(&catalog, &record, &LinearSolver, &options).unwrap();
        assert_eq!(rec.status, SolveStatus::Unknown);
        assert!(rec.courses.is_empty());
        assert!(rec.objective_value.is_none());
    }
}

#[test]
fn test_record_from_same_sized_catalog_is_rejected() {
    let other = CatalogBuilder::new(band(3, 6))
        .course(course("X", 3, &[]))
        .course(course("Y", 3, &[]))
        .course(course("Z", 4, &[]))
        .build()
        .unwrap();
    let record = StudentRecord::from_request(&other, &PlanningRequest::new(1)).unwrap();
    assert!(plan_term(&chain(), &record, &LinearSolver, &SolveOptions::default()).is_err());
}

#[test]
fn test_record_from_other_catalog_is_rejected() {
    let small = chain();
    let record = StudentRecord::from_request(&small, &PlanningRequest::new(1)).unwrap();
    assert!(plan_term(&sample(), &record, &LinearSolver, &SolveOptions::default()).is_err());
}

/// Random small catalogs: credits, slot sets, optional co-module partner, offered flag
fn arb_catalog() -> impl Strategy<Value = (Catalog, Vec<bool>)> {
    let course = (1u32..=5, prop::collection::vec(0usize..4, 0..3), any::<bool>(), any::<bool>());
    (prop::collection::vec(course, 2..8), any::<u64>(), 0u32..6).prop_map(
        |(specs, seed, min)| {
            let n = specs.len();
            let mut passed = Vec::with_capacity(n);
            let mut builder = CatalogBuilder::new(Requirements {
                credit_requirement: 60,
                min_credits_per_term: min,
                max_credits_per_term: min + 9,
            });
            for (idx, (credits, slots, offered, pass)) in specs.into_iter().enumerate() {
                let mut c = Course::new(format!("C{idx}"), credits);
                for slot in slots {
                    c.add_timeslot(format!("S{slot}"));
                }
                c.set_offered(offered || idx % 2 == 0);
                // deterministic partner choice from the seed
                let partner = usize::try_from(seed.rotate_left(u32::try_from(idx).unwrap()) % 64)
                    .unwrap();
                if partner < n && partner != idx && partner % 3 == 0 {
                    c.set_co_module(format!("C{partner}"));
                }
                passed.push(pass && idx % 3 == 1);
                builder = builder.course(c);
            }
            (builder.build().unwrap(), passed)
        },
    )
}

/// Best credit total over every assignment that breaks no rule, by enumeration
fn exhaustive_best(model: &PlanModel) -> Option<i64> {
    let n = model.variables().len();
    (0u32..1 << n)
        .map(|mask| (0..n).map(|i| mask & (1 << i) != 0).collect::<Vec<bool>>())
        .filter(|assignment| model.violations(assignment).is_empty())
        .map(|assignment| model.objective().credits_taken(&assignment))
        .max()
}

fn request_for(catalog: &Catalog, passed: &[bool], terms: u32) -> PlanningRequest {
    catalog
        .courses()
        .iter()
        .zip(passed)
        .filter(|(_, p)| **p)
        .fold(PlanningRequest::new(terms), |r, (c, _)| r.with_grade(&c.id, "A"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_solutions_never_break_clash_or_co_module_rules((catalog, passed) in arb_catalog()) {
        let request = request_for(&catalog, &passed, 2);
        let record = StudentRecord::from_request(&catalog, &request).unwrap();
        let model = formulate(&catalog, &record).unwrap();
        let outcome = LinearSolver.solve(&model, &SolveOptions::default());

        prop_assert_ne!(outcome.status, SolveStatus::Unknown);
        if let Some(assignment) = outcome.assignment {
            prop_assert!(model.violations(&assignment).is_empty());

            let courses = catalog.courses();
            for a in 0..courses.len() {
                for b in (a + 1)..courses.len() {
                    if courses[a].clashes_with(&courses[b]) {
                        prop_assert!(!(assignment[a] && assignment[b]));
                    }
                }
                if let Some(partner) = courses[a].co_module.as_deref() {
                    let m = catalog.index_of(partner).unwrap();
                    let lhs = i64::from(assignment[a]) + i64::from(record.passed(a));
                    let rhs = i64::from(assignment[m]) + i64::from(record.passed(m));
                    prop_assert_eq!(lhs, rhs);
                }
            }
        }
    }

    #[test]
    fn prop_solutions_are_optimal((catalog, passed) in arb_catalog(), terms in 0u32..8) {
        let request = request_for(&catalog, &passed, terms);
        let record = StudentRecord::from_request(&catalog, &request).unwrap();
        let model = formulate(&catalog, &record).unwrap();
        let outcome = LinearSolver.solve(&model, &SolveOptions::default());
        let best = exhaustive_best(&model);

        match outcome.status {
            SolveStatus::Optimal => {
                let assignment = outcome.assignment.unwrap();
                prop_assert!(model.violations(&assignment).is_empty());
                prop_assert_eq!(Some(model.objective().credits_taken(&assignment)), best);
            }
            SolveStatus::Infeasible => prop_assert_eq!(best, None),
            other => prop_assert!(false, "unexpected status {}", other),
        }
    }
}
