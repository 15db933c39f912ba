use cplp::*;

pub const TOL: f64 = 1e-6;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOL,
        "value: {}, expected: {}",
        actual,
        expected
    );
}

pub fn unwrap_optimal(outcome: CpOutcome) -> CpSolution {
    match outcome {
        CpOutcome::Optimal(sol) => sol,
        other => panic!("not optimal: {:?}", other),
    }
}

pub fn assert_infeasible(outcome: CpOutcome) {
    match outcome {
        CpOutcome::Infeasible => (),
        other => panic!("not infeasible: {:?}", other),
    }
}

/// Three tasks partitioned by two current-solution columns. The only
/// direction is keeping both columns, so the objective is their combined
/// cost.
pub fn disjoint_solution_columns() {
    let columns = vec![
        Column::new(7., vec![0, 1], 0, true),
        Column::new(4., vec![2], 0, true),
    ];

    let mut cp = ComplementaryProblem::new(&columns, 3, Some(0), None, None);
    cp.construct_problem(false, 0.).unwrap();

    let sol = unwrap_optimal(cp.solve(None).unwrap());
    assert_close(sol.objective, 11.);
    assert_close(cp.value_of(&sol, 0).unwrap(), 1.);
    assert_close(cp.value_of(&sol, 1).unwrap(), 1.);

    //one dual per task coverage row, no normalization row here
    assert_eq!(sol.duals.len(), 3);
}

/// A phase-5 candidate at phase cutoff 0 gets no variable at all.
pub fn ineligible_column_is_excluded() {
    let columns = vec![
        Column::new(5., vec![0, 1], 0, true),
        Column::new(1., vec![2], 5, false),
    ];

    let mut cp = ComplementaryProblem::new(&columns, 3, Some(0), None, None);
    cp.construct_problem(false, 0.).unwrap();

    assert!(cp.variable_of(0).is_some());
    assert!(cp.variable_of(1).is_none());

    let sol = unwrap_optimal(cp.solve(None).unwrap());
    assert!(cp.value_of(&sol, 1).is_none());
    assert_close(sol.objective, 5.);
}

/// The eligible candidate clashes with the coverage the current solution
/// imposes, so no direction exists at this phase.
pub fn coverage_conflict_is_infeasible() {
    let columns = vec![
        Column::new(5., vec![0, 1], 0, true),
        Column::new(1., vec![0], 0, false),
    ];

    let mut cp = ComplementaryProblem::new(&columns, 2, Some(0), None, None);
    cp.construct_problem(false, 0.).unwrap();

    assert_infeasible(cp.solve(None).unwrap());
}

fn escalation_pool() -> Vec<Column> {
    vec![
        Column::new(10., vec![0], 0, true),
        Column::new(9., vec![0], 0, false),
        Column::new(2., vec![0], 2, false),
        Column::new(8., vec![0], 0, false),
        Column::new(0., vec![], 0, false),
    ]
}

fn escalation_cp(columns: &[Column]) -> ComplementaryProblem {
    //column 4 is the artificial aggregate of columns 1 and 2
    let mut cp = ComplementaryProblem::new(columns, 1, Some(2), Some(4), Some(&[1, 2]));
    cp.construct_problem(false, 0.).unwrap();
    cp
}

/// Raising the artificial penalty drives the artificial variable out: its
/// value strictly decreases and reaches zero once the genuine column takes
/// over, while the objective never improves.
pub fn artificial_penalization_escalation() {
    let columns = escalation_pool();
    let mut cp = escalation_cp(&columns);

    let first = unwrap_optimal(cp.solve(None).unwrap());
    assert_close(first.objective, 6.);
    let a_first = cp.value_of(&first, 4).unwrap();
    assert_close(a_first, 1. / 3.);

    cp.construct_problem(true, 10.).unwrap();
    let second = unwrap_optimal(cp.solve(Some(&first.primal)).unwrap());
    assert_close(second.objective, 54. / 7.);
    let a_second = cp.value_of(&second, 4).unwrap();
    assert_close(a_second, 1. / 7.);

    cp.construct_problem(true, 1e6).unwrap();
    let third = unwrap_optimal(cp.solve(Some(&second.primal)).unwrap());
    assert_close(third.objective, 8.);
    let a_third = cp.value_of(&third, 4).unwrap();
    assert_close(a_third, 0.);
    assert_close(cp.value_of(&third, 3).unwrap(), 1.);

    assert!(a_first > a_second && a_second > a_third + TOL);
    assert!(first.objective <= second.objective + TOL);
    assert!(second.objective <= third.objective + TOL);
}

/// Re-solving with identical parameters returns identical objective, primal
/// and dual vectors.
pub fn resolve_is_idempotent() {
    let columns = escalation_pool();
    let mut cp = escalation_cp(&columns);

    let first = unwrap_optimal(cp.solve(None).unwrap());
    let second = unwrap_optimal(cp.solve(Some(&first.primal)).unwrap());

    assert_eq!(first.objective, second.objective);
    assert_eq!(first.primal, second.primal);
    assert_eq!(first.duals, second.duals);
}

/// A phase change alone does nothing; rebuilding at the higher cutoff admits
/// the cheaper column and the objective drops below the current cost.
pub fn phase_rebuild_admits_columns() {
    let columns = vec![
        Column::new(5., vec![0], 0, true),
        Column::new(1., vec![0], 2, false),
    ];

    let mut cp = ComplementaryProblem::new(&columns, 1, Some(0), None, None);
    cp.construct_problem(false, 0.).unwrap();

    let sol = unwrap_optimal(cp.solve(None).unwrap());
    assert_close(sol.objective, 5.);
    assert!(cp.value_of(&sol, 1).is_none());

    cp.set_phase(Some(2));
    cp.construct_problem(false, 0.).unwrap();

    let sol = unwrap_optimal(cp.solve(None).unwrap());
    //the entering column carries normalization weight phase + 1 = 3
    assert_close(sol.objective, 11. / 3.);
    assert_close(cp.value_of(&sol, 1).unwrap(), 1. / 3.);
}

/// Dual values are returned per row, coverage rows first and the
/// normalization row last, and satisfy strong duality.
pub fn dual_values_satisfy_strong_duality() {
    let columns = escalation_pool();
    let mut cp = escalation_cp(&columns);

    let sol = unwrap_optimal(cp.solve(None).unwrap());

    //one coverage row, the aggregation row, the normalization row
    assert_eq!(sol.duals.len(), 3);

    //rhs is 1 for the covered task, 0 for the aggregation row, 1 for the
    //normalization row
    let dual_obj = sol.duals[0] + sol.duals[2];
    assert_close(dual_obj, sol.objective);
}
