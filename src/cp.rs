use crate::error::CpError;
use crate::model::Column;
use crate::problem::{Problem, VariableId};
use crate::simplex::SimplexLpSolver;
use crate::solver::{LpSolver, SolverResult};

use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

/// Bidirectional lookup between external column ids and internal LP variable
/// indices. Rebuilt at every construction, dropped at destroy.
#[derive(Debug, Clone, Default)]
pub struct VarMap {
    by_column: HashMap<usize, usize>,
    by_var: Vec<usize>,
}

impl VarMap {
    fn insert(&mut self, column_id: usize) -> usize {
        let var = self.by_var.len();
        self.by_var.push(column_id);
        self.by_column.insert(column_id, var);
        var
    }

    pub fn var_of(&self, column_id: usize) -> Option<usize> {
        self.by_column.get(&column_id).copied()
    }

    pub fn column_of(&self, var: usize) -> Option<usize> {
        self.by_var.get(var).copied()
    }

    pub fn len(&self) -> usize {
        self.by_var.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_var.is_empty()
    }

    fn clear(&mut self) {
        self.by_column.clear();
        self.by_var.clear();
    }
}

/// Solution of one complementary-problem solve.
#[derive(Debug, Clone)]
pub struct CpSolution {
    pub objective: f64,
    /// One entry per modeled column, in construction order. Use
    /// [`ComplementaryProblem::value_of`] to look a column up by id.
    pub primal: Vec<f64>,
    /// One entry per row, in construction order: task coverage rows first,
    /// then the aggregation row if present, the normalization row last.
    pub duals: Vec<f64>,
}

/// Outcome of a solve. Infeasibility is the expected terminal state at some
/// phases, so it is a result, not an error.
#[derive(Debug, Clone)]
pub enum CpOutcome {
    Optimal(CpSolution),
    Infeasible,
}

/// The complementary problem of one integral-simplex iteration: an LP over
/// the phase-eligible columns whose optimum identifies an improving,
/// integer-feasible direction away from the current master solution.
///
/// One instance lives for one solve cycle. The caller builds it with
/// [`construct_problem`](Self::construct_problem), solves it, optionally
/// escalates the artificial column's penalty and re-solves, and finally
/// drops or [`destroy`](Self::destroy)s it.
pub struct ComplementaryProblem<'a, S = SimplexLpSolver> {
    columns: &'a [Column],
    task_count: usize,
    phase_limit: Option<u32>,
    normalization: Vec<f64>,
    artificial: Option<usize>,
    artificial_support: BTreeSet<usize>,
    max_penalization: f64,
    var_map: VarMap,
    prob: Option<Problem>,
    solver: S,
    destroyed: bool,
}

impl<'a> ComplementaryProblem<'a> {
    /// `artificial` is the pool id of the synthetic column aggregating the
    /// columns in `ac_support`; candidates that are neither in the current
    /// solution nor phase-eligible are dropped from the support.
    pub fn new(
        columns: &'a [Column],
        task_count: usize,
        phase_limit: Option<u32>,
        artificial: Option<usize>,
        ac_support: Option<&[usize]>,
    ) -> Self {
        Self::with_solver(
            columns,
            task_count,
            phase_limit,
            artificial,
            ac_support,
            SimplexLpSolver::default(),
        )
    }
}

impl<'a, S: LpSolver> ComplementaryProblem<'a, S> {
    pub fn with_solver(
        columns: &'a [Column],
        task_count: usize,
        phase_limit: Option<u32>,
        artificial: Option<usize>,
        ac_support: Option<&[usize]>,
        solver: S,
    ) -> Self {
        let mut artificial_support = BTreeSet::new();

        if let Some(candidates) = ac_support {
            for &id in candidates {
                if Some(id) == artificial {
                    continue;
                }

                if let Some(col) = columns.get(id) {
                    if col.is_eligible(phase_limit) {
                        artificial_support.insert(id);
                    }
                }
            }
        }

        let normalization = columns
            .iter()
            .enumerate()
            .map(|(id, col)| {
                if Some(id) == artificial || col.in_solution {
                    1.
                } else {
                    f64::from(col.phase + 1)
                }
            })
            .collect();

        Self {
            columns,
            task_count,
            phase_limit,
            normalization,
            artificial,
            artificial_support,
            max_penalization: 0.,
            var_map: VarMap::default(),
            prob: None,
            solver,
            destroyed: false,
        }
    }

    /// Builds the LP, or, with `increase_artificial_cost`, raises the
    /// artificial column's objective coefficient to `penalization` in place.
    /// Penalization values must strictly increase across calls; the rest of
    /// the model is left untouched by an increase.
    pub fn construct_problem(
        &mut self,
        increase_artificial_cost: bool,
        penalization: f64,
    ) -> Result<(), CpError> {
        self.check_alive()?;

        if increase_artificial_cost {
            return self.penalize(penalization);
        }

        if self.columns.is_empty() {
            return Err(CpError::Construction("column pool is empty".to_string()));
        }

        if let Some(acol) = self.artificial {
            if acol >= self.columns.len() {
                return Err(CpError::Construction(format!(
                    "artificial column id {} is outside the pool of {} columns",
                    acol,
                    self.columns.len()
                )));
            }
        }

        let mut prob = Problem::new();
        let mut var_map = VarMap::default();

        for (id, col) in self.columns.iter().enumerate() {
            let is_artificial = Some(id) == self.artificial;

            if !is_artificial && !col.is_eligible(self.phase_limit) {
                continue;
            }

            if !is_artificial {
                if let Some(&task) = col.support.iter().find(|&&t| t >= self.task_count) {
                    return Err(CpError::Construction(format!(
                        "column {} covers unknown task {}",
                        id, task
                    )));
                }
            }

            let (cost, name) = if is_artificial {
                (self.max_penalization, format!("acol{}", id))
            } else {
                (col.cost, format!("col{}", id))
            };

            let var = prob.add_var(cost, Some(name))?;
            let index = var_map.insert(id);
            debug_assert_eq!(usize::from(var), index);
        }

        //aggregate cover of the artificial column: the union of its
        //members' supports
        let mut acol_cover = vec![false; self.task_count];

        for &id in &self.artificial_support {
            for &task in &self.columns[id].support {
                if task >= self.task_count {
                    return Err(CpError::Construction(format!(
                        "artificial support column {} covers unknown task {}",
                        id, task
                    )));
                }

                acol_cover[task] = true;
            }
        }

        let mut solution_cover = vec![false; self.task_count];

        for col in self.columns.iter().filter(|col| col.in_solution) {
            for &task in &col.support {
                if task >= self.task_count {
                    return Err(CpError::Construction(format!(
                        "a current-solution column covers unknown task {}",
                        task
                    )));
                }

                solution_cover[task] = true;
            }
        }

        //coverage rows, one per task: the candidate direction must cover
        //exactly the tasks the current solution covers
        for task in 0..self.task_count {
            let mut coeffs: Vec<(VariableId, f64)> = Vec::new();

            for (var, &id) in var_map.by_var.iter().enumerate() {
                let covered = if Some(id) == self.artificial {
                    acol_cover[task]
                } else {
                    self.columns[id].covers(task)
                };

                if covered {
                    coeffs.push((var.into(), 1.));
                }
            }

            let rhs = if solution_cover[task] { 1. } else { 0. };
            prob.add_constraint(coeffs, rhs)?;
        }

        //aggregation row tying the members to the artificial variable:
        //sum of member values = |support| * artificial value
        if let Some(acol) = self.artificial {
            if !self.artificial_support.is_empty() {
                let avar = Self::require_var(&var_map, acol)?;

                let mut coeffs: Vec<(VariableId, f64)> = Vec::new();

                for &id in &self.artificial_support {
                    let var = Self::require_var(&var_map, id)?;
                    coeffs.push((var.into(), 1.));
                }

                coeffs.push((avar.into(), -(self.artificial_support.len() as f64)));
                prob.add_constraint(coeffs, 0.)?;
            }
        }

        //normalization row, added last: one unit of entering direction,
        //weighted so that later-phase columns are used reluctantly
        let mut coeffs: Vec<(VariableId, f64)> = Vec::new();

        for (var, &id) in var_map.by_var.iter().enumerate() {
            if Some(id) == self.artificial || !self.columns[id].in_solution {
                coeffs.push((var.into(), self.normalization[id]));
            }
        }

        if !coeffs.is_empty() {
            prob.add_constraint(coeffs, 1.)?;
        }

        info!(
            "built complementary problem with {} variables and {} rows at phase {:?}",
            var_map.len(),
            prob.constraints().len(),
            self.phase_limit
        );

        self.prob = Some(prob);
        self.var_map = var_map;
        Ok(())
    }

    fn penalize(&mut self, penalization: f64) -> Result<(), CpError> {
        let acol = self.artificial.ok_or_else(|| {
            CpError::Construction("no artificial column to penalize".to_string())
        })?;

        if self.prob.is_none() {
            return Err(CpError::Construction(
                "cannot raise the artificial cost before the problem is built".to_string(),
            ));
        }

        if penalization <= self.max_penalization {
            return Err(CpError::Construction(format!(
                "penalization must strictly increase, {} <= {}",
                penalization, self.max_penalization
            )));
        }

        let var = Self::require_var(&self.var_map, acol)?;

        if let Some(prob) = self.prob.as_mut() {
            prob.set_obj_coeff(var.into(), penalization)?;
        }

        self.max_penalization = penalization;

        debug!(
            "artificial column {} penalized with cost {}",
            acol, penalization
        );

        Ok(())
    }

    fn require_var(var_map: &VarMap, column_id: usize) -> Result<usize, CpError> {
        var_map.var_of(column_id).ok_or_else(|| {
            CpError::Construction(format!("column {} has no variable", column_id))
        })
    }

    /// Changes the phase cutoff. Eligibility of already-built variables is
    /// not re-filtered; call [`construct_problem`](Self::construct_problem)
    /// again for the new phase to take effect.
    pub fn set_phase(&mut self, phase: Option<u32>) {
        self.phase_limit = phase;
    }

    /// Solves the built LP. `past_solution`, when given, is only compared
    /// against the new primal values for diagnostics. The model is left
    /// intact, so a penalization update can re-solve without a rebuild.
    pub fn solve(&mut self, past_solution: Option<&[f64]>) -> Result<CpOutcome, CpError> {
        self.check_alive()?;

        let prob = self.prob.as_ref().ok_or_else(|| {
            CpError::Construction("the problem has not been constructed".to_string())
        })?;

        match self.solver.solve(prob)? {
            SolverResult::Optimal(sol) => {
                if let Some(past) = past_solution {
                    let delta = past
                        .iter()
                        .zip(sol.x())
                        .map(|(a, b)| (a - b).abs())
                        .fold(0., f64::max);

                    debug!("largest primal change from the previous solution: {}", delta);
                }

                info!("complementary problem solved, objective {}", sol.obj());

                Ok(CpOutcome::Optimal(CpSolution {
                    objective: sol.obj(),
                    primal: sol.x().to_vec(),
                    duals: sol.y().to_vec(),
                }))
            }

            SolverResult::Infeasible => {
                info!("no improving direction at phase {:?}", self.phase_limit);
                Ok(CpOutcome::Infeasible)
            }

            SolverResult::Unbounded => Err(CpError::Solver(
                "complementary problem is unbounded, the normalization row is missing or malformed"
                    .to_string(),
            )),

            SolverResult::MaxIter { obj } => Err(CpError::Solver(format!(
                "iteration limit reached with objective {}",
                obj
            ))),
        }
    }

    /// Releases the LP model and the identifier maps. The instance cannot be
    /// used afterwards; dropping it has the same effect.
    pub fn destroy(&mut self) {
        self.prob = None;
        self.var_map.clear();
        self.destroyed = true;
    }

    fn check_alive(&self) -> Result<(), CpError> {
        if self.destroyed {
            return Err(CpError::Construction(
                "the instance was destroyed".to_string(),
            ));
        }

        Ok(())
    }

    /// Primal value of a column in `solution`, or `None` if the column has
    /// no variable in the current model.
    pub fn value_of(&self, solution: &CpSolution, column_id: usize) -> Option<f64> {
        self.var_map
            .var_of(column_id)
            .and_then(|var| solution.primal.get(var).copied())
    }

    /// Internal variable index of a column in the current model.
    pub fn variable_of(&self, column_id: usize) -> Option<usize> {
        self.var_map.var_of(column_id)
    }

    pub fn phase(&self) -> Option<u32> {
        self.phase_limit
    }

    pub fn max_penalization(&self) -> f64 {
        self.max_penalization
    }

    pub fn normalization_coefficients(&self) -> &[f64] {
        &self.normalization
    }

    pub fn artificial_support(&self) -> &BTreeSet<usize> {
        &self.artificial_support
    }
}
