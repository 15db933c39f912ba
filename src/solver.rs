use crate::error::CpError;
use crate::problem::Problem;

pub type LpResult = Result<SolverResult, CpError>;

/// Capability interface of the LP collaborator. The complementary-problem
/// layer only ever hands over a built [`Problem`] and reads back status,
/// objective, primal values and row duals, so any backend can stand in for
/// the bundled simplex.
pub trait LpSolver {
    fn solve(&self, prob: &Problem) -> LpResult;
}

#[derive(Debug, Clone)]
pub enum SolverResult {
    Optimal(Solution),
    Infeasible,
    Unbounded,
    MaxIter { obj: f64 },
}

#[derive(Debug, Clone)]
pub struct Solution {
    obj: f64,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Solution {
    pub(crate) fn new(obj: f64, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { obj, x, y }
    }

    pub fn obj(&self) -> f64 {
        self.obj
    }

    /// One entry per problem variable, in the order they were added.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// One dual value per constraint, in the order they were added.
    pub fn y(&self) -> &[f64] {
        &self.y
    }
}
