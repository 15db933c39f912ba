mod cp;
mod error;
mod model;
pub mod problem;
mod simplex;
pub mod solver;
mod util;

pub use crate::cp::{ComplementaryProblem, CpOutcome, CpSolution, VarMap};
pub use crate::error::CpError;
pub use crate::model::Column;
pub use crate::problem::{Constraint, Problem, Variable, VariableId};
pub use crate::simplex::SimplexLpSolver;
pub use crate::solver::{LpResult, LpSolver, Solution, SolverResult};
