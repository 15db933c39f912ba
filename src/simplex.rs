#![allow(non_snake_case)]

use crate::error::CpError;
use crate::problem::Problem;
use crate::solver::{LpResult, LpSolver, Solution, SolverResult};
use crate::util::{EPS, ITER_WIDTH};

use log::{debug, info, trace};

/// Two-phase primal simplex for problems of the form
/// `min c.x  s.t.  A x = b,  x >= 0`, the shape produced by the
/// complementary-problem builder. Phase 1 starts from an identity basis of
/// row artificials; phase 2 pins those artificials at zero and optimizes the
/// real objective. Row duals are read off the final basis.
pub struct SimplexLpSolver {
    max_iter: u64,
}

impl std::default::Default for SimplexLpSolver {
    fn default() -> Self {
        Self { max_iter: 1000 }
    }
}

impl SimplexLpSolver {
    pub fn new(max_iter: Option<u64>) -> Self {
        Self {
            max_iter: max_iter.unwrap_or(u64::MAX),
        }
    }

    fn run_phase(
        &self,
        A: &nalgebra::DMatrix<f64>,
        c: &nalgebra::DVector<f64>,
        x: &mut nalgebra::DVector<f64>,
        B: &mut Vec<usize>,
        in_basis: &mut Vec<bool>,
        n: usize,
        pin_artificials: bool,
    ) -> Result<PhaseResult, CpError> {
        let m = A.nrows();
        let mut iter = 0u64;

        info!("Iteration  |  Objective");

        loop {
            if iter >= self.max_iter {
                debug!("reached max iterations");
                return Ok(PhaseResult::MaxIter);
            }

            iter += 1;

            let B_cols: Vec<_> = B.iter().map(|&j| A.column(j)).collect();
            let A_B = nalgebra::DMatrix::from_columns(&B_cols);
            let c_B = nalgebra::DVector::from_iterator(m, B.iter().map(|&j| c[j]));

            let lu_decomp = A_B.lu();

            if lu_decomp.u().diagonal().iter().any(|d| d.abs() < EPS) {
                return Err(CpError::Solver(
                    "invalid basis, A_B is not invertible".to_string(),
                ));
            }

            //solve A_B^T y = c_B through the transposed LU factors,
            //always has a solution because A_B is invertible
            let y_tilde = lu_decomp.u().tr_solve_upper_triangular(&c_B).unwrap();
            let mut y = lu_decomp.l().tr_solve_lower_triangular(&y_tilde).unwrap();
            lu_decomp.p().inv_permute_rows(&mut y);

            debug!("{:>width$} | {}", iter, c.dot(x), width = ITER_WIDTH);

            //smallest eligible index enters (Bland's rule, no cycling)
            let mut entering = None;

            for j in 0..n {
                if in_basis[j] {
                    continue;
                }

                let r_j = c[j] - A.column(j).dot(&y);

                if r_j < -EPS {
                    entering = Some(j);
                    break;
                }
            }

            let j = match entering {
                Some(j) => j,
                None => return Ok(PhaseResult::Optimal { y }),
            };

            //always has a solution, singularity was checked above
            let d = lu_decomp.solve(&A.column(j)).unwrap();

            trace!("entering variable: {}, d: {}", j, d);

            let mut lambda = f64::INFINITY;
            let mut leaving: Option<usize> = None;

            for (i, &d_i) in d.iter().enumerate() {
                let k = B[i];

                let lambda_i = if pin_artificials && k >= n {
                    //artificials stay at zero once a feasible point is found
                    if d_i.abs() < EPS {
                        continue;
                    }

                    0.
                } else if d_i > EPS {
                    x[k] / d_i
                } else {
                    continue;
                };

                let take = match leaving {
                    None => true,
                    //ties broken on the smallest basic index (Bland's rule)
                    Some(cur) => {
                        lambda_i < lambda - EPS
                            || ((lambda_i - lambda).abs() < EPS && k < B[cur])
                    }
                };

                if take {
                    lambda = lambda_i;
                    leaving = Some(i);
                }
            }

            let li = match leaving {
                Some(li) => li,
                None => return Ok(PhaseResult::Unbounded),
            };

            //degenerate ratios can come out as small negative dust
            let lambda = lambda.max(0.);

            for (i, &d_i) in d.iter().enumerate() {
                x[B[i]] -= lambda * d_i;
            }

            let leave = B[li];
            x[j] = lambda;
            x[leave] = 0.;
            in_basis[leave] = false;
            in_basis[j] = true;
            B[li] = j;

            trace!("pivot: {} enters, {} leaves, step {}", j, leave, lambda);
        }
    }
}

impl LpSolver for SimplexLpSolver {
    fn solve(&self, prob: &Problem) -> LpResult {
        let n = prob.variables.len();
        let m = prob.constraints().len();

        info!(
            "solving problem with {} variables and {} constraints",
            n, m
        );

        if m == 0 {
            //trivial problem, every variable sits at its lower bound unless
            //a negative cost pushes it off to infinity
            if prob.variables.iter().any(|var| var.obj_coeff < -EPS) {
                return Ok(SolverResult::Unbounded);
            }

            return Ok(SolverResult::Optimal(Solution::new(
                0.,
                vec![0.; n],
                Vec::new(),
            )));
        }

        let mut A = nalgebra::DMatrix::<f64>::zeros(m, n + m);
        let mut b = nalgebra::DVector::zeros(m);
        let mut flipped = vec![false; m];

        for (i, constraint) in prob.constraints().iter().enumerate() {
            b[i] = constraint.rhs;

            for (id, coeff) in &constraint.coeffs {
                A[(i, usize::from(id))] += *coeff;
            }
        }

        //normalize to a non-negative right-hand side so the artificial
        //identity basis starts feasible
        for i in 0..m {
            if b[i] < 0. {
                flipped[i] = true;
                b[i] = -b[i];

                for j in 0..n {
                    A[(i, j)] = -A[(i, j)];
                }
            }

            A[(i, n + i)] = 1.;
        }

        trace!("A: {}", A);
        trace!("b: {}", b);

        let mut x = nalgebra::DVector::zeros(n + m);
        let mut B: Vec<usize> = (n..n + m).collect();
        let mut in_basis = vec![false; n + m];

        for i in 0..m {
            x[n + i] = b[i];
            in_basis[n + i] = true;
        }

        let mut c1 = nalgebra::DVector::zeros(n + m);

        for i in 0..m {
            c1[n + i] = 1.;
        }

        info!("PHASE 1");

        match self.run_phase(&A, &c1, &mut x, &mut B, &mut in_basis, n, false)? {
            PhaseResult::Optimal { .. } => {
                let infeas = c1.dot(&x);
                assert!(infeas > -EPS);

                if infeas > EPS {
                    info!("problem is infeasible");
                    return Ok(SolverResult::Infeasible);
                }

                info!("found feasible point");
            }

            PhaseResult::Unbounded => panic!("phase 1 is never unbounded"),

            PhaseResult::MaxIter => {
                info!("reached maximum iterations");
                return Ok(SolverResult::MaxIter { obj: f64::INFINITY });
            }
        }

        let mut c2 = nalgebra::DVector::zeros(n + m);

        for (j, var) in prob.variables.iter().enumerate() {
            c2[j] = var.obj_coeff;
        }

        info!("PHASE 2");

        Ok(
            match self.run_phase(&A, &c2, &mut x, &mut B, &mut in_basis, n, true)? {
                PhaseResult::Optimal { mut y } => {
                    //row flips negate the corresponding duals
                    for (i, &was_flipped) in flipped.iter().enumerate() {
                        if was_flipped {
                            y[i] = -y[i];
                        }
                    }

                    let obj = c2.dot(&x);

                    info!("found optimal point with objective value {}", obj);

                    SolverResult::Optimal(Solution::new(
                        obj,
                        x.iter().take(n).cloned().collect(),
                        y.iter().cloned().collect(),
                    ))
                }

                PhaseResult::Unbounded => {
                    info!("problem is unbounded");
                    SolverResult::Unbounded
                }

                PhaseResult::MaxIter => {
                    info!("reached maximum iterations");
                    SolverResult::MaxIter { obj: c2.dot(&x) }
                }
            },
        )
    }
}

#[derive(Debug)]
enum PhaseResult {
    Optimal { y: nalgebra::DVector<f64> },
    Unbounded,
    MaxIter,
}
