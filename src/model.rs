/// A candidate subset-cover unit of the master set-partitioning problem,
/// supplied by the outer algorithm. Columns are identified by their position
/// in the pool slice handed to [`crate::ComplementaryProblem`].
#[derive(Debug, Clone)]
pub struct Column {
    pub cost: f64,
    /// Task indices covered by this column, each in `0..task_count`.
    pub support: Vec<usize>,
    /// Tier at which the column was introduced. Immutable once created.
    pub phase: u32,
    /// Whether the column is part of the current master solution. Fixed for
    /// the duration of one complementary-problem solve.
    pub in_solution: bool,
}

impl Column {
    pub fn new(cost: f64, support: Vec<usize>, phase: u32, in_solution: bool) -> Self {
        Self {
            cost,
            support,
            phase,
            in_solution,
        }
    }

    pub fn covers(&self, task: usize) -> bool {
        self.support.contains(&task)
    }

    /// A column participates in the complementary problem if it is in the
    /// current solution, or its phase does not exceed the cutoff. `None`
    /// means no phase restriction.
    pub fn is_eligible(&self, phase_limit: Option<u32>) -> bool {
        self.in_solution || phase_limit.map_or(true, |p| self.phase <= p)
    }
}
