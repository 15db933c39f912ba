use thiserror::Error;

/// Errors surfaced to the outer algorithm. Infeasible and unbounded solve
/// outcomes are part of the normal result contract and are not errors.
#[derive(Error, Debug)]
pub enum CpError {
    /// Malformed inputs to the problem builder. Fatal to the current
    /// instance; the caller must rebuild.
    #[error("construction error: {0}")]
    Construction(String),

    /// The LP backend failed, as opposed to reporting a legitimate
    /// infeasible result.
    #[error("solver error: {0}")]
    Solver(String),
}
