//! Solver seam: the operations a formulation needs from a MILP engine.
//!
//! The [`Solver`] trait is the only thing the formulation talks to. Engines
//! plug in by implementing it; [`MicroLpSolver`] is the bundled adapter.

pub mod error;
pub mod expr;
mod lp_format;
pub mod microlp;
pub mod problem;
pub mod result;

pub use error::SolverError;
pub use expr::{LinearExpr, VarHandle};
pub use microlp::{MicroLpSolver, SolverConfig};
pub use problem::{ConstraintSpec, MipProblem, ProblemStats, Sense, VarKind, VarSpec};
pub use result::{Assignment, SolveResult, SolveStatus};

/// A MILP engine session.
///
/// Declarations are infallible; every failure is reported by [`solve`](Solver::solve).
/// One session holds one model and is solved once.
pub trait Solver {
    /// Declares a `{0, 1}` variable.
    fn new_binary_var(&mut self, name: &str) -> VarHandle;

    /// Declares an integer variable in `[lower, upper]`.
    fn new_integer_var(&mut self, name: &str, lower: i64, upper: i64) -> VarHandle;

    /// Adds `lhs = rhs`.
    fn add_linear_equality(&mut self, lhs: LinearExpr, rhs: LinearExpr);

    /// Adds `target = max(exprs)`.
    fn add_max_constraint(&mut self, target: VarHandle, exprs: Vec<LinearExpr>);

    /// Adds `lhs = rhs`, enforced only while `indicator == active_when`.
    fn add_indicator_constraint(
        &mut self,
        indicator: VarHandle,
        active_when: bool,
        lhs: LinearExpr,
        rhs: LinearExpr,
    );

    fn set_objective(&mut self, expr: LinearExpr, sense: Sense);

    /// Runs the engine to completion or to its configured limit.
    ///
    /// Infeasible and unbounded models are `Ok` with the matching
    /// [`SolveStatus`]; `Err` is reserved for engine failures.
    fn solve(&mut self) -> Result<SolveResult, SolverError>;
}
