//! Channel-scheduling and buffer-management MILP.
//!
//! For `N` users and `T` timesteps the builder declares six variable
//! families per `(n, t)` and the constraints
//!
//! 1. `Σ_u s[u,t] = 1`
//! 2. `aux1[n,t] = q[n,t] − capacity_n`
//! 3. `ind[n,t] = max(0, aux1[n,t])`
//! 4. `ind[n,t] = 1 ⇒ l[n,t+1] − l[n,t] = 1`
//! 5. `s[n,t] = 1 ⇒ q[n,t+1] − q[n,t] = demand_n − level[n,t]`
//! 6. `s[n,t] = 0 ⇒ q[n,t+1] − q[n,t] = 1`
//!
//! with 4 to 6 only for `t < T − 1`, and minimizes `Σ l[n,t]`.
//!
//! Nothing ties `l[n,t+1]` to `l[n,t]` while `ind[n,t] = 0`, so the
//! minimizer may lower the counter between overflows.
//! [`LossMode::Held`] adds `ind[n,t] = 0 ⇒ l[n,t+1] − l[n,t] = 0`.

mod builder;
mod error;
mod options;
mod solution;
pub mod variables;
pub mod verify;


pub use builder::{FormulationStats, ScheduleModel, ScheduleModelBuilder, UserTerms};
pub use error::FormulationError;
pub use options::{BuildOptions, ExclusivityMode, LossMode};
pub use solution::ScheduleSolution;
pub use variables::{ScheduleVariables, VarFamily, VarGrid};
pub use verify::{verify, Violation};

use crate::channel::ChannelQualityTable;
use crate::instance::{Scenario, User};
use crate::solver::Solver;

/// [`ScheduleModelBuilder::build`] with default options.
pub fn build<S: Solver + ?Sized>(
    users: &[User],
    scenario: &Scenario,
    channels: &ChannelQualityTable,
    solver: &mut S,
) -> Result<ScheduleModel, FormulationError> {
    ScheduleModelBuilder::default().build(users, scenario, channels, solver)
}
