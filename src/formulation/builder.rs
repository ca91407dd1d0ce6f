//! Declares variables, constraints and the objective on a [`Solver`].

use serde::Serialize;

use super::error::FormulationError;
use super::options::{BuildOptions, ExclusivityMode, LossMode};
use super::solution::ScheduleSolution;
use super::variables::{ScheduleVariables, VarFamily};
use crate::channel::ChannelQualityTable;
use crate::instance::{Scenario, User, UserKey};
use crate::solver::{LinearExpr, Sense, SolveResult, Solver, SolverError, VarHandle};

/// Number of constraints emitted per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormulationStats {
    pub variables: usize,
    pub exclusivity: usize,
    pub overflow_margin: usize,
    pub overflow_max: usize,
    pub loss_recurrence: usize,
    pub buffer_recurrence: usize,
}

impl FormulationStats {
    pub fn linear_constraints(&self) -> usize {
        self.exclusivity + self.overflow_margin
    }

    pub fn general_constraints(&self) -> usize {
        self.overflow_max + self.loss_recurrence + self.buffer_recurrence
    }
}

/// Per-user constants the constraints were built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTerms {
    pub key: UserKey,
    pub demand: i64,
    pub buffer_capacity: i64,
    /// Upper bound of `l`, `q`, `aux2` and `|aux1|`: `demand × T`.
    pub bound: i64,
    /// `demand − level[t]`: occupancy change when served at `t`.
    pub served_delta: Vec<i64>,
}

/// A model declared on some solver session.
///
/// Holds only handles and the constants used to build it; values arrive
/// through [`ScheduleModel::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleModel {
    variables: ScheduleVariables,
    users: Vec<UserTerms>,
    duration: usize,
    options: BuildOptions,
    stats: FormulationStats,
}

impl ScheduleModel {
    pub fn variables(&self) -> &ScheduleVariables {
        &self.variables
    }

    pub fn users(&self) -> &[UserTerms] {
        &self.users
    }

    /// Episode length `T`.
    pub fn duration(&self) -> usize {
        self.duration
    }

    pub fn stats(&self) -> &FormulationStats {
        &self.stats
    }

    /// Options the model was built with.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Solves on the session the model was built on.
    pub fn solve<S: Solver + ?Sized>(
        &self,
        solver: &mut S,
    ) -> Result<ScheduleSolution<'_>, SolverError> {
        let result = solver.solve()?;
        Ok(self.solution(result))
    }

    /// Reads `result` through this model's handles.
    pub fn solution(&self, result: SolveResult) -> ScheduleSolution<'_> {
        ScheduleSolution::new(self, result)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleModelBuilder {
    options: BuildOptions,
}

impl ScheduleModelBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Declares the whole model on `solver`.
    ///
    /// Fails with [`FormulationError::OutOfRangeTimestep`] before declaring
    /// anything when a user's positions or channel row are shorter than the
    /// scenario. Never fails otherwise; an infeasible model is reported by
    /// the solver.
    pub fn build<S: Solver + ?Sized>(
        &self,
        users: &[User],
        scenario: &Scenario,
        channels: &ChannelQualityTable,
        solver: &mut S,
    ) -> Result<ScheduleModel, FormulationError> {
        let horizon = scenario.duration();
        let terms = user_terms(users, horizon, channels)?;

        let mut vars = ScheduleVariables::with_capacity(users.len(), horizon);
        let mut cells = Vec::with_capacity(terms.len() * horizon);
        for (n, user) in terms.iter().enumerate() {
            for t in 0..horizon {
                let mut declare = |family: VarFamily| {
                    let name = family.name(n, t);
                    let handle = match family {
                        VarFamily::Scheduled | VarFamily::Overflow => solver.new_binary_var(&name),
                        VarFamily::Margin => solver.new_integer_var(&name, -user.bound, user.bound),
                        VarFamily::Loss | VarFamily::Occupancy | VarFamily::Reserved => {
                            solver.new_integer_var(&name, 0, user.bound)
                        }
                    };
                    vars.family_mut(family).push(handle);
                    handle
                };
                cells.push(Cell {
                    served: declare(VarFamily::Scheduled),
                    loss: declare(VarFamily::Loss),
                    occupancy: declare(VarFamily::Occupancy),
                    overflow: declare(VarFamily::Overflow),
                    margin: declare(VarFamily::Margin),
                });
                declare(VarFamily::Reserved);
            }
        }

        let mut stats = FormulationStats {
            variables: VarFamily::ALL.len() * cells.len(),
            ..FormulationStats::default()
        };

        for (n, user) in terms.iter().enumerate() {
            let row = &cells[n * horizon..(n + 1) * horizon];
            for t in 0..horizon {
                let emit_exclusivity = match self.options.exclusivity {
                    ExclusivityMode::PerUser => true,
                    ExclusivityMode::PerTimestep => n == 0,
                };
                if emit_exclusivity {
                    solver.add_linear_equality(
                        LinearExpr::sum(vars.scheduled.column(t)),
                        LinearExpr::constant(1.0),
                    );
                    stats.exclusivity += 1;
                }

                let cell = &row[t];
                solver.add_linear_equality(
                    cell.margin.into(),
                    cell.occupancy - user.buffer_capacity as f64,
                );
                stats.overflow_margin += 1;

                solver.add_max_constraint(
                    cell.overflow,
                    vec![LinearExpr::constant(0.0), cell.margin.into()],
                );
                stats.overflow_max += 1;

                // No recurrence leaves the last timestep.
                let Some(next) = row.get(t + 1) else {
                    continue;
                };

                solver.add_indicator_constraint(
                    cell.overflow,
                    true,
                    next.loss - cell.loss,
                    LinearExpr::constant(1.0),
                );
                stats.loss_recurrence += 1;
                if self.options.loss == LossMode::Held {
                    solver.add_indicator_constraint(
                        cell.overflow,
                        false,
                        next.loss - cell.loss,
                        LinearExpr::constant(0.0),
                    );
                    stats.loss_recurrence += 1;
                }

                solver.add_indicator_constraint(
                    cell.served,
                    true,
                    next.occupancy - cell.occupancy,
                    LinearExpr::constant(user.served_delta[t] as f64),
                );
                solver.add_indicator_constraint(
                    cell.served,
                    false,
                    next.occupancy - cell.occupancy,
                    LinearExpr::constant(1.0),
                );
                stats.buffer_recurrence += 2;
            }
        }

        solver.set_objective(LinearExpr::sum(vars.loss.iter()), Sense::Minimize);

        log::debug!(
            "built schedule model: {} users, {} timesteps, {} variables, {} linear and {} general constraints",
            terms.len(),
            horizon,
            stats.variables,
            stats.linear_constraints(),
            stats.general_constraints()
        );

        Ok(ScheduleModel {
            variables: vars,
            users: terms,
            duration: horizon,
            options: self.options,
            stats,
        })
    }
}

/// Handles of one `(user, timestep)` that the constraints refer to.
struct Cell {
    served: VarHandle,
    loss: VarHandle,
    occupancy: VarHandle,
    overflow: VarHandle,
    margin: VarHandle,
}

/// Checks dimensions and collects the per-user constants.
fn user_terms(
    users: &[User],
    horizon: usize,
    channels: &ChannelQualityTable,
) -> Result<Vec<UserTerms>, FormulationError> {
    users
        .iter()
        .enumerate()
        .map(|(n, user)| {
            let row = channels.row(n).unwrap_or_default();
            let available = user.positions().len().min(row.len());
            if available < horizon {
                return Err(FormulationError::OutOfRangeTimestep {
                    user: n,
                    key: user.key().to_string(),
                    available,
                    duration: horizon,
                });
            }
            let demand = i64::from(user.demand());
            Ok(UserTerms {
                key: user.key().clone(),
                demand,
                buffer_capacity: user.buffer_capacity(),
                bound: demand.saturating_mul(horizon as i64),
                served_delta: row[..horizon]
                    .iter()
                    .map(|q| demand - i64::from(q.level()))
                    .collect(),
            })
        })
        .collect()
}
