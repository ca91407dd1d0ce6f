//! airsched - channel scheduling and buffer management as a MILP
//!
//! Users share one access point over a discrete-time episode. Each timestep
//! exactly one user is served; served users drain their buffer at a rate set
//! by channel quality, idle users accumulate one unit, and overflowing
//! buffers lose packets. The crate turns an instance into a mixed-integer
//! program that minimizes total loss and hands it to a [`solver::Solver`].
//!
//! ```text
//! instance → channel → formulation → solver
//! ```

pub mod channel;
pub mod formulation;
pub mod instance;
pub mod solver;

use thiserror::Error;

use channel::{ChannelQualityTable, ChannelResolver};
use formulation::{BuildOptions, FormulationError, ScheduleModel, ScheduleModelBuilder};
use instance::{Instance, InstanceError};
use solver::{SolveResult, Solver, SolverError};

/// Identifier type used for solver sessions.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Formulation(#[from] FormulationError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything produced by one [`optimize`] run.
#[derive(Debug, Clone)]
pub struct Optimization {
    pub channels: ChannelQualityTable,
    pub model: ScheduleModel,
    pub result: SolveResult,
}

impl Optimization {
    /// Served user per timestep, or `None` without a solution.
    pub fn schedule(&self) -> Option<Vec<Option<usize>>> {
        self.solution().schedule()
    }

    pub fn solution(&self) -> formulation::ScheduleSolution<'_> {
        self.model.solution(self.result.clone())
    }
}

/// Resolves channel quality, builds the model on `solver` and solves it.
pub fn optimize<S: Solver + ?Sized>(
    instance: &Instance,
    resolver: &ChannelResolver,
    options: BuildOptions,
    solver: &mut S,
) -> Result<Optimization> {
    let channels = resolver.resolve(instance.users(), instance.access_point());
    let model = ScheduleModelBuilder::new(options).build(
        instance.users(),
        instance.scenario(),
        &channels,
        solver,
    )?;
    let result = solver.solve()?;
    log::info!(
        "schedule for {} users over {} timesteps: {} (objective {:?})",
        instance.users().len(),
        instance.scenario().duration(),
        result.status,
        result.objective
    );
    Ok(Optimization {
        channels,
        model,
        result,
    })
}
