//! Solved values read back through a model's handles.

use super::builder::ScheduleModel;
use super::verify::{verify, Violation};
use crate::solver::{Assignment, SolveResult, SolveStatus, VarHandle};

/// A [`SolveResult`] paired with the model it solves.
#[derive(Debug, Clone)]
pub struct ScheduleSolution<'m> {
    model: &'m ScheduleModel,
    result: SolveResult,
}

impl<'m> ScheduleSolution<'m> {
    pub(crate) fn new(model: &'m ScheduleModel, result: SolveResult) -> Self {
        Self { model, result }
    }

    pub fn model(&self) -> &'m ScheduleModel {
        self.model
    }

    pub fn status(&self) -> SolveStatus {
        self.result.status
    }

    pub fn result(&self) -> &SolveResult {
        &self.result
    }

    pub fn into_result(self) -> SolveResult {
        self.result
    }

    /// Total packet loss, when a solution exists.
    pub fn objective(&self) -> Option<f64> {
        self.result.objective
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.result.assignment.as_ref()
    }

    /// Integral value of `var`.
    pub fn value(&self, var: VarHandle) -> Option<i64> {
        self.assignment()?.get_int(var)
    }

    pub fn scheduled(&self, user: usize, t: usize) -> Option<bool> {
        let var = self.model.variables().scheduled.get(user, t)?;
        self.assignment()?.is_set(var)
    }

    pub fn occupancy(&self, user: usize, t: usize) -> Option<i64> {
        self.value(self.model.variables().occupancy.get(user, t)?)
    }

    pub fn loss(&self, user: usize, t: usize) -> Option<i64> {
        self.value(self.model.variables().loss.get(user, t)?)
    }

    /// The first user served at `t`.
    pub fn served_user(&self, t: usize) -> Option<usize> {
        (0..self.model.users().len()).find(|&n| self.scheduled(n, t) == Some(true))
    }

    /// Served user per timestep, or `None` without a solution.
    pub fn schedule(&self) -> Option<Vec<Option<usize>>> {
        self.assignment()?;
        Some((0..self.model.duration()).map(|t| self.served_user(t)).collect())
    }

    /// Constraint violations of the returned assignment, or `None` without
    /// a solution.
    pub fn verify(&self) -> Option<Vec<Violation>> {
        Some(verify(self.model, self.assignment()?))
    }
}
