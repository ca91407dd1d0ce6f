//! Values returned from a solve call.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::expr::VarHandle;
use super::problem::ProblemStats;

/// Outcome of a solve that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Stopped on a time or iteration limit before proving optimality.
    TimeLimit,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::TimeLimit => write!(f, "time limit"),
        }
    }
}

/// Value of every declared variable, indexed by [`VarHandle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, var: VarHandle) -> Option<f64> {
        self.values.get(var.index()).copied()
    }

    /// Value rounded to the nearest integer.
    pub fn get_int(&self, var: VarHandle) -> Option<i64> {
        self.get(var).map(|v| v.round() as i64)
    }

    /// True when a binary variable is set (value above one half).
    pub fn is_set(&self, var: VarHandle) -> Option<bool> {
        self.get(var).map(|v| v > 0.5)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Solve outcome plus metadata.
///
/// `assignment` and `objective` are present only when the backend produced
/// a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub assignment: Option<Assignment>,
    pub runtime: Duration,
    /// Branch-and-bound nodes explored, when the backend reports it.
    pub node_count: Option<u64>,
    pub stats: ProblemStats,
}

impl SolveResult {
    /// Result carrying no solution.
    pub fn without_solution(status: SolveStatus, runtime: Duration, stats: ProblemStats) -> Self {
        Self {
            status,
            objective: None,
            assignment: None,
            runtime,
            node_count: None,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_accessors() {
        let a = Assignment::new(vec![0.9999, 2.0000001, 0.2]);
        assert_eq!(a.len(), 3);
        assert_eq!(a.get_int(VarHandle(0)), Some(1));
        assert_eq!(a.get_int(VarHandle(1)), Some(2));
        assert_eq!(a.is_set(VarHandle(0)), Some(true));
        assert_eq!(a.is_set(VarHandle(2)), Some(false));
        assert_eq!(a.get(VarHandle(3)), None);
    }

    #[test]
    fn without_solution_has_no_values() {
        let r = SolveResult::without_solution(
            SolveStatus::Infeasible,
            Duration::from_millis(3),
            ProblemStats::default(),
        );
        assert!(r.assignment.is_none());
        assert!(r.objective.is_none());
        assert!(!r.status.is_optimal());
    }

    #[test]
    fn status_display() {
        assert_eq!(SolveStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolveStatus::TimeLimit.to_string(), "time limit");
    }

    #[test]
    fn result_serializes_to_json() {
        let r = SolveResult {
            status: SolveStatus::Optimal,
            objective: Some(1.0),
            assignment: Some(Assignment::new(vec![1.0, 0.0])),
            runtime: Duration::from_millis(5),
            node_count: Some(4),
            stats: ProblemStats::default(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"status\":\"Optimal\""));
        let back: SolveResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
