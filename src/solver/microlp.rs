//! [`Solver`] backed by `good_lp` with the pure-Rust `microlp` engine.
//!
//! `microlp` only understands linear rows, so general constraints are
//! linearized at solve time with big-M terms computed from the declared
//! variable bounds:
//!
//! - `b = 1 ⇒ e = 0` becomes `e + hi·b ≤ hi` and `e + lo·b ≥ lo`
//!   (and the mirrored pair for `b = 0`), where `[lo, hi]` is the range of `e`.
//! - `r = max(e₁..eₖ)` becomes `r ≥ eᵢ` for all `i`, plus one selector
//!   binary per argument with `Σ yᵢ = 1` and `r ≤ eᵢ + Mᵢ(1 − yᵢ)`.

use std::path::PathBuf;
use std::time::Instant;

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};

use super::error::SolverError;
use super::expr::{LinearExpr, VarHandle};
use super::problem::{ConstraintSpec, MipProblem, Sense, VarKind};
use super::result::{Assignment, SolveResult, SolveStatus};
use super::Solver;
use crate::generate_id;

/// Adapter settings.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Session name; a fresh `schedule-<uuid>` when `None`.
    pub name: Option<String>,
    /// Write the LP dump here before solving.
    pub write_model: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct MicroLpSolver {
    problem: MipProblem,
    config: SolverConfig,
}

impl MicroLpSolver {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| format!("schedule-{}", generate_id()));
        Self {
            problem: MipProblem::new(name),
            config,
        }
    }

    /// Declarations recorded so far.
    pub fn problem(&self) -> &MipProblem {
        &self.problem
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for MicroLpSolver {
    fn new_binary_var(&mut self, name: &str) -> VarHandle {
        self.problem.add_binary(name)
    }

    fn new_integer_var(&mut self, name: &str, lower: i64, upper: i64) -> VarHandle {
        self.problem.add_integer(name, lower, upper)
    }

    fn add_linear_equality(&mut self, lhs: LinearExpr, rhs: LinearExpr) {
        self.problem
            .add_constraint(ConstraintSpec::LinearEq { lhs, rhs });
    }

    fn add_max_constraint(&mut self, target: VarHandle, exprs: Vec<LinearExpr>) {
        self.problem
            .add_constraint(ConstraintSpec::Max { target, exprs });
    }

    fn add_indicator_constraint(
        &mut self,
        indicator: VarHandle,
        active_when: bool,
        lhs: LinearExpr,
        rhs: LinearExpr,
    ) {
        self.problem.add_constraint(ConstraintSpec::Indicator {
            indicator,
            active_when,
            lhs,
            rhs,
        });
    }

    fn set_objective(&mut self, expr: LinearExpr, sense: Sense) {
        self.problem.set_objective(expr, sense);
    }

    fn solve(&mut self) -> Result<SolveResult, SolverError> {
        if let Some(path) = &self.config.write_model {
            self.problem.write_lp_file(path)?;
            log::debug!("{}: wrote model to {}", self.problem.name(), path.display());
        }

        let stats = self.problem.stats();
        log::debug!(
            "{}: solving {} variables, {} linear and {} general constraints",
            self.problem.name(),
            stats.variables,
            stats.linear_constraints,
            stats.general_constraints
        );

        let started = Instant::now();
        let outcome = solve_linearized(&self.problem)?;
        let runtime = started.elapsed();

        let result = match outcome {
            Ok(values) => {
                let assignment = Assignment::new(values);
                let objective = self
                    .problem
                    .objective()
                    .map(|obj| obj.expr.evaluate(|v| assignment.get(v).unwrap_or(0.0)));
                SolveResult {
                    status: SolveStatus::Optimal,
                    objective,
                    assignment: Some(assignment),
                    runtime,
                    node_count: None,
                    stats,
                }
            }
            Err(ResolutionError::Infeasible) => {
                SolveResult::without_solution(SolveStatus::Infeasible, runtime, stats)
            }
            Err(ResolutionError::Unbounded) => {
                SolveResult::without_solution(SolveStatus::Unbounded, runtime, stats)
            }
            Err(other) => return Err(SolverError::Backend(other.to_string())),
        };

        match result.status {
            SolveStatus::Optimal => log::info!(
                "{}: optimal, objective {:?}, {:?}",
                self.problem.name(),
                result.objective,
                runtime
            ),
            status => log::warn!("{}: {} after {:?}", self.problem.name(), status, runtime),
        }
        Ok(result)
    }
}

/// Translates the record into a `good_lp` model and runs `microlp`.
///
/// The outer `Result` carries translation failures; the inner one is the
/// backend outcome.
fn solve_linearized(
    problem: &MipProblem,
) -> Result<Result<Vec<f64>, ResolutionError>, SolverError> {
    let mut vars = ProblemVariables::new();
    let columns: Vec<Variable> = problem
        .vars()
        .iter()
        .map(|spec| {
            let def = match spec.kind {
                VarKind::Binary => variable().binary(),
                VarKind::Integer => variable()
                    .integer()
                    .min(spec.lower as f64)
                    .max(spec.upper as f64),
            };
            vars.add(def.name(spec.name.clone()))
        })
        .collect();

    // Selector binaries for max constraints must exist before the model does.
    let mut selectors: Vec<Vec<Variable>> = Vec::new();
    for c in problem.constraints() {
        if let ConstraintSpec::Max { exprs, .. } = c {
            selectors.push(exprs.iter().map(|_| vars.add(variable().binary())).collect());
        }
    }

    let (objective, sense) = match problem.objective() {
        Some(obj) => (to_expression(&obj.expr, &columns)?, obj.sense),
        None => (Expression::from(0.0), Sense::Minimize),
    };
    let unsolved = match sense {
        Sense::Minimize => vars.minimise(objective),
        Sense::Maximize => vars.maximise(objective),
    };
    let mut model = unsolved.using(microlp);

    let bounds = |v: VarHandle| problem.bounds(v);
    let mut selectors = selectors.into_iter();

    for c in problem.constraints() {
        match c {
            ConstraintSpec::LinearEq { lhs, rhs } => {
                model.add_constraint(constraint::eq(
                    to_expression(lhs, &columns)?,
                    to_expression(rhs, &columns)?,
                ));
            }
            ConstraintSpec::Indicator {
                indicator,
                active_when,
                lhs,
                rhs,
            } => {
                let diff = lhs.clone() - rhs.clone();
                let (lo, hi) = diff.range(bounds);
                if !lo.is_finite() || !hi.is_finite() {
                    return Err(SolverError::UnsupportedConstraint(format!(
                        "indicator on {indicator} spans an unbounded range"
                    )));
                }
                let z = column(&columns, *indicator)?;
                let e = to_expression(&diff, &columns)?;
                if *active_when {
                    model.add_constraint(constraint::leq(e.clone() + hi * z, Expression::from(hi)));
                    model.add_constraint(constraint::geq(e + lo * z, Expression::from(lo)));
                } else {
                    model.add_constraint(constraint::leq(e.clone() - hi * z, Expression::from(0.0)));
                    model.add_constraint(constraint::geq(e - lo * z, Expression::from(0.0)));
                }
            }
            ConstraintSpec::Max { target, exprs } => {
                if exprs.is_empty() {
                    return Err(SolverError::UnsupportedConstraint(format!(
                        "max constraint on {target} has no arguments"
                    )));
                }
                let selector = selectors.next().unwrap_or_default();
                let r = column(&columns, *target)?;
                let (_, r_upper) = bounds(*target);

                let mut choice = Expression::from(0.0);
                for (arg, &y) in exprs.iter().zip(&selector) {
                    let (arg_lower, _) = arg.range(bounds);
                    let big_m = (r_upper - arg_lower).max(0.0);
                    if !big_m.is_finite() {
                        return Err(SolverError::UnsupportedConstraint(format!(
                            "max constraint on {target} spans an unbounded range"
                        )));
                    }
                    let e = to_expression(arg, &columns)?;
                    model.add_constraint(constraint::geq(Expression::from(r), e.clone()));
                    model.add_constraint(constraint::leq(
                        Expression::from(r) - e + big_m * y,
                        Expression::from(big_m),
                    ));
                    choice += y;
                }
                model.add_constraint(constraint::eq(choice, Expression::from(1.0)));
            }
        }
    }

    Ok(model.solve().map(|solution| {
        columns
            .iter()
            .map(|&col| solution.value(col).round())
            .collect()
    }))
}

fn column(columns: &[Variable], var: VarHandle) -> Result<Variable, SolverError> {
    columns
        .get(var.index())
        .copied()
        .ok_or_else(|| SolverError::UnsupportedConstraint(format!("unknown variable {var}")))
}

fn to_expression(expr: &LinearExpr, columns: &[Variable]) -> Result<Expression, SolverError> {
    let mut out = Expression::from(expr.constant_term());
    for &(var, coef) in expr.terms() {
        out += coef * column(columns, var)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> MicroLpSolver {
        MicroLpSolver::with_config(SolverConfig {
            name: Some(name.to_string()),
            write_model: None,
        })
    }

    #[test]
    fn default_session_names_are_unique() {
        let a = MicroLpSolver::new();
        let b = MicroLpSolver::new();
        assert!(a.problem().name().starts_with("schedule-"));
        assert_ne!(a.problem().name(), b.problem().name());
    }

    #[test]
    fn solves_plain_integer_program() {
        // min x + y  s.t.  x - y = 2, x, y ∈ [0, 5]
        let mut s = named("plain");
        let x = s.new_integer_var("x", 0, 5);
        let y = s.new_integer_var("y", 0, 5);
        s.add_linear_equality(x - y, LinearExpr::constant(2.0));
        s.set_objective(LinearExpr::sum([x, y]), Sense::Minimize);

        let r = s.solve().unwrap();
        assert_eq!(r.status, SolveStatus::Optimal);
        let a = r.assignment.unwrap();
        assert_eq!(a.get_int(x), Some(2));
        assert_eq!(a.get_int(y), Some(0));
        assert_eq!(r.objective, Some(2.0));
    }

    #[test]
    fn indicator_active_when_set() {
        // b = 1 ⇒ x = 3; minimizing x while forcing b = 1
        let mut s = named("ind-true");
        let b = s.new_binary_var("b");
        let x = s.new_integer_var("x", 0, 5);
        s.add_linear_equality(b.into(), LinearExpr::constant(1.0));
        s.add_indicator_constraint(b, true, x.into(), LinearExpr::constant(3.0));
        s.set_objective(x.into(), Sense::Minimize);

        let a = s.solve().unwrap().assignment.unwrap();
        assert_eq!(a.get_int(x), Some(3));
    }

    #[test]
    fn indicator_active_when_clear() {
        // b = 0 ⇒ x = 4; maximizing x cannot move past it
        let mut s = named("ind-false");
        let b = s.new_binary_var("b");
        let x = s.new_integer_var("x", 0, 5);
        s.add_linear_equality(b.into(), LinearExpr::constant(0.0));
        s.add_indicator_constraint(b, false, x.into(), LinearExpr::constant(4.0));
        s.set_objective(x.into(), Sense::Maximize);

        let a = s.solve().unwrap().assignment.unwrap();
        assert_eq!(a.get_int(x), Some(4));
    }

    #[test]
    fn indicator_inactive_leaves_expression_free() {
        let mut s = named("ind-free");
        let b = s.new_binary_var("b");
        let x = s.new_integer_var("x", 0, 5);
        s.add_linear_equality(b.into(), LinearExpr::constant(0.0));
        s.add_indicator_constraint(b, true, x.into(), LinearExpr::constant(3.0));
        s.set_objective(x.into(), Sense::Maximize);

        let a = s.solve().unwrap().assignment.unwrap();
        assert_eq!(a.get_int(x), Some(5));
    }

    #[test]
    fn max_constraint_binds_target() {
        // r = max(0, x) with x fixed to -2 and to 3
        for (fixed, expected) in [(-2.0, 0), (3.0, 3)] {
            let mut s = named("max");
            let x = s.new_integer_var("x", -5, 5);
            let r = s.new_integer_var("r", 0, 5);
            s.add_linear_equality(x.into(), LinearExpr::constant(fixed));
            s.add_max_constraint(r, vec![LinearExpr::constant(0.0), x.into()]);
            s.set_objective(r.into(), Sense::Maximize);

            let a = s.solve().unwrap().assignment.unwrap();
            assert_eq!(a.get_int(r), Some(expected));
        }
    }

    #[test]
    fn infeasible_is_a_status() {
        let mut s = named("infeasible");
        let x = s.new_integer_var("x", 0, 2);
        s.add_linear_equality(x.into(), LinearExpr::constant(7.0));
        s.set_objective(x.into(), Sense::Minimize);

        let r = s.solve().unwrap();
        assert_eq!(r.status, SolveStatus::Infeasible);
        assert!(r.assignment.is_none());
        assert_eq!(r.stats.linear_constraints, 1);
    }

    #[test]
    fn empty_max_is_rejected() {
        let mut s = named("empty-max");
        let r = s.new_integer_var("r", 0, 1);
        s.add_max_constraint(r, Vec::new());
        assert!(matches!(
            s.solve(),
            Err(SolverError::UnsupportedConstraint(_))
        ));
    }

    #[test]
    fn writes_model_before_solving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.lp");
        let mut s = MicroLpSolver::with_config(SolverConfig {
            name: Some("dump".to_string()),
            write_model: Some(path.clone()),
        });
        let x = s.new_integer_var("x", 0, 1);
        s.set_objective(x.into(), Sense::Minimize);
        s.solve().unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("\\ Problem: dump"));
    }
}
