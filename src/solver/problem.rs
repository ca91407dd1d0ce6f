//! In-memory record of a mixed-integer program.
//!
//! Adapters collect declarations into a [`MipProblem`] and translate it to
//! their backend at solve time. The record is also what gets written to the
//! LP debug file and what tests inspect.

use serde::{Deserialize, Serialize};

use super::expr::{LinearExpr, VarHandle};

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Binary,
    Integer,
}

/// Declared variable: name, domain and bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    pub name: String,
    pub kind: VarKind,
    pub lower: i64,
    pub upper: i64,
}

/// One declared constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintSpec {
    /// `lhs = rhs`
    LinearEq { lhs: LinearExpr, rhs: LinearExpr },
    /// `target = max(exprs)`
    Max {
        target: VarHandle,
        exprs: Vec<LinearExpr>,
    },
    /// `indicator = active_when ⇒ lhs = rhs`
    Indicator {
        indicator: VarHandle,
        active_when: bool,
        lhs: LinearExpr,
        rhs: LinearExpr,
    },
}

impl ConstraintSpec {
    /// Max and indicator constraints are "general" constraints.
    pub fn is_general(&self) -> bool {
        !matches!(self, ConstraintSpec::LinearEq { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub expr: LinearExpr,
    pub sense: Sense,
}

/// Size summary of a problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemStats {
    pub variables: usize,
    pub binaries: usize,
    pub integers: usize,
    pub linear_constraints: usize,
    pub general_constraints: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MipProblem {
    name: String,
    vars: Vec<VarSpec>,
    constraints: Vec<ConstraintSpec>,
    objective: Option<Objective>,
}

impl MipProblem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_var(&mut self, spec: VarSpec) -> VarHandle {
        let handle = VarHandle(self.vars.len());
        self.vars.push(spec);
        handle
    }

    pub fn add_binary(&mut self, name: &str) -> VarHandle {
        self.add_var(VarSpec {
            name: name.to_string(),
            kind: VarKind::Binary,
            lower: 0,
            upper: 1,
        })
    }

    pub fn add_integer(&mut self, name: &str, lower: i64, upper: i64) -> VarHandle {
        self.add_var(VarSpec {
            name: name.to_string(),
            kind: VarKind::Integer,
            lower,
            upper,
        })
    }

    pub fn add_constraint(&mut self, constraint: ConstraintSpec) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, expr: LinearExpr, sense: Sense) {
        self.objective = Some(Objective { expr, sense });
    }

    pub fn vars(&self) -> &[VarSpec] {
        &self.vars
    }

    pub fn var(&self, handle: VarHandle) -> Option<&VarSpec> {
        self.vars.get(handle.index())
    }

    /// Bounds of a declared variable as floats; unknown handles are unbounded.
    pub fn bounds(&self, handle: VarHandle) -> (f64, f64) {
        self.var(handle)
            .map(|v| (v.lower as f64, v.upper as f64))
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY))
    }

    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn stats(&self) -> ProblemStats {
        let binaries = self
            .vars
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count();
        let general = self.constraints.iter().filter(|c| c.is_general()).count();
        ProblemStats {
            variables: self.vars.len(),
            binaries,
            integers: self.vars.len() - binaries,
            linear_constraints: self.constraints.len() - general,
            general_constraints: general,
        }
    }

    /// Same variables, constraints and objective; the problem name is ignored.
    pub fn same_structure(&self, other: &MipProblem) -> bool {
        self.vars == other.vars
            && self.constraints == other.constraints
            && self.objective == other.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_follow_declaration_order() {
        let mut p = MipProblem::new("p");
        let a = p.add_binary("a");
        let b = p.add_integer("b", -2, 5);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(p.var(b).map(|v| v.name.as_str()), Some("b"));
        assert_eq!(p.bounds(b), (-2.0, 5.0));
        assert_eq!(p.bounds(a), (0.0, 1.0));
    }

    #[test]
    fn stats_split_linear_and_general() {
        let mut p = MipProblem::new("p");
        let s = p.add_binary("s");
        let q = p.add_integer("q", 0, 4);
        p.add_constraint(ConstraintSpec::LinearEq {
            lhs: q.into(),
            rhs: LinearExpr::constant(1.0),
        });
        p.add_constraint(ConstraintSpec::Indicator {
            indicator: s,
            active_when: true,
            lhs: q.into(),
            rhs: LinearExpr::constant(2.0),
        });
        p.add_constraint(ConstraintSpec::Max {
            target: s,
            exprs: vec![LinearExpr::constant(0.0), q.into()],
        });

        let stats = p.stats();
        assert_eq!(stats.variables, 2);
        assert_eq!(stats.binaries, 1);
        assert_eq!(stats.integers, 1);
        assert_eq!(stats.linear_constraints, 1);
        assert_eq!(stats.general_constraints, 2);
    }

    #[test]
    fn same_structure_ignores_name() {
        let mut a = MipProblem::new("first");
        let mut b = MipProblem::new("second");
        for p in [&mut a, &mut b] {
            let x = p.add_integer("x", 0, 3);
            p.set_objective(x.into(), Sense::Minimize);
        }
        assert!(a.same_structure(&b));
        assert_ne!(a, b);

        b.add_binary("extra");
        assert!(!a.same_structure(&b));
    }

    #[test]
    fn unknown_handle_is_unbounded() {
        let p = MipProblem::new("empty");
        let (lo, hi) = p.bounds(VarHandle(7));
        assert!(lo.is_infinite() && hi.is_infinite());
    }
}
