//! Variable handles and affine expressions passed across the solver seam.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Opaque reference to a variable declared on a [`Solver`](super::Solver).
///
/// Handles are dense indices in declaration order, so an
/// [`Assignment`](super::Assignment) can be indexed by them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarHandle(pub(crate) usize);

impl VarHandle {
    /// Position of the variable in declaration order.
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Affine expression `Σ coef·var + constant`.
///
/// Terms keep their insertion order; nothing is merged or sorted, so two
/// expressions built by the same sequence of operations compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: Vec<(VarHandle, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(var: VarHandle, coef: f64) -> Self {
        Self {
            terms: vec![(var, coef)],
            constant: 0.0,
        }
    }

    /// Sum of the given variables with unit coefficients.
    pub fn sum<I: IntoIterator<Item = VarHandle>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, var: VarHandle, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    pub fn terms(&self) -> &[(VarHandle, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// True when the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression with `value(var)` supplying variable values.
    pub fn evaluate<F: Fn(VarHandle) -> f64>(&self, value: F) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(v, c)| acc + c * value(v))
    }

    /// Smallest and largest value over a box given per-variable bounds.
    pub fn range<F: Fn(VarHandle) -> (f64, f64)>(&self, bounds: F) -> (f64, f64) {
        self.terms
            .iter()
            .fold((self.constant, self.constant), |(lo, hi), &(v, c)| {
                let (lb, ub) = bounds(v);
                if c >= 0.0 {
                    (lo + c * lb, hi + c * ub)
                } else {
                    (lo + c * ub, hi + c * lb)
                }
            })
    }
}

impl From<VarHandle> for LinearExpr {
    fn from(var: VarHandle) -> Self {
        Self::term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl AddAssign for LinearExpr {
    fn add_assign(&mut self, rhs: LinearExpr) {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self += rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + (-rhs)
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> LinearExpr {
        for (_, c) in &mut self.terms {
            *c *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Sub for VarHandle {
    type Output = LinearExpr;

    fn sub(self, rhs: VarHandle) -> LinearExpr {
        let mut expr = LinearExpr::from(self);
        expr.add_term(rhs, -1.0);
        expr
    }
}

impl Sub<f64> for VarHandle {
    type Output = LinearExpr;

    fn sub(self, rhs: f64) -> LinearExpr {
        LinearExpr::from(self) + LinearExpr::constant(-rhs)
    }
}
