//! Checks an assignment against the formulation it came from.
//!
//! Only what the model actually enforces is checked. A loss change while
//! `ind[n,t] = 0` is reported only for models built with
//! [`LossMode::Held`]; the literal formulation leaves it free.

use std::fmt;

use super::builder::ScheduleModel;
use super::options::LossMode;
use super::variables::VarFamily;
use crate::solver::{Assignment, VarHandle};

const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A variable has no value in the assignment.
    MissingValue { name: String },
    /// An integer or binary variable has a fractional value.
    Fractional { name: String, value: f64 },
    /// A value lies outside the declared bounds.
    OutOfBounds { name: String, value: f64 },
    /// Not exactly one user served at `t`.
    Exclusivity { t: usize, served: usize },
    /// `aux1 ≠ q − capacity`.
    OverflowMargin { user: usize, t: usize, margin: i64, expected: i64 },
    /// `ind ≠ max(0, aux1)`.
    OverflowIndicator { user: usize, t: usize, indicator: i64, margin: i64 },
    /// Overflow at `t` without a unit loss increment at `t + 1`.
    LossRecurrence { user: usize, t: usize, delta: i64 },
    /// Loss changed at `t + 1` without an overflow at `t` ([`LossMode::Held`]).
    LossHeld { user: usize, t: usize, delta: i64 },
    /// Occupancy step differs from the served or idle increment.
    BufferRecurrence { user: usize, t: usize, delta: i64, expected: i64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingValue { name } => write!(f, "{name} has no value"),
            Violation::Fractional { name, value } => {
                write!(f, "{name} = {value} is not integral")
            }
            Violation::OutOfBounds { name, value } => {
                write!(f, "{name} = {value} is out of bounds")
            }
            Violation::Exclusivity { t, served } => {
                write!(f, "{served} users served at timestep {t}")
            }
            Violation::OverflowMargin {
                user,
                t,
                margin,
                expected,
            } => write!(f, "aux1[{user},{t}] = {margin}, expected {expected}"),
            Violation::OverflowIndicator {
                user,
                t,
                indicator,
                margin,
            } => write!(
                f,
                "ind[{user},{t}] = {indicator} but aux1[{user},{t}] = {margin}"
            ),
            Violation::LossRecurrence { user, t, delta } => write!(
                f,
                "user {user} overflowed at {t} but loss changed by {delta}"
            ),
            Violation::LossHeld { user, t, delta } => write!(
                f,
                "user {user} did not overflow at {t} but loss changed by {delta}"
            ),
            Violation::BufferRecurrence {
                user,
                t,
                delta,
                expected,
            } => write!(
                f,
                "q[{user},{}] - q[{user},{t}] = {delta}, expected {expected}",
                t + 1
            ),
        }
    }
}

/// Every violation of `model`'s constraints and bounds in `assignment`.
pub fn verify(model: &ScheduleModel, assignment: &Assignment) -> Vec<Violation> {
    let mut violations = Vec::new();
    let vars = model.variables();
    let horizon = model.duration();
    let held = model.options().loss == LossMode::Held;

    // Integral values of every variable, `None` where missing.
    let mut values = vec![[None::<i64>; 6]; model.users().len() * horizon];
    for (n, user) in model.users().iter().enumerate() {
        for t in 0..horizon {
            for (k, family) in VarFamily::ALL.into_iter().enumerate() {
                let name = || family.name(n, t);
                let Some(handle) = vars.family(family).get(n, t) else {
                    violations.push(Violation::MissingValue { name: name() });
                    continue;
                };
                let Some(value) = read(assignment, handle, name, &mut violations) else {
                    continue;
                };
                let (lower, upper) = match family {
                    VarFamily::Scheduled | VarFamily::Overflow => (0, 1),
                    VarFamily::Margin => (-user.bound, user.bound),
                    VarFamily::Loss | VarFamily::Occupancy | VarFamily::Reserved => (0, user.bound),
                };
                if value < lower || value > upper {
                    violations.push(Violation::OutOfBounds {
                        name: name(),
                        value: value as f64,
                    });
                }
                values[n * horizon + t][k] = Some(value);
            }
        }
    }

    let [s, l, q, ind, aux1] = [0, 1, 2, 3, 4];
    let cell = |n: usize, t: usize| &values[n * horizon + t];

    for t in 0..horizon {
        let Some(flags) = (0..model.users().len())
            .map(|n| cell(n, t)[s])
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        let served = flags.iter().filter(|&&v| v == 1).count();
        if served != 1 {
            violations.push(Violation::Exclusivity { t, served });
        }
    }

    for (n, user) in model.users().iter().enumerate() {
        for t in 0..horizon {
            let now = cell(n, t);
            if let (Some(margin), Some(occupancy)) = (now[aux1], now[q]) {
                let expected = occupancy - user.buffer_capacity;
                if margin != expected {
                    violations.push(Violation::OverflowMargin {
                        user: n,
                        t,
                        margin,
                        expected,
                    });
                }
            }
            if let (Some(indicator), Some(margin)) = (now[ind], now[aux1]) {
                if indicator != margin.max(0) {
                    violations.push(Violation::OverflowIndicator {
                        user: n,
                        t,
                        indicator,
                        margin,
                    });
                }
            }

            if t + 1 == horizon {
                continue;
            }
            let next = cell(n, t + 1);

            if let (Some(overflow), Some(loss), Some(loss_next)) = (now[ind], now[l], next[l]) {
                let delta = loss_next - loss;
                if overflow == 1 && delta != 1 {
                    violations.push(Violation::LossRecurrence { user: n, t, delta });
                }
                if overflow == 0 && held && delta != 0 {
                    violations.push(Violation::LossHeld { user: n, t, delta });
                }
            }

            if let (Some(served), Some(occ), Some(occ_next)) = (now[s], now[q], next[q]) {
                let expected = if served == 1 {
                    user.served_delta[t]
                } else {
                    1
                };
                if occ_next - occ != expected {
                    violations.push(Violation::BufferRecurrence {
                        user: n,
                        t,
                        delta: occ_next - occ,
                        expected,
                    });
                }
            }
        }
    }

    violations
}

fn read<F: Fn() -> String>(
    assignment: &Assignment,
    handle: VarHandle,
    name: F,
    violations: &mut Vec<Violation>,
) -> Option<i64> {
    let Some(value) = assignment.get(handle) else {
        violations.push(Violation::MissingValue { name: name() });
        return None;
    };
    if (value - value.round()).abs() > TOLERANCE {
        violations.push(Violation::Fractional {
            name: name(),
            value,
        });
        return None;
    }
    Some(value.round() as i64)
}
