//! Static problem input: users, the access point and the scenario.
//!
//! An [`Instance`] is validated on construction and immutable afterwards.
//! Users are kept in [`UserKey`] order, which fixes the user index `n` used
//! by the channel table and by every variable name.

pub mod error;
pub mod generator;
mod loader;

pub use error::InstanceError;
pub use generator::{generate, GeneratorConfig};
pub use loader::load;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use qtty::{Meter, Quantity};
use serde::{Deserialize, Serialize};

/// A point in space, one `f64` per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(Vec<f64>);

impl Position {
    pub fn new(coords: Vec<f64>) -> Self {
        Self(coords)
    }

    pub fn coords(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Euclidean distance, or NaN when the dimensions differ.
    pub fn distance_to(&self, other: &Position) -> Quantity<Meter> {
        if self.dimension() != other.dimension() {
            return Quantity::new(f64::NAN);
        }
        let squared: f64 = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Quantity::new(squared.sqrt())
    }
}

impl From<Vec<f64>> for Position {
    fn from(coords: Vec<f64>) -> Self {
        Self(coords)
    }
}

/// Key of a user in the instance document.
///
/// Ordering: keys that parse as unsigned integers come first in numeric
/// order, then every other key in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for UserKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for UserKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user served by the access point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    key: UserKey,
    positions: Vec<Position>,
    demand: u32,
    buffer_capacity: i64,
}

impl User {
    pub fn new(
        key: impl Into<String>,
        positions: Vec<Position>,
        demand: u32,
        buffer_capacity: i64,
    ) -> Self {
        Self {
            key: UserKey::new(key),
            positions,
            demand,
            buffer_capacity,
        }
    }

    pub fn key(&self) -> &UserKey {
        &self.key
    }

    /// One position per timestep.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Units consumed per served timestep.
    pub fn demand(&self) -> u32 {
        self.demand
    }

    /// Occupancy above which the buffer counts as overflowed.
    pub fn buffer_capacity(&self) -> i64 {
        self.buffer_capacity
    }
}

/// Where the access point is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApPosition {
    Static(Position),
    /// One position per timestep.
    Trajectory(Vec<Position>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessPoint {
    position: ApPosition,
}

impl AccessPoint {
    pub fn fixed(position: Position) -> Self {
        Self {
            position: ApPosition::Static(position),
        }
    }

    pub fn moving(trajectory: Vec<Position>) -> Self {
        Self {
            position: ApPosition::Trajectory(trajectory),
        }
    }

    pub fn position(&self) -> &ApPosition {
        &self.position
    }

    /// Position at timestep `t`; `None` past the end of a trajectory.
    pub fn position_at(&self, t: usize) -> Option<&Position> {
        match &self.position {
            ApPosition::Static(p) => Some(p),
            ApPosition::Trajectory(ps) => ps.get(t),
        }
    }

    fn positions(&self) -> &[Position] {
        match &self.position {
            ApPosition::Static(p) => std::slice::from_ref(p),
            ApPosition::Trajectory(ps) => ps,
        }
    }
}

/// Episode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    duration: usize,
}

impl Scenario {
    pub fn new(duration: usize) -> Self {
        Self { duration }
    }

    /// Number of discrete timesteps `T`.
    pub fn duration(&self) -> usize {
        self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    users: Vec<User>,
    access_point: AccessPoint,
    scenario: Scenario,
}

impl Instance {
    /// Validates the parts and sorts users by key.
    ///
    /// Fails with [`InstanceError::MalformedInstance`] when there are no
    /// users, keys repeat, the duration is zero, a coordinate is empty,
    /// coordinate dimensions disagree, or an access-point trajectory is
    /// shorter than some user's positions.
    pub fn new(
        mut users: Vec<User>,
        access_point: AccessPoint,
        scenario: Scenario,
    ) -> Result<Self, InstanceError> {
        if users.is_empty() {
            return Err(InstanceError::malformed("instance has no users"));
        }
        if scenario.duration() == 0 {
            return Err(InstanceError::malformed(
                "scenario duration must be a positive integer",
            ));
        }

        let ap_positions = access_point.positions();
        let dimension = match ap_positions.first() {
            Some(p) => p.dimension(),
            None => {
                return Err(InstanceError::malformed(
                    "access point trajectory is empty",
                ))
            }
        };
        if dimension == 0 {
            return Err(InstanceError::malformed("access point position is empty"));
        }
        if ap_positions.iter().any(|p| p.dimension() != dimension) {
            return Err(InstanceError::malformed(
                "access point positions have inconsistent dimensions",
            ));
        }

        let mut seen = BTreeSet::new();
        for user in &users {
            if !seen.insert(user.key()) {
                return Err(InstanceError::malformed(format!(
                    "duplicate user key `{}`",
                    user.key()
                )));
            }
            if let Some(t) = user
                .positions()
                .iter()
                .position(|p| p.dimension() != dimension)
            {
                return Err(InstanceError::malformed(format!(
                    "user `{}` position {t} has dimension {}, access point has {dimension}",
                    user.key(),
                    user.positions()[t].dimension()
                )));
            }
            if let ApPosition::Trajectory(ps) = access_point.position() {
                if ps.len() < user.positions().len() {
                    return Err(InstanceError::malformed(format!(
                        "access point trajectory has {} positions, user `{}` has {}",
                        ps.len(),
                        user.key(),
                        user.positions().len()
                    )));
                }
            }
        }

        users.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(Self {
            users,
            access_point,
            scenario,
        })
    }

    /// Users in enumeration order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn access_point(&self) -> &AccessPoint {
        &self.access_point
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Index `n` of the user with the given key.
    pub fn user_index(&self, key: &str) -> Option<usize> {
        self.users.iter().position(|u| u.key().as_str() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Position {
        Position::new(vec![x, y])
    }

    fn user(key: &str, len: usize) -> User {
        User::new(key, vec![p(0.0, 0.0); len], 1, 1)
    }

    #[test]
    fn distance_is_euclidean() {
        let d = p(0.0, 0.0).distance_to(&p(3.0, 4.0));
        assert!((d.value() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn numeric_keys_sort_numerically_before_names() {
        let mut keys: Vec<UserKey> = ["10", "b", "2", "a", "0"]
            .into_iter()
            .map(UserKey::new)
            .collect();
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(ordered, vec!["0", "2", "10", "a", "b"]);
    }

    #[test]
    fn users_are_sorted_on_construction() {
        let inst = Instance::new(
            vec![user("node2", 2), user("1", 2), user("node10", 2)],
            AccessPoint::fixed(p(0.0, 0.0)),
            Scenario::new(2),
        )
        .unwrap();
        let keys: Vec<&str> = inst.users().iter().map(|u| u.key().as_str()).collect();
        assert_eq!(keys, vec!["1", "node10", "node2"]);
        assert_eq!(inst.user_index("node2"), Some(2));
        assert_eq!(inst.user_index("missing"), None);
    }

    #[test]
    fn rejects_empty_user_set() {
        let err = Instance::new(Vec::new(), AccessPoint::fixed(p(0.0, 0.0)), Scenario::new(1));
        assert!(matches!(err, Err(InstanceError::MalformedInstance(_))));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = Instance::new(
            vec![user("0", 1)],
            AccessPoint::fixed(p(0.0, 0.0)),
            Scenario::new(0),
        );
        assert!(matches!(err, Err(InstanceError::MalformedInstance(_))));
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let bad = User::new("0", vec![Position::new(vec![1.0])], 1, 1);
        let err = Instance::new(vec![bad], AccessPoint::fixed(p(0.0, 0.0)), Scenario::new(1));
        assert!(matches!(err, Err(InstanceError::MalformedInstance(_))));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = Instance::new(
            vec![user("7", 1), user("7", 1)],
            AccessPoint::fixed(p(0.0, 0.0)),
            Scenario::new(1),
        );
        assert!(matches!(err, Err(InstanceError::MalformedInstance(m)) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_short_access_point_trajectory() {
        let err = Instance::new(
            vec![user("0", 3)],
            AccessPoint::moving(vec![p(0.0, 0.0), p(1.0, 0.0)]),
            Scenario::new(2),
        );
        assert!(matches!(err, Err(InstanceError::MalformedInstance(_))));
    }

    #[test]
    fn moving_access_point_positions() {
        let ap = AccessPoint::moving(vec![p(0.0, 0.0), p(1.0, 0.0)]);
        assert_eq!(ap.position_at(1), Some(&p(1.0, 0.0)));
        assert_eq!(ap.position_at(2), None);
        let fixed = AccessPoint::fixed(p(5.0, 5.0));
        assert_eq!(fixed.position_at(100), Some(&p(5.0, 5.0)));
    }

    #[test]
    fn negative_capacity_is_accepted() {
        let u = User::new("0", vec![p(0.0, 0.0)], 1, -3);
        let inst = Instance::new(vec![u], AccessPoint::fixed(p(0.0, 0.0)), Scenario::new(1)).unwrap();
        assert_eq!(inst.users()[0].buffer_capacity(), -3);
    }
}
