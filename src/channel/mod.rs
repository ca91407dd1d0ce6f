//! Channel quality from user-to-access-point distance.
//!
//! Distances fall into three half-open tiers:
//!
//! | distance `d`    | level |
//! |-----------------|-------|
//! | `d < 2`         | 3     |
//! | `2 ≤ d < 3`     | 2     |
//! | otherwise       | 1     |
//!
//! The level is the number of buffered units a served user can drain in one
//! timestep.

use std::fmt;

use qtty::{Meter, Quantity};
use serde::{Serialize, Serializer};

use crate::instance::{AccessPoint, User};

/// Discrete channel quality level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelQuality {
    Poor = 1,
    Fair = 2,
    Good = 3,
}

impl ChannelQuality {
    pub const fn level(&self) -> u8 {
        *self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(ChannelQuality::Poor),
            2 => Some(ChannelQuality::Fair),
            3 => Some(ChannelQuality::Good),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

impl Serialize for ChannelQuality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

/// Tier boundaries. Each boundary belongs to the worse tier.
#[derive(Debug, Clone, Copy)]
pub struct ChannelThresholds {
    /// Below this distance the channel is [`ChannelQuality::Good`].
    pub good_below: Quantity<Meter>,
    /// Below this distance (and not good) the channel is [`ChannelQuality::Fair`].
    pub fair_below: Quantity<Meter>,
}

impl ChannelThresholds {
    pub fn classify(&self, distance: Quantity<Meter>) -> ChannelQuality {
        let d = distance.value();
        if d < self.good_below.value() {
            ChannelQuality::Good
        } else if d < self.fair_below.value() {
            ChannelQuality::Fair
        } else {
            ChannelQuality::Poor
        }
    }
}

impl Default for ChannelThresholds {
    fn default() -> Self {
        Self {
            good_below: Quantity::new(2.0),
            fair_below: Quantity::new(3.0),
        }
    }
}

/// Quality level per `(user, timestep)`.
///
/// Row `n` holds one level for every recorded position of user `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChannelQualityTable {
    levels: Vec<Vec<ChannelQuality>>,
}

impl ChannelQualityTable {
    pub fn from_rows(levels: Vec<Vec<ChannelQuality>>) -> Self {
        Self { levels }
    }

    pub fn get(&self, user: usize, t: usize) -> Option<ChannelQuality> {
        self.levels.get(user)?.get(t).copied()
    }

    pub fn row(&self, user: usize) -> Option<&[ChannelQuality]> {
        self.levels.get(user).map(Vec::as_slice)
    }

    /// Number of user rows.
    pub fn users(&self) -> usize {
        self.levels.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[ChannelQuality]> + '_ {
        self.levels.iter().map(Vec::as_slice)
    }
}

/// Builds [`ChannelQualityTable`]s with configurable thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelResolver {
    thresholds: ChannelThresholds,
}

impl ChannelResolver {
    pub fn new(thresholds: ChannelThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ChannelThresholds {
        &self.thresholds
    }

    /// Classifies every recorded position of every user, in user order.
    ///
    /// Positions past the end of a moving access point's trajectory, and
    /// positions whose dimension differs from the access point's, are
    /// classified [`ChannelQuality::Poor`] and logged; a validated
    /// [`Instance`](crate::instance::Instance) never has any.
    pub fn resolve(&self, users: &[User], access_point: &AccessPoint) -> ChannelQualityTable {
        let levels = users
            .iter()
            .map(|user| {
                user.positions()
                    .iter()
                    .enumerate()
                    .map(|(t, p)| match access_point.position_at(t) {
                        Some(ap) if ap.dimension() == p.dimension() => {
                            self.thresholds.classify(ap.distance_to(p))
                        }
                        Some(ap) => {
                            log::warn!(
                                "user `{}` position {t} has dimension {}, access point has {}",
                                user.key(),
                                p.dimension(),
                                ap.dimension()
                            );
                            ChannelQuality::Poor
                        }
                        None => ChannelQuality::Poor,
                    })
                    .collect()
            })
            .collect();
        let table = ChannelQualityTable { levels };
        log::debug!("resolved channel quality for {} users", table.users());
        table
    }
}

/// [`ChannelResolver::resolve`] with the default thresholds.
pub fn resolve(users: &[User], access_point: &AccessPoint) -> ChannelQualityTable {
    ChannelResolver::default().resolve(users, access_point)
}
