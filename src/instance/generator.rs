//! Random instance generation.
//!
//! Users random-walk in a square around a static access point at the
//! origin. The same seed always yields the same instance.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{AccessPoint, Instance, InstanceError, Position, Scenario, User};

/// Parameters for [`generate`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of users.
    pub users: usize,
    /// Episode length `T`.
    pub duration: usize,
    /// Users stay within `[-area, area]` on both axes.
    pub area: f64,
    /// Largest per-axis displacement between consecutive timesteps.
    pub step: f64,
    /// Inclusive demand range.
    pub demand: (u32, u32),
    /// Inclusive buffer capacity range.
    pub buffer: (i64, i64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            users: 3,
            duration: 5,
            area: 4.0,
            step: 1.0,
            demand: (1, 3),
            buffer: (1, 4),
        }
    }
}

/// Builds a random instance from `config` and `seed`.
///
/// Fails with [`InstanceError::MalformedInstance`] when the configuration
/// cannot produce a valid instance.
pub fn generate(config: &GeneratorConfig, seed: u64) -> Result<Instance, InstanceError> {
    if config.demand.0 > config.demand.1 || config.buffer.0 > config.buffer.1 {
        return Err(InstanceError::malformed("generator ranges are inverted"));
    }
    // `gen_range(-area..=area)` needs a finite width.
    if !(config.area > 0.0 && config.area <= f64::MAX / 2.0) {
        return Err(InstanceError::malformed(format!(
            "generator area must be positive and at most {:e}, got {}",
            f64::MAX / 2.0,
            config.area
        )));
    }
    if !(config.step.is_finite() && config.step >= 0.0) {
        return Err(InstanceError::malformed(format!(
            "generator step must be finite and non-negative, got {}",
            config.step
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let users = (0..config.users)
        .map(|n| {
            let mut x = rng.gen_range(-config.area..=config.area);
            let mut y = rng.gen_range(-config.area..=config.area);
            let mut positions = Vec::with_capacity(config.duration);
            for _ in 0..config.duration {
                positions.push(Position::new(vec![x, y]));
                x = (x + rng.gen_range(-config.step..=config.step)).clamp(-config.area, config.area);
                y = (y + rng.gen_range(-config.step..=config.step)).clamp(-config.area, config.area);
            }
            let demand = rng.gen_range(config.demand.0..=config.demand.1);
            let buffer = rng.gen_range(config.buffer.0..=config.buffer.1);
            User::new(n.to_string(), positions, demand, buffer)
        })
        .collect();

    Instance::new(
        users,
        AccessPoint::fixed(Position::new(vec![0.0, 0.0])),
        Scenario::new(config.duration),
    )
}
