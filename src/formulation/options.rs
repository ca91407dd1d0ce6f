//! Formulation settings.

/// How the one-user-per-timestep constraint is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusivityMode {
    /// One `Σ_u s[u,t] = 1` row per timestep.
    #[default]
    PerTimestep,
    /// The same row repeated once per user, `N` identical rows per timestep.
    PerUser,
}

/// What constrains the loss counter while a buffer is not overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossMode {
    /// Only `ind[n,t] = 1 ⇒ l[n,t+1] − l[n,t] = 1`; `l[n,t+1]` is free
    /// otherwise, so a minimizing solver may lower the counter.
    #[default]
    Literal,
    /// Also `ind[n,t] = 0 ⇒ l[n,t+1] − l[n,t] = 0`, making `l` cumulative.
    Held,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub exclusivity: ExclusivityMode,
    pub loss: LossMode,
}

impl BuildOptions {
    /// Emits the redundant per-user exclusivity rows.
    pub fn redundant_exclusivity() -> Self {
        Self {
            exclusivity: ExclusivityMode::PerUser,
            ..Self::default()
        }
    }

    /// Keeps `l` unchanged across timesteps without overflow.
    pub fn cumulative_loss() -> Self {
        Self {
            loss: LossMode::Held,
            ..Self::default()
        }
    }
}
