use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormulationError {
    /// A user has fewer positions (or channel levels) than the scenario has
    /// timesteps.
    #[error("User {user} (`{key}`) covers {available} timesteps, scenario needs {duration}")]
    OutOfRangeTimestep {
        user: usize,
        key: String,
        available: usize,
        duration: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display() {
        let e = FormulationError::OutOfRangeTimestep {
            user: 1,
            key: "node1".to_string(),
            available: 3,
            duration: 5,
        };
        assert_eq!(
            e.to_string(),
            "User 1 (`node1`) covers 3 timesteps, scenario needs 5"
        );
    }
}
