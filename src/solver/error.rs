use thiserror::Error;

/// Failures raised by a solver backend.
///
/// An infeasible or unbounded model is a solve outcome, reported through
/// [`SolveStatus`](super::SolveStatus), and never appears here.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver backend failed: {0}")]
    Backend(String),

    #[error("Constraint cannot be expressed for this backend: {0}")]
    UnsupportedConstraint(String),

    #[error("Failed to write model file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_display() {
        let e = SolverError::Backend("numerical trouble".to_string());
        assert_eq!(e.to_string(), "Solver backend failed: numerical trouble");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: SolverError = io.into();
        assert!(matches!(e, SolverError::Io(_)));
        assert!(e.to_string().contains("denied"));
    }
}
