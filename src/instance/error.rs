use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Malformed instance: {0}")]
    MalformedInstance(String),

    #[error("Failed to read instance: {0}")]
    Io(#[from] std::io::Error),
}

impl InstanceError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        InstanceError::MalformedInstance(msg.into())
    }
}

impl From<serde_json::Error> for InstanceError {
    fn from(err: serde_json::Error) -> Self {
        InstanceError::MalformedInstance(err.to_string())
    }
}
