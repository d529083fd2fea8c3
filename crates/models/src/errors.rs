use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown kind: {0}")]
    UnknownKind(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    pub fn required(field: &str) -> Self { Self::Validation(format!("{} required", field)) }
}
