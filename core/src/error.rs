use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
