use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid workload: {0}")]
    InvalidWorkload(String),
    #[error("queue did not drain within {0:?}")]
    DrainTimeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, SimError>;
