use thiserror::Error;

use crate::param::Param;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatError {
    #[error("{0} is read-only")]
    ReadOnly(Param),
    #[error("{param} must be in [0, {max}], got {value}")]
    OutOfRange { param: Param, value: u64, max: u32 },
    #[error("unknown parameter: {0}")]
    UnknownParam(String),
    #[error("invalid value for {param}: {input:?}")]
    InvalidValue { param: Param, input: String },
    #[error("sampling worker unavailable: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, StatError>;
