use thiserror::Error;

use crate::tensor::DataType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeqPackError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported element type: {0:?}")]
    UnsupportedType(DataType),

    #[error("Type mismatch: expected {expected:?}, tensor holds {actual:?}")]
    TypeMismatch {
        expected: DataType,
        actual: DataType,
    },
}

impl SeqPackError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SeqPackError::InvalidArgument(msg.into())
    }
}
