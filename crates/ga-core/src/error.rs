use std::fmt;

#[derive(Debug)]
pub enum GaError {
    /// A value outside the valid range for the active algebra.
    InvalidArgument(String),
    /// An operand needs more basis vectors than the algebra provides.
    DimensionMismatch { expected: u32, found: u32 },
    /// A linear map or scalar that must be invertible is not.
    Singular(String),
    Serialization(serde_json::Error),
}

impl GaError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GaError::InvalidArgument(msg.into())
    }
}

impl fmt::Display for GaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GaError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            GaError::DimensionMismatch { expected, found } => write!(
                f,
                "dimension mismatch: algebra has {expected} basis vectors, operand needs {found}"
            ),
            GaError::Singular(msg) => write!(f, "singular: {msg}"),
            GaError::Serialization(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl std::error::Error for GaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GaError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GaError {
    fn from(e: serde_json::Error) -> Self {
        GaError::Serialization(e)
    }
}

pub type Result<T> = std::result::Result<T, GaError>;
