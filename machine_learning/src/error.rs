use std::{
    error::Error,
    fmt::{self, Display},
};

use comms::CommErr;

use crate::initialization::RandErr;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// Everything that can go wrong while building or training a network.
#[derive(Debug)]
pub enum MlErr {
    InvalidNetwork(String),
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidParams(String),
    Comm(CommErr),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::InvalidNetwork(reason) => write!(f, "Invalid network: {reason}"),
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "Size mismatch between {a} and {b}, got {got} where {expected} was expected"
            ),
            MlErr::InvalidParams(reason) => write!(f, "Failed to generate parameters: {reason}"),
            MlErr::Comm(e) => write!(f, "Collective operation failed: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommErr> for MlErr {
    fn from(value: CommErr) -> Self {
        Self::Comm(value)
    }
}

impl From<RandErr> for MlErr {
    fn from(value: RandErr) -> Self {
        Self::InvalidParams(value.to_string())
    }
}
