use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type of every collective operation.
pub type Result<T> = std::result::Result<T, CommErr>;

/// The error returned when a collective operation can't be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommErr {
    InvalidRoot { root: usize, size: usize },
    LengthMismatch { expected: usize, got: usize },
    Disconnected,
}

impl Display for CommErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommErr::InvalidRoot { root, size } => {
                write!(f, "invalid root {root} for a group of {size} workers")
            }
            CommErr::LengthMismatch { expected, got } => {
                write!(f, "buffer length mismatch, got {got} and expected {expected}")
            }
            CommErr::Disconnected => write!(f, "a worker left the group mid collective"),
        }
    }
}

impl Error for CommErr {}
