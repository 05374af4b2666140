use std::{error::Error, fmt};

/// Raised when a random generator is asked for a distribution it can't sample from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RandErr {
    /// `low` is not below `high`, or one of them is not finite.
    EmptyRange { low: f64, high: f64 },
}

impl fmt::Display for RandErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandErr::EmptyRange { low, high } => {
                write!(f, "can't sample uniformly from [{low}, {high})")
            }
        }
    }
}

impl Error for RandErr {}
