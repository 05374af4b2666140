use std::{fmt, io};

use comms::CommErr;
use machine_learning::MlErr;

/// All errors that can occur while running a training session.
#[derive(Debug)]
pub enum SessionErr {
    /// The config file could not be read.
    Io(io::Error),
    /// The config file is not valid JSON or does not have the expected fields.
    Json(serde_json::Error),
    /// The config parsed but describes something that can't be trained.
    InvalidConfig(String),
    /// A worker failed while building or training its network.
    Ml(MlErr),
    /// A worker thread panicked.
    WorkerPanicked { rank: usize },
    /// Every worker finished cleanly but the first one handed back no report.
    MissingReport,
}

impl SessionErr {
    /// Whether this error only reports that some other worker went away first.
    pub(crate) fn is_disconnect(&self) -> bool {
        matches!(self, Self::Ml(MlErr::Comm(CommErr::Disconnected)))
    }
}

impl fmt::Display for SessionErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "malformed config: {e}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Ml(e) => write!(f, "training error: {e}"),
            Self::WorkerPanicked { rank } => write!(f, "worker {rank} panicked"),
            Self::MissingReport => write!(f, "the first worker never handed back its report"),
        }
    }
}

impl std::error::Error for SessionErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Ml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SessionErr {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SessionErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<MlErr> for SessionErr {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}
