use std::fmt;

/// Message shown to the user for any failed capture or submission.
pub const GENERIC_FAILURE_NOTICE: &str = "Something went wrong";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Capture,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Capture => write!(f, "capture"),
            FailureKind::Network => write!(f, "network"),
        }
    }
}

/// A failure caught at an operation boundary. `detail` is for operators only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    pub fn capture(err: &anyhow::Error) -> Self {
        Self {
            kind: FailureKind::Capture,
            detail: format!("{err:#}"),
        }
    }

    pub fn network(err: &anyhow::Error) -> Self {
        Self {
            kind: FailureKind::Network,
            detail: format!("{err:#}"),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.detail)
    }
}

impl std::error::Error for Failure {}
