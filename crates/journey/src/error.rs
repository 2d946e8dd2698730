use std::time::Duration;

use dateline::SplitError;
use formats::GeometryKind;

#[derive(Debug)]
pub enum JourneyError {
    Split(SplitError),
    /// The engine did not finish within the configured per-line limit.
    Timeout(Duration),
    NotALine(GeometryKind),
}

impl std::fmt::Display for JourneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JourneyError::Split(e) => write!(f, "split failed: {e}"),
            JourneyError::Timeout(limit) => {
                write!(f, "split timed out after {} ms", limit.as_millis())
            }
            JourneyError::NotALine(kind) => write!(f, "expected a line geometry, got {kind:?}"),
        }
    }
}

impl std::error::Error for JourneyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JourneyError::Split(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SplitError> for JourneyError {
    fn from(e: SplitError) -> Self {
        JourneyError::Split(e)
    }
}
