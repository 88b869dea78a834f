//! Error types shared by the itinerary client

use std::fmt;

use thiserror::Error;

/// Local rejection of a generation request. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination must not be empty")]
    EmptyDestination,
    #[error("trip must last at least one day")]
    ZeroDuration,
    #[error("pick at least one type of travel")]
    NoInterests,
    #[error("an itinerary is already being generated")]
    AlreadyInFlight,
}

/// Failure reported by the remote itinerary service.
///
/// Unreachable hosts and non-2xx statuses both count as `Transport`; only a
/// body that cannot be decoded is `Malformed`.
///
/// Variants hold the rendered message, not the source error: a bad status has
/// no `reqwest::Error` behind it, and test doubles build both variants directly.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Why a generation attempt ended without an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    Transport,
    Malformed,
}

impl FailureReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Malformed => "malformed",
        }
    }

    /// Text shown to the user when generation fails.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Timeout => {
                "Generating your itinerary took too long. Please try again in a moment."
            }
            Self::Transport => {
                "We couldn't reach the itinerary service. Check your connection and try again."
            }
            Self::Malformed => {
                "The itinerary service sent back something we couldn't read. Please try again."
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&ServiceError> for FailureReason {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::Transport(_) => Self::Transport,
            ServiceError::Malformed(_) => Self::Malformed,
        }
    }
}

/// The detail view could not be built from the remote record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailError {
    #[error("itinerary {0} not found")]
    NotFound(String),
}

/// The `interests` field of a catalog row could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable interests {raw:?}: {reason}")]
pub struct MalformedInterests {
    pub raw: String,
    pub reason: String,
}
