//! Error types for booking-engine operations.
//!
//! Business outcomes (slot taken, overlapping funeral range, ...) are never
//! errors: they come back as [`ConflictResult`](crate::conflict::ConflictResult)
//! values. The types here cover malformed input at the boundary, configuration
//! defects and store failures.

use thiserror::Error;

use crate::conflict::ConflictReason;
use crate::reservation::Reservation;

/// A value from the outside world could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid time of day: '{0}'")]
    Time(String),

    #[error("Invalid date: '{0}'")]
    Date(String),

    #[error("Unknown service type: '{0}'")]
    ServiceType(String),

    #[error("Unknown reservation status: '{0}'")]
    Status(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid funeral range: {start} is after {end}")]
    FuneralRange { start: String, end: String },

    #[error("Malformed JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

/// The external store refused or failed a call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Another booking committed first. Surfaced to callers as a rejected
    /// [`ConflictResult`](crate::conflict::ConflictResult), not as a failure.
    #[error("Store conflict: {reason}")]
    Conflict {
        reason: ConflictReason,
        conflicting: Option<Box<Reservation>>,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A request was built with a shape its service type does not allow
    /// (e.g. a funeral without a date range).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid slot catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, BookingError>;
