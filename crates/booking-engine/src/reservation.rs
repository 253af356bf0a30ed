//! Reservations read from the store, and the booking requests checked
//! against them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, ParseError, Result};
use crate::service::{self, ServiceType};
use crate::time::TimeOfDay;

/// Lifecycle status of a stored reservation.
///
/// Only [`is_blocking`](Self::is_blocking) statuses take part in scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
    /// Legacy alias, blocks exactly like `Confirmed`.
    Approved,
    PriestApproved,
    Pending,
    WaitingPriestApproval,
    Cancelled,
    Declined,
    Completed,
}

impl ReservationStatus {
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            ReservationStatus::Confirmed
                | ReservationStatus::Approved
                | ReservationStatus::PriestApproved
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Approved => "approved",
            ReservationStatus::PriestApproved => "priest_approved",
            ReservationStatus::Pending => "pending",
            ReservationStatus::WaitingPriestApproval => "waiting_priest_approval",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Declined => "declined",
            ReservationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ParseError;

    /// Case-insensitive; runs of whitespace and hyphens fold to `_`, so
    /// `"Priest Approved"` and `"waiting-priest-approval"` both parse.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        match normalized.as_str() {
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "approved" => Ok(ReservationStatus::Approved),
            "priest_approved" => Ok(ReservationStatus::PriestApproved),
            "pending" => Ok(ReservationStatus::Pending),
            "waiting_priest_approval" => Ok(ReservationStatus::WaitingPriestApproval),
            "cancelled" | "canceled" => Ok(ReservationStatus::Cancelled),
            "declined" => Ok(ReservationStatus::Declined),
            "completed" => Ok(ReservationStatus::Completed),
            _ => Err(ParseError::Status(s.to_string())),
        }
    }
}

/// Inclusive span of whole days occupied by an exclusive-range service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FuneralRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl FuneralRange {
    /// # Errors
    /// Returns `ParseError::FuneralRange` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> std::result::Result<Self, ParseError> {
        if start > end {
            return Err(ParseError::FuneralRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A single-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Inclusive overlap: ranges sharing a boundary date overlap.
    pub fn overlaps(&self, other: &FuneralRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for FuneralRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// An existing booking, as owned by the external store.
///
/// Inbound data goes through [`ReservationRecord`](crate::wire::ReservationRecord);
/// this type is only ever built from already-normalized values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub service_type: ServiceType,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funeral_range: Option<FuneralRange>,
    /// Contact name of whoever holds the booking, for "reserved by" messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
}

impl Reservation {
    pub fn is_blocking(&self) -> bool {
        self.status.is_blocking()
    }

    pub fn is_exclusive_range(&self) -> bool {
        service::is_exclusive_range(self.service_type)
    }

    /// `[start, start + duration)` in minutes since midnight of `date`.
    pub fn occupied_minutes(&self) -> (u32, u32) {
        let start = u32::from(self.start_time.minutes());
        (start, self.start_time.end_after(service::duration_of(self.service_type)))
    }

    pub fn holder_or_default(&self) -> &str {
        self.holder_name.as_deref().unwrap_or("Another client")
    }

    pub fn summary(&self) -> ReservationSummary {
        ReservationSummary {
            id: self.id.clone(),
            holder_name: self.holder_or_default().to_string(),
            service_type: self.service_type,
            status: self.status,
            start_time: self.start_time,
        }
    }
}

/// What a blocked slot tells the presentation layer about its occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub id: String,
    pub holder_name: String,
    pub service_type: ServiceType,
    pub status: ReservationStatus,
    pub start_time: TimeOfDay,
}

/// Where a request sits on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "range", rename_all = "snake_case")]
pub enum Placement {
    /// A start time on the slot grid of the request date.
    Slot,
    /// Whole days, inclusive of both ends.
    Days(FuneralRange),
}

/// A candidate booking to be checked before commit.
///
/// Built only through [`point_in_time`](Self::point_in_time) or
/// [`funeral`](Self::funeral): grid services get [`Placement::Slot`] and
/// exclusive-range services always get [`Placement::Days`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    date: NaiveDate,
    start_time: TimeOfDay,
    service_type: ServiceType,
    placement: Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    holder_name: Option<String>,
}

impl BookingRequest {
    /// A request for a slot-grid service.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidRequest` for exclusive-range services,
    /// which must go through [`BookingRequest::funeral`].
    pub fn point_in_time(
        date: NaiveDate,
        start_time: TimeOfDay,
        service_type: ServiceType,
    ) -> Result<Self> {
        if service::is_exclusive_range(service_type) {
            return Err(BookingError::InvalidRequest(format!(
                "{service_type} requires a date range"
            )));
        }
        Ok(Self {
            date,
            start_time,
            service_type,
            placement: Placement::Slot,
            holder_name: None,
        })
    }

    /// A funeral request. `start_time` is kept for the record but does not
    /// take part in blocking.
    pub fn funeral(date: NaiveDate, start_time: TimeOfDay, range: FuneralRange) -> Self {
        Self {
            date,
            start_time,
            service_type: ServiceType::Funeral,
            placement: Placement::Days(range),
            holder_name: None,
        }
    }

    /// Attach the requester's name; used when the store turns the request
    /// into a reservation.
    pub fn with_holder(mut self, name: impl Into<String>) -> Self {
        self.holder_name = Some(name.into());
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> TimeOfDay {
        self.start_time
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn funeral_range(&self) -> Option<&FuneralRange> {
        match &self.placement {
            Placement::Days(range) => Some(range),
            Placement::Slot => None,
        }
    }

    pub fn holder_name(&self) -> Option<&str> {
        self.holder_name.as_deref()
    }

    pub fn is_exclusive_range(&self) -> bool {
        matches!(self.placement, Placement::Days(_))
    }

    /// `[start, start + duration)` in minutes since midnight of `date`.
    pub fn occupied_minutes(&self) -> (u32, u32) {
        let start = u32::from(self.start_time.minutes());
        (start, self.start_time.end_after(service::duration_of(self.service_type)))
    }

    /// The reservation a store creates from this request.
    pub fn into_reservation(self, id: String, status: ReservationStatus) -> Reservation {
        Reservation {
            id,
            date: self.date,
            start_time: self.start_time,
            service_type: self.service_type,
            status,
            funeral_range: match self.placement {
                Placement::Days(range) => Some(range),
                Placement::Slot => None,
            },
            holder_name: self.holder_name,
        }
    }
}

/// Reservations that occupy the slot grid on `date`: blocking status, same
/// day, point-in-time service. Exclusive-range bookings never appear here.
pub(crate) fn grid_blockers(
    reservations: &[Reservation],
    date: NaiveDate,
) -> impl Iterator<Item = &Reservation> {
    reservations
        .iter()
        .filter(move |r| r.is_blocking() && r.date == date && !r.is_exclusive_range())
}
