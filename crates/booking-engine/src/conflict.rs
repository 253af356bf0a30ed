//! Check one booking request against a reservation snapshot.
//!
//! Point-in-time requests run four checks in order and stop at the first hit:
//! direct (same start), duration overlap, service allowed at the slot, and the
//! optional buffer rule. Funeral requests skip all of them and are checked
//! only for overlapping funeral date ranges.
//!
//! Two duration windows overlap when `a.start < b.end && b.start < a.end`;
//! back-to-back bookings (one ends exactly when the other starts) do not.
//! Funeral ranges are inclusive, so sharing a boundary date IS a conflict.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::SlotCatalog;
use crate::config::BufferPolicy;
use crate::reservation::{grid_blockers, BookingRequest, FuneralRange, Placement, Reservation};
use crate::service::{self, ServiceType};

/// Why a request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    DirectConflict,
    DurationOverlapConflict,
    ServiceUnavailableConflict,
    BufferConflict,
    FuneralRangeConflict,
}

impl ConflictReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictReason::DirectConflict => "direct_conflict",
            ConflictReason::DurationOverlapConflict => "duration_overlap_conflict",
            ConflictReason::ServiceUnavailableConflict => "service_unavailable_conflict",
            ConflictReason::BufferConflict => "buffer_conflict",
            ConflictReason::FuneralRangeConflict => "funeral_range_conflict",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictResult {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConflictReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_reservation: Option<Reservation>,
    /// Minutes shared by the two duration windows, for duration overlaps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_minutes: Option<u32>,
    /// User-facing explanation.
    pub message: String,
}

impl ConflictResult {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
            conflicting_reservation: None,
            overlap_minutes: None,
            message: "Time slot is available".to_string(),
        }
    }

    /// A rejection for `request` caused by `existing`.
    ///
    /// Also used to present a store-side conflict, so a booking lost to a
    /// concurrent writer reads the same as one caught before commit.
    pub fn rejected(
        request: &BookingRequest,
        reason: ConflictReason,
        existing: Option<&Reservation>,
    ) -> Self {
        let message = rejection_message(request, reason, existing);
        Self {
            accepted: false,
            reason: Some(reason),
            conflicting_reservation: existing.cloned(),
            overlap_minutes: None,
            message,
        }
    }

    fn with_overlap(mut self, minutes: u32) -> Self {
        self.overlap_minutes = Some(minutes);
        self
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// Check `request` against `reservations`.
///
/// Only blocking-status reservations are considered. The snapshot may contain
/// other dates; point-in-time checks look only at `request.date()`, while the
/// funeral check looks at every funeral in the snapshot.
pub fn check(
    request: &BookingRequest,
    catalog: &SlotCatalog,
    reservations: &[Reservation],
    buffer: &BufferPolicy,
) -> ConflictResult {
    let result = match request.placement() {
        Placement::Days(range) => check_funeral_range(request, range, reservations),
        Placement::Slot => check_point_in_time(request, catalog, reservations, buffer),
    };

    match result.reason {
        None => debug!(
            date = %request.date(),
            start = %request.start_time(),
            service = %request.service_type(),
            "booking request accepted"
        ),
        Some(reason) => info!(
            date = %request.date(),
            start = %request.start_time(),
            service = %request.service_type(),
            %reason,
            "booking request rejected"
        ),
    }
    result
}

fn check_point_in_time(
    request: &BookingRequest,
    catalog: &SlotCatalog,
    reservations: &[Reservation],
    buffer: &BufferPolicy,
) -> ConflictResult {
    let on_date: Vec<&Reservation> = grid_blockers(reservations, request.date()).collect();

    if let Some(existing) = on_date
        .iter()
        .copied()
        .find(|r| r.start_time == request.start_time())
    {
        return ConflictResult::rejected(request, ConflictReason::DirectConflict, Some(existing));
    }

    let candidate = request.occupied_minutes();
    for &existing in &on_date {
        let overlap = overlap_minutes(candidate, existing.occupied_minutes());
        if overlap > 0 {
            return ConflictResult::rejected(
                request,
                ConflictReason::DurationOverlapConflict,
                Some(existing),
            )
            .with_overlap(overlap);
        }
    }

    // Off-grid start times have no catalog entry to restrict them.
    if let Some(slot) = catalog.slot_at(request.start_time()) {
        if !slot.allows(request.service_type()) {
            return ConflictResult::rejected(
                request,
                ConflictReason::ServiceUnavailableConflict,
                None,
            );
        }
    }

    let start = u32::from(request.start_time().minutes());
    if let Some(existing) = on_date
        .iter()
        .copied()
        .find(|r| buffer.violated_by(start, u32::from(r.start_time.minutes())))
    {
        return ConflictResult::rejected(request, ConflictReason::BufferConflict, Some(existing));
    }

    ConflictResult::accepted()
}

fn check_funeral_range(
    request: &BookingRequest,
    range: &FuneralRange,
    reservations: &[Reservation],
) -> ConflictResult {
    let clash = reservations.iter().find(|r| {
        r.is_blocking()
            && r.is_exclusive_range()
            && r.funeral_range.is_some_and(|existing| existing.overlaps(range))
    });

    match clash {
        Some(existing) => ConflictResult::rejected(
            request,
            ConflictReason::FuneralRangeConflict,
            Some(existing),
        ),
        None => ConflictResult::accepted(),
    }
}

/// Minutes shared by two half-open windows; 0 when they merely touch.
pub fn overlap_minutes(a: (u32, u32), b: (u32, u32)) -> u32 {
    if a.0 < b.1 && b.0 < a.1 {
        a.1.min(b.1) - a.0.max(b.0)
    } else {
        0
    }
}

fn hours_phrase(service: ServiceType) -> String {
    let hours = service::duration_hours_label(service);
    let unit = if hours == "1" { "hour" } else { "hours" };
    format!("{hours} {unit}")
}

fn rejection_message(
    request: &BookingRequest,
    reason: ConflictReason,
    existing: Option<&Reservation>,
) -> String {
    let holder = existing.map_or("Another client", |r| r.holder_or_default());
    match reason {
        ConflictReason::DirectConflict => {
            let status = existing.map_or("reserved", |r| r.status.as_str());
            format!(
                "This time slot is already {status} by {holder}. Please select a different time."
            )
        }
        ConflictReason::DurationOverlapConflict => match existing {
            Some(r) => format!(
                "Schedule conflict! {holder} has a {} reservation at {} ({}). Your {} service ({}) would overlap with this reservation.",
                r.service_type,
                r.start_time.to_12_hour(),
                hours_phrase(r.service_type),
                request.service_type(),
                hours_phrase(request.service_type()),
            ),
            None => format!(
                "Schedule conflict! Your {} service would overlap with another reservation.",
                request.service_type()
            ),
        },
        ConflictReason::ServiceUnavailableConflict => format!(
            "{} service is not available at {}. Please select a different time.",
            request.service_type(),
            request.start_time().to_12_hour()
        ),
        ConflictReason::BufferConflict => {
            "This time slot conflicts with the buffer requirement between bookings. Please select a different time."
                .to_string()
        }
        ConflictReason::FuneralRangeConflict => {
            let existing_range = existing
                .and_then(|r| r.funeral_range)
                .map_or_else(|| "an existing funeral".to_string(), |fr| fr.to_string());
            let requested = request
                .funeral_range()
                .map_or_else(String::new, |fr| format!(" ({fr})"));
            format!(
                "The requested funeral dates{requested} overlap with {holder}'s funeral on {existing_range}. Please choose different dates."
            )
        }
    }
}
