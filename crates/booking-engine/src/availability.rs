//! Per-slot availability for a single date.
//!
//! Takes a snapshot of reservations and reports, for every catalog slot,
//! whether it can still be booked and which reservation is in the way if not.
//!
//! A slot is blocked when its start falls inside the duration window
//! `[start, start + duration)` of a blocking, point-in-time reservation on the
//! same day. Funerals occupy whole date ranges and are checked separately by
//! [`conflict`](crate::conflict); they never block grid slots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{SlotCatalog, TimeSlot};
use crate::config::BufferPolicy;
use crate::reservation::{grid_blockers, Reservation, ReservationSummary};
use crate::time::TimeOfDay;

/// Why a slot cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotBlock {
    /// A reservation starts exactly at this slot.
    Reserved,
    /// An earlier reservation is still running when this slot starts.
    WithinDuration,
    /// Too close to another booking's start under the buffer policy.
    Buffer,
}

/// Availability of one catalog slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStatus {
    pub start_time: TimeOfDay,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotBlock>,
    /// The reservation responsible for the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_reservation: Option<ReservationSummary>,
}

impl SlotStatus {
    fn available(slot: &TimeSlot) -> Self {
        Self {
            start_time: slot.start_time,
            available: true,
            reason: None,
            blocking_reservation: None,
        }
    }

    fn blocked(slot: &TimeSlot, reason: SlotBlock, by: &Reservation) -> Self {
        Self {
            start_time: slot.start_time,
            available: false,
            reason: Some(reason),
            blocking_reservation: Some(by.summary()),
        }
    }

    pub fn is_buffer_blocked(&self) -> bool {
        self.reason == Some(SlotBlock::Buffer)
    }

    /// Tooltip-style text, e.g. "Reserved by Maria Santos (wedding, confirmed)".
    pub fn describe(&self) -> String {
        match (&self.reason, &self.blocking_reservation) {
            (None, _) => "Available".to_string(),
            (Some(SlotBlock::Buffer), _) => {
                "Unavailable due to buffer requirement".to_string()
            }
            (Some(SlotBlock::Reserved), Some(r)) => format!(
                "Reserved by {} ({}, {})",
                r.holder_name, r.service_type, r.status
            ),
            (Some(SlotBlock::WithinDuration), Some(r)) => format!(
                "Blocked by {}'s {} at {}",
                r.holder_name,
                r.service_type,
                r.start_time.to_12_hour()
            ),
            (Some(_), None) => "Unavailable".to_string(),
        }
    }
}

/// Compute the status of every catalog slot on `date`.
///
/// Reservations on other dates, with non-blocking statuses, or for
/// exclusive-range services are ignored. When two reservations cover the same
/// slot, the one starting exactly at the slot is reported, then the earliest.
///
/// # Arguments
///
/// * `date` — The day being rendered.
/// * `catalog` — The slot grid.
/// * `reservations` — Snapshot from the store; may include other dates.
/// * `buffer` — Optional start-time gap rule. Off by default.
pub fn compute_availability(
    date: NaiveDate,
    catalog: &SlotCatalog,
    reservations: &[Reservation],
    buffer: &BufferPolicy,
) -> Vec<SlotStatus> {
    let mut blockers: Vec<&Reservation> = grid_blockers(reservations, date).collect();
    blockers.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));

    debug!(
        %date,
        snapshot = reservations.len(),
        blocking = blockers.len(),
        "computing slot availability"
    );

    catalog
        .slots_for_date(date)
        .iter()
        .map(|slot| slot_status(slot, &blockers, buffer))
        .collect()
}

fn slot_status(slot: &TimeSlot, blockers: &[&Reservation], buffer: &BufferPolicy) -> SlotStatus {
    let slot_start = u32::from(slot.start_time.minutes());

    if let Some(exact) = blockers.iter().find(|r| r.start_time == slot.start_time) {
        return SlotStatus::blocked(slot, SlotBlock::Reserved, exact);
    }

    let covering = blockers.iter().find(|r| {
        let (start, end) = r.occupied_minutes();
        start <= slot_start && slot_start < end
    });
    if let Some(r) = covering {
        return SlotStatus::blocked(slot, SlotBlock::WithinDuration, r);
    }

    let near = blockers
        .iter()
        .find(|r| buffer.violated_by(slot_start, u32::from(r.start_time.minutes())));
    if let Some(r) = near {
        return SlotStatus::blocked(slot, SlotBlock::Buffer, r);
    }

    SlotStatus::available(slot)
}

/// How full a day is, as shown on the calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "available", rename_all = "snake_case")]
pub enum Occupancy {
    Full,
    /// Three or fewer slots left.
    Limited(usize),
    Open(usize),
}

impl Occupancy {
    const LIMITED_THRESHOLD: usize = 3;

    fn from_available(available: usize) -> Self {
        match available {
            0 => Occupancy::Full,
            n if n <= Self::LIMITED_THRESHOLD => Occupancy::Limited(n),
            n => Occupancy::Open(n),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Occupancy::Full => "Full".to_string(),
            Occupancy::Limited(n) => format!("{n} left"),
            Occupancy::Open(n) => format!("{n} slots"),
        }
    }
}

/// Counts over one day's slot statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub total: usize,
    pub available: usize,
    pub reserved: usize,
    pub duration_blocked: usize,
    pub buffer_blocked: usize,
    pub occupancy: Occupancy,
}

pub fn summarize(statuses: &[SlotStatus]) -> DaySummary {
    let count = |reason: SlotBlock| statuses.iter().filter(|s| s.reason == Some(reason)).count();
    let available = statuses.iter().filter(|s| s.available).count();

    DaySummary {
        total: statuses.len(),
        available,
        reserved: count(SlotBlock::Reserved),
        duration_blocked: count(SlotBlock::WithinDuration),
        buffer_blocked: count(SlotBlock::Buffer),
        occupancy: Occupancy::from_available(available),
    }
}
