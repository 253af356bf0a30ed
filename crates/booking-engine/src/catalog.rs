//! Slot catalog: the bookable start times of a day.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};
use crate::service::ServiceType;
use crate::time::TimeOfDay;

/// Capacity carried by every standard slot. Never consulted by any blocking
/// decision.
pub const DEFAULT_CAPACITY: u32 = 200;

/// Standard start hours: 09:00-12:00 and 14:00-17:00, on the hour.
const STANDARD_HOURS: [u16; 8] = [9, 10, 11, 12, 14, 15, 16, 17];

/// A bookable start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: TimeOfDay,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "all_services")]
    pub allowed_services: BTreeSet<ServiceType>,
}

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

fn all_services() -> BTreeSet<ServiceType> {
    ServiceType::ALL.into_iter().collect()
}

impl TimeSlot {
    pub fn allows(&self, service: ServiceType) -> bool {
        self.allowed_services.contains(&service)
    }
}

/// An ordered, validated list of slots shared by every date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<TimeSlot>,
}

impl SlotCatalog {
    /// Build a catalog from custom slots.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidCatalog` if the list is empty, start times
    /// are not strictly increasing, or a slot allows no service at all.
    pub fn new(slots: Vec<TimeSlot>) -> Result<Self> {
        if slots.is_empty() {
            return Err(BookingError::InvalidCatalog("catalog has no slots".to_string()));
        }
        for pair in slots.windows(2) {
            if pair[0].start_time >= pair[1].start_time {
                return Err(BookingError::InvalidCatalog(format!(
                    "slot {} is not after {}",
                    pair[1].start_time, pair[0].start_time
                )));
            }
        }
        if let Some(empty) = slots.iter().find(|s| s.allowed_services.is_empty()) {
            return Err(BookingError::InvalidCatalog(format!(
                "slot {} allows no services",
                empty.start_time
            )));
        }
        Ok(Self { slots })
    }

    /// The eight standard slots, each open to all four services.
    pub fn standard() -> Self {
        let slots = STANDARD_HOURS
            .iter()
            .map(|&hour| TimeSlot {
                start_time: TimeOfDay::on_the_hour(hour),
                capacity: DEFAULT_CAPACITY,
                allowed_services: all_services(),
            })
            .collect();
        Self { slots }
    }

    /// Slots bookable on `date`. The grid does not vary by date.
    pub fn slots_for_date(&self, _date: NaiveDate) -> &[TimeSlot] {
        &self.slots
    }

    /// The catalog entry starting exactly at `time`, if any.
    pub fn slot_at(&self, time: TimeOfDay) -> Option<&TimeSlot> {
        self.slots
            .binary_search_by_key(&time, |s| s.start_time)
            .ok()
            .map(|i| &self.slots[i])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
