//! The reservation store seam.
//!
//! The engine never persists anything. It reads snapshots through
//! [`ReservationStore::list_active`] and hands accepted requests to
//! [`ReservationStore::create`], which must repeat the conflict check
//! atomically with the insert: validation done before the call can go stale
//! if two callers race for the same slot or the same funeral dates.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::catalog::SlotCatalog;
use crate::config::BufferPolicy;
use crate::conflict;
use crate::error::StoreError;
use crate::reservation::{BookingRequest, Reservation, ReservationStatus};

pub trait ReservationStore {
    /// Reservations that count for `date` as of the call.
    ///
    /// Must include exclusive-range reservations whose range covers `date`,
    /// not only those whose own `date` equals it. The engine trusts the
    /// snapshot completely.
    fn list_active(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError>;

    /// Commit a request. Implementations must enforce the same conflict
    /// rules at commit time and answer `StoreError::Conflict` when they fail.
    fn create(&self, request: &BookingRequest) -> Result<Reservation, StoreError>;

    /// Reservations active on any day from `start` to `end` inclusive,
    /// deduplicated by id.
    ///
    /// The provided body calls [`list_active`](Self::list_active) once per
    /// day, so its cost grows with the length of the range. Stores that can
    /// answer a range query directly should override it.
    fn list_active_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for day in start.iter_days().take_while(|d| *d <= end) {
            for r in self.list_active(day)? {
                if seen.insert(r.id.clone()) {
                    out.push(r);
                }
            }
        }
        Ok(out)
    }
}

impl<S: ReservationStore + ?Sized> ReservationStore for &S {
    fn list_active(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        (**self).list_active(date)
    }

    fn create(&self, request: &BookingRequest) -> Result<Reservation, StoreError> {
        (**self).create(request)
    }

    fn list_active_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        (**self).list_active_between(start, end)
    }
}

/// In-memory store that re-validates and inserts under one lock.
///
/// New reservations are created with [`ReservationStatus::Confirmed`] unless
/// another initial status is set, and get sequential ids (`RES-000001`, ...).
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    catalog: SlotCatalog,
    buffer: BufferPolicy,
    initial_status: ReservationStatus,
}

#[derive(Debug, Default)]
struct Inner {
    reservations: Vec<Reservation>,
    next_id: u64,
}

impl Inner {
    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("RES-{:06}", self.next_id);
            if !self.reservations.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_rules(SlotCatalog::standard(), BufferPolicy::default())
    }

    /// A store enforcing the given grid and buffer rule at commit time.
    pub fn with_rules(catalog: SlotCatalog, buffer: BufferPolicy) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            catalog,
            buffer,
            initial_status: ReservationStatus::Confirmed,
        }
    }

    /// Status given to committed requests. A non-blocking status (e.g.
    /// `Pending`) lets duplicates through, matching a review-queue workflow.
    pub fn with_initial_status(mut self, status: ReservationStatus) -> Self {
        self.initial_status = status;
        self
    }

    /// Seed the store with existing records, keeping its rules.
    pub fn seeded(mut self, reservations: Vec<Reservation>) -> Self {
        self.inner = Mutex::new(Inner {
            reservations,
            next_id: 0,
        });
        self
    }

    /// Standard rules, seeded with existing records.
    pub fn from_reservations(reservations: Vec<Reservation>) -> Self {
        Self::new().seeded(reservations)
    }

    /// Insert a record as-is, bypassing conflict checks (imports, fixtures).
    pub fn insert(&self, reservation: Reservation) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.reservations.push(reservation);
        Ok(())
    }

    /// Change a reservation's status, e.g. `Pending` → `PriestApproved`.
    /// Returns false if the id is unknown.
    pub fn set_status(&self, id: &str, status: ReservationStatus) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        match inner.reservations.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.reservations.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.reservations.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("reservation store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn counts_for(r: &Reservation, date: NaiveDate) -> bool {
    r.date == date || r.funeral_range.is_some_and(|range| range.contains(date))
}

fn counts_between(r: &Reservation, start: NaiveDate, end: NaiveDate) -> bool {
    (start <= r.date && r.date <= end)
        || r.funeral_range
            .is_some_and(|range| range.start() <= end && range.end() >= start)
}

impl ReservationStore for MemoryStore {
    fn list_active(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .reservations
            .iter()
            .filter(|r| counts_for(r, date))
            .cloned()
            .collect())
    }

    /// One pass over the records, however long the range.
    fn list_active_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.lock()?;
        let mut seen = HashSet::new();
        Ok(inner
            .reservations
            .iter()
            .filter(|r| counts_between(r, start, end) && seen.insert(r.id.as_str()))
            .cloned()
            .collect())
    }

    fn create(&self, request: &BookingRequest) -> Result<Reservation, StoreError> {
        let mut inner = self.lock()?;

        // Re-check against the authoritative set while holding the lock.
        let verdict = conflict::check(request, &self.catalog, &inner.reservations, &self.buffer);
        if let Some(reason) = verdict.reason {
            return Err(StoreError::Conflict {
                reason,
                conflicting: verdict.conflicting_reservation.map(Box::new),
            });
        }

        let id = inner.fresh_id();
        let reservation = request.clone().into_reservation(id, self.initial_status);
        inner.reservations.push(reservation.clone());
        Ok(reservation)
    }
}
