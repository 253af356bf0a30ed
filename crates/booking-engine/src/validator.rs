//! The entry point UI adapters talk to.
//!
//! [`BookingValidator`] pulls a fresh snapshot from its injected
//! [`ReservationStore`] on every call and runs the pure engine over it. It
//! holds no mutable state of its own.
//!
//! Lifecycle of one request:
//!
//! ```text
//! Submitted ──validate──▶ Validated(rejected)
//!     │
//!     └──────validate──▶ Validated(accepted) ──store.create──▶ Created
//!                                                   └──────▶ StoreConflict → Rejected
//! ```
//!
//! `validate` is a pre-filter: the store's own commit-time check decides.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::availability::{self, DaySummary, SlotStatus};
use crate::catalog::SlotCatalog;
use crate::config::{BufferPolicy, EngineConfig};
use crate::conflict::{self, ConflictResult};
use crate::error::{BookingError, Result, StoreError};
use crate::reservation::{BookingRequest, Placement, Reservation};
use crate::store::ReservationStore;
use crate::wire::BookingRequestRecord;

/// Terminal state of [`BookingValidator::commit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    Created { reservation: Reservation },
    /// Turned down before commit, or by the store at commit time. Both
    /// render the same way.
    Rejected { result: ConflictResult },
}

pub struct BookingValidator<S> {
    store: S,
    catalog: SlotCatalog,
    buffer: BufferPolicy,
}

impl<S: ReservationStore> BookingValidator<S> {
    /// Standard grid, buffer rule off.
    pub fn new(store: S) -> Self {
        Self {
            store,
            catalog: SlotCatalog::standard(),
            buffer: BufferPolicy::default(),
        }
    }

    /// # Errors
    /// Returns `BookingError::InvalidCatalog` for a malformed custom grid.
    pub fn with_config(store: S, config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            store,
            catalog: config.slot_catalog()?,
            buffer: config.buffer,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    /// Status of every catalog slot on `date`.
    pub fn get_availability(&self, date: NaiveDate) -> Result<Vec<SlotStatus>> {
        let snapshot = self.store.list_active(date)?;
        Ok(availability::compute_availability(
            date,
            &self.catalog,
            &snapshot,
            &self.buffer,
        ))
    }

    /// Counts and occupancy label for `date`.
    pub fn day_summary(&self, date: NaiveDate) -> Result<DaySummary> {
        Ok(availability::summarize(&self.get_availability(date)?))
    }

    /// May `request` be committed, as of now?
    ///
    /// Business conflicts come back as a rejected [`ConflictResult`]; `Err` is
    /// reserved for store failures.
    pub fn validate(&self, request: &BookingRequest) -> Result<ConflictResult> {
        let snapshot = self.snapshot_for(request)?;
        debug!(
            date = %request.date(),
            snapshot = snapshot.len(),
            "validating booking request"
        );
        Ok(conflict::check(request, &self.catalog, &snapshot, &self.buffer))
    }

    /// Normalize a raw form submission, then [`validate`](Self::validate) it.
    ///
    /// # Errors
    /// Returns `BookingError::Parse` when a field cannot be normalized; a
    /// malformed time never turns into a default slot.
    pub fn validate_record(&self, record: BookingRequestRecord) -> Result<ConflictResult> {
        let request = BookingRequest::try_from(record)?;
        self.validate(&request)
    }

    /// Validate, then hand the request to the store.
    pub fn commit(&self, request: &BookingRequest) -> Result<CommitOutcome> {
        let verdict = self.validate(request)?;
        if !verdict.accepted {
            return Ok(CommitOutcome::Rejected { result: verdict });
        }

        match self.store.create(request) {
            Ok(reservation) => {
                debug!(id = %reservation.id, "reservation created");
                Ok(CommitOutcome::Created { reservation })
            }
            Err(StoreError::Conflict {
                reason,
                conflicting,
            }) => {
                warn!(
                    date = %request.date(),
                    start = %request.start_time(),
                    %reason,
                    "store rejected a request that passed validation"
                );
                Ok(CommitOutcome::Rejected {
                    result: ConflictResult::rejected(request, reason, conflicting.as_deref()),
                })
            }
            Err(e) => Err(BookingError::Store(e)),
        }
    }

    /// Funerals need every reservation whose range can touch the requested
    /// days; everything else only needs its own date.
    fn snapshot_for(&self, request: &BookingRequest) -> Result<Vec<Reservation>> {
        match request.placement() {
            Placement::Days(range) => {
                Ok(self.store.list_active_between(range.start(), range.end())?)
            }
            Placement::Slot => Ok(self.store.list_active(request.date())?),
        }
    }
}
