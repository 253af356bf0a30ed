//! Tests for `BookingValidator` and the in-memory reservation store.

use booking_engine::wire::BookingRequestRecord;
use booking_engine::{
    BookingError, BookingRequest, BookingValidator, BufferPolicy, CommitOutcome, ConflictReason,
    EngineConfig, FuneralRange, MemoryStore, ParseError, Reservation, ReservationStatus,
    ReservationStore, ServiceType, SlotBlock, SlotCatalog, StoreError, TimeOfDay, TimeSlot,
};
use chrono::NaiveDate;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn at(h: u32) -> TimeOfDay {
    TimeOfDay::from_hm(h, 0).unwrap()
}

fn wedding_at(h: u32) -> BookingRequest {
    BookingRequest::point_in_time(day("2025-11-01"), at(h), ServiceType::Wedding)
        .unwrap()
        .with_holder("Maria Santos")
}

fn baptism_at(h: u32) -> BookingRequest {
    BookingRequest::point_in_time(day("2025-11-01"), at(h), ServiceType::Baptism).unwrap()
}

fn funeral_over(start: &str, end: &str) -> BookingRequest {
    let range = FuneralRange::new(day(start), day(end)).unwrap();
    BookingRequest::funeral(range.start(), at(9), range).with_holder("Pedro Garcia")
}

fn created(outcome: CommitOutcome) -> Reservation {
    match outcome {
        CommitOutcome::Created { reservation } => reservation,
        CommitOutcome::Rejected { result } => panic!("expected Created, got {result:?}"),
    }
}

fn rejected_reason(outcome: CommitOutcome) -> Option<ConflictReason> {
    match outcome {
        CommitOutcome::Rejected { result } => result.reason,
        CommitOutcome::Created { reservation } => panic!("expected Rejected, got {reservation:?}"),
    }
}

/// Reports an empty day to the validator but commits through a real store,
/// the way a snapshot goes stale when another writer gets in first.
struct StaleStore<'a>(&'a MemoryStore);

impl ReservationStore for StaleStore<'_> {
    fn list_active(&self, _date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        Ok(Vec::new())
    }

    fn create(&self, request: &BookingRequest) -> Result<Reservation, StoreError> {
        self.0.create(request)
    }
}

/// Lists a funeral only on its own date but answers range queries in full,
/// like a store backed by an indexed date-range query.
struct RangeIndexedStore {
    funerals: Vec<Reservation>,
}

impl ReservationStore for RangeIndexedStore {
    fn list_active(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.funerals.iter().filter(|r| r.date == date).cloned().collect())
    }

    fn create(&self, request: &BookingRequest) -> Result<Reservation, StoreError> {
        Ok(request
            .clone()
            .into_reservation("RES-000099".to_string(), ReservationStatus::Confirmed))
    }

    fn list_active_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .funerals
            .iter()
            .filter(|r| {
                r.funeral_range
                    .is_some_and(|range| range.start() <= end && range.end() >= start)
            })
            .cloned()
            .collect())
    }
}

fn funeral_record(id: &str, start: &str, end: &str) -> Reservation {
    Reservation {
        id: id.to_string(),
        date: day(start),
        start_time: at(9),
        service_type: ServiceType::Funeral,
        status: ReservationStatus::Confirmed,
        funeral_range: Some(FuneralRange::new(day(start), day(end)).unwrap()),
        holder_name: Some("Pedro Garcia".to_string()),
    }
}

struct DownStore;

impl ReservationStore for DownStore {
    fn list_active(&self, _date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn create(&self, _request: &BookingRequest) -> Result<Reservation, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

// ── Commit lifecycle ────────────────────────────────────────────────────────

#[test]
fn same_slot_twice_second_is_direct_conflict() {
    let validator = BookingValidator::new(MemoryStore::new());

    let first = created(validator.commit(&wedding_at(10)).unwrap());
    assert_eq!(first.status, ReservationStatus::Confirmed);
    assert_eq!(first.holder_name.as_deref(), Some("Maria Santos"));

    let second = validator.commit(&baptism_at(10)).unwrap();
    assert_eq!(rejected_reason(second), Some(ConflictReason::DirectConflict));
    assert_eq!(validator.store().len().unwrap(), 1);
}

#[test]
fn committed_wedding_shapes_availability() {
    let validator = BookingValidator::new(MemoryStore::new());
    created(validator.commit(&wedding_at(10)).unwrap());

    let slots = validator.get_availability(day("2025-11-01")).unwrap();
    let reasons: Vec<Option<SlotBlock>> = slots.iter().map(|s| s.reason).collect();
    assert_eq!(
        reasons,
        vec![
            None,
            Some(SlotBlock::Reserved),
            Some(SlotBlock::WithinDuration),
            Some(SlotBlock::WithinDuration),
            None,
            None,
            None,
            None,
        ]
    );

    let summary = validator.day_summary(day("2025-11-01")).unwrap();
    assert_eq!(summary.available, 5);
    assert_eq!(summary.occupancy.label(), "5 slots");
}

#[test]
fn created_ids_are_sequential_and_skip_seeded_ids() {
    let seeded = Reservation {
        id: "RES-000001".to_string(),
        date: day("2025-11-02"),
        start_time: at(9),
        service_type: ServiceType::Baptism,
        status: ReservationStatus::Confirmed,
        funeral_range: None,
        holder_name: None,
    };
    let validator = BookingValidator::new(MemoryStore::from_reservations(vec![seeded]));

    let a = created(validator.commit(&baptism_at(9)).unwrap());
    let b = created(validator.commit(&baptism_at(14)).unwrap());
    assert_eq!(a.id, "RES-000002");
    assert_eq!(b.id, "RES-000003");
}

#[test]
fn stale_snapshot_is_caught_at_commit() {
    let backing = MemoryStore::new();
    backing
        .create(&wedding_at(10))
        .expect("first booking goes straight in");

    let validator = BookingValidator::new(StaleStore(&backing));
    assert!(validator.validate(&baptism_at(10)).unwrap().accepted);

    let outcome = validator.commit(&baptism_at(10)).unwrap();
    match outcome {
        CommitOutcome::Rejected { result } => {
            assert_eq!(result.reason, Some(ConflictReason::DirectConflict));
            assert!(result.message.contains("Maria Santos"), "{}", result.message);
            assert_eq!(
                result.conflicting_reservation.unwrap().id,
                "RES-000001"
            );
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(backing.len().unwrap(), 1);
}

#[test]
fn store_failure_is_an_error_not_a_rejection() {
    let validator = BookingValidator::new(DownStore);

    assert!(matches!(
        validator.get_availability(day("2025-11-01")),
        Err(BookingError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        validator.commit(&baptism_at(9)),
        Err(BookingError::Store(StoreError::Unavailable(_)))
    ));
}

// ── Status workflow ─────────────────────────────────────────────────────────

#[test]
fn pending_bookings_let_duplicates_through() {
    let store = MemoryStore::new().with_initial_status(ReservationStatus::Pending);
    let validator = BookingValidator::new(store);

    created(validator.commit(&wedding_at(10)).unwrap());
    created(validator.commit(&wedding_at(10)).unwrap());

    assert_eq!(validator.store().len().unwrap(), 2);
    let summary = validator.day_summary(day("2025-11-01")).unwrap();
    assert_eq!(summary.available, 8);
}

#[test]
fn approving_a_pending_booking_starts_blocking() {
    let store = MemoryStore::new().with_initial_status(ReservationStatus::Pending);
    let validator = BookingValidator::new(store);
    let pending = created(validator.commit(&wedding_at(10)).unwrap());

    assert!(validator.validate(&baptism_at(11)).unwrap().accepted);

    assert!(validator
        .store()
        .set_status(&pending.id, ReservationStatus::PriestApproved)
        .unwrap());
    let result = validator.validate(&baptism_at(11)).unwrap();
    assert_eq!(result.reason, Some(ConflictReason::DurationOverlapConflict));

    assert!(!validator
        .store()
        .set_status("RES-999999", ReservationStatus::Cancelled)
        .unwrap());
}

#[test]
fn cancelling_frees_the_slot() {
    let validator = BookingValidator::new(MemoryStore::new());
    let booking = created(validator.commit(&wedding_at(10)).unwrap());

    validator
        .store()
        .set_status(&booking.id, ReservationStatus::Cancelled)
        .unwrap();
    created(validator.commit(&baptism_at(10)).unwrap());
}

// ── Funerals across days ────────────────────────────────────────────────────

#[test]
fn funeral_listed_on_every_covered_day() {
    let store = MemoryStore::new();
    store.create(&funeral_over("2025-11-01", "2025-11-03")).unwrap();

    for d in ["2025-11-01", "2025-11-02", "2025-11-03"] {
        assert_eq!(store.list_active(day(d)).unwrap().len(), 1, "{d}");
    }
    assert!(store.list_active(day("2025-11-04")).unwrap().is_empty());

    let span = store
        .list_active_between(day("2025-10-30"), day("2025-11-05"))
        .unwrap();
    assert_eq!(span.len(), 1);
}

#[test]
fn funeral_range_conflict_through_validator() {
    let validator = BookingValidator::new(MemoryStore::new());
    created(validator.commit(&funeral_over("2025-11-01", "2025-11-03")).unwrap());

    let outcome = validator.commit(&funeral_over("2025-11-03", "2025-11-05")).unwrap();
    assert_eq!(rejected_reason(outcome), Some(ConflictReason::FuneralRangeConflict));

    created(validator.commit(&funeral_over("2025-11-04", "2025-11-05")).unwrap());
}

#[test]
fn funeral_found_when_it_starts_before_requested_date() {
    // Existing funeral's own date (11-01) is outside the requested range,
    // but its range reaches into it.
    let validator = BookingValidator::new(MemoryStore::new());
    created(validator.commit(&funeral_over("2025-11-01", "2025-11-04")).unwrap());

    let result = validator.validate(&funeral_over("2025-11-04", "2025-11-06")).unwrap();
    assert_eq!(result.reason, Some(ConflictReason::FuneralRangeConflict));
}

#[test]
fn funeral_leaves_slot_grid_open() {
    let validator = BookingValidator::new(MemoryStore::new());
    created(validator.commit(&funeral_over("2025-11-01", "2025-11-01")).unwrap());

    let summary = validator.day_summary(day("2025-11-01")).unwrap();
    assert_eq!(summary.available, 8);
    created(validator.commit(&wedding_at(9)).unwrap());
}

#[test]
fn range_query_is_used_through_a_borrowed_store() {
    let store = RangeIndexedStore {
        funerals: vec![funeral_record("f1", "2025-10-30", "2025-11-02")],
    };
    let request = funeral_over("2025-11-01", "2025-11-03");

    let borrowed = BookingValidator::new(&store);
    let result = borrowed.validate(&request).unwrap();
    assert_eq!(result.reason, Some(ConflictReason::FuneralRangeConflict));
    assert_eq!(
        rejected_reason(borrowed.commit(&request).unwrap()),
        Some(ConflictReason::FuneralRangeConflict)
    );

    let owned = BookingValidator::new(store);
    let result = owned.validate(&request).unwrap();
    assert_eq!(result.reason, Some(ConflictReason::FuneralRangeConflict));
}

#[test]
fn range_listing_is_deduplicated_and_handles_distant_ends() {
    let store = MemoryStore::new();
    store.insert(funeral_record("f1", "2025-10-30", "2025-11-02")).unwrap();
    store.insert(funeral_record("f1", "2025-10-30", "2025-11-02")).unwrap();
    store.insert(funeral_record("f2", "2026-03-01", "2026-03-02")).unwrap();
    store.create(&wedding_at(10)).unwrap();

    let far_end = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
    let span = store.list_active_between(day("2025-11-01"), far_end).unwrap();
    let ids: Vec<&str> = span.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["f1", "f2", "RES-000001"]);

    let validator = BookingValidator::new(&store);
    let outcome = validator.commit(&funeral_over("2025-11-02", "9999-12-31")).unwrap();
    assert_eq!(rejected_reason(outcome), Some(ConflictReason::FuneralRangeConflict));
}

// ── Configuration ───────────────────────────────────────────────────────────

#[test]
fn buffer_config_applies_to_validate_and_commit() {
    let config = EngineConfig {
        buffer: BufferPolicy::enabled(60),
        slots: None,
    };
    let store = MemoryStore::with_rules(SlotCatalog::standard(), config.buffer);
    let validator = BookingValidator::with_config(store, &config).unwrap();

    created(validator.commit(&baptism_at(10)).unwrap());
    let outcome = validator.commit(&baptism_at(11)).unwrap();
    assert_eq!(rejected_reason(outcome), Some(ConflictReason::BufferConflict));

    let slots = validator.get_availability(day("2025-11-01")).unwrap();
    assert!(slots[0].is_buffer_blocked());
    assert!(slots[2].is_buffer_blocked());
}

#[test]
fn seeded_store_keeps_its_buffer_rule() {
    let seeded = Reservation {
        id: "RES-000001".to_string(),
        date: day("2025-11-01"),
        start_time: at(10),
        service_type: ServiceType::Baptism,
        status: ReservationStatus::Confirmed,
        funeral_range: None,
        holder_name: None,
    };
    let store = MemoryStore::with_rules(SlotCatalog::standard(), BufferPolicy::enabled(60))
        .seeded(vec![seeded]);
    assert_eq!(store.len().unwrap(), 1);
    assert!(!store.is_empty().unwrap());

    // A validator without the buffer rule still loses at commit.
    let validator = BookingValidator::new(&store);
    assert!(validator.validate(&baptism_at(11)).unwrap().accepted);
    let outcome = validator.commit(&baptism_at(11)).unwrap();
    assert_eq!(rejected_reason(outcome), Some(ConflictReason::BufferConflict));

    let next = created(validator.commit(&baptism_at(14)).unwrap());
    assert_eq!(next.id, "RES-000002");
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn new_store_reports_empty() {
    let store = MemoryStore::new();
    assert!(store.is_empty().unwrap());
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn invalid_custom_catalog_is_rejected() {
    let config = EngineConfig {
        buffer: BufferPolicy::default(),
        slots: Some(vec![
            TimeSlot {
                start_time: at(10),
                capacity: 1,
                allowed_services: ServiceType::ALL.into_iter().collect(),
            },
            TimeSlot {
                start_time: at(9),
                capacity: 1,
                allowed_services: ServiceType::ALL.into_iter().collect(),
            },
        ]),
    };
    assert!(matches!(
        BookingValidator::with_config(MemoryStore::new(), &config),
        Err(BookingError::InvalidCatalog(_))
    ));
}

#[test]
fn empty_config_documents_are_defaults() {
    let config: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert!(!config.buffer.enabled);
    assert_eq!(config.buffer.window_minutes, 60);
    assert_eq!(config.slot_catalog().unwrap(), SlotCatalog::standard());
}

// ── Raw records ─────────────────────────────────────────────────────────────

#[test]
fn validate_record_surfaces_parse_errors() {
    let validator = BookingValidator::new(MemoryStore::new());
    let record = BookingRequestRecord {
        date: Some("2025-11-01".to_string()),
        time_slot: Some("teatime".to_string()),
        service_type: Some("baptism".to_string()),
        ..Default::default()
    };

    let err = validator.validate_record(record).unwrap_err();
    assert_eq!(err, BookingError::Parse(ParseError::Time("teatime".to_string())));
}

#[test]
fn validate_record_accepts_twelve_hour_form_input() {
    let validator = BookingValidator::new(MemoryStore::new());
    created(validator.commit(&wedding_at(14)).unwrap());

    let record = BookingRequestRecord {
        date: Some("2025-11-01".to_string()),
        time_slot: Some("3:00 PM".to_string()),
        service_type: Some("baptism".to_string()),
        ..Default::default()
    };
    let result = validator.validate_record(record).unwrap();
    assert_eq!(result.reason, Some(ConflictReason::DurationOverlapConflict));
}
