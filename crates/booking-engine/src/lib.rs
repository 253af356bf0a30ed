//! # booking-engine
//!
//! Time-slot availability and booking-conflict resolution for parish service
//! reservations (weddings, baptisms, funerals, confirmations).
//!
//! Given one day's reservations, the engine reports which of the fixed hourly
//! slots are free, and checks a new request against duration overlaps, an
//! optional buffer rule, and multi-day funeral ranges before it may commit.
//! The engine is pure: every call takes a snapshot and returns a value.
//! [`BookingValidator`] wires it to a [`ReservationStore`].
//!
//! ## Modules
//!
//! - [`time`] — `TimeOfDay` and strict time/date parsing
//! - [`service`] — service types, durations, exclusivity
//! - [`catalog`] — the slot grid
//! - [`reservation`] — reservations, statuses, funeral ranges, requests
//! - [`availability`] — per-slot status for a date
//! - [`conflict`] — accept/reject one request with a typed reason
//! - [`store`] — the `ReservationStore` seam and an in-memory store
//! - [`validator`] — `BookingValidator`, the adapter-facing entry point
//! - [`wire`] — tolerant inbound records and JSON helpers
//! - [`config`] — `EngineConfig` and the buffer policy
//! - [`error`] — error types

pub mod availability;
pub mod catalog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod reservation;
pub mod service;
pub mod store;
pub mod time;
pub mod validator;
pub mod wire;

pub use availability::{compute_availability, summarize, DaySummary, SlotBlock, SlotStatus};
pub use catalog::{SlotCatalog, TimeSlot};
pub use config::{BufferPolicy, EngineConfig};
pub use conflict::{check, ConflictReason, ConflictResult};
pub use error::{BookingError, ParseError, StoreError};
pub use reservation::{BookingRequest, FuneralRange, Placement, Reservation, ReservationStatus};
pub use service::ServiceType;
pub use store::{MemoryStore, ReservationStore};
pub use time::TimeOfDay;
pub use validator::{BookingValidator, CommitOutcome};
