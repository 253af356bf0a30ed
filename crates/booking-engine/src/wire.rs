//! Wire records: reservations and requests as they arrive from the dashboard
//! and the existing database, before normalization.
//!
//! Field names are tolerant (the same start time shows up as `time_slot`,
//! `time`, `start_time` or `reservation_time` depending on the producer).
//! Field values are not: every time, date, service and status goes through a
//! strict parser, and a value that fails is a [`ParseError`].

use serde::{Deserialize, Serialize};

use crate::error::{BookingError, ParseError};
use crate::reservation::{BookingRequest, FuneralRange, Reservation, ReservationStatus};
use crate::service::ServiceType;
use crate::time::{parse_date, TimeOfDay};

/// Database ids are integers in some tables and UUID strings in others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Number(n) => n.to_string(),
            RecordId::Text(s) => s,
        }
    }
}

/// A stored reservation in any of the shapes existing producers emit.
///
/// Unknown fields (payment, contact phone, priest assignment, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub reservation_date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub reservation_time: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub funeral_start_date: Option<String>,
    #[serde(default)]
    pub funeral_end_date: Option<String>,
}

/// First present, non-blank value.
fn first<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ParseError> {
    value.ok_or(ParseError::MissingField(field))
}

/// Both funeral dates, or neither.
fn funeral_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<FuneralRange>, ParseError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ParseError::MissingField("funeral_end_date")),
        (None, Some(_)) => Err(ParseError::MissingField("funeral_start_date")),
        (Some(s), Some(e)) => Ok(Some(FuneralRange::new(parse_date(s)?, parse_date(e)?)?)),
    }
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = ParseError;

    fn try_from(record: ReservationRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .clone()
            .map(RecordId::into_string)
            .ok_or(ParseError::MissingField("id"))?;
        let date = parse_date(required(
            first(&[&record.date, &record.reservation_date]),
            "date",
        )?)?;
        let start_time = TimeOfDay::parse(required(
            first(&[
                &record.time_slot,
                &record.time,
                &record.start_time,
                &record.reservation_time,
            ]),
            "time_slot",
        )?)?;
        let service_type: ServiceType =
            required(first(&[&record.service_type]), "service_type")?.parse()?;
        let status: ReservationStatus = required(first(&[&record.status]), "status")?.parse()?;
        let funeral_range = funeral_range(
            first(&[&record.funeral_start_date]),
            first(&[&record.funeral_end_date]),
        )?;
        let holder_name = first(&[&record.contact_name, &record.full_name]).map(str::to_string);

        Ok(Reservation {
            id,
            date,
            start_time,
            service_type,
            status,
            funeral_range,
            holder_name,
        })
    }
}

/// A booking form submission.
///
/// Accepts the same start-time spellings as [`ReservationRecord`] plus the
/// camelCase names the booking form posts (`reservationTime`,
/// `reservationDate`, `selectedService`). When several are present the first
/// non-blank one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequestRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "reservationDate")]
    pub reservation_date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default, rename = "reservationTime")]
    pub reservation_time: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default, rename = "selectedService")]
    pub selected_service: Option<String>,
    #[serde(default)]
    pub funeral_start_date: Option<String>,
    #[serde(default)]
    pub funeral_end_date: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
}

impl TryFrom<BookingRequestRecord> for BookingRequest {
    type Error = BookingError;

    /// A funeral's range starts at `funeral_start_date`, falling back to the
    /// request date; `funeral_end_date` is always required. Other services
    /// need a date.
    fn try_from(record: BookingRequestRecord) -> Result<Self, Self::Error> {
        let service_type: ServiceType = required(
            first(&[&record.service_type, &record.selected_service]),
            "service_type",
        )?
        .parse()?;
        let start_time = TimeOfDay::parse(required(
            first(&[
                &record.time_slot,
                &record.time,
                &record.start_time,
                &record.reservation_time,
            ]),
            "time_slot",
        )?)?;
        let date = first(&[&record.date, &record.reservation_date]);

        let request = if service_type == ServiceType::Funeral {
            let range_start = required(
                first(&[&record.funeral_start_date]).or(date),
                "funeral_start_date",
            )?;
            let range_end = required(first(&[&record.funeral_end_date]), "funeral_end_date")?;
            let range = FuneralRange::new(parse_date(range_start)?, parse_date(range_end)?)?;
            let date = match date {
                Some(d) => parse_date(d)?,
                None => range.start(),
            };
            BookingRequest::funeral(date, start_time, range)
        } else {
            let date = parse_date(required(date, "date")?)?;
            BookingRequest::point_in_time(date, start_time, service_type)?
        };

        Ok(match first(&[&record.contact_name]) {
            Some(name) => request.with_holder(name),
            None => request,
        })
    }
}

/// Snapshot payloads come either as a bare array or wrapped as
/// `{"reservations": [...]}` (the listing endpoint's shape).
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Bare(Vec<ReservationRecord>),
    Wrapped { reservations: Vec<ReservationRecord> },
}

/// Parse and normalize a JSON reservation snapshot.
///
/// # Errors
/// Fails on malformed JSON or on the first record that does not normalize.
pub fn parse_reservations_json(json: &str) -> Result<Vec<Reservation>, ParseError> {
    let records = match serde_json::from_str::<Snapshot>(json)? {
        Snapshot::Bare(records) => records,
        Snapshot::Wrapped { reservations } => reservations,
    };
    records.into_iter().map(Reservation::try_from).collect()
}

/// Parse and normalize a JSON booking request.
pub fn parse_request_json(json: &str) -> Result<BookingRequest, BookingError> {
    let record: BookingRequestRecord = serde_json::from_str(json).map_err(ParseError::from)?;
    BookingRequest::try_from(record)
}
