//! Service catalog: the four bookable rites, their fixed durations and how
//! each one occupies the calendar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// How a service occupies the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusivity {
    /// Occupies `[start, start + duration)` on one day of the slot grid.
    PointInTime,
    /// Occupies whole days, inclusive of both ends, outside the slot grid.
    ExclusiveDateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Wedding,
    Baptism,
    Funeral,
    Confirmation,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Wedding,
        ServiceType::Baptism,
        ServiceType::Funeral,
        ServiceType::Confirmation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Wedding => "wedding",
            ServiceType::Baptism => "baptism",
            ServiceType::Funeral => "funeral",
            ServiceType::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ParseError;

    /// Service types arrive lowercase on the wire. Surrounding whitespace and
    /// case are tolerated; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wedding" => Ok(ServiceType::Wedding),
            "baptism" => Ok(ServiceType::Baptism),
            "funeral" => Ok(ServiceType::Funeral),
            "confirmation" => Ok(ServiceType::Confirmation),
            _ => Err(ParseError::ServiceType(s.to_string())),
        }
    }
}

/// Fixed duration of a service, in minutes.
pub const fn duration_of(service: ServiceType) -> u32 {
    match service {
        ServiceType::Wedding => 180,
        ServiceType::Baptism => 60,
        ServiceType::Funeral => 120,
        ServiceType::Confirmation => 90,
    }
}

pub const fn exclusivity_of(service: ServiceType) -> Exclusivity {
    match service {
        ServiceType::Funeral => Exclusivity::ExclusiveDateRange,
        _ => Exclusivity::PointInTime,
    }
}

/// True for services that block whole date ranges instead of slots.
pub const fn is_exclusive_range(service: ServiceType) -> bool {
    matches!(exclusivity_of(service), Exclusivity::ExclusiveDateRange)
}

/// Duration rendered in hours for user messages: `3`, `1.5`.
pub fn duration_hours_label(service: ServiceType) -> String {
    let minutes = duration_of(service);
    if minutes % 60 == 0 {
        (minutes / 60).to_string()
    } else {
        format!("{}", f64::from(minutes) / 60.0)
    }
}
