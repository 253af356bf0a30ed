//! Engine configuration.
//!
//! Every field has a default, so an empty TOML file or `{}` JSON document
//! yields the standard behavior: eight hourly slots, buffer rule off.

use serde::{Deserialize, Serialize};

use crate::catalog::{SlotCatalog, TimeSlot};
use crate::error::Result;

pub const DEFAULT_BUFFER_MINUTES: u32 = 60;

/// Minimum gap between two bookings' start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPolicy {
    pub enabled: bool,
    pub window_minutes: u32,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            window_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }
}

impl BufferPolicy {
    pub fn enabled(window_minutes: u32) -> Self {
        Self {
            enabled: true,
            window_minutes,
        }
    }

    /// True when `a` and `b` are distinct start times closer than the window
    /// (inclusive). Always false while the policy is off.
    pub fn violated_by(&self, a: u32, b: u32) -> bool {
        if !self.enabled {
            return false;
        }
        let gap = a.abs_diff(b);
        gap > 0 && gap <= self.window_minutes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub buffer: BufferPolicy,
    /// Replaces the standard slot grid when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<TimeSlot>>,
}

impl EngineConfig {
    /// Resolve the slot catalog this configuration describes.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidCatalog` for a malformed custom grid.
    pub fn slot_catalog(&self) -> Result<SlotCatalog> {
        match &self.slots {
            Some(slots) => SlotCatalog::new(slots.clone()),
            None => Ok(SlotCatalog::standard()),
        }
    }
}
